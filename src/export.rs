use std::io::Cursor;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{ImageFormat, RgbaImage};

use crate::error::{CropError, Result};

/// Form key the finished avatar is packaged under.
pub const AVATAR_FIELD_NAME: &str = "avatar";

const PNG_CONTENT_TYPE: &str = "image/png";

/// Encode the raster as PNG bytes.
pub fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CropError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Encode the raster as a `data:image/png;base64,…` URL for immediate
/// display by the host.
pub fn data_url(image: &RgbaImage) -> Result<String> {
    let bytes = png_bytes(image)?;
    Ok(format!(
        "data:{};base64,{}",
        PNG_CONTENT_TYPE,
        BASE64.encode(bytes)
    ))
}

/// One multipart form field holding the finished avatar, ready for a future
/// upload. Only constructed here; nothing is transmitted.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FormField {
    /// Package PNG bytes under the fixed [`AVATAR_FIELD_NAME`] key with a
    /// timestamped file name.
    pub fn avatar(bytes: Vec<u8>) -> Self {
        Self {
            name: AVATAR_FIELD_NAME.to_string(),
            file_name: format!("{}.png", unix_millis()),
            content_type: PNG_CONTENT_TYPE.to_string(),
            bytes,
        }
    }

    /// Render the field as a complete `multipart/form-data` body with the
    /// given boundary.
    pub fn multipart_body(&self, boundary: &str) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.bytes.len() + 256);
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                self.name, self.file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.content_type).as_bytes());
        body.extend_from_slice(&self.bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        body
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// In-flight background packaging of a finished avatar.
pub struct UploadTask {
    rx: Receiver<Result<FormField>>,
}

/// Package `image` into its upload form field on a worker thread.
///
/// The field is a side channel: it has no ordering relationship with the
/// data-URL path, and there is no retry. The caller polls the task and logs
/// failures.
pub fn spawn_upload_field(image: RgbaImage) -> UploadTask {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let _ = tx.send(png_bytes(&image).map(FormField::avatar));
    });
    UploadTask { rx }
}

impl UploadTask {
    /// Non-blocking poll; `None` while the worker is still running.
    pub fn poll(&self) -> Option<Result<FormField>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(CropError::WorkerExited)),
        }
    }
}
