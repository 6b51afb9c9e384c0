use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

use image::RgbaImage;
use tracing::info;

use crate::crop::MIN_DIMENSION;
use crate::error::{CropError, Result};

/// A decoded source image that passed the minimum-dimension gate.
#[derive(Debug)]
pub struct LoadedImage {
    pub image: RgbaImage,
    pub path: PathBuf,
}

impl LoadedImage {
    pub fn natural_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Where the session is in the load pipeline. A selection only ever exists
/// in `Validated`; choosing a new file resets to `Decoding` and drops any
/// previous selection.
#[derive(Default)]
pub enum LoadState {
    #[default]
    Idle,
    Decoding,
    Validated(LoadedImage),
    Rejected(String),
}

/// Gate an image's natural dimensions against the minimum the crop needs.
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    let min = MIN_DIMENSION as u32;
    if width < min || height < min {
        return Err(CropError::ImageTooSmall { width, height, min });
    }
    Ok(())
}

fn decode_and_validate(path: PathBuf) -> Result<LoadedImage> {
    let image = image::open(&path)?.to_rgba8();
    let (width, height) = image.dimensions();
    validate_dimensions(width, height)?;
    info!(path = %path.display(), width, height, "image decoded");
    Ok(LoadedImage { image, path })
}

/// In-flight background decode of a chosen file.
pub struct DecodeTask {
    rx: Receiver<Result<LoadedImage>>,
}

/// Decode and validate `path` on a worker thread.
pub fn spawn_decode(path: PathBuf) -> DecodeTask {
    let (tx, rx) = channel();
    thread::spawn(move || {
        let _ = tx.send(decode_and_validate(path));
    });
    DecodeTask { rx }
}

impl DecodeTask {
    /// Non-blocking poll; `None` while the worker is still running.
    pub fn poll(&self) -> Option<Result<LoadedImage>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(CropError::WorkerExited)),
        }
    }
}
