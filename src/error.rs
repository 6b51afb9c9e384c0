use thiserror::Error;

/// Failures across the crop session.
///
/// `ImageTooSmall` is the only error a user is expected to recover from by
/// picking a different file; its message is shown verbatim in the UI. The
/// remaining variants end the operation that raised them.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Image must be at least {min} x {min} pixels.")]
    ImageTooSmall { width: u32, height: u32, min: u32 },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("crop selection is empty")]
    EmptySelection,

    #[error("no drawing surface available for a {width} x {height} output")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("background worker exited before reporting a result")]
    WorkerExited,
}

pub type Result<T> = std::result::Result<T, CropError>;
