//! Square avatar cropping: validate a source image, drag a square selection
//! over its displayed rendition, rasterize the selection at natural
//! resolution, and export the result as a PNG data URL and an upload form
//! field.

pub mod app;
pub mod crop;
pub mod error;
pub mod export;
pub mod logger;
pub mod raster;
pub mod session;

pub use app::AvatarCropper;
pub use crop::{initial_crop, CropRegion, CropUnit, ImageLayout, ASPECT_RATIO, MIN_DIMENSION};
pub use error::{CropError, Result};
pub use export::{data_url, png_bytes, FormField, AVATAR_FIELD_NAME};
pub use raster::{render_crop, Smoothing, Surface, Transform};
pub use session::{validate_dimensions, LoadState, LoadedImage};
