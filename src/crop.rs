use eframe::egui::Vec2;
use image::RgbaImage;

/// Fixed output aspect ratio (width / height). Avatars are square.
pub const ASPECT_RATIO: f32 = 1.0;

/// Smallest acceptable source-image edge and smallest selectable crop edge,
/// in pixels.
pub const MIN_DIMENSION: f32 = 150.0;

/// Unit a [`CropRegion`]'s coordinates are expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CropUnit {
    /// Percentages (0 to 100) of the displayed image size.
    #[default]
    Percent,
    /// Displayed-image pixels.
    Pixel,
}

/// A crop selection over the displayed image.
///
/// Coordinates are always relative to the *displayed* size of the image, in
/// the unit recorded in `unit`; converting to the source's natural
/// resolution is the rasterizer's job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub unit: CropUnit,
}

impl CropRegion {
    pub fn percent(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: CropUnit::Percent,
        }
    }

    pub fn pixels(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            unit: CropUnit::Pixel,
        }
    }

    /// The same region in displayed-pixel units.
    pub fn to_pixel(&self, container: Vec2) -> CropRegion {
        match self.unit {
            CropUnit::Pixel => *self,
            CropUnit::Percent => CropRegion::pixels(
                self.x * container.x / 100.0,
                self.y * container.y / 100.0,
                self.width * container.x / 100.0,
                self.height * container.y / 100.0,
            ),
        }
    }

    /// The same region as percentages of the displayed size.
    pub fn to_percent(&self, container: Vec2) -> CropRegion {
        match self.unit {
            CropUnit::Percent => *self,
            CropUnit::Pixel => CropRegion::percent(
                self.x / container.x * 100.0,
                self.y / container.y * 100.0,
                self.width / container.x * 100.0,
                self.height / container.y * 100.0,
            ),
        }
    }

    /// Derive the missing dimension so the region is `aspect`-true in pixel
    /// space, then shrink it along the aspect wherever it would overflow the
    /// container. The result keeps this region's unit.
    ///
    /// A region with only `width` set gets its height computed; one with only
    /// `height` set gets its width computed.
    pub fn with_aspect(&self, aspect: f32, container: Vec2) -> CropRegion {
        let mut px = self.to_pixel(container);

        if self.width > 0.0 {
            px.height = px.width / aspect;
        }
        if self.height > 0.0 {
            px.width = px.height * aspect;
        }

        if px.y + px.height > container.y {
            px.height = container.y - px.y;
            px.width = px.height * aspect;
        }
        if px.x + px.width > container.x {
            px.width = container.x - px.x;
            px.height = px.width / aspect;
        }

        match self.unit {
            CropUnit::Percent => px.to_percent(container),
            CropUnit::Pixel => px,
        }
    }

    /// Center the region within the container, keeping its size and unit.
    pub fn centered(&self, container: Vec2) -> CropRegion {
        let mut px = self.to_pixel(container);
        px.x = (container.x - px.width) / 2.0;
        px.y = (container.y - px.height) / 2.0;

        match self.unit {
            CropUnit::Percent => px.to_percent(container),
            CropUnit::Pixel => px,
        }
    }
}

/// Seed crop shown once an image finishes loading: [`MIN_DIMENSION`] wide as
/// a percentage of the displayed width, square in pixel space, centered.
pub fn initial_crop(displayed: Vec2) -> CropRegion {
    let width_pct = MIN_DIMENSION / displayed.x * 100.0;
    CropRegion::percent(0.0, 0.0, width_pct, 0.0)
        .with_aspect(ASPECT_RATIO, displayed)
        .centered(displayed)
}

/// Natural (intrinsic) and displayed (on-screen) dimensions of the image
/// under the crop UI. The display may scale each axis independently, and the
/// factor on either axis can be above or below 1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLayout {
    pub natural: Vec2,
    pub displayed: Vec2,
}

impl ImageLayout {
    /// Layout of `image` as rendered at `displayed` size.
    pub fn of(image: &RgbaImage, displayed: Vec2) -> Self {
        Self {
            natural: Vec2::new(image.width() as f32, image.height() as f32),
            displayed,
        }
    }

    /// Per-axis displayed→natural scale factors.
    pub fn scale(&self) -> Vec2 {
        Vec2::new(
            self.natural.x / self.displayed.x,
            self.natural.y / self.displayed.y,
        )
    }
}
