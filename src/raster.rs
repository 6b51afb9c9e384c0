use eframe::egui::Vec2;
use image::imageops::{interpolate_bilinear, interpolate_nearest};
use image::RgbaImage;

use crate::crop::{CropRegion, ImageLayout};
use crate::error::{CropError, Result};

/// Canvas-style 2D transform holding scale and translation, composed by
/// post-multiplication: `scale` then `translate` moves the origin in the
/// already-scaled space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    sx: f32,
    sy: f32,
    tx: f32,
    ty: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn scale(&mut self, kx: f32, ky: f32) {
        self.sx *= kx;
        self.sy *= ky;
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.tx += self.sx * dx;
        self.ty += self.sy * dy;
    }

    /// Map a drawing-space point to buffer space.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (self.sx * x + self.tx, self.sy * y + self.ty)
    }

    /// Map a buffer-space point back to drawing space.
    pub fn unapply(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.tx) / self.sx, (y - self.ty) / self.sy)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Resampling used when drawing through a non-identity transform. Bilinear
/// is the high-quality default.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Smoothing {
    Nearest,
    #[default]
    Bilinear,
}

/// An RGBA raster buffer with a canvas-like transform stack.
pub struct Surface {
    pixels: RgbaImage,
    transform: Transform,
    saved: Vec<Transform>,
    smoothing: Smoothing,
}

impl Surface {
    /// Allocate a `width` × `height` surface. A zero-sized surface cannot be
    /// drawn to; requesting one is a fatal error for this call.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CropError::SurfaceUnavailable { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
            transform: Transform::IDENTITY,
            saved: Vec::new(),
            smoothing: Smoothing::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn set_smoothing(&mut self, smoothing: Smoothing) {
        self.smoothing = smoothing;
    }

    pub fn scale(&mut self, kx: f32, ky: f32) {
        self.transform.scale(kx, ky);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.translate(dx, dy);
    }

    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    pub fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    /// Scoped save: the guard restores the current transform when dropped,
    /// however the enclosing scope exits.
    pub fn saved(&mut self) -> TransformScope<'_> {
        self.save();
        TransformScope { surface: self }
    }

    /// Draw `src` with its top-left corner at the drawing-space origin and
    /// its natural size, resampled through the current transform. Buffer
    /// pixels that map outside `src` are left untouched, so the buffer edge
    /// clips the drawing.
    pub fn draw_image(&mut self, src: &RgbaImage) {
        let (width, height) = self.pixels.dimensions();
        for by in 0..height {
            for bx in 0..width {
                let (ux, uy) = self.transform.unapply(bx as f32, by as f32);
                let sample = match self.smoothing {
                    Smoothing::Bilinear => interpolate_bilinear(src, ux, uy),
                    Smoothing::Nearest => interpolate_nearest(src, ux, uy),
                };
                if let Some(pixel) = sample {
                    self.pixels.put_pixel(bx, by, pixel);
                }
            }
        }
    }

    /// Consume the surface, yielding its pixel buffer.
    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }
}

// Debug output elides the pixel data.
impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("transform", &self.transform)
            .field("saved", &self.saved)
            .field("smoothing", &self.smoothing)
            .finish()
    }
}

/// Drop guard returned by [`Surface::saved`]; restores the previously saved
/// transform when it goes out of scope.
pub struct TransformScope<'a> {
    surface: &'a mut Surface,
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

impl std::ops::Deref for TransformScope<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl std::ops::DerefMut for TransformScope<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        self.surface
    }
}

/// Rasterize the selected region of `source` at its natural resolution.
///
/// `crop` is interpreted against the `displayed` size; the displayed→natural
/// scale is computed per axis, so a stretched display is handled. The
/// `pixel_ratio` density factor is applied uniformly on top for sharpness on
/// dense displays. All transforms are scoped, so repeated calls with the
/// same inputs produce identical buffers.
pub fn render_crop(
    source: &RgbaImage,
    crop: &CropRegion,
    displayed: Vec2,
    pixel_ratio: f32,
) -> Result<RgbaImage> {
    let crop = crop.to_pixel(displayed);
    let scale = ImageLayout::of(source, displayed).scale();

    let out_width = (crop.width * scale.x * pixel_ratio).floor() as u32;
    let out_height = (crop.height * scale.y * pixel_ratio).floor() as u32;
    if out_width == 0 || out_height == 0 {
        return Err(CropError::EmptySelection);
    }

    let mut surface = Surface::new(out_width, out_height)?;
    surface.scale(pixel_ratio, pixel_ratio);
    surface.set_smoothing(Smoothing::Bilinear);

    {
        let mut scope = surface.saved();
        scope.translate(-(crop.x * scale.x), -(crop.y * scale.y));
        scope.draw_image(source);
    }

    Ok(surface.into_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([x as u8, y as u8, (x ^ y) as u8, 255])
        })
    }

    #[test]
    fn transform_composes_like_a_canvas() {
        let mut t = Transform::IDENTITY;
        t.scale(2.0, 2.0);
        t.translate(-10.0, -5.0);

        assert_eq!(t.apply(10.0, 5.0), (0.0, 0.0));
        assert_eq!(t.apply(11.0, 5.0), (2.0, 0.0));
        assert_eq!(t.unapply(2.0, 0.0), (11.0, 5.0));
    }

    #[test]
    fn scope_guard_restores_the_transform() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.scale(2.0, 2.0);
        let outer = surface.transform();

        {
            let mut scope = surface.saved();
            scope.translate(-8.0, -8.0);
            assert_ne!(scope.transform(), outer);
        }

        assert_eq!(surface.transform(), outer);
    }

    #[test]
    fn scope_guard_restores_on_early_exit() {
        fn draw_or_bail(surface: &mut Surface, bail: bool) -> Option<()> {
            let mut scope = surface.saved();
            scope.translate(-1.0, -1.0);
            if bail {
                return None;
            }
            scope.draw_image(&gradient(2, 2));
            Some(())
        }

        let mut surface = Surface::new(4, 4).unwrap();
        let before = surface.transform();
        assert!(draw_or_bail(&mut surface, true).is_none());
        assert_eq!(surface.transform(), before);
    }

    #[test]
    fn zero_sized_surface_is_unavailable() {
        match Surface::new(0, 10) {
            Err(CropError::SurfaceUnavailable { width: 0, height: 10 }) => {}
            other => panic!("expected SurfaceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn debug_output_shows_dimensions_not_pixel_data() {
        let surface = Surface::new(8, 6).unwrap();
        let text = format!("{surface:?}");
        assert!(text.contains("width: 8"));
        assert!(text.contains("height: 6"));
        assert!(!text.contains("pixels"));
    }

    #[test]
    fn output_matches_scaled_crop_dimensions() {
        // 300x300 natural shown at 150x150; a 75x75 selection comes back at
        // natural resolution: 150x150.
        let source = gradient(300, 300);
        let crop = CropRegion::pixels(0.0, 0.0, 75.0, 75.0);
        let out = render_crop(&source, &crop, Vec2::new(150.0, 150.0), 1.0).unwrap();
        assert_eq!(out.dimensions(), (150, 150));
    }

    #[test]
    fn copies_the_region_at_natural_resolution() {
        let source = gradient(300, 300);
        // 5,10 displayed maps to 10,20 natural with a 2x display scale.
        let crop = CropRegion::pixels(5.0, 10.0, 75.0, 75.0);
        let out = render_crop(&source, &crop, Vec2::new(150.0, 150.0), 1.0).unwrap();

        assert_eq!(out.dimensions(), (150, 150));
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(10, 20));
        assert_eq!(out.get_pixel(149, 149), source.get_pixel(159, 169));
    }

    #[test]
    fn percent_crops_are_converted_before_mapping() {
        let source = gradient(300, 300);
        let crop = CropRegion::percent(0.0, 0.0, 50.0, 50.0);
        let out = render_crop(&source, &crop, Vec2::new(150.0, 150.0), 1.0).unwrap();
        assert_eq!(out.dimensions(), (150, 150));
        assert_eq!(out.get_pixel(10, 10), source.get_pixel(10, 10));
    }

    #[test]
    fn density_factor_scales_the_output() {
        let source = gradient(300, 300);
        let crop = CropRegion::pixels(0.0, 0.0, 75.0, 75.0);
        let out = render_crop(&source, &crop, Vec2::new(150.0, 150.0), 2.0).unwrap();

        assert_eq!(out.dimensions(), (300, 300));
        // Even buffer indices land on whole source pixels.
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(0, 0));
        assert_eq!(out.get_pixel(20, 40), source.get_pixel(10, 20));
    }

    #[test]
    fn stretched_displays_scale_each_axis() {
        // 400x300 natural stretched to 200x100: scale is (2, 3).
        let source = gradient(400, 300);
        let crop = CropRegion::pixels(10.0, 10.0, 50.0, 40.0);
        let out = render_crop(&source, &crop, Vec2::new(200.0, 100.0), 1.0).unwrap();
        assert_eq!(out.dimensions(), (100, 120));
    }

    #[test]
    fn repeated_renders_are_bit_identical() {
        let source = gradient(300, 300);
        let crop = CropRegion::percent(12.5, 20.0, 40.0, 40.0);
        let displayed = Vec2::new(240.0, 240.0);

        let first = render_crop(&source, &crop, displayed, 2.0).unwrap();
        let second = render_crop(&source, &crop, displayed, 2.0).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn selection_outside_the_source_stays_transparent() {
        let source = gradient(100, 100);
        // Extends 20 displayed pixels past the right edge of the image.
        let crop = CropRegion::pixels(90.0, 0.0, 30.0, 30.0);
        let out = render_crop(&source, &crop, Vec2::new(100.0, 100.0), 1.0).unwrap();

        assert_eq!(out.dimensions(), (30, 30));
        assert_eq!(out.get_pixel(0, 0), source.get_pixel(90, 0));
        assert_eq!(out.get_pixel(25, 0)[3], 0);
    }

    #[test]
    fn degenerate_selection_is_rejected() {
        let source = gradient(100, 100);
        let crop = CropRegion::pixels(0.0, 0.0, 0.0, 40.0);
        match render_crop(&source, &crop, Vec2::new(100.0, 100.0), 1.0) {
            Err(CropError::EmptySelection) => {}
            other => panic!("expected EmptySelection, got {other:?}"),
        }
    }
}
