use std::path::PathBuf;

use eframe::egui;
use image::RgbaImage;
use tracing::{error, info, warn};

use crate::crop::{initial_crop, CropRegion, ASPECT_RATIO, MIN_DIMENSION};
use crate::export::{data_url, spawn_upload_field, FormField, UploadTask};
use crate::raster::render_crop;
use crate::session::{spawn_decode, DecodeTask, LoadState};

/// Side length of the circular result preview, in points.
const PREVIEW_SIZE: f32 = 150.0;

#[derive(Clone, Copy, Debug, PartialEq)]
enum ResizeHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Center, // moves the whole selection
}

/// The avatar-cropping window: pick an image, adjust the square selection,
/// confirm, and the finished avatar is rendered, previewed, and packaged.
#[derive(Default)]
pub struct AvatarCropper {
    state: LoadState,
    decode: Option<DecodeTask>,
    texture: Option<egui::TextureHandle>,
    crop: Option<CropRegion>, // percent of the displayed size
    selected_handle: Option<ResizeHandle>,
    avatar: Option<RgbaImage>,
    avatar_texture: Option<egui::TextureHandle>,
    upload: Option<UploadTask>,
    upload_field: Option<FormField>,
    on_avatar: Option<Box<dyn FnMut(&str)>>,
}

impl AvatarCropper {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self::default()
    }

    /// Register the host callback that receives each finished avatar as a
    /// PNG data URL.
    pub fn with_avatar_callback(mut self, on_avatar: impl FnMut(&str) + 'static) -> Self {
        self.on_avatar = Some(Box::new(on_avatar));
        self
    }

    fn begin_load(&mut self, path: PathBuf) {
        info!(path = %path.display(), "loading image");
        self.texture = None;
        self.crop = None;
        self.selected_handle = None;
        self.state = LoadState::Decoding;
        self.decode = Some(spawn_decode(path));
    }

    fn poll_decode(&mut self, ctx: &egui::Context) {
        if let Some(task) = self.decode.take() {
            match task.poll() {
                None => {
                    self.decode = Some(task);
                    ctx.request_repaint();
                }
                Some(Ok(loaded)) => {
                    self.texture = Some(Self::texture_from(ctx, "source", &loaded.image));
                    self.state = LoadState::Validated(loaded);
                }
                Some(Err(err)) => {
                    warn!(%err, "image rejected");
                    self.state = LoadState::Rejected(err.to_string());
                }
            }
        }
    }

    fn poll_upload(&mut self) {
        if let Some(task) = self.upload.take() {
            match task.poll() {
                None => self.upload = Some(task),
                Some(Ok(field)) => {
                    info!(
                        name = %field.name,
                        file_name = %field.file_name,
                        bytes = field.bytes.len(),
                        "avatar packaged for upload"
                    );
                    self.upload_field = Some(field);
                }
                Some(Err(err)) => error!(%err, "failed to package avatar"),
            }
        }
    }

    /// Render the current selection at natural resolution and publish it:
    /// data URL to the host callback, form field to the background packer,
    /// preview texture to the UI.
    fn confirm_crop(&mut self, ctx: &egui::Context, display_size: egui::Vec2) {
        let raster = match (&self.state, self.crop) {
            (LoadState::Validated(loaded), Some(crop)) => {
                let pixel_ratio = ctx.pixels_per_point();
                match render_crop(&loaded.image, &crop, display_size, pixel_ratio) {
                    Ok(raster) => raster,
                    Err(err) => {
                        error!(%err, "failed to rasterize the selection");
                        return;
                    }
                }
            }
            _ => return,
        };

        match data_url(&raster) {
            Ok(url) => {
                if let Some(on_avatar) = &mut self.on_avatar {
                    on_avatar(&url);
                }
            }
            Err(err) => error!(%err, "failed to encode the avatar"),
        }

        self.upload = Some(spawn_upload_field(raster.clone()));
        self.avatar_texture = Some(Self::texture_from(ctx, "avatar", &raster));
        info!(
            width = raster.width(),
            height = raster.height(),
            "avatar rendered"
        );
        self.avatar = Some(raster);
    }

    fn save_avatar(&self) {
        if let Some(avatar) = &self.avatar {
            let mut dialog = rfd::FileDialog::new().add_filter("Image", &["png"]);
            if let Some(field) = &self.upload_field {
                dialog = dialog.set_file_name(field.file_name.as_str());
            }
            if let Some(path) = dialog.save_file() {
                match avatar.save(&path) {
                    Ok(()) => info!(path = %path.display(), "avatar saved"),
                    Err(err) => error!(%err, "failed to save avatar"),
                }
            }
        }
    }

    fn texture_from(ctx: &egui::Context, name: &str, image: &RgbaImage) -> egui::TextureHandle {
        let size = [image.width() as _, image.height() as _];
        let pixels = image.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR)
    }

    fn hit_test(pos: egui::Pos2, rect: egui::Rect) -> Option<ResizeHandle> {
        let tolerance = 10.0;

        let min = rect.min;
        let max = rect.max;

        if pos.distance(min) < tolerance {
            return Some(ResizeHandle::TopLeft);
        }
        if pos.distance(egui::pos2(max.x, min.y)) < tolerance {
            return Some(ResizeHandle::TopRight);
        }
        if pos.distance(egui::pos2(min.x, max.y)) < tolerance {
            return Some(ResizeHandle::BottomLeft);
        }
        if pos.distance(max) < tolerance {
            return Some(ResizeHandle::BottomRight);
        }

        if (pos.x - min.x).abs() < tolerance && pos.y > min.y && pos.y < max.y {
            return Some(ResizeHandle::Left);
        }
        if (pos.x - max.x).abs() < tolerance && pos.y > min.y && pos.y < max.y {
            return Some(ResizeHandle::Right);
        }
        if (pos.y - min.y).abs() < tolerance && pos.x > min.x && pos.x < max.x {
            return Some(ResizeHandle::Top);
        }
        if (pos.y - max.y).abs() < tolerance && pos.x > min.x && pos.x < max.x {
            return Some(ResizeHandle::Bottom);
        }

        if rect.contains(pos) {
            return Some(ResizeHandle::Center);
        }

        None
    }
}

/// Largest size with the image's aspect ratio that fits `available`, never
/// scaled above natural size so the rendered avatar cannot come out smaller
/// than the selection promises. Collapses to zero when `available` runs out.
fn fit_size(image: egui::Vec2, available: egui::Vec2) -> egui::Vec2 {
    let scale = (available.x / image.x)
        .min(available.y / image.y)
        .min(1.0)
        .max(0.0);
    image * scale
}

/// Apply a drag to the selection. The result is square, at least `min_edge`
/// on a side, and inside `bounds`; all coordinates are displayed-image
/// pixels.
fn drag_crop(
    rect: egui::Rect,
    handle: ResizeHandle,
    delta: egui::Vec2,
    bounds: egui::Rect,
    min_edge: f32,
) -> egui::Rect {
    match handle {
        ResizeHandle::Center => {
            // Safe panning: constrain the delta so the rect stays in bounds
            let mut final_delta = delta;
            if rect.min.x + final_delta.x < bounds.min.x {
                final_delta.x = bounds.min.x - rect.min.x;
            }
            if rect.max.x + final_delta.x > bounds.max.x {
                final_delta.x = bounds.max.x - rect.max.x;
            }
            if rect.min.y + final_delta.y < bounds.min.y {
                final_delta.y = bounds.min.y - rect.min.y;
            }
            if rect.max.y + final_delta.y > bounds.max.y {
                final_delta.y = bounds.max.y - rect.max.y;
            }
            rect.translate(final_delta)
        }
        ResizeHandle::TopLeft
        | ResizeHandle::TopRight
        | ResizeHandle::BottomLeft
        | ResizeHandle::BottomRight => {
            // The opposite corner stays fixed while the dragged one moves.
            let (anchor, mut corner) = match handle {
                ResizeHandle::TopLeft => (rect.max, rect.min),
                ResizeHandle::TopRight => (
                    egui::pos2(rect.min.x, rect.max.y),
                    egui::pos2(rect.max.x, rect.min.y),
                ),
                ResizeHandle::BottomLeft => (
                    egui::pos2(rect.max.x, rect.min.y),
                    egui::pos2(rect.min.x, rect.max.y),
                ),
                _ => (rect.min, rect.max),
            };
            corner += delta;

            // Project the suggested dimensions onto the aspect-ratio
            // direction U = (ratio, 1.0)
            let raw = egui::vec2((corner.x - anchor.x).abs(), (corner.y - anchor.y).abs());
            let u = egui::vec2(ASPECT_RATIO, 1.0);
            let lambda = raw.dot(u) / u.length_sq();

            // The anchor cannot move, so growth is limited by the room the
            // bounds leave on the dragged side.
            let avail = match handle {
                ResizeHandle::TopLeft => {
                    egui::vec2(anchor.x - bounds.min.x, anchor.y - bounds.min.y)
                }
                ResizeHandle::TopRight => {
                    egui::vec2(bounds.max.x - anchor.x, anchor.y - bounds.min.y)
                }
                ResizeHandle::BottomLeft => {
                    egui::vec2(anchor.x - bounds.min.x, bounds.max.y - anchor.y)
                }
                _ => egui::vec2(bounds.max.x - anchor.x, bounds.max.y - anchor.y),
            };
            let lambda_max = (avail.x / u.x).min(avail.y / u.y);
            let lambda_min = (min_edge / u.x).max(min_edge / u.y).min(lambda_max);
            // max/min chain, not clamp: inverted or NaN limits from a
            // collapsed display must not panic mid-drag.
            let size = u * lambda.max(lambda_min).min(lambda_max);

            match handle {
                ResizeHandle::TopLeft => egui::Rect::from_min_max(anchor - size, anchor),
                ResizeHandle::TopRight => egui::Rect::from_min_max(
                    egui::pos2(anchor.x, anchor.y - size.y),
                    egui::pos2(anchor.x + size.x, anchor.y),
                ),
                ResizeHandle::BottomLeft => egui::Rect::from_min_max(
                    egui::pos2(anchor.x - size.x, anchor.y),
                    egui::pos2(anchor.x, anchor.y + size.y),
                ),
                _ => egui::Rect::from_min_max(anchor, anchor + size),
            }
        }
        // Side handles drive one dimension and keep the other centered
        ResizeHandle::Left | ResizeHandle::Right => {
            let driven = match handle {
                ResizeHandle::Left => rect.width() - delta.x,
                _ => rect.width() + delta.x,
            };
            let center_y = rect.center().y;
            let room_x = match handle {
                ResizeHandle::Left => rect.max.x - bounds.min.x,
                _ => bounds.max.x - rect.min.x,
            };
            let room_y = 2.0 * (center_y - bounds.min.y).min(bounds.max.y - center_y);
            let max_w = room_x.min(room_y * ASPECT_RATIO);
            let w = driven.max(min_edge.min(max_w)).min(max_w);
            let h = w / ASPECT_RATIO;
            let x = match handle {
                ResizeHandle::Left => rect.max.x - w,
                _ => rect.min.x,
            };
            egui::Rect::from_min_size(egui::pos2(x, center_y - h * 0.5), egui::vec2(w, h))
        }
        ResizeHandle::Top | ResizeHandle::Bottom => {
            let driven = match handle {
                ResizeHandle::Top => rect.height() - delta.y,
                _ => rect.height() + delta.y,
            };
            let center_x = rect.center().x;
            let room_y = match handle {
                ResizeHandle::Top => rect.max.y - bounds.min.y,
                _ => bounds.max.y - rect.min.y,
            };
            let room_x = 2.0 * (center_x - bounds.min.x).min(bounds.max.x - center_x);
            let max_h = room_y.min(room_x / ASPECT_RATIO);
            let h = driven.max(min_edge.min(max_h)).min(max_h);
            let w = h * ASPECT_RATIO;
            let y = match handle {
                ResizeHandle::Top => rect.max.y - h,
                _ => rect.min.y,
            };
            egui::Rect::from_min_size(egui::pos2(center_x - w * 0.5, y), egui::vec2(w, h))
        }
    }
}

impl eframe::App for AvatarCropper {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle dropped files
        if !ctx.input(|i| i.raw.dropped_files.is_empty()) {
            let dropped_files = ctx.input(|i| i.raw.dropped_files.clone());
            if let Some(file) = dropped_files.first() {
                if let Some(path) = &file.path {
                    self.begin_load(path.clone());
                }
            }
        }

        self.poll_decode(ctx);
        self.poll_upload();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open Image").clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Image", &["png", "jpg", "jpeg", "bmp"])
                        .pick_file()
                    {
                        self.begin_load(path);
                    }
                }

                match &self.state {
                    LoadState::Idle => {
                        ui.label("Open or drop an image to start.");
                    }
                    LoadState::Decoding => {
                        ui.spinner();
                    }
                    LoadState::Rejected(message) => {
                        ui.colored_label(egui::Color32::LIGHT_RED, message);
                    }
                    LoadState::Validated(_) => {}
                }
            });

            let mut crop_clicked = false;
            if matches!(self.state, LoadState::Validated(_)) {
                ui.horizontal(|ui| {
                    crop_clicked = ui.button("Crop Image").clicked();

                    if let Some(texture) = &self.avatar_texture {
                        let sized = egui::load::SizedTexture::new(
                            texture.id(),
                            egui::vec2(PREVIEW_SIZE, PREVIEW_SIZE),
                        );
                        ui.add(egui::Image::from_texture(sized).rounding(PREVIEW_SIZE / 2.0));
                        if ui.button("Save Avatar…").clicked() {
                            self.save_avatar();
                        }
                    }
                });
                ui.separator();
            }

            let mut shown_display_size = None;

            if let (Some(texture), LoadState::Validated(_)) = (&self.texture, &self.state) {
                const PADDING: f32 = 20.0;
                let available_size = ui.available_size();
                let max_size = available_size - egui::vec2(PADDING * 2.0, PADDING * 2.0);
                let display_size = fit_size(texture.size_vec2(), max_size);

                // Nothing to lay out or drag once the window collapses
                // below the padding.
                if display_size.x > 0.0 && display_size.y > 0.0 {
                    shown_display_size = Some(display_size);

                    let total_display_size =
                        display_size + egui::vec2(PADDING * 2.0, PADDING * 2.0);

                    // Manual centering
                    let x_offset = (available_size.x - total_display_size.x) / 2.0;
                    let y_offset = (available_size.y - total_display_size.y) / 2.0;
                    let start_pos =
                        ui.cursor().min + egui::vec2(x_offset.max(0.0), y_offset.max(0.0));

                    let target_rect = egui::Rect::from_min_size(start_pos, total_display_size);

                    let response = ui.allocate_rect(target_rect, egui::Sense::drag());
                    let painter = ui.painter_at(target_rect);

                    let image_rect = egui::Rect::from_min_size(
                        target_rect.min + egui::vec2(PADDING, PADDING),
                        display_size,
                    );

                    // Draw image
                    painter.image(
                        texture.id(),
                        image_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );

                    // A selection only exists once the image is shown; seed it
                    // centered at the minimum size
                    let crop = self.crop.get_or_insert_with(|| initial_crop(display_size));

                    let pixel = crop.to_pixel(display_size);
                    let mut crop_px = egui::Rect::from_min_size(
                        egui::pos2(pixel.x, pixel.y),
                        egui::vec2(pixel.width, pixel.height),
                    );
                    let mut screen_crop_rect = crop_px.translate(image_rect.min.to_vec2());

                    // Handle input
                    if response.drag_started() {
                        if let Some(pos) = response.interact_pointer_pos() {
                            self.selected_handle = Self::hit_test(pos, screen_crop_rect);
                        }
                    }

                    if response.dragged() {
                        if let Some(handle) = self.selected_handle {
                            let bounds = egui::Rect::from_min_size(egui::Pos2::ZERO, display_size);
                            let min_edge = MIN_DIMENSION.min(display_size.x).min(display_size.y);
                            crop_px =
                                drag_crop(crop_px, handle, response.drag_delta(), bounds, min_edge);
                            *crop = CropRegion::pixels(
                                crop_px.min.x,
                                crop_px.min.y,
                                crop_px.width(),
                                crop_px.height(),
                            )
                            .to_percent(display_size);

                            // Re-calculate the screen rect after modification
                            screen_crop_rect = crop_px.translate(image_rect.min.to_vec2());
                        }
                    }

                    if response.drag_stopped() {
                        self.selected_handle = None;
                    }

                    // Draw overlay (dimmed area outside the selection)
                    let overlay_color = egui::Color32::from_black_alpha(150);

                    // Top
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            image_rect.min,
                            egui::pos2(image_rect.max.x, screen_crop_rect.min.y),
                        ),
                        0.0,
                        overlay_color,
                    );
                    // Bottom
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(image_rect.min.x, screen_crop_rect.max.y),
                            image_rect.max,
                        ),
                        0.0,
                        overlay_color,
                    );
                    // Left
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(image_rect.min.x, screen_crop_rect.min.y),
                            egui::pos2(screen_crop_rect.min.x, screen_crop_rect.max.y),
                        ),
                        0.0,
                        overlay_color,
                    );
                    // Right
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(screen_crop_rect.max.x, screen_crop_rect.min.y),
                            egui::pos2(image_rect.max.x, screen_crop_rect.max.y),
                        ),
                        0.0,
                        overlay_color,
                    );

                    // Draw selection border and the circular-mask hint
                    painter.rect_stroke(
                        screen_crop_rect,
                        0.0,
                        egui::Stroke::new(1.0, egui::Color32::WHITE),
                    );
                    painter.circle_stroke(
                        screen_crop_rect.center(),
                        screen_crop_rect.width() * 0.5,
                        egui::Stroke::new(1.0, egui::Color32::WHITE),
                    );

                    // Draw handles
                    let handle_radius = 6.0;
                    let handle_stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
                    let handle_fill = egui::Color32::WHITE;

                    let handles = [
                        screen_crop_rect.min,
                        screen_crop_rect.max,
                        egui::pos2(screen_crop_rect.min.x, screen_crop_rect.max.y),
                        egui::pos2(screen_crop_rect.max.x, screen_crop_rect.min.y),
                        screen_crop_rect.center_top(),
                        screen_crop_rect.center_bottom(),
                        screen_crop_rect.left_center(),
                        screen_crop_rect.right_center(),
                    ];

                    for pos in handles {
                        painter.circle(pos, handle_radius, handle_fill, handle_stroke);
                    }
                }
            }

            if crop_clicked {
                if let Some(display_size) = shown_display_size {
                    self.confirm_crop(ctx, display_size);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2, Rect};

    const EPS: f32 = 1e-3;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_size(pos2(x, y), vec2(w, h))
    }

    fn bounds600() -> Rect {
        rect(0.0, 0.0, 600.0, 600.0)
    }

    #[test]
    fn fit_shrinks_to_the_available_space() {
        assert_eq!(
            fit_size(vec2(3000.0, 1500.0), vec2(600.0, 400.0)),
            vec2(600.0, 300.0)
        );
        // 400 / 3000 is not representable, so the scaled size lands a hair
        // off the exact 200 x 400.
        let tall = fit_size(vec2(1500.0, 3000.0), vec2(600.0, 400.0));
        assert!((tall.x - 200.0).abs() < EPS);
        assert!((tall.y - 400.0).abs() < EPS);
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(
            fit_size(vec2(300.0, 200.0), vec2(600.0, 400.0)),
            vec2(300.0, 200.0)
        );
    }

    #[test]
    fn fit_collapses_when_space_runs_out() {
        assert_eq!(
            fit_size(vec2(800.0, 600.0), vec2(-40.0, 300.0)),
            vec2(0.0, 0.0)
        );
    }

    #[test]
    fn hit_test_prefers_corners_over_edges() {
        let r = rect(100.0, 100.0, 200.0, 200.0);
        assert_eq!(
            AvatarCropper::hit_test(pos2(102.0, 98.0), r),
            Some(ResizeHandle::TopLeft)
        );
        assert_eq!(
            AvatarCropper::hit_test(pos2(300.0, 305.0), r),
            Some(ResizeHandle::BottomRight)
        );
        assert_eq!(
            AvatarCropper::hit_test(pos2(100.0, 200.0), r),
            Some(ResizeHandle::Left)
        );
        assert_eq!(
            AvatarCropper::hit_test(pos2(200.0, 300.0), r),
            Some(ResizeHandle::Bottom)
        );
        assert_eq!(
            AvatarCropper::hit_test(pos2(200.0, 200.0), r),
            Some(ResizeHandle::Center)
        );
        assert_eq!(AvatarCropper::hit_test(pos2(50.0, 50.0), r), None);
    }

    #[test]
    fn corner_drag_keeps_the_selection_square() {
        let out = drag_crop(
            rect(100.0, 100.0, 200.0, 200.0),
            ResizeHandle::BottomRight,
            vec2(40.0, 10.0),
            bounds600(),
            150.0,
        );
        assert!((out.width() - out.height()).abs() < EPS);
        assert_eq!(out.min, pos2(100.0, 100.0));
        // (240, 210) projected onto the square diagonal is 225 x 225
        assert!((out.width() - 225.0).abs() < EPS);
    }

    #[test]
    fn corner_drag_respects_the_minimum_edge() {
        let out = drag_crop(
            rect(100.0, 100.0, 200.0, 200.0),
            ResizeHandle::BottomRight,
            vec2(-180.0, -180.0),
            bounds600(),
            150.0,
        );
        assert!((out.width() - 150.0).abs() < EPS);
        assert_eq!(out.min, pos2(100.0, 100.0));
    }

    #[test]
    fn corner_drag_stops_at_the_image_bounds() {
        let out = drag_crop(
            rect(100.0, 100.0, 200.0, 200.0),
            ResizeHandle::BottomRight,
            vec2(1000.0, 0.0),
            bounds600(),
            150.0,
        );
        assert_eq!(out.max, pos2(600.0, 600.0));
        assert!((out.width() - 500.0).abs() < EPS);
    }

    #[test]
    fn top_left_drag_anchors_the_bottom_right_corner() {
        let out = drag_crop(
            rect(200.0, 200.0, 200.0, 200.0),
            ResizeHandle::TopLeft,
            vec2(-30.0, -30.0),
            bounds600(),
            150.0,
        );
        assert_eq!(out.max, pos2(400.0, 400.0));
        assert!((out.width() - 230.0).abs() < EPS);
        assert!((out.width() - out.height()).abs() < EPS);
    }

    #[test]
    fn side_drag_recenters_the_other_axis() {
        let out = drag_crop(
            rect(200.0, 200.0, 200.0, 200.0),
            ResizeHandle::Right,
            vec2(50.0, 0.0),
            bounds600(),
            150.0,
        );
        assert!((out.width() - 250.0).abs() < EPS);
        assert!((out.height() - 250.0).abs() < EPS);
        assert!((out.center().y - 300.0).abs() < EPS);
        assert!((out.min.x - 200.0).abs() < EPS);
    }

    #[test]
    fn side_drag_clamps_to_the_minimum_edge() {
        let out = drag_crop(
            rect(200.0, 200.0, 200.0, 200.0),
            ResizeHandle::Top,
            vec2(0.0, 120.0),
            bounds600(),
            150.0,
        );
        assert!((out.height() - 150.0).abs() < EPS);
        assert!((out.max.y - 400.0).abs() < EPS);
        assert!((out.center().x - 300.0).abs() < EPS);
    }

    #[test]
    fn center_drag_pans_without_resizing() {
        let out = drag_crop(
            rect(100.0, 100.0, 200.0, 200.0),
            ResizeHandle::Center,
            vec2(30.0, -20.0),
            bounds600(),
            150.0,
        );
        assert_eq!(out.size(), vec2(200.0, 200.0));
        assert_eq!(out.min, pos2(130.0, 80.0));
    }

    #[test]
    fn center_drag_stops_at_the_edges() {
        let out = drag_crop(
            rect(100.0, 100.0, 200.0, 200.0),
            ResizeHandle::Center,
            vec2(-500.0, 900.0),
            bounds600(),
            150.0,
        );
        assert_eq!(out.min.x, 0.0);
        assert_eq!(out.max.y, 600.0);
        assert_eq!(out.size(), vec2(200.0, 200.0));
    }

    #[test]
    fn drag_tolerates_a_collapsed_display() {
        // A window shrunk to nothing leaves a zero display and a NaN seed;
        // dragging that geometry must not panic.
        let zero = vec2(0.0, 0.0);
        let seed = initial_crop(zero).to_pixel(zero);
        let degenerate = rect(seed.x, seed.y, seed.width, seed.height);
        let bounds = rect(0.0, 0.0, 0.0, 0.0);

        for handle in [
            ResizeHandle::TopLeft,
            ResizeHandle::Top,
            ResizeHandle::TopRight,
            ResizeHandle::Left,
            ResizeHandle::Center,
            ResizeHandle::Right,
            ResizeHandle::BottomLeft,
            ResizeHandle::Bottom,
            ResizeHandle::BottomRight,
        ] {
            drag_crop(degenerate, handle, vec2(4.0, -3.0), bounds, 0.0);
        }
    }
}
