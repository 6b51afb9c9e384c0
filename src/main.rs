#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

use eframe::egui;
use tracing::info;

use avatarcropper::app::AvatarCropper;
use avatarcropper::logger;

fn main() -> eframe::Result {
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([860.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Avatar Cropper",
        options,
        Box::new(|cc| {
            Ok(Box::new(AvatarCropper::new(cc).with_avatar_callback(
                |data_url| {
                    info!(bytes = data_url.len(), "avatar data URL ready");
                },
            )))
        }),
    )
}
