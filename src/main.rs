//! StoryNest - Bedtime stories with AI narration for Linux
//!
//! This is the main entry point for the StoryNest application.

mod app;
mod assets;
mod audio;
mod cli;
mod models;
mod services;
mod settings;
mod state;
mod tokio_runtime;

use app::StoryNest;
use assets::Assets;
use clap::Parser;
use gpui::prelude::*;
use gpui::*;
use gpui_component::Root;
use log::{error, info};
use settings::Settings;

const APP_ID: &str = "com.storynest.BedtimeStories";

fn main() {
    // Parse command-line arguments and initialize logging
    let args = cli::Args::parse();
    cli::init_logging(&args);
    let settings = Settings::from_args(&args);

    info!("Starting StoryNest");

    Application::new().with_assets(Assets).run(move |cx: &mut App| {
        gpui_component::init(cx);

        // Global Tokio runtime for the reqwest based services
        if let Err(e) = tokio_runtime::init(cx) {
            error!("Failed to start async runtime: {}", e);
            cx.quit();
            return;
        }

        let bounds = Bounds::centered(None, size(px(1100.0), px(800.0)), cx);
        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                // No titlebar - we'll draw our own
                titlebar: None,
                window_decorations: Some(WindowDecorations::Client),
                // App ID for Wayland/GNOME desktop integration
                app_id: Some(APP_ID.to_string()),
                ..Default::default()
            },
            |window, cx| {
                window.set_app_id(APP_ID);
                let view = cx.new(|cx| StoryNest::new(settings, cx));
                cx.new(|cx| Root::new(AnyView::from(view), window, cx))
            },
        );

        if let Err(e) = opened {
            error!("Failed to open window: {}", e);
            cx.quit();
        }
    });
}
