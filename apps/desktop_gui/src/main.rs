mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::load_settings;
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::InventoryApp;

#[derive(Parser, Debug)]
#[command(name = "tracify_gui", about = "Tracify Pro inventory dashboard")]
struct Args {
    /// Backend base URL; overrides tracify.toml and the environment.
    #[arg(long)]
    api_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_url) = &args.api_url {
        settings = settings.with_api_base_url(api_url);
    }
    let api_base_url = settings.api_base_url.clone();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Tracify Pro")
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([980.0, 640.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Tracify Pro",
        options,
        Box::new(move |_cc| Ok(Box::new(InventoryApp::new(cmd_tx, ui_rx, api_base_url)))),
    )
}
