// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! YBOX - YOLO Box Annotation Studio
//!
//! A cross-platform desktop client for drawing bounding-box annotations on
//! images and saving them, through a remote backend service, as YOLO-format
//! datasets organized into named sessions.

mod app;
mod config;
mod gesture;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::YboxApp;
use io::gateway::Gateway;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = config::StudioConfig::load();
    let gateway = Gateway::new(&config.server)?;
    log::info!("Using annotation backend at {}", config.server);

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("YBOX - YOLO Box Annotation Studio"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "YBOX",
        options,
        Box::new(move |_cc| Ok(Box::new(YboxApp::new(config, gateway)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
