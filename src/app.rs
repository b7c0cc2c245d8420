// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `YboxApp` owns the annotation store, the gesture interpreter, and every
//! in-flight background job.  Jobs report through channels drained at the
//! top of each frame; while a job is pending its triggering control is
//! disabled, so no two requests for the same logical action overlap.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::config::StudioConfig;
use crate::gesture::DragGesture;
use crate::io::gateway::Gateway;
use crate::io::jobs::{self, Pending, PollUpdate, ProgressPoller};
use crate::io::media::{self, DecodedImage};
use crate::models::session::{
    self, GenerateParams, SavePayload, SavedDataset, SessionSummary, VariantInfo, WireAnnotation,
};
use crate::models::store::{AnnotationStore, ImageContext};
use crate::ui::augment::{self, AugmentAction, AugmentModal};
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::panels::{self, AnnotatorPanel, PanelAction, SessionsPanel};
use crate::ui::toolbar;
use crate::ui::visualizer::{self, ImageCard, VisualizerWindow};

const STATUS_TTL: Duration = Duration::from_secs(8);

#[derive(Clone, Copy, PartialEq)]
enum StatusKind {
    Info,
    Success,
    Error,
}

struct Status {
    kind: StatusKind,
    text: String,
    set_at: Instant,
}

/// Result of a completed image generation: the new image context plus its
/// decoded pixels for the display texture.
struct GeneratedImage {
    context: ImageContext,
    pixels: DecodedImage,
}

/// One `Option<Pending<...>>` per logical action; `Some` means in flight.
#[derive(Default)]
struct Jobs {
    generate: Option<Pending<GeneratedImage>>,
    save: Option<Pending<SavedDataset>>,
    sessions: Option<Pending<Vec<SessionSummary>>>,
    delete: Option<Pending<(String, String)>>,
    download: Option<Pending<PathBuf>>,
    visualize: Option<Pending<(String, Vec<ImageCard>)>>,
    augment_info: Option<Pending<(String, BTreeMap<String, VariantInfo>)>>,
    augment_start: Option<Pending<String>>,
}

/// Main application state.
pub struct YboxApp {
    config: StudioConfig,
    gateway: Gateway,

    store: AnnotationStore,
    gesture: DragGesture,
    texture: Option<egui::TextureHandle>,

    picked_image: Option<PathBuf>,
    gen_params: GenerateParams,
    filename: String,
    session_name: String,

    sessions: Vec<SessionSummary>,
    save_result: Option<SavedDataset>,
    confirm_delete: Option<String>,
    augment: AugmentModal,
    visualizer: VisualizerWindow,

    status: Option<Status>,
    jobs: Jobs,
    poller: Option<ProgressPoller>,
}

impl YboxApp {
    pub fn new(config: StudioConfig, gateway: Gateway) -> Self {
        let mut store = AnnotationStore::new();
        // First configured class is active at startup
        if let Some(first) = config.classes.first() {
            store.set_active_class(first.id);
        }

        let mut app = Self {
            config,
            gateway,
            store,
            gesture: DragGesture::new(),
            texture: None,
            picked_image: None,
            gen_params: GenerateParams::default(),
            filename: String::new(),
            session_name: "default".to_string(),
            sessions: Vec::new(),
            save_result: None,
            confirm_delete: None,
            augment: AugmentModal::default(),
            visualizer: VisualizerWindow::default(),
            status: None,
            jobs: Jobs::default(),
            poller: None,
        };
        app.spawn_refresh_sessions();
        app
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status { kind, text: text.into(), set_at: Instant::now() });
    }

    fn busy(&self) -> bool {
        self.jobs.generate.is_some()
            || self.jobs.save.is_some()
            || self.jobs.sessions.is_some()
            || self.jobs.delete.is_some()
            || self.jobs.download.is_some()
            || self.jobs.visualize.is_some()
            || self.jobs.augment_info.is_some()
            || self.jobs.augment_start.is_some()
    }

    fn session_busy(&self) -> bool {
        self.jobs.delete.is_some()
            || self.jobs.download.is_some()
            || self.jobs.visualize.is_some()
            || self.jobs.augment_start.is_some()
    }

    // ----- background job launchers -------------------------------------

    fn spawn_refresh_sessions(&mut self) {
        if self.jobs.sessions.is_some() {
            return;
        }
        let gateway = self.gateway.clone();
        self.jobs.sessions = Some(jobs::spawn(move || gateway.list_sessions()));
    }

    fn pick_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"])
            .pick_file()
        {
            if self.filename.trim().is_empty() {
                if let Some(stem) = path.file_stem() {
                    self.filename = stem.to_string_lossy().to_string();
                }
            }
            self.picked_image = Some(path);
        }
    }

    fn spawn_generate(&mut self) {
        let Some(path) = self.picked_image.clone() else {
            self.set_status(StatusKind::Error, "Pick an image file first");
            return;
        };
        let params = self.gen_params.clone();
        let gateway = self.gateway.clone();
        self.jobs.generate = Some(jobs::spawn(move || {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "upload.png".to_string());
            let data_url = gateway.generate(&file_name, bytes, &params)?;
            let pixels = media::decode_data_url(&data_url)?;
            Ok(GeneratedImage {
                context: ImageContext {
                    width: pixels.width,
                    height: pixels.height,
                    data_url,
                },
                pixels,
            })
        }));
    }

    /// Validate locally, then snapshot the store and send the save request.
    /// Validation failures block the action before any network traffic.
    fn request_save(&mut self) {
        if let Some(blocker) = session::save_blocker(
            &self.filename,
            self.store.has_image(),
            self.store.list().len(),
        ) {
            self.set_status(StatusKind::Error, blocker);
            return;
        }
        let Some(image) = self.store.image() else {
            return;
        };

        let filename = self.filename.trim().to_string();
        let session_name = match self.session_name.trim() {
            "" => "default".to_string(),
            name => name.to_string(),
        };
        let payload = SavePayload {
            annotations: self
                .store
                .list()
                .iter()
                .map(|a| WireAnnotation::from_annotation(a, &self.config.classes))
                .collect(),
            filename,
            session_name,
            image_width: image.width,
            image_height: image.height,
            image_data: image.data_url.clone(),
        };
        let gateway = self.gateway.clone();
        self.jobs.save = Some(jobs::spawn(move || gateway.save_annotations(&payload)));
    }

    fn request_download(&mut self, name: String) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("ZIP", &["zip"])
            .set_file_name(format!("dataset_{}.zip", name))
            .save_file()
        else {
            return;
        };
        let gateway = self.gateway.clone();
        self.jobs.download = Some(jobs::spawn(move || {
            let bytes = gateway.download_session(&name)?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Ok(path)
        }));
    }

    fn request_visualize(&mut self, name: String) {
        self.visualizer = VisualizerWindow::loading_for(name.clone());
        let gateway = self.gateway.clone();
        self.jobs.visualize = Some(jobs::spawn(move || {
            let resp = gateway.visualize_session(&name)?;
            Ok((name, visualizer::prepare_cards(resp)))
        }));
    }

    fn spawn_delete(&mut self, name: String) {
        let gateway = self.gateway.clone();
        self.jobs.delete = Some(jobs::spawn(move || {
            let message = gateway.delete_session(&name)?;
            Ok((name, message))
        }));
    }

    fn open_augment(&mut self, name: String) {
        self.augment = AugmentModal::open_for(name.clone());
        let gateway = self.gateway.clone();
        self.jobs.augment_info = Some(jobs::spawn(move || {
            let variants = gateway.augmentation_info(&name)?;
            Ok((name, variants))
        }));
    }

    fn start_augmentation(&mut self, variants: Vec<String>) {
        self.augment.in_progress = true;
        self.augment.finished = false;
        self.augment.progress = None;
        self.augment.error = None;
        let session = self.augment.session.clone();
        let gateway = self.gateway.clone();
        self.jobs.augment_start = Some(jobs::spawn(move || {
            gateway.start_augmentation(&session, &variants)?;
            Ok(session)
        }));
    }

    // ----- job completion -----------------------------------------------

    fn drain_jobs(&mut self, ctx: &egui::Context) {
        if let Some(result) = self.jobs.generate.as_ref().and_then(|p| p.poll()) {
            self.jobs.generate = None;
            match result {
                Ok(generated) => {
                    let size = [
                        generated.pixels.width as usize,
                        generated.pixels.height as usize,
                    ];
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(size, &generated.pixels.rgba);
                    self.texture = Some(ctx.load_texture(
                        "active_image",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                    self.store.set_image(generated.context);
                    self.set_status(StatusKind::Success, "Image ready - draw boxes to annotate");
                }
                Err(e) => {
                    log::error!("Image generation failed: {}", e);
                    self.set_status(StatusKind::Error, format!("Image generation failed: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.save.as_ref().and_then(|p| p.poll()) {
            self.jobs.save = None;
            match result {
                Ok(saved) => {
                    log::info!("Saved dataset as '{}'", saved.unique_name);
                    self.set_status(
                        StatusKind::Success,
                        format!("Dataset saved as '{}'", saved.unique_name),
                    );
                    self.save_result = Some(saved);
                    self.spawn_refresh_sessions();
                }
                Err(e) => {
                    log::error!("Save failed: {}", e);
                    self.set_status(StatusKind::Error, format!("Save failed: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.sessions.as_ref().and_then(|p| p.poll()) {
            self.jobs.sessions = None;
            match result {
                Ok(sessions) => self.sessions = sessions,
                Err(e) => {
                    log::error!("Failed to load sessions: {}", e);
                    self.set_status(StatusKind::Error, format!("Failed to load sessions: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.delete.as_ref().and_then(|p| p.poll()) {
            self.jobs.delete = None;
            match result {
                Ok((name, message)) => {
                    self.set_status(StatusKind::Success, message);
                    // Deleting the selected session falls back to the default
                    if self.session_name == name {
                        self.session_name = "default".to_string();
                    }
                    self.spawn_refresh_sessions();
                }
                Err(e) => {
                    self.set_status(StatusKind::Error, format!("Delete failed: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.download.as_ref().and_then(|p| p.poll()) {
            self.jobs.download = None;
            match result {
                Ok(path) => {
                    self.set_status(
                        StatusKind::Success,
                        format!("Session ZIP saved to {}", path.display()),
                    );
                }
                Err(e) => {
                    self.set_status(StatusKind::Error, format!("Download failed: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.visualize.as_ref().and_then(|p| p.poll()) {
            self.jobs.visualize = None;
            match result {
                Ok((session, cards)) => {
                    if self.visualizer.open && self.visualizer.session == session {
                        self.visualizer.cards = cards;
                        self.visualizer.loading = false;
                    }
                }
                Err(e) => {
                    self.visualizer.open = false;
                    self.set_status(StatusKind::Error, format!("Visualize failed: {}", e));
                }
            }
        }

        if let Some(result) = self.jobs.augment_info.as_ref().and_then(|p| p.poll()) {
            self.jobs.augment_info = None;
            match result {
                Ok((session, variants)) => {
                    if self.augment.open && self.augment.session == session {
                        self.augment.variants = Some(variants);
                    }
                }
                Err(e) => {
                    if self.augment.open {
                        self.augment.error = Some(format!("Failed to load variants: {}", e));
                    }
                }
            }
        }

        if let Some(result) = self.jobs.augment_start.as_ref().and_then(|p| p.poll()) {
            self.jobs.augment_start = None;
            match result {
                Ok(session) => {
                    if self.augment.open && self.augment.session == session {
                        self.poller =
                            Some(jobs::poll_augmentation(self.gateway.clone(), session));
                    }
                }
                Err(e) => {
                    // Roll the modal back so the run can be retried
                    self.augment.in_progress = false;
                    self.augment.error = Some(format!("Failed to start augmentation: {}", e));
                }
            }
        }
    }

    fn drain_poller(&mut self) {
        let mut updates = Vec::new();
        if let Some(poller) = &self.poller {
            while let Some(update) = poller.poll() {
                updates.push(update);
            }
        }
        for update in updates {
            match update {
                PollUpdate::Progress(progress) => {
                    self.augment.progress = Some(progress);
                    if progress.completed {
                        self.augment.finished = true;
                        self.augment.in_progress = false;
                        self.poller = None;
                        // Variant images change the session counts
                        self.spawn_refresh_sessions();
                    }
                }
                PollUpdate::Failed(message) => {
                    self.augment.in_progress = false;
                    self.augment.error = Some(message);
                    self.poller = None;
                }
            }
        }
    }

    fn handle_panel_action(&mut self, action: PanelAction) {
        match action {
            PanelAction::None => {}
            PanelAction::PickImage => self.pick_image(),
            PanelAction::Generate => self.spawn_generate(),
            PanelAction::RemoveAnnotation(id) => self.store.remove_annotation(id),
            PanelAction::ClearAnnotations => {
                self.store.clear();
                self.set_status(StatusKind::Info, "Annotations cleared");
            }
            PanelAction::Save => self.request_save(),
            PanelAction::RefreshSessions => self.spawn_refresh_sessions(),
            PanelAction::SelectSession(name) => {
                self.set_status(StatusKind::Info, format!("Session '{}' selected", name));
                self.session_name = name;
            }
            PanelAction::DownloadSession(name) => self.request_download(name),
            PanelAction::VisualizeSession(name) => self.request_visualize(name),
            PanelAction::DeleteSessionRequested(name) => self.confirm_delete = Some(name),
            PanelAction::AugmentSession(name) => self.open_augment(name),
        }
    }
}

impl eframe::App for YboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_jobs(ctx);
        self.drain_poller();

        // Keep polling job channels while anything runs in the background
        if self.busy() || self.poller.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // Top menu bar
        let mut menu_action = PanelAction::None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        menu_action = PanelAction::PickImage;
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Session", |ui| {
                    if ui.button("Refresh sessions").clicked() {
                        menu_action = PanelAction::RefreshSessions;
                        ui.close_menu();
                    }
                });
            });
        });
        self.handle_panel_action(menu_action);

        // Class selector
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            toolbar::show(ui, &self.config.classes, &mut self.store);
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            if self
                .status
                .as_ref()
                .is_some_and(|s| s.set_at.elapsed() > STATUS_TTL)
            {
                self.status = None;
            }
            match &self.status {
                Some(status) => {
                    let color = match status.kind {
                        StatusKind::Info => egui::Color32::from_gray(200),
                        StatusKind::Success => egui::Color32::from_rgb(60, 180, 90),
                        StatusKind::Error => egui::Color32::from_rgb(220, 60, 60),
                    };
                    ui.colored_label(color, &status.text);
                }
                None => {
                    ui.label(
                        egui::RichText::new(format!("Backend: {}", self.config.server))
                            .small()
                            .weak(),
                    );
                }
            }
        });

        // Side panel (annotator forms + session list)
        let picked_name = self
            .picked_image
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());
        let session_busy = self.session_busy();
        let side_action = egui::SidePanel::right("side_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| {
                        let mut panel = AnnotatorPanel {
                            classes: &self.config.classes,
                            store: &self.store,
                            filename: &mut self.filename,
                            session_name: &mut self.session_name,
                            gen_params: &mut self.gen_params,
                            picked_image: picked_name.as_deref(),
                            generating: self.jobs.generate.is_some(),
                            saving: self.jobs.save.is_some(),
                        };
                        let mut action = panels::annotator_panel(ui, &mut panel);

                        ui.separator();
                        let sessions = SessionsPanel {
                            sessions: &self.sessions,
                            refreshing: self.jobs.sessions.is_some(),
                            session_busy,
                        };
                        let session_action = panels::sessions_panel(ui, &sessions);
                        if matches!(action, PanelAction::None) {
                            action = session_action;
                        }
                        action
                    })
                    .inner
            })
            .inner;
        self.handle_panel_action(side_action);

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    &self.store,
                    &self.config.classes,
                    &self.texture,
                    &mut self.gesture,
                )
            })
            .inner;
        if let CanvasAction::Committed(rect) = canvas_action {
            if let Some(class_id) = self.store.active_class() {
                self.store.add_annotation(rect, class_id);
            }
        }

        // Save result dialog
        if let Some(result) = &self.save_result {
            let mut open = true;
            let mut close_clicked = false;
            egui::Window::new("✅ Dataset saved")
                .open(&mut open)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.label(format!("Requested name: \"{}\"", result.original_name));
                    ui.label(format!("Stored as: \"{}\"", result.unique_name));
                    if !result.image_file.is_empty() {
                        ui.label(format!("Image: {}", result.image_file));
                    }
                    if !result.labels_file.is_empty() {
                        ui.label(format!("Labels: {}", result.labels_file));
                    }
                    ui.separator();
                    ui.label("YOLO labels:");
                    for line in &result.yolo_format {
                        ui.monospace(line);
                    }
                    ui.label(
                        egui::RichText::new("The stored image contains no annotation overlays")
                            .small()
                            .weak(),
                    );
                    ui.add_space(4.0);
                    if ui.button("Close").clicked() {
                        close_clicked = true;
                    }
                });
            if !open || close_clicked {
                self.save_result = None;
            }
        }

        // Delete confirmation dialog
        if let Some(name) = self.confirm_delete.clone() {
            let mut open = true;
            let mut delete_clicked = false;
            let mut cancel_clicked = false;
            egui::Window::new("⚠ Delete session?")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("Permanently delete session \"{}\"?", name));
                    ui.label(
                        egui::RichText::new(
                            "All images and labels in it will be removed. This cannot be undone.",
                        )
                        .small(),
                    );
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("🗑 Delete").clicked() {
                            delete_clicked = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_clicked = true;
                        }
                    });
                });
            if delete_clicked {
                self.spawn_delete(name);
                self.confirm_delete = None;
            } else if !open || cancel_clicked {
                self.confirm_delete = None;
            }
        }

        // Augmentation modal
        match augment::show(ctx, &mut self.augment) {
            AugmentAction::None => {}
            AugmentAction::Start(variants) => self.start_augmentation(variants),
            AugmentAction::Closed => {
                // Closing the modal stops the poll loop
                self.poller = None;
            }
        }

        // Session visualizer
        visualizer::show(ctx, &mut self.visualizer, &self.config.classes);
    }
}
