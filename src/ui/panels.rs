// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Side panel: image generation form, annotation list, save form, and the
//! session list with its per-session actions.

use crate::config::{class_color, class_name, ClassDefinition};
use crate::models::session::{GenerateParams, SessionSummary};
use crate::models::store::AnnotationStore;

/// Action requested from the side panel this frame.
pub enum PanelAction {
    None,
    PickImage,
    Generate,
    RemoveAnnotation(u32),
    ClearAnnotations,
    Save,
    RefreshSessions,
    SelectSession(String),
    DownloadSession(String),
    VisualizeSession(String),
    DeleteSessionRequested(String),
    AugmentSession(String),
}

pub struct AnnotatorPanel<'a> {
    pub classes: &'a [ClassDefinition],
    pub store: &'a AnnotationStore,
    pub filename: &'a mut String,
    pub session_name: &'a mut String,
    pub gen_params: &'a mut GenerateParams,
    pub picked_image: Option<&'a str>,
    pub generating: bool,
    pub saving: bool,
}

/// Image upload/generate form plus the annotation list and save form.
pub fn annotator_panel(ui: &mut egui::Ui, panel: &mut AnnotatorPanel) -> PanelAction {
    let mut action = PanelAction::None;

    ui.heading("Image");
    ui.horizontal(|ui| {
        if ui.button("📂 Pick image...").clicked() {
            action = PanelAction::PickImage;
        }
        match panel.picked_image {
            Some(name) => ui.label(egui::RichText::new(name).weak()),
            None => ui.label(egui::RichText::new("no file selected").weak().italics()),
        };
    });
    ui.add(egui::Slider::new(&mut panel.gen_params.size, 64..=1024).text("canvas size"));
    ui.add(egui::Slider::new(&mut panel.gen_params.x, 0..=1024).text("x position"));
    ui.add(egui::Slider::new(&mut panel.gen_params.y, 0..=1024).text("y position"));
    ui.checkbox(&mut panel.gen_params.random_bg, "random background");

    let can_generate = panel.picked_image.is_some() && !panel.generating;
    let generate_label = if panel.generating { "⏳ Generating..." } else { "🖼 Generate" };
    if ui.add_enabled(can_generate, egui::Button::new(generate_label)).clicked() {
        action = PanelAction::Generate;
    }

    ui.separator();
    ui.heading("Annotations");
    if panel.store.list().is_empty() {
        ui.label(egui::RichText::new("No annotations yet").weak().italics());
    } else {
        for ann in panel.store.list() {
            ui.horizontal(|ui| {
                let rgb = class_color(panel.classes, ann.class_id);
                ui.label(
                    egui::RichText::new("■")
                        .color(egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)),
                );
                ui.vertical(|ui| {
                    ui.label(
                        egui::RichText::new(class_name(panel.classes, ann.class_id)).strong(),
                    );
                    ui.label(
                        egui::RichText::new(format!(
                            "x:{:.0}, y:{:.0}, w:{:.0}, h:{:.0}",
                            ann.x, ann.y, ann.width, ann.height
                        ))
                        .small()
                        .weak(),
                    );
                });
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("❌").clicked() {
                        action = PanelAction::RemoveAnnotation(ann.id);
                    }
                });
            });
        }
        if ui.button("Clear all").clicked() {
            action = PanelAction::ClearAnnotations;
        }
    }

    ui.separator();
    ui.heading("Save");
    ui.horizontal(|ui| {
        ui.label("File name:");
        ui.text_edit_singleline(panel.filename);
    });
    ui.horizontal(|ui| {
        ui.label("Session:");
        ui.text_edit_singleline(panel.session_name);
    });
    let save_label = if panel.saving { "⏳ Saving..." } else { "💾 Save annotations" };
    if ui.add_enabled(!panel.saving, egui::Button::new(save_label)).clicked() {
        action = PanelAction::Save;
    }

    action
}

pub struct SessionsPanel<'a> {
    pub sessions: &'a [SessionSummary],
    pub refreshing: bool,
    /// True while any session-level request (download, visualize, delete,
    /// augmentation start) is in flight; row actions are disabled then.
    pub session_busy: bool,
}

/// The session list with per-session actions.
pub fn sessions_panel(ui: &mut egui::Ui, panel: &SessionsPanel) -> PanelAction {
    let mut action = PanelAction::None;

    ui.horizontal(|ui| {
        ui.heading("Sessions");
        if ui
            .add_enabled(!panel.refreshing, egui::Button::new("🔄 Refresh"))
            .clicked()
        {
            action = PanelAction::RefreshSessions;
        }
    });

    if panel.sessions.is_empty() {
        ui.label(egui::RichText::new("No sessions available").weak().italics());
        return action;
    }

    for session in panel.sessions {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            if ui
                .add(egui::Label::new(egui::RichText::new(&session.name).strong()).sense(
                    egui::Sense::click(),
                ))
                .clicked()
            {
                action = PanelAction::SelectSession(session.name.clone());
            }
            ui.label(
                egui::RichText::new(format!(
                    "📷 {} images | 📝 {} labels",
                    session.images_count, session.labels_count
                ))
                .small()
                .weak(),
            );
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!panel.session_busy, |ui| {
                    if ui.small_button("💾 Download").clicked() {
                        action = PanelAction::DownloadSession(session.name.clone());
                    }
                    if ui.small_button("👁 Visualize").clicked() {
                        action = PanelAction::VisualizeSession(session.name.clone());
                    }
                    if ui.small_button("🔄 Augment").clicked() {
                        action = PanelAction::AugmentSession(session.name.clone());
                    }
                    if ui.small_button("🗑 Delete").clicked() {
                        action = PanelAction::DeleteSessionRequested(session.name.clone());
                    }
                });
            });
        });
    }

    action
}
