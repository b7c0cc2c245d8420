// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Augmentation modal.
//!
//! Lets the user pick augmentation variants for a session, start the run,
//! and watch its progress.  The variants themselves are opaque - the
//! backend describes them and applies them; the client only selects keys
//! and polls progress.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::session::{AugmentationProgress, VariantInfo};

#[derive(Default)]
pub struct AugmentModal {
    pub open: bool,
    pub session: String,
    /// None until the info request completes.
    pub variants: Option<BTreeMap<String, VariantInfo>>,
    pub selected: BTreeSet<String>,
    pub in_progress: bool,
    pub finished: bool,
    pub progress: Option<AugmentationProgress>,
    pub error: Option<String>,
}

impl AugmentModal {
    pub fn open_for(session: String) -> Self {
        Self { open: true, session, ..Self::default() }
    }
}

pub enum AugmentAction {
    None,
    /// Start the run with the selected variant keys.
    Start(Vec<String>),
    /// The modal was closed; any active poller must stop.
    Closed,
}

/// Display the modal.  Returns what the app should do about it.
pub fn show(ctx: &egui::Context, modal: &mut AugmentModal) -> AugmentAction {
    if !modal.open {
        return AugmentAction::None;
    }

    let mut action = AugmentAction::None;
    let mut open = modal.open;
    let mut close_clicked = false;

    egui::Window::new(format!("🔄 Augment session: {}", modal.session))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            match &modal.variants {
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Loading available variants...");
                    });
                }
                Some(variants) => {
                    ui.label("Select the variants to apply:");
                    ui.add_space(4.0);
                    for (key, info) in variants {
                        let mut checked = modal.selected.contains(key);
                        let label = if info.icon.is_empty() {
                            info.name.clone()
                        } else {
                            format!("{} {}", info.icon, info.name)
                        };
                        if ui
                            .add_enabled(!modal.in_progress, egui::Checkbox::new(&mut checked, label))
                            .changed()
                        {
                            if checked {
                                modal.selected.insert(key.clone());
                            } else {
                                modal.selected.remove(key);
                            }
                        }
                        if !info.description.is_empty() {
                            ui.label(egui::RichText::new(&info.description).small().weak());
                        }
                    }

                    ui.add_space(8.0);
                    let can_start = !modal.in_progress && !modal.selected.is_empty();
                    let label = if modal.in_progress {
                        "🔄 Processing..."
                    } else {
                        "🚀 Run augmentation"
                    };
                    if ui.add_enabled(can_start, egui::Button::new(label)).clicked() {
                        action =
                            AugmentAction::Start(modal.selected.iter().cloned().collect());
                    }
                }
            }

            if let Some(progress) = &modal.progress {
                ui.add_space(8.0);
                let fraction = if progress.total > 0 {
                    progress.current as f32 / progress.total as f32
                } else if progress.completed {
                    1.0
                } else {
                    0.0
                };
                ui.add(egui::ProgressBar::new(fraction).show_percentage());
                ui.label(format!(
                    "Processing: {}/{} images",
                    progress.current, progress.total
                ));
            }

            if modal.finished {
                ui.add_space(4.0);
                ui.colored_label(
                    egui::Color32::from_rgb(60, 180, 90),
                    "✅ Augmentation complete - check the session for the new images",
                );
            }

            if let Some(error) = &modal.error {
                ui.add_space(4.0);
                ui.colored_label(egui::Color32::from_rgb(220, 60, 60), format!("❌ {}", error));
            }

            ui.add_space(8.0);
            if ui.button("Close").clicked() {
                close_clicked = true;
            }
        });

    if close_clicked {
        open = false;
    }
    if modal.open && !open {
        modal.open = false;
        return AugmentAction::Closed;
    }
    modal.open = open;
    action
}
