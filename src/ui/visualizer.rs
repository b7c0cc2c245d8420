// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session visualizer.
//!
//! Shows every image of a session with its stored annotations overlaid.
//! The backend hands boxes back in YOLO-normalized form; they are converted
//! to pixel rectangles here for display only - the client never produces
//! YOLO coordinates itself.

use crate::config::{class_color, class_name, ClassDefinition};
use crate::io::media::{self, DecodedImage};
use crate::models::session::{VisualizeAnnotation, VisualizeResponse};
use crate::render::DrawSurface;
use crate::ui::canvas::PainterSurface;
use crate::util::geometry;

const CARD_MAX_WIDTH: f32 = 480.0;
const OVERLAY_STROKE_WIDTH: f32 = 3.0;

/// One session image prepared for display.  `decoded` is `None` when the
/// payload failed to decode; the card then shows a placeholder.
pub struct ImageCard {
    pub filename: String,
    pub has_labels: bool,
    pub annotations: Vec<VisualizeAnnotation>,
    pub decoded: Option<DecodedImage>,
    texture: Option<egui::TextureHandle>,
}

/// Decode the visualize response into display cards.  Runs on the worker
/// thread; decode failures degrade to placeholders instead of failing the
/// whole session.
pub fn prepare_cards(resp: VisualizeResponse) -> Vec<ImageCard> {
    resp.images
        .into_iter()
        .map(|img| {
            let decoded = match media::decode_data_url(&img.image_data) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    log::warn!("Failed to decode session image {}: {}", img.filename, e);
                    None
                }
            };
            ImageCard {
                filename: img.filename,
                has_labels: img.has_labels,
                annotations: img.annotations,
                decoded,
                texture: None,
            }
        })
        .collect()
}

#[derive(Default)]
pub struct VisualizerWindow {
    pub open: bool,
    pub session: String,
    pub loading: bool,
    pub cards: Vec<ImageCard>,
}

impl VisualizerWindow {
    pub fn loading_for(session: String) -> Self {
        Self { open: true, session, loading: true, cards: Vec::new() }
    }
}

/// Display the visualizer window.
pub fn show(ctx: &egui::Context, window: &mut VisualizerWindow, classes: &[ClassDefinition]) {
    if !window.open {
        return;
    }
    let mut open = window.open;

    egui::Window::new(format!("👁 Session visualizer: {}", window.session))
        .open(&mut open)
        .default_size([560.0, 640.0])
        .show(ctx, |ui| {
            legend(ui, classes);
            ui.separator();

            if window.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading session images...");
                });
                return;
            }
            if window.cards.is_empty() {
                ui.label(
                    egui::RichText::new("No annotated images in this session")
                        .weak()
                        .italics(),
                );
                return;
            }

            let total: usize = window.cards.iter().map(|c| c.annotations.len()).sum();
            ui.label(format!(
                "Images: {} | Annotations: {}",
                window.cards.len(),
                total
            ));
            ui.add_space(4.0);

            egui::ScrollArea::vertical().show(ui, |ui| {
                for card in &mut window.cards {
                    card_ui(ui, card, classes);
                    ui.add_space(8.0);
                }
            });
        });

    window.open = open;
}

fn legend(ui: &mut egui::Ui, classes: &[ClassDefinition]) {
    ui.horizontal_wrapped(|ui| {
        for class in classes {
            let rgb = class.rgb();
            ui.label(
                egui::RichText::new("■").color(egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)),
            );
            ui.label(&class.name);
            ui.add_space(6.0);
        }
    });
}

fn card_ui(ui: &mut egui::Ui, card: &mut ImageCard, classes: &[ClassDefinition]) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        match &card.decoded {
            Some(decoded) => {
                // Lazily upload the texture on first display
                if card.texture.is_none() {
                    let size = [decoded.width as usize, decoded.height as usize];
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied(size, &decoded.rgba);
                    card.texture = Some(ui.ctx().load_texture(
                        format!("visualizer_{}", card.filename),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
                if let Some(texture) = &card.texture {
                    let scale =
                        (CARD_MAX_WIDTH.min(ui.available_width()) / decoded.width as f32).min(1.0);
                    let display = egui::vec2(
                        decoded.width as f32 * scale,
                        decoded.height as f32 * scale,
                    );
                    let (rect, _) = ui.allocate_exact_size(display, egui::Sense::hover());

                    let mut surface = PainterSurface::new(
                        ui.painter().clone(),
                        texture.id(),
                        rect,
                        scale,
                    );
                    surface.draw_image();
                    for ann in &card.annotations {
                        if let Some(rect) = geometry::yolo_to_box(
                            &ann.yolo_coords,
                            decoded.width,
                            decoded.height,
                        ) {
                            surface.stroke_rect(
                                rect,
                                class_color(classes, ann.class_id),
                                OVERLAY_STROKE_WIDTH,
                            );
                        }
                    }
                }
            }
            None => {
                // Decode failed: keep the card, show a placeholder
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(240.0, 140.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, 4.0, egui::Color32::from_gray(60));
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "⚠ image failed to decode",
                    egui::FontId::proportional(14.0),
                    egui::Color32::from_gray(200),
                );
            }
        }

        ui.label(egui::RichText::new(&card.filename).strong());
        ui.label(
            egui::RichText::new(format!("Annotations: {}", card.annotations.len())).small(),
        );
        ui.label(
            egui::RichText::new(if card.has_labels {
                "✅ labels found"
            } else {
                "❌ no labels"
            })
            .small()
            .weak(),
        );

        for ann in &card.annotations {
            let name = ann
                .class_name
                .clone()
                .unwrap_or_else(|| class_name(classes, ann.class_id));
            let coords = if ann.yolo_coords.is_empty() {
                "N/A".to_string()
            } else {
                ann.yolo_coords
                    .iter()
                    .map(|c| format!("{:.3}", c))
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            ui.label(
                egui::RichText::new(format!(
                    "{} (ID: {})  YOLO: [{}]",
                    name, ann.class_id, coords
                ))
                .small()
                .monospace(),
            );
        }
    });
}
