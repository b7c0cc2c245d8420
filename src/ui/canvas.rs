// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation canvas.
//!
//! Displays the active image fitted to the panel, feeds pointer events into
//! the gesture interpreter (converted to source-image pixels), and renders
//! the scene through [`PainterSurface`], the egui implementation of the
//! renderer's drawing surface.

use crate::config::{class_color, class_name, ClassDefinition, Rgb};
use crate::gesture::DragGesture;
use crate::models::annotation::{BoxPx, PointPx};
use crate::models::store::AnnotationStore;
use crate::render::{self, DrawSurface};
use crate::util::geometry;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// A drag finished above the minimum size; the rectangle is in
    /// source-image pixels.
    Committed(BoxPx),
}

/// [`DrawSurface`] backed by an egui painter.  Maps source-image pixel
/// coordinates onto the displayed image rectangle; stroke widths and fonts
/// scale with the display so the output matches the image's native look.
pub struct PainterSurface {
    painter: egui::Painter,
    texture_id: egui::TextureId,
    image_rect: egui::Rect,
    scale: f32,
}

impl PainterSurface {
    pub fn new(
        painter: egui::Painter,
        texture_id: egui::TextureId,
        image_rect: egui::Rect,
        scale: f32,
    ) -> Self {
        Self { painter, texture_id, image_rect, scale }
    }

    fn map_point(&self, x: f32, y: f32) -> egui::Pos2 {
        self.image_rect.min + egui::vec2(x * self.scale, y * self.scale)
    }

    fn map_rect(&self, rect: BoxPx) -> egui::Rect {
        egui::Rect::from_min_size(
            self.map_point(rect.x, rect.y),
            egui::vec2(rect.width * self.scale, rect.height * self.scale),
        )
    }

    fn font(&self) -> egui::FontId {
        egui::FontId::proportional(14.0 * self.scale)
    }
}

fn color32(c: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

impl DrawSurface for PainterSurface {
    fn clear(&mut self) {
        // egui clears the framebuffer every frame; nothing to do here.
    }

    fn draw_image(&mut self) {
        self.painter.image(
            self.texture_id,
            self.image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );
    }

    fn stroke_rect(&mut self, rect: BoxPx, color: Rgb, width: f32) {
        self.painter.rect_stroke(
            self.map_rect(rect),
            0.0,
            egui::Stroke::new(width * self.scale, color32(color)),
        );
    }

    fn fill_rect(&mut self, rect: BoxPx, color: Rgb) {
        self.painter.rect_filled(self.map_rect(rect), 0.0, color32(color));
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb) {
        self.painter.text(
            self.map_point(x, y),
            egui::Align2::LEFT_BOTTOM,
            text,
            self.font(),
            color32(color),
        );
    }

    fn text_width(&mut self, text: &str) -> f32 {
        let galley =
            self.painter
                .layout_no_wrap(text.to_string(), self.font(), egui::Color32::WHITE);
        galley.rect.width() / self.scale
    }
}

/// Display the canvas and run the gesture state machine for this frame.
pub fn show(
    ui: &mut egui::Ui,
    store: &AnnotationStore,
    classes: &[ClassDefinition],
    texture: &Option<egui::TextureHandle>,
    gesture: &mut DragGesture,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        if let (Some(texture), Some(image)) = (texture.as_ref(), store.image()) {
            let available = ui.available_size();
            let (display_width, display_height) = geometry::fit_size(
                image.width as f32,
                image.height as f32,
                available.x,
                available.y,
            );
            let scale = display_width / image.width as f32;

            // Center the image
            let x_offset = (available.x - display_width) / 2.0;
            let y_offset = (available.y - display_height) / 2.0;
            let image_rect = egui::Rect::from_min_size(
                ui.min_rect().min + egui::vec2(x_offset, y_offset),
                egui::vec2(display_width, display_height),
            );

            let response = ui.allocate_rect(image_rect, egui::Sense::drag());

            let mut surface = PainterSurface::new(
                ui.painter().clone(),
                texture.id(),
                image_rect,
                scale,
            );
            render::draw_scene(&mut surface, store.list(), classes);

            // Screen position -> source-image pixels, clamped to the image
            let to_image = |pos: egui::Pos2| -> PointPx {
                geometry::clamp_to_image(
                    PointPx::new(
                        (pos.x - image_rect.min.x) / scale,
                        (pos.y - image_rect.min.y) / scale,
                    ),
                    image.width,
                    image.height,
                )
            };

            if response.drag_started() {
                if let Some(pos) = response.interact_pointer_pos() {
                    gesture.pointer_down(to_image(pos), store.active_class().is_some());
                }
            }
            if response.dragged() {
                if let Some(pos) = response.interact_pointer_pos() {
                    gesture.pointer_move(to_image(pos));
                }
            }
            if response.drag_stopped() {
                let end = response.interact_pointer_pos().map(to_image);
                if let Some(rect) = gesture.pointer_up(end) {
                    action = CanvasAction::Committed(rect);
                }
            }

            if gesture.is_dragging() {
                // Escape aborts the drag; a lost pointer (focus change with
                // no release event) counts as a cancel too.
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    gesture.cancel();
                } else if !ui.input(|i| i.pointer.any_down()) && !response.drag_stopped() {
                    gesture.cancel();
                }
            }

            // Preview overlay for the in-progress drag
            if let (Some(preview), Some(class_id)) = (gesture.preview_rect(), store.active_class())
            {
                let color = color32(class_color(classes, class_id));
                let rect = egui::Rect::from_min_size(
                    image_rect.min + egui::vec2(preview.x * scale, preview.y * scale),
                    egui::vec2(preview.width * scale, preview.height * scale),
                );
                let painter = ui.painter();
                painter.rect_filled(
                    rect,
                    0.0,
                    egui::Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), 0x20),
                );
                painter.rect_stroke(rect, 0.0, egui::Stroke::new(2.0, color));
                painter.text(
                    rect.min + egui::vec2(2.0, 2.0),
                    egui::Align2::LEFT_TOP,
                    class_name(classes, class_id),
                    egui::FontId::proportional(12.0 * scale.max(0.5)),
                    color,
                );
            }
        } else {
            // Show welcome message when no image is loaded
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("YBOX")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("YOLO Box Annotation Studio")
                            .size(14.0)
                            .color(egui::Color32::from_gray(150)),
                    );
                    ui.add_space(20.0);
                    ui.label(
                        egui::RichText::new("Pick an image and press Generate to begin annotating")
                            .color(egui::Color32::from_gray(180)),
                    );
                });
            });
        }
    });

    // Canvas status line
    ui.separator();
    ui.horizontal(|ui| {
        if let Some(class_id) = store.active_class() {
            let color = color32(class_color(classes, class_id));
            ui.label(egui::RichText::new("■").color(color));
            ui.label(format!("Active class: {}", class_name(classes, class_id)));
        } else {
            ui.label("No class selected");
        }
        ui.separator();
        if let Some(image) = store.image() {
            ui.label(format!(
                "{}x{} px | {} annotations",
                image.width,
                image.height,
                store.list().len()
            ));
        } else {
            ui.label("No image loaded");
        }
    });

    action
}
