// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class selector toolbar.
//!
//! One tinted button per configured class; exactly one class is active at a
//! time and new boxes take the active class.

use crate::config::ClassDefinition;
use crate::models::store::AnnotationStore;

/// Display the class buttons and update the store's active class.
pub fn show(ui: &mut egui::Ui, classes: &[ClassDefinition], store: &mut AnnotationStore) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Classes:");
        ui.separator();

        for class in classes {
            let selected = store.active_class() == Some(class.id);
            let rgb = class.rgb();
            let fill = egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b);
            let stroke = if selected {
                egui::Stroke::new(2.0, egui::Color32::WHITE)
            } else {
                egui::Stroke::new(1.0, egui::Color32::from_gray(60))
            };
            let button = egui::Button::new(
                egui::RichText::new(&class.name).color(egui::Color32::BLACK).strong(),
            )
            .fill(fill)
            .stroke(stroke);

            if ui.add(button).clicked() {
                store.set_active_class(class.id);
            }
        }

        ui.separator();
        ui.label(
            egui::RichText::new("Drag on the image to draw a box with the active class")
                .italics()
                .weak(),
        );
    });
}
