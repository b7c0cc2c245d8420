// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Canvas rendering pipeline.
//!
//! [`draw_scene`] is a pure function of the annotation list and the class
//! config: it clears the surface, blits the source image, then draws every
//! annotation in list order (later entries on top).  It talks to the display
//! through the [`DrawSurface`] trait so the same logic runs against the egui
//! painter in the app and against a recording surface in tests.
//!
//! All coordinates and sizes handed to a surface are source-image pixels;
//! mapping to screen space is the surface's job.

use crate::config::{class_color, class_name, ClassDefinition, Rgb};
use crate::models::annotation::{Annotation, BoxPx};

pub const BOX_STROKE_WIDTH: f32 = 2.0;
pub const LABEL_PLATE_HEIGHT: f32 = 20.0;
pub const LABEL_PAD: f32 = 5.0;
pub const LABEL_TEXT_COLOR: Rgb = Rgb::WHITE;

/// Minimal drawing surface: enough to render an annotated image, nothing
/// more.
pub trait DrawSurface {
    /// Reset the surface to a blank state.
    fn clear(&mut self);
    /// Blit the source image at its native resolution, origin (0, 0).
    fn draw_image(&mut self);
    fn stroke_rect(&mut self, rect: BoxPx, color: Rgb, width: f32);
    fn fill_rect(&mut self, rect: BoxPx, color: Rgb);
    /// Draw `text` with its bottom-left corner at (x, y).
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb);
    /// Width of `text` in source-image pixels.
    fn text_width(&mut self, text: &str) -> f32;
}

/// Redraw the whole scene from current state.  Idempotent: the same inputs
/// always produce the same draw sequence.
pub fn draw_scene<S: DrawSurface>(
    surface: &mut S,
    annotations: &[Annotation],
    classes: &[ClassDefinition],
) {
    surface.clear();
    surface.draw_image();

    for ann in annotations {
        let color = class_color(classes, ann.class_id);
        let name = class_name(classes, ann.class_id);

        surface.stroke_rect(ann.rect(), color, BOX_STROKE_WIDTH);

        // Label plate above the box's top-left corner
        let plate_width = surface.text_width(&name) + 2.0 * LABEL_PAD;
        surface.fill_rect(
            BoxPx::new(ann.x, ann.y - LABEL_PLATE_HEIGHT, plate_width, LABEL_PLATE_HEIGHT),
            color,
        );
        surface.fill_text(&name, ann.x + LABEL_PAD, ann.y - LABEL_PAD, LABEL_TEXT_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Image,
        Stroke(BoxPx, Rgb, u32),
        Fill(BoxPx, Rgb),
        Text(String, u32, u32, Rgb),
    }

    /// Records draw calls instead of rasterizing them.
    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    impl DrawSurface for RecordingSurface {
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }
        fn draw_image(&mut self) {
            self.ops.push(Op::Image);
        }
        fn stroke_rect(&mut self, rect: BoxPx, color: Rgb, width: f32) {
            self.ops.push(Op::Stroke(rect, color, width as u32));
        }
        fn fill_rect(&mut self, rect: BoxPx, color: Rgb) {
            self.ops.push(Op::Fill(rect, color));
        }
        fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgb) {
            self.ops.push(Op::Text(text.to_string(), x as u32, y as u32, color));
        }
        fn text_width(&mut self, text: &str) -> f32 {
            7.0 * text.len() as f32
        }
    }

    fn annotation(id: u32, x: f32, y: f32, class_id: u32) -> Annotation {
        Annotation { id, x, y, width: 100.0, height: 50.0, class_id }
    }

    #[test]
    fn test_render_is_idempotent() {
        let classes = StudioConfig::default().classes;
        let annotations = vec![annotation(0, 30.0, 40.0, 0), annotation(1, 60.0, 80.0, 2)];

        let mut first = RecordingSurface::default();
        draw_scene(&mut first, &annotations, &classes);
        let mut second = RecordingSurface::default();
        draw_scene(&mut second, &annotations, &classes);

        assert_eq!(first.ops, second.ops);
    }

    #[test]
    fn test_empty_list_draws_only_the_image() {
        let classes = StudioConfig::default().classes;
        let mut surface = RecordingSurface::default();
        draw_scene(&mut surface, &[], &classes);
        assert_eq!(surface.ops, vec![Op::Clear, Op::Image]);
    }

    #[test]
    fn test_list_order_is_z_order() {
        let classes = StudioConfig::default().classes;
        let annotations = vec![annotation(0, 30.0, 40.0, 0), annotation(1, 60.0, 80.0, 1)];
        let mut surface = RecordingSurface::default();
        draw_scene(&mut surface, &annotations, &classes);

        let strokes: Vec<&Op> = surface
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Stroke(..)))
            .collect();
        assert_eq!(strokes.len(), 2);
        // First annotation stroked first, so the second draws on top
        assert_eq!(
            *strokes[0],
            Op::Stroke(BoxPx::new(30.0, 40.0, 100.0, 50.0), Rgb { r: 255, g: 0, b: 0 }, 2)
        );
        assert_eq!(
            *strokes[1],
            Op::Stroke(BoxPx::new(60.0, 80.0, 100.0, 50.0), Rgb { r: 0, g: 255, b: 0 }, 2)
        );
    }

    #[test]
    fn test_label_plate_sized_to_text() {
        let classes = StudioConfig::default().classes;
        let annotations = vec![annotation(0, 30.0, 40.0, 0)];
        let mut surface = RecordingSurface::default();
        draw_scene(&mut surface, &annotations, &classes);

        // "object 1" is 8 chars -> 7*8 + 10 = 66 wide, plate sits above the box
        let expected_plate = BoxPx::new(30.0, 20.0, 66.0, 20.0);
        assert!(surface
            .ops
            .contains(&Op::Fill(expected_plate, Rgb { r: 255, g: 0, b: 0 })));
        assert!(surface
            .ops
            .contains(&Op::Text("object 1".to_string(), 35, 35, Rgb::WHITE)));
    }

    #[test]
    fn test_unknown_class_renders_with_fallbacks() {
        let classes = StudioConfig::default().classes;
        let annotations = vec![annotation(0, 30.0, 40.0, 42)];
        let mut surface = RecordingSurface::default();
        draw_scene(&mut surface, &annotations, &classes);

        assert!(surface
            .ops
            .iter()
            .any(|op| matches!(op, Op::Stroke(_, color, _) if *color == Rgb::GRAY)));
        assert!(surface
            .ops
            .iter()
            .any(|op| matches!(op, Op::Text(text, ..) if text == "class 42")));
    }
}
