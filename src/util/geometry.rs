// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides conversions between YOLO-normalized coordinates and
//! pixel space, plus the display-fit math shared by the canvas and the
//! visualizer.

use crate::models::annotation::{BoxPx, PointPx};

/// Convert one YOLO record (`x_center y_center width height`, all 0-1) to a
/// pixel-space box.  Returns `None` unless exactly four coordinates are
/// present.
pub fn yolo_to_box(coords: &[f64], img_width: u32, img_height: u32) -> Option<BoxPx> {
    if coords.len() != 4 {
        return None;
    }
    let (w, h) = (img_width as f64, img_height as f64);
    let box_w = coords[2] * w;
    let box_h = coords[3] * h;
    Some(BoxPx::new(
        (coords[0] * w - box_w / 2.0) as f32,
        (coords[1] * h - box_h / 2.0) as f32,
        box_w as f32,
        box_h as f32,
    ))
}

/// Clamp a point into the image bounds.
pub fn clamp_to_image(p: PointPx, img_width: u32, img_height: u32) -> PointPx {
    PointPx::new(
        p.x.clamp(0.0, img_width as f32),
        p.y.clamp(0.0, img_height as f32),
    )
}

/// Fit an image into the available area preserving aspect ratio.  Returns
/// the displayed size.
pub fn fit_size(img_width: f32, img_height: f32, avail_width: f32, avail_height: f32) -> (f32, f32) {
    let img_aspect = img_width / img_height;
    let avail_aspect = avail_width / avail_height;

    if img_aspect > avail_aspect {
        // Image is wider - fit to width
        (avail_width, avail_width / img_aspect)
    } else {
        // Image is taller - fit to height
        (avail_height * img_aspect, avail_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yolo_to_box_centered() {
        let rect = yolo_to_box(&[0.5, 0.5, 0.25, 0.25], 800, 600).unwrap();
        assert_eq!(rect, BoxPx::new(300.0, 225.0, 200.0, 150.0));
    }

    #[test]
    fn test_yolo_to_box_corner() {
        // Box filling the top-left quarter
        let rect = yolo_to_box(&[0.25, 0.25, 0.5, 0.5], 1920, 1080).unwrap();
        assert_eq!(rect, BoxPx::new(0.0, 0.0, 960.0, 540.0));
    }

    #[test]
    fn test_yolo_to_box_rejects_short_records() {
        assert!(yolo_to_box(&[0.5, 0.5, 0.25], 800, 600).is_none());
        assert!(yolo_to_box(&[], 800, 600).is_none());
    }

    #[test]
    fn test_clamp_to_image() {
        let p = clamp_to_image(PointPx::new(-5.0, 700.0), 800, 600);
        assert_eq!(p, PointPx::new(0.0, 600.0));
        let q = clamp_to_image(PointPx::new(400.0, 300.0), 800, 600);
        assert_eq!(q, PointPx::new(400.0, 300.0));
    }

    #[test]
    fn test_fit_size_wide_image() {
        let (w, h) = fit_size(1600.0, 800.0, 800.0, 800.0);
        assert_eq!((w, h), (800.0, 400.0));
    }

    #[test]
    fn test_fit_size_tall_image() {
        let (w, h) = fit_size(400.0, 800.0, 800.0, 400.0);
        assert_eq!((w, h), (200.0, 400.0));
    }
}
