// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-gesture interpretation.
//!
//! Turns pointer down/move/up sequences over the canvas into candidate
//! bounding boxes.  All positions are source-image pixels; the UI converts
//! from screen space before calling in.  The interpreter never touches the
//! store itself - a committed rectangle is returned to the caller, which
//! decides what to do with it.

use crate::models::annotation::{BoxPx, PointPx};

/// Minimum committed box edge, in source-image pixels.  Drags at or below
/// this size on either axis are discarded as accidental clicks.
pub const MIN_BOX_EDGE: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Dragging { start: PointPx, current: PointPx },
}

/// Drag-rectangle state machine: Idle -> Dragging -> Idle, committing on
/// pointer-up when the rectangle beats the minimum-size threshold.
#[derive(Debug)]
pub struct DragGesture {
    state: State,
}

impl Default for DragGesture {
    fn default() -> Self {
        Self::new()
    }
}

impl DragGesture {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, State::Dragging { .. })
    }

    /// Start a drag.  Ignored while a drag is already active, and ignored
    /// entirely when no class is selected.
    pub fn pointer_down(&mut self, pos: PointPx, class_selected: bool) {
        if !class_selected {
            return;
        }
        if let State::Idle = self.state {
            self.state = State::Dragging { start: pos, current: pos };
        }
    }

    /// Update the drag position and return the preview rectangle.  No-op
    /// when idle.
    pub fn pointer_move(&mut self, pos: PointPx) -> Option<BoxPx> {
        match &mut self.state {
            State::Dragging { start, current } => {
                *current = pos;
                Some(BoxPx::from_drag(*start, pos))
            }
            State::Idle => None,
        }
    }

    /// Finish the drag.  Returns the final rectangle when both edges exceed
    /// [`MIN_BOX_EDGE`]; smaller drags are discarded.  A pointer-up with no
    /// active drag is a no-op.  `pos` falls back to the last observed drag
    /// position when the release carries no coordinates.
    pub fn pointer_up(&mut self, pos: Option<PointPx>) -> Option<BoxPx> {
        match self.state {
            State::Dragging { start, current } => {
                self.state = State::Idle;
                let rect = BoxPx::from_drag(start, pos.unwrap_or(current));
                if rect.width > MIN_BOX_EDGE && rect.height > MIN_BOX_EDGE {
                    log::debug!(
                        "Committed drag: {}x{} at ({}, {})",
                        rect.width,
                        rect.height,
                        rect.x,
                        rect.y
                    );
                    Some(rect)
                } else {
                    None
                }
            }
            State::Idle => None,
        }
    }

    /// The current preview rectangle, if a drag is active.
    pub fn preview_rect(&self) -> Option<BoxPx> {
        match self.state {
            State::Dragging { start, current } => Some(BoxPx::from_drag(start, current)),
            State::Idle => None,
        }
    }

    /// Abort the active drag without committing (Escape, lost pointer).
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::{AnnotationStore, ImageContext};

    fn drag(gesture: &mut DragGesture, from: (f32, f32), to: (f32, f32)) -> Option<BoxPx> {
        gesture.pointer_down(PointPx::new(from.0, from.1), true);
        gesture.pointer_move(PointPx::new(to.0, to.1));
        gesture.pointer_up(Some(PointPx::new(to.0, to.1)))
    }

    #[test]
    fn test_drag_below_threshold_discarded() {
        let mut gesture = DragGesture::new();
        assert_eq!(drag(&mut gesture, (10.0, 10.0), (13.0, 13.0)), None);
        // Exactly at the threshold is still too small
        assert_eq!(drag(&mut gesture, (10.0, 10.0), (15.0, 15.0)), None);
    }

    #[test]
    fn test_drag_above_threshold_commits() {
        let mut gesture = DragGesture::new();
        let rect = drag(&mut gesture, (10.0, 10.0), (16.0, 16.0)).unwrap();
        assert_eq!(rect, BoxPx::new(10.0, 10.0, 6.0, 6.0));
        assert!(!gesture.is_dragging());
    }

    #[test]
    fn test_drag_any_direction() {
        let mut gesture = DragGesture::new();
        let rect = drag(&mut gesture, (110.0, 60.0), (10.0, 10.0)).unwrap();
        assert_eq!(rect, BoxPx::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_no_class_selected_ignores_pointer() {
        let mut gesture = DragGesture::new();
        gesture.pointer_down(PointPx::new(10.0, 10.0), false);
        assert!(!gesture.is_dragging());
        assert_eq!(gesture.pointer_move(PointPx::new(50.0, 50.0)), None);
        assert_eq!(gesture.pointer_up(Some(PointPx::new(50.0, 50.0))), None);
    }

    #[test]
    fn test_pointer_up_without_drag_is_noop() {
        let mut gesture = DragGesture::new();
        assert_eq!(gesture.pointer_up(Some(PointPx::new(50.0, 50.0))), None);
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut gesture = DragGesture::new();
        gesture.pointer_down(PointPx::new(10.0, 10.0), true);
        gesture.pointer_move(PointPx::new(100.0, 100.0));
        gesture.cancel();
        assert!(!gesture.is_dragging());
        assert_eq!(gesture.pointer_up(Some(PointPx::new(100.0, 100.0))), None);
    }

    #[test]
    fn test_pointer_up_falls_back_to_last_position() {
        let mut gesture = DragGesture::new();
        gesture.pointer_down(PointPx::new(10.0, 10.0), true);
        gesture.pointer_move(PointPx::new(110.0, 60.0));
        let rect = gesture.pointer_up(None).unwrap();
        assert_eq!(rect, BoxPx::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_preview_rect_follows_drag() {
        let mut gesture = DragGesture::new();
        assert_eq!(gesture.preview_rect(), None);
        gesture.pointer_down(PointPx::new(20.0, 20.0), true);
        gesture.pointer_move(PointPx::new(60.0, 40.0));
        assert_eq!(gesture.preview_rect(), Some(BoxPx::new(20.0, 20.0, 40.0, 20.0)));
    }

    #[test]
    fn test_drag_to_store_end_to_end() {
        // 800x600 image, drag (10,10) -> (110,60) with class 0 selected
        let mut store = AnnotationStore::new();
        store.set_image(ImageContext {
            width: 800,
            height: 600,
            data_url: String::new(),
        });
        store.set_active_class(0);

        let mut gesture = DragGesture::new();
        gesture.pointer_down(PointPx::new(10.0, 10.0), store.active_class().is_some());
        gesture.pointer_move(PointPx::new(110.0, 60.0));
        let rect = gesture.pointer_up(Some(PointPx::new(110.0, 60.0))).unwrap();
        store.add_annotation(rect, store.active_class().unwrap());

        assert_eq!(store.list().len(), 1);
        let ann = &store.list()[0];
        assert_eq!(
            (ann.x, ann.y, ann.width, ann.height, ann.class_id),
            (10.0, 10.0, 100.0, 50.0, 0)
        );
    }
}
