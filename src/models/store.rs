// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation state management.
//!
//! `AnnotationStore` owns the active image context, the ordered annotation
//! list, and the class selection.  Every mutation goes through it; the
//! gesture interpreter and the renderer only ever see it from the outside.

use crate::models::annotation::{Annotation, BoxPx};

/// The currently loaded image: pixel dimensions plus the original encoded
/// payload (kept verbatim for the save request).
#[derive(Debug, Clone)]
pub struct ImageContext {
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

/// In-memory annotation state for one image.
///
/// Ids are assigned from a counter that only ever increases within the
/// lifetime of one image context, so an id is never reused even after
/// removals.  Insertion order is z-order: later entries draw on top.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    image: Option<ImageContext>,
    annotations: Vec<Annotation>,
    next_id: u32,
    active_class: Option<u32>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active image.  Clears the annotation list and resets the
    /// id counter; the class selection is left alone.
    pub fn set_image(&mut self, image: ImageContext) {
        log::info!("Loaded image {}x{}", image.width, image.height);
        self.image = Some(image);
        self.annotations.clear();
        self.next_id = 0;
    }

    pub fn image(&self) -> Option<&ImageContext> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn set_active_class(&mut self, class_id: u32) {
        self.active_class = Some(class_id);
    }

    pub fn active_class(&self) -> Option<u32> {
        self.active_class
    }

    /// Append a new annotation and return its id.
    ///
    /// Coordinates are rounded to whole pixels at creation.  Without a
    /// loaded image this is a silent no-op.
    pub fn add_annotation(&mut self, rect: BoxPx, class_id: u32) -> Option<u32> {
        self.image.as_ref()?;

        let id = self.next_id;
        self.next_id += 1;
        self.annotations.push(Annotation {
            id,
            x: rect.x.round(),
            y: rect.y.round(),
            width: rect.width.round(),
            height: rect.height.round(),
            class_id,
        });
        log::info!(
            "Added annotation #{} (class {}), total: {}",
            id,
            class_id,
            self.annotations.len()
        );
        Some(id)
    }

    /// Remove the annotation with the given id; no-op if absent.
    pub fn remove_annotation(&mut self, id: u32) {
        if let Some(idx) = self.annotations.iter().position(|a| a.id == id) {
            self.annotations.remove(idx);
            log::info!(
                "Removed annotation #{}, total: {}",
                id,
                self.annotations.len()
            );
        }
    }

    /// Empty the annotation list and reset the id counter.  The image stays
    /// loaded.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.next_id = 0;
    }

    /// Insertion-ordered snapshot for rendering and serialization.
    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image() -> ImageContext {
        ImageContext {
            width: 800,
            height: 600,
            data_url: "data:image/png;base64,AAAA".to_string(),
        }
    }

    fn store_with_image() -> AnnotationStore {
        let mut store = AnnotationStore::new();
        store.set_image(test_image());
        store
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut store = store_with_image();
        let mut ids = Vec::new();
        for i in 0..5 {
            ids.push(
                store
                    .add_annotation(BoxPx::new(10.0 * i as f32, 0.0, 20.0, 20.0), 0)
                    .unwrap(),
            );
        }
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        // List order matches call order
        let listed: Vec<u32> = store.list().iter().map(|a| a.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut store = store_with_image();
        let first = store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0).unwrap();
        store.add_annotation(BoxPx::new(5.0, 5.0, 10.0, 10.0), 1).unwrap();
        store.remove_annotation(first);
        let third = store.add_annotation(BoxPx::new(9.0, 9.0, 10.0, 10.0), 2).unwrap();
        assert_eq!(third, 2);
        assert!(store.list().iter().all(|a| a.id != first));
    }

    #[test]
    fn test_remove_keeps_other_entries() {
        let mut store = store_with_image();
        let a = store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0).unwrap();
        let b = store.add_annotation(BoxPx::new(5.0, 5.0, 10.0, 10.0), 1).unwrap();
        store.remove_annotation(a);
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].id, b);
        assert_eq!(store.list()[0].class_id, 1);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut store = store_with_image();
        store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0);
        store.remove_annotation(99);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_add_without_image_is_noop() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0), None);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_set_image_resets_list_and_counter() {
        let mut store = store_with_image();
        store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0);
        store.add_annotation(BoxPx::new(1.0, 1.0, 10.0, 10.0), 0);
        store.set_image(test_image());
        assert!(store.list().is_empty());
        assert_eq!(store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0), Some(0));
    }

    #[test]
    fn test_clear_resets_counter_but_keeps_image() {
        let mut store = store_with_image();
        store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0);
        store.clear();
        assert!(store.has_image());
        assert!(store.list().is_empty());
        assert_eq!(store.add_annotation(BoxPx::new(0.0, 0.0, 10.0, 10.0), 0), Some(0));
    }

    #[test]
    fn test_coordinates_rounded_at_creation() {
        let mut store = store_with_image();
        store.add_annotation(BoxPx::new(10.4, 9.6, 100.2, 49.8), 0);
        let ann = &store.list()[0];
        assert_eq!((ann.x, ann.y, ann.width, ann.height), (10.0, 10.0, 100.0, 50.0));
    }
}
