// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Wire types for the annotation backend.
//!
//! These mirror the backend's fixed HTTP contract.  Response structs are
//! deliberately tolerant: optional fields default so that an application
//! failure (`success: false` plus a message) still parses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{class_name, ClassDefinition};
use crate::models::annotation::Annotation;

fn default_true() -> bool {
    true
}

/// One annotation as persisted on the wire: integer pixel coordinates
/// relative to the original (unscaled) image, class name resolved from the
/// current config at serialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAnnotation {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub class_id: u32,
    pub class_name: String,
}

impl WireAnnotation {
    pub fn from_annotation(ann: &Annotation, classes: &[ClassDefinition]) -> Self {
        Self {
            id: ann.id,
            x: ann.x.round() as i32,
            y: ann.y.round() as i32,
            width: ann.width.round() as i32,
            height: ann.height.round() as i32,
            class_id: ann.class_id,
            class_name: class_name(classes, ann.class_id),
        }
    }
}

/// Pre-flight check for a save.  Returns the user-facing message that blocks
/// the request, if any; no request is sent while this returns `Some`.
pub fn save_blocker(filename: &str, has_image: bool, annotations: usize) -> Option<&'static str> {
    if filename.trim().is_empty() {
        Some("Enter a file name before saving")
    } else if !has_image {
        Some("No image loaded")
    } else if annotations == 0 {
        Some("There are no annotations to save")
    } else {
        None
    }
}

/// Form fields for `POST /save_annotations`, captured as a complete snapshot
/// of the store at call time.
#[derive(Debug, Clone)]
pub struct SavePayload {
    pub annotations: Vec<WireAnnotation>,
    pub filename: String,
    pub session_name: String,
    pub image_width: u32,
    pub image_height: u32,
    pub image_data: String,
}

/// Parameters for `POST /generate`.
#[derive(Debug, Clone)]
pub struct GenerateParams {
    pub size: u32,
    pub x: i32,
    pub y: i32,
    pub random_bg: bool,
}

impl Default for GenerateParams {
    fn default() -> Self {
        Self { size: 320, x: 0, y: 0, random_bg: true }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct SavedFiles {
    pub image: String,
    pub labels: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub files: Option<SavedFiles>,
    #[serde(default)]
    pub yolo_format: Vec<String>,
}

/// A successful save, with the response fields the UI presents verbatim.
#[derive(Debug, Clone)]
pub struct SavedDataset {
    pub original_name: String,
    pub unique_name: String,
    pub image_file: String,
    pub labels_file: String,
    pub yolo_format: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionSummary {
    pub name: String,
    pub images_count: u32,
    pub labels_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct SessionsResponse {
    pub success: bool,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Generic `{ success, message? }` response (delete, augmentation start).
#[derive(Debug, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizeAnnotation {
    pub class_id: u32,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub yolo_coords: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisualizeImage {
    pub filename: String,
    pub image_data: String,
    #[serde(default)]
    pub annotations: Vec<VisualizeAnnotation>,
    #[serde(default)]
    pub has_labels: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisualizeResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub session_name: String,
    #[serde(default)]
    pub images: Vec<VisualizeImage>,
}

/// Metadata for one augmentation variant; the transform itself is opaque to
/// the client.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantInfo {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AugmentationInfoResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub available_variants: BTreeMap<String, VariantInfo>,
}

#[derive(Debug, Serialize)]
pub struct StartAugmentationRequest {
    pub variants: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProgressResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct AugmentationProgress {
    pub current: u64,
    pub total: u64,
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StudioConfig;

    #[test]
    fn test_wire_annotation_field_names() {
        let classes = StudioConfig::default().classes;
        let ann = Annotation {
            id: 3,
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
            class_id: 0,
        };
        let wire = WireAnnotation::from_annotation(&ann, &classes);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["x"], 10);
        assert_eq!(json["width"], 100);
        assert_eq!(json["class_id"], 0);
        assert_eq!(json["class_name"], "object 1");
    }

    #[test]
    fn test_wire_annotation_unknown_class_falls_back() {
        let classes = StudioConfig::default().classes;
        let ann = Annotation {
            id: 0,
            x: 0.0,
            y: 0.0,
            width: 6.0,
            height: 6.0,
            class_id: 42,
        };
        let wire = WireAnnotation::from_annotation(&ann, &classes);
        assert_eq!(wire.class_name, "class 42");
    }

    #[test]
    fn test_save_response_success_shape() {
        let json = r#"{
            "success": true,
            "message": "Dataset guardado",
            "files": {"image": "annotations/images/cat_1.jpg", "labels": "annotations/labels/cat_1.txt"},
            "original_name": "cat",
            "unique_name": "cat_1",
            "yolo_format": ["0 0.075000 0.058333 0.125000 0.083333"]
        }"#;
        let resp: SaveResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.unique_name.as_deref(), Some("cat_1"));
        assert_eq!(resp.files.unwrap().labels, "annotations/labels/cat_1.txt");
        assert_eq!(resp.yolo_format.len(), 1);
    }

    #[test]
    fn test_save_response_failure_shape() {
        let resp: SaveResponse =
            serde_json::from_str(r#"{"success": false, "message": "Error: bad image"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("Error: bad image"));
        assert!(resp.yolo_format.is_empty());
    }

    #[test]
    fn test_sessions_response() {
        let json = r#"{
            "success": true,
            "sessions": [
                {"name": "default", "images_count": 12, "labels_count": 12},
                {"name": "traffic", "images_count": 3, "labels_count": 1}
            ]
        }"#;
        let resp: SessionsResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.sessions.len(), 2);
        assert_eq!(resp.sessions[1].name, "traffic");
        assert_eq!(resp.sessions[1].labels_count, 1);
    }

    #[test]
    fn test_visualize_response() {
        let json = r#"{
            "session_name": "traffic",
            "images": [{
                "filename": "car_1.jpg",
                "image_data": "data:image/jpeg;base64,AAAA",
                "has_labels": true,
                "annotations": [
                    {"class_id": 1, "class_name": "object 2", "yolo_coords": [0.5, 0.5, 0.25, 0.25]}
                ]
            }]
        }"#;
        let resp: VisualizeResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success); // defaults true when the field is absent
        assert_eq!(resp.images.len(), 1);
        assert_eq!(resp.images[0].annotations[0].yolo_coords.len(), 4);
    }

    #[test]
    fn test_augmentation_info_response() {
        let json = r#"{
            "success": true,
            "available_variants": {
                "espejo": {"name": "Espejo horizontal", "icon": "M", "description": "volteo horizontal"},
                "brillo": {"name": "Brillo aumentado", "icon": "B", "description": "brillo +50%"}
            }
        }"#;
        let resp: AugmentationInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.available_variants.len(), 2);
        // BTreeMap keeps a stable presentation order
        let keys: Vec<&String> = resp.available_variants.keys().collect();
        assert_eq!(keys, vec!["brillo", "espejo"]);
    }

    #[test]
    fn test_save_blocker_rules() {
        // Zero annotations block the save before any request is sent
        assert_eq!(
            save_blocker("cat", true, 0),
            Some("There are no annotations to save")
        );
        assert_eq!(save_blocker("", true, 3), Some("Enter a file name before saving"));
        assert_eq!(save_blocker("   ", true, 3), Some("Enter a file name before saving"));
        assert_eq!(save_blocker("cat", false, 3), Some("No image loaded"));
        assert_eq!(save_blocker("cat", true, 3), None);
    }

    #[test]
    fn test_progress_response_idle_shape() {
        // Backend reports completed=true with zero totals when nothing runs
        let json = r#"{"success": true, "current": 0, "total": 0, "completed": true}"#;
        let resp: ProgressResponse = serde_json::from_str(json).unwrap();
        assert!(resp.completed);
        assert_eq!(resp.total, 0);
    }
}
