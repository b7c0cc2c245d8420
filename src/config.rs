// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! The class set and the backend address are loaded once at startup from
//! `studio.yaml` (falling back to built-in defaults) and stay immutable for
//! the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// An RGB color, parsed from the `#rrggbb` strings used in class configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const GRAY: Rgb = Rgb { r: 128, g: 128, b: 128 };
}

/// Parse a `#rrggbb` hex color string (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Option<Rgb> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

/// One annotatable object class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDefinition {
    pub id: u32,
    pub name: String,
    pub color: String,
}

impl ClassDefinition {
    /// The configured color, or gray when the hex string is malformed.
    pub fn rgb(&self) -> Rgb {
        parse_hex_color(&self.color).unwrap_or(Rgb::GRAY)
    }
}

/// Look up a class by id.
pub fn class_by_id(classes: &[ClassDefinition], id: u32) -> Option<&ClassDefinition> {
    classes.iter().find(|c| c.id == id)
}

/// Display name for a class id, with a fallback for ids missing from the
/// current config (old sessions may reference classes that were renumbered).
pub fn class_name(classes: &[ClassDefinition], id: u32) -> String {
    class_by_id(classes, id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("class {}", id))
}

/// Display color for a class id.
pub fn class_color(classes: &[ClassDefinition], id: u32) -> Rgb {
    class_by_id(classes, id).map(|c| c.rgb()).unwrap_or(Rgb::GRAY)
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_classes")]
    pub classes: Vec<ClassDefinition>,
}

fn default_server() -> String {
    "http://localhost:8000".to_string()
}

fn default_classes() -> Vec<ClassDefinition> {
    let palette = [
        "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff",
    ];
    palette
        .iter()
        .enumerate()
        .map(|(i, color)| ClassDefinition {
            id: i as u32,
            name: format!("object {}", i + 1),
            color: color.to_string(),
        })
        .collect()
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            classes: default_classes(),
        }
    }
}

impl StudioConfig {
    /// Load `./studio.yaml` if present, otherwise use defaults.  The
    /// `YBOX_SERVER` environment variable overrides the backend address
    /// either way.
    pub fn load() -> Self {
        let mut config = match Self::from_file(Path::new("studio.yaml")) {
            Some(cfg) => cfg,
            None => Self::default(),
        };
        if let Ok(server) = std::env::var("YBOX_SERVER") {
            config.server = server;
        }
        config
    }

    fn from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_yaml::from_str(&text) {
                Ok(cfg) => {
                    log::info!("Loaded configuration from {}", path.display());
                    Some(cfg)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}
