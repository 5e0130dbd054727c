//! Manager configuration
//!
//! TOML-backed defaults for primitives created by the annotation tools.

use anyhow::Context;
use annotation_types::DrawingSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Content of a freshly placed text primitive
    #[serde(default = "default_text_placeholder")]
    pub text_placeholder: String,
    /// Fill reserved for highlight rectangles
    #[serde(default = "default_highlight_fill")]
    pub highlight_fill: String,
    #[serde(default = "default_highlight_opacity")]
    pub highlight_opacity: f64,
    /// Distance within which an eraser stroke removes ink
    #[serde(default = "default_eraser_radius")]
    pub eraser_radius: f64,
    #[serde(default)]
    pub stamp: StampConfig,
    /// Initial drawing settings of every session
    #[serde(default)]
    pub drawing: DrawingSettings,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            text_placeholder: default_text_placeholder(),
            highlight_fill: default_highlight_fill(),
            highlight_opacity: default_highlight_opacity(),
            eraser_radius: default_eraser_radius(),
            stamp: StampConfig::default(),
            drawing: DrawingSettings::default(),
        }
    }
}

impl ManagerConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string; missing keys take defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }
}

/// Fixed composition of the stamp tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    pub width: f64,
    pub height: f64,
    pub label: String,
    pub color: String,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 40.0,
            label: "APPROVED".to_string(),
            color: "#d32f2f".to_string(),
        }
    }
}

fn default_text_placeholder() -> String {
    "Type here".to_string()
}

fn default_highlight_fill() -> String {
    "#ffff00".to_string()
}

fn default_highlight_opacity() -> f64 {
    0.3
}

fn default_eraser_radius() -> f64 {
    10.0
}
