//! Export configuration
//!
//! Defaults applied when an annotation's snapshot leaves a style unspecified.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Fill opacity of burned-in highlights
    pub highlight_opacity: f32,
    pub highlight_color: String,
    pub drawing_color: String,
    pub drawing_width: f64,
    pub shape_stroke: String,
    pub shape_stroke_width: f64,
    pub text_color: String,
    pub text_font_size: f64,
    /// Length of each arrowhead stroke, in page units
    pub arrow_head_length: f64,
    /// Angle between the shaft and each arrowhead stroke
    pub arrow_head_angle_deg: f64,
    /// Gray levels of the rectangle drawn when a stamp image is unavailable
    pub stamp_placeholder_fill: f32,
    pub stamp_placeholder_border: f32,
    /// Surface units per page unit (the editor's zoom when the snapshot was taken)
    pub surface_scale: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            highlight_opacity: 0.3,
            highlight_color: "#ffff00".to_string(),
            drawing_color: "#ff0000".to_string(),
            drawing_width: 2.0,
            shape_stroke: "#000000".to_string(),
            shape_stroke_width: 1.0,
            text_color: "#000000".to_string(),
            text_font_size: 12.0,
            arrow_head_length: 10.0,
            arrow_head_angle_deg: 30.0,
            stamp_placeholder_fill: 0.85,
            stamp_placeholder_border: 0.5,
            surface_scale: 1.0,
        }
    }
}

impl ExportConfig {
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

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: ExportConfig =
            toml::from_str(s).context("Failed to parse TOML configuration")?;
        anyhow::ensure!(
            config.surface_scale > 0.0,
            "surface_scale must be positive, got {}",
            config.surface_scale
        );
        Ok(config)
    }
}
