//! Interaction modes and drawing style

use serde::{Deserialize, Serialize};

/// Mutually exclusive interaction mode; governs how pointer-down is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    #[default]
    Select,
    Draw,
    Text,
    Highlight,
    Stamp,
    Shape,
    Eraser,
}

impl ToolType {
    /// Whether pointer input on the surface is a freehand brush for this tool
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolType::Draw | ToolType::Eraser)
    }
}

/// Style applied to primitives created from now on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawingSettings {
    pub color: String,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        Self {
            color: "#ff0000".to_string(),
            stroke_width: 2.0,
            font_size: 16.0,
            font_family: "Helvetica".to_string(),
        }
    }
}

impl DrawingSettings {
    pub fn merge(&mut self, patch: DrawingSettingsPatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(family) = patch.font_family {
            self.font_family = family;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingSettingsPatch {
    pub color: Option<String>,
    pub stroke_width: Option<f64>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
}
