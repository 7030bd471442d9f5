//! Flowchart settings
//!
//! One serde-backed struct groups every tunable of the flowchart. Every
//! section has defaults, so partial settings files are fine.

use crate::{FlowEditError, GridConfig, InteractionConfig, Result};
use flow_layout::LayoutConfig;
use flow_model::ShapeDefaults;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// All flowchart settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowSettings {
    /// Defaults for new shapes
    pub shapes: ShapeDefaults,
    /// Group sizing and minimum sizes
    pub layout: LayoutConfig,
    /// Placement grid for shapes created from headings
    pub grid: GridConfig,
    /// Pointer hit tolerances
    pub interaction: InteractionConfig,
}

impl FlowSettings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| FlowEditError::Settings(e.to_string()))
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn load_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Failed to parse flowchart settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Read settings from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| FlowEditError::Settings(e.to_string()))
    }
}
