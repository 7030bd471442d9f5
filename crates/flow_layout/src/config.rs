//! Layout settings

use flow_model::Size;
use serde::{Deserialize, Serialize};

/// Spacing and size limits used by the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Space kept between a group's border and its children
    pub group_padding: f32,
    /// Extra room above the children for the group title
    pub header_height: f32,
    /// Size a group collapses to when none was recorded
    pub collapsed_size: Size,
    /// Smallest size a resize gesture may produce
    pub min_shape_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            group_padding: 20.0,
            header_height: 30.0,
            collapsed_size: Size::new(120.0, 40.0),
            min_shape_size: Size::new(50.0, 30.0),
        }
    }
}
