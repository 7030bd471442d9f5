//! Shape records, drafts and patches
//!
//! A [`Shape`] is a rectangular node of the flowchart. Shapes linked to a
//! document heading carry a `heading_id` and are owned by outline sync;
//! shapes without one were placed by the user and are never removed
//! automatically.

use crate::{Palette, Point, Rect, ShapeColor, ShapeId, Size};
use serde::{Deserialize, Serialize};

/// A rectangular node in the flowchart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub background_color: ShapeColor,
    pub border_color: ShapeColor,
    pub color: ShapeColor,
    /// Stable id of the heading this shape mirrors, if any
    #[serde(default)]
    pub heading_id: Option<String>,
    /// Position of the heading in documents saved before heading ids existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_index: Option<usize>,
    #[serde(default)]
    pub parent: Option<ShapeId>,
    #[serde(default)]
    pub children: Vec<ShapeId>,
    #[serde(default)]
    pub collapsed: bool,
    #[serde(default)]
    pub collapsed_size: Option<Size>,
    #[serde(default)]
    pub expanded_size: Option<Size>,
    /// Hidden because an ancestor is collapsed. Derived, never persisted.
    #[serde(skip)]
    pub(crate) hidden: bool,
}

/// Equality over the persisted fields; `hidden` is derived and ignored.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.text == other.text
            && self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
            && self.background_color == other.background_color
            && self.border_color == other.border_color
            && self.color == other.color
            && self.heading_id == other.heading_id
            && self.legacy_index == other.legacy_index
            && self.parent == other.parent
            && self.children == other.children
            && self.collapsed == other.collapsed
            && self.collapsed_size == other.collapsed_size
            && self.expanded_size == other.expanded_size
    }
}

impl Shape {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_size(&mut self, size: Size) {
        self.width = size.width.max(0.0);
        self.height = size.height.max(0.0);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.set_size(rect.size());
    }

    /// Whether the shape is driven by a document heading
    pub fn is_heading_linked(&self) -> bool {
        self.heading_id.is_some()
    }

    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    /// Whether the shape is currently rendered (no collapsed ancestor)
    pub fn is_visible(&self) -> bool {
        !self.hidden
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// Defaults applied to fields a [`ShapeDraft`] leaves out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeDefaults {
    pub width: f32,
    /// Height of user-placed shapes
    pub manual_height: f32,
    /// Height of heading-linked shapes
    pub heading_height: f32,
    pub palette: Palette,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            width: 120.0,
            manual_height: 60.0,
            heading_height: 36.0,
            palette: Palette::default(),
        }
    }
}

// =============================================================================
// Drafts and patches
// =============================================================================

/// Partial shape description accepted by [`crate::ShapeStore::add_shape`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeDraft {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background_color: Option<ShapeColor>,
    pub border_color: Option<ShapeColor>,
    pub color: Option<ShapeColor>,
    pub heading_id: Option<String>,
    pub legacy_index: Option<usize>,
}

impl ShapeDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_rect(self, rect: Rect) -> Self {
        self.at(rect.x, rect.y).with_size(rect.width, rect.height)
    }

    pub fn with_background(mut self, color: ShapeColor) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_heading(mut self, heading_id: impl Into<String>) -> Self {
        self.heading_id = Some(heading_id.into());
        self
    }

    pub fn with_legacy_index(mut self, index: usize) -> Self {
        self.legacy_index = Some(index);
        self
    }

    /// Materialize the draft, filling omitted fields from `defaults`
    pub fn into_shape(self, id: ShapeId, defaults: &ShapeDefaults) -> Shape {
        let default_height = if self.heading_id.is_some() {
            defaults.heading_height
        } else {
            defaults.manual_height
        };
        Shape {
            id,
            text: self.text.unwrap_or_default(),
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
            width: self.width.unwrap_or(defaults.width).max(0.0),
            height: self.height.unwrap_or(default_height).max(0.0),
            background_color: self.background_color.unwrap_or(defaults.palette.manual),
            border_color: self.border_color.unwrap_or(defaults.palette.border),
            color: self.color.unwrap_or(defaults.palette.text),
            heading_id: self.heading_id,
            legacy_index: self.legacy_index,
            parent: None,
            children: Vec::new(),
            collapsed: false,
            collapsed_size: None,
            expanded_size: None,
            hidden: false,
        }
    }
}

/// Shallow patch merged into a shape by [`crate::ShapeStore::update_shape`].
///
/// Structural fields (`parent`, `children`, `collapsed`) are
/// absent; they change only through grouping and collapse operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub background_color: Option<ShapeColor>,
    pub border_color: Option<ShapeColor>,
    pub color: Option<ShapeColor>,
    /// `Some(None)` unlinks the shape from its heading
    pub heading_id: Option<Option<String>>,
    pub collapsed_size: Option<Size>,
    pub expanded_size: Option<Size>,
}

impl ShapePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), ..Self::default() }
    }

    pub fn position(x: f32, y: f32) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    pub fn size(width: f32, height: f32) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    pub fn rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }

    pub(crate) fn apply(self, shape: &mut Shape) {
        if let Some(text) = self.text {
            shape.text = text;
        }
        if let Some(x) = self.x {
            shape.x = x;
        }
        if let Some(y) = self.y {
            shape.y = y;
        }
        if let Some(width) = self.width {
            shape.width = width.max(0.0);
        }
        if let Some(height) = self.height {
            shape.height = height.max(0.0);
        }
        if let Some(color) = self.background_color {
            shape.background_color = color;
        }
        if let Some(color) = self.border_color {
            shape.border_color = color;
        }
        if let Some(color) = self.color {
            shape.color = color;
        }
        if let Some(heading_id) = self.heading_id {
            shape.heading_id = heading_id;
        }
        if let Some(size) = self.collapsed_size {
            shape.collapsed_size = Some(size);
        }
        if let Some(size) = self.expanded_size {
            shape.expanded_size = Some(size);
        }
    }
}
