//! Connections between shapes
//!
//! A [`Connection`] is a directed link from one shape's boundary anchor to
//! another's. Several connections may join the same pair of shapes.

use crate::{ConnectionId, Point, Rect, ShapeColor, ShapeId};
use serde::{Deserialize, Serialize};

/// Boundary anchor a connection attaches to (edge midpoints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPoint {
    Top,
    #[default]
    Right,
    Bottom,
    Left,
}

impl AnchorPoint {
    pub const ALL: [AnchorPoint; 4] = [
        AnchorPoint::Top,
        AnchorPoint::Right,
        AnchorPoint::Bottom,
        AnchorPoint::Left,
    ];

    /// Get the normalized position (0.0-1.0) for this anchor
    pub fn normalized_position(&self) -> (f32, f32) {
        match self {
            AnchorPoint::Top => (0.5, 0.0),
            AnchorPoint::Right => (1.0, 0.5),
            AnchorPoint::Bottom => (0.5, 1.0),
            AnchorPoint::Left => (0.0, 0.5),
        }
    }

    /// Outward unit normal of the edge the anchor sits on
    pub fn normal(&self) -> (f32, f32) {
        match self {
            AnchorPoint::Top => (0.0, -1.0),
            AnchorPoint::Right => (1.0, 0.0),
            AnchorPoint::Bottom => (0.0, 1.0),
            AnchorPoint::Left => (-1.0, 0.0),
        }
    }

    /// Absolute position of the anchor on `rect`
    pub fn position_on(&self, rect: &Rect) -> Point {
        let (nx, ny) = self.normalized_position();
        Point::new(rect.x + rect.width * nx, rect.y + rect.height * ny)
    }
}

/// Stroke pattern of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
}

/// Arrow head style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowHead {
    None,
    /// Arrow at the target end only
    #[default]
    End,
    /// Arrows at both ends
    Both,
}

/// Visual style of a connection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStyle {
    pub color: Option<ShapeColor>,
    #[serde(rename = "type")]
    pub line_type: LineType,
    pub arrow: ArrowHead,
    pub label: Option<String>,
}

impl ConnectionStyle {
    pub fn dashed() -> Self {
        Self { line_type: LineType::Dashed, ..Self::default() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A directed link between two shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub from: ShapeId,
    pub to: ShapeId,
    #[serde(default)]
    pub from_point: AnchorPoint,
    #[serde(default = "default_to_point")]
    pub to_point: AnchorPoint,
    #[serde(default)]
    pub style: ConnectionStyle,
}

fn default_to_point() -> AnchorPoint {
    AnchorPoint::Left
}

impl Connection {
    /// Check if this connection touches a specific shape
    pub fn is_connected_to(&self, shape_id: ShapeId) -> bool {
        self.from == shape_id || self.to == shape_id
    }
}

/// Partial connection accepted by [`crate::ShapeStore::add_connection`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDraft {
    pub from: ShapeId,
    pub to: ShapeId,
    pub from_point: AnchorPoint,
    pub to_point: AnchorPoint,
    pub style: ConnectionStyle,
}

impl ConnectionDraft {
    /// Right edge of `from` to left edge of `to`, solid with an end arrow
    pub fn new(from: ShapeId, to: ShapeId) -> Self {
        Self {
            from,
            to,
            from_point: AnchorPoint::Right,
            to_point: AnchorPoint::Left,
            style: ConnectionStyle::default(),
        }
    }

    pub fn with_anchors(mut self, from_point: AnchorPoint, to_point: AnchorPoint) -> Self {
        self.from_point = from_point;
        self.to_point = to_point;
        self
    }

    pub fn with_style(mut self, style: ConnectionStyle) -> Self {
        self.style = style;
        self
    }

    pub(crate) fn into_connection(self, id: ConnectionId) -> Connection {
        Connection {
            id,
            from: self.from,
            to: self.to,
            from_point: self.from_point,
            to_point: self.to_point,
            style: self.style,
        }
    }
}

/// Shallow patch for [`crate::ShapeStore::update_connection`]; endpoints are immutable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionPatch {
    pub from_point: Option<AnchorPoint>,
    pub to_point: Option<AnchorPoint>,
    pub style: Option<ConnectionStyle>,
}

impl ConnectionPatch {
    pub(crate) fn apply(self, connection: &mut Connection) {
        if let Some(point) = self.from_point {
            connection.from_point = point;
        }
        if let Some(point) = self.to_point {
            connection.to_point = point;
        }
        if let Some(style) = self.style {
            connection.style = style;
        }
    }
}
