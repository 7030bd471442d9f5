//! Connector geometry for rendering adapters
//!
//! Each visible connection is drawn as a cubic Bézier from its source anchor
//! to its target anchor. Control points leave each anchor along the edge's
//! outward normal so curves exit and enter shapes perpendicularly.

use flow_model::{AnchorPoint, Connection, ConnectionId, Point, ShapeStore};

/// Minimum distance between an anchor and its control point
const MIN_CONTROL_OFFSET: f32 = 40.0;

/// Resolved curve of one connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorPath {
    pub connection: ConnectionId,
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl ConnectorPath {
    /// SVG path data (`M … C …`)
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x,
            self.start.y,
            self.control1.x,
            self.control1.y,
            self.control2.x,
            self.control2.y,
            self.end.x,
            self.end.y
        )
    }

    /// Point halfway along the curve, where labels go
    pub fn midpoint(&self) -> Point {
        // B(0.5) = (P0 + 3 P1 + 3 P2 + P3) / 8
        Point::new(
            (self.start.x + 3.0 * self.control1.x + 3.0 * self.control2.x + self.end.x) / 8.0,
            (self.start.y + 3.0 * self.control1.y + 3.0 * self.control2.y + self.end.y) / 8.0,
        )
    }
}

fn control_point(anchor: AnchorPoint, at: Point, offset: f32) -> Point {
    let (nx, ny) = anchor.normal();
    Point::new(at.x + nx * offset, at.y + ny * offset)
}

/// Curve for `connection`, or `None` when an endpoint is missing or hidden
pub fn connector_path(store: &ShapeStore, connection: &Connection) -> Option<ConnectorPath> {
    let from = store.get_shape(connection.from).filter(|s| s.is_visible())?;
    let to = store.get_shape(connection.to).filter(|s| s.is_visible())?;

    let start = connection.from_point.position_on(&from.rect());
    let end = connection.to_point.position_on(&to.rect());
    let offset = (start.distance(end) / 2.0).max(MIN_CONTROL_OFFSET);

    Some(ConnectorPath {
        connection: connection.id,
        start,
        control1: control_point(connection.from_point, start, offset),
        control2: control_point(connection.to_point, end, offset),
        end,
    })
}

/// Curves for every drawable connection, in connection order
pub fn connector_paths(store: &ShapeStore) -> Vec<ConnectorPath> {
    store
        .get_connections()
        .iter()
        .filter_map(|c| connector_path(store, c))
        .collect()
}
