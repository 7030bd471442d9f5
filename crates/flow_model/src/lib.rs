//! Flow Model - Scene graph for the outline-linked flowchart
//!
//! This crate owns the data side of the flowchart: shapes, the connections
//! between them, and the [`ShapeStore`] that keeps parent/child links
//! consistent. Layout and interaction live in `flow_layout` and `flow_edit`;
//! nothing here knows about rendering.

mod id;
mod error;
pub mod geometry;
pub mod color;
mod shape;
mod connection;
mod store;
pub mod snapshot;

pub use id::*;
pub use error::*;
pub use geometry::*;
pub use color::*;
pub use shape::*;
pub use connection::*;
pub use store::*;
pub use snapshot::Snapshot;
