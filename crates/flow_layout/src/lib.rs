//! Flow Layout - Spatial rules of the flowchart
//!
//! This crate decides which shape contains which ([`ContainmentResolver`]),
//! keeps group boxes and sibling spacing consistent ([`LayoutEngine`]) and
//! computes the curves adapters draw for connections ([`connector`]).
//! Every operation works on a caller-owned [`flow_model::ShapeStore`].

mod config;
mod layout;
mod containment;
pub mod connector;

pub use config::*;
pub use layout::*;
pub use containment::*;
pub use connector::{connector_path, connector_paths, ConnectorPath};
