//! Error types for flowchart model operations
//!
//! Everyday scene-graph misuse (unknown ids, self-grouping) is reported with
//! `bool`/`Option` sentinels by the store itself. These errors cover the
//! fallible edges: JSON persistence and strict snapshot validation.

use crate::{ConnectionId, ShapeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowModelError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Duplicate shape id: {0}")]
    DuplicateShape(ShapeId),

    #[error("Connection {connection} references missing shape {shape}")]
    DanglingConnection {
        connection: ConnectionId,
        shape: ShapeId,
    },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

pub type Result<T> = std::result::Result<T, FlowModelError>;
