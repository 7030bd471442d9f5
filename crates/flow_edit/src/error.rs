//! Error types for the flowchart editing layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowEditError {
    #[error("Flowchart model error: {0}")]
    Model(#[from] flow_model::FlowModelError),

    #[error("Invalid settings: {0}")]
    Settings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlowEditError>;
