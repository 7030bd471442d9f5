//! Flow Edit - Editing surface of the outline-linked flowchart
//!
//! Pointer gestures ([`InteractionController`]), heading reconciliation
//! ([`OutlineSync`]), settings, and the [`Flowchart`] facade that owns one
//! independent flowchart instance.

mod error;
mod settings;
mod outline_sync;
mod interaction;
mod flowchart;

pub use error::*;
pub use settings::*;
pub use outline_sync::*;
pub use interaction::*;
pub use flowchart::*;
