//! Automation rules for the NexHome hub
//!
//! Provides the rule data model and an in-memory editor for user-defined
//! condition/action pairs bound to devices. Rules are definitions only;
//! the hub never evaluates them against live device state.

pub mod editor;
pub mod error;
pub mod model;

pub use editor::{AutomationEditor, EditorEvent};
pub use error::AutomationError;
pub use model::*;
