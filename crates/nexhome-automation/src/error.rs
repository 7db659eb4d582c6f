//! Error types for the automation editor

use thiserror::Error;

/// Errors that can occur in the automation editor
#[derive(Error, Debug)]
pub enum AutomationError {
    /// Automation not found
    #[error("Automation not found: {0}")]
    NotFound(String),

    /// The rule name was empty or whitespace
    #[error("Automation name must not be empty")]
    EmptyName,
}
