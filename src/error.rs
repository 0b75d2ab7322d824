//! Error types for trimcss configuration.
//!
//! Minification itself never fails: malformed input degrades to
//! [`Warning`]s. Errors only come from loading and validating options.

use thiserror::Error;

use crate::token::Position;

/// Errors that can occur while building a [`crate::Minifier`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Options parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid compatibility: {0}")]
    InvalidCompatibility(String),

    #[error("Invalid selector pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A shorthand value that cannot be split into its components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid property value `{value}` for `{name}`")]
pub struct BreakupError {
    pub name: String,
    pub value: String,
}

impl BreakupError {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A recoverable problem found while tokenizing or optimizing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Warning {
    pub message: String,
    pub position: Option<Position>,
}

impl Warning {
    pub fn new(message: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(position) => write!(f, "{} at {}", self.message, position),
            None => f.write_str(&self.message),
        }
    }
}
