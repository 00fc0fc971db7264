//! Crate-level error type
//!
//! Every leaf error converts into [`Error`] so builder and view operations
//! that can fail in more than one way return a single `Result`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::notation::{FormatError, ValidationError};
use crate::schema::SchemaError;
use crate::transaction::ResolutionError;

/// Result type for fallible crate operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed version text
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Unknown table/column or incompatible version binding
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Value shape rejected before the operation was queued
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Result list inconsistent with the operation list
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Invalid builder configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Short category name, logged as the `kind` field of rejections
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Format(_) => "format",
            Error::Schema(_) => "schema",
            Error::Validation(_) => "validation",
            Error::Resolution(_) => "resolution",
            Error::Config(_) => "config",
        }
    }

    /// Resolution errors invalidate the whole transaction
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Resolution(_))
    }
}
