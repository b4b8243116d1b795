//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when the input has a bad shape (e.g. a period
//!   whose end is before its start).
//! - [`NotFound`] thrown when an item is not found for the caller.
//! - [`InUse`] thrown when an item cannot be deleted because other rows still
//!   reference it.
//! - [`Import`] thrown when one or more rows of an import are invalid.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`NotFound`]: EngineError::NotFound
//!  [`InUse`]: EngineError::InUse
//!  [`Import`]: EngineError::Import
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is still in use")]
    InUse(String),
    #[error("import rejected: {}", .0.join("; "))]
    Import(Vec<String>),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Prefix the message with what the caller was doing, keeping the error
    /// kind untouched.
    pub fn context(self, what: &str) -> Self {
        match self {
            Self::Validation(msg) => Self::Validation(format!("{what}: {msg}")),
            Self::NotFound(msg) => Self::NotFound(format!("{what}: {msg}")),
            Self::InUse(msg) => Self::InUse(format!("{what}: {msg}")),
            Self::Import(rows) => Self::Import(rows),
            Self::Database(err) => Self::Database(DbErr::Custom(format!("{what}: {err}"))),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InUse(a), Self::InUse(b)) => a == b,
            (Self::Import(a), Self::Import(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
