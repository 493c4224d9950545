//! Export functionality for prescriptions.

mod prescription;

pub use prescription::*;

use thiserror::Error;

use crate::calculator::CalcError;
use crate::db::DbError;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Calculation error: {0}")]
    Calculation(#[from] CalcError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
