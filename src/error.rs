use crate::validation::{ErrorKind, Severity, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

/// Échecs de lecture : la grille n'a pas pu être produite.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Unsupported file format: {0}. Please upload CSV, TSV, TXT, XLSX, XLS or ODS files.")]
    UnsupportedFormat(String),
    #[error("empty roster: {0}")]
    EmptyGrid(String),
    #[error("invalid settings: {0}")]
    Config(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl RosterError {
    /// Conversion à la frontière : un seul `ValidationError` de type `format`.
    pub fn to_validation_error(&self) -> ValidationError {
        ValidationError {
            kind: ErrorKind::Format,
            message: format!("Error parsing file: {self}"),
            day: None,
            doctor: None,
            severity: Severity::Error,
        }
    }
}
