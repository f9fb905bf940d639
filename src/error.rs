use std::io;

use thiserror::Error;

/// Fatal failures of a planning run. Input policy violations are not
/// errors; they are reported as diagnostics and processing continues.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("input file not found: {0}")]
    FileNotFound(String),
    #[error("unsupported input format '{0}', expected .xlsx, .xls or .csv")]
    UnsupportedFormat(String),
    #[error("failed to read workbook: {0}")]
    Excel(String),
    #[error("worksheet '{0}' not found")]
    SheetNotFound(String),
    #[error("header row {row} has no column named '{column}'")]
    MissingColumn { row: usize, column: String },
    #[error("input contains no data rows")]
    EmptyDataset,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
