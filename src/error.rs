//! Error type shared by loading, session navigation and export.

use thiserror::Error;

use crate::loader::REQUIRED_COLUMNS;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please fill all fields ({0} is empty).")]
    MissingField(&'static str),

    #[error(
        "CSV must contain columns: {}. Missing: {}",
        REQUIRED_COLUMNS.join(", "),
        .missing.join(", ")
    )]
    MissingColumns { missing: Vec<String> },

    #[error("Row {row}: cannot read {column} value {value:?}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Row {row}: unrecognized mode {value:?} (expected Normal, Intermediate or Fast)")]
    UnrecognizedMode { row: usize, value: String },

    #[error("Invalid setup: {0}")]
    InvalidShape(String),

    #[error("Entry grid does not match setup: {0}")]
    ShapeMismatch(String),

    #[error("Cannot {action} from the {screen} screen")]
    InvalidTransition {
        action: &'static str,
        screen: &'static str,
    },

    #[error("No data loaded. Enter subject details or upload a CSV first.")]
    NoData,

    #[error("Input closed")]
    InputClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse settings TOML: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
