//! Custom error types for the Sentinel-X analyzer.
//!
//! Provides a structured error hierarchy so parse, analysis, and report
//! failures carry enough context to be reported per file or per column.

use std::path::PathBuf;

use crate::anomaly::AnomalyError;

/// The main error type for Sentinel-X operations.
#[derive(Debug, thiserror::Error)]
pub enum SentinelError {
    /// I/O error (file read/write, permissions, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// CSV parse error for a specific input file
    #[error("Failed to parse CSV file '{name}': {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },

    /// Spreadsheet parse error for a specific input file
    #[error("Failed to parse spreadsheet '{name}': {message}")]
    Spreadsheet { name: String, message: String },

    /// JSON parse error for a specific input file
    #[error("Failed to parse JSON file '{name}': {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Input file extension not recognized as CSV, spreadsheet, or JSON
    #[error("Unsupported input format: '{name}' (expected .csv, .xlsx, .xls, .ods, or .json)")]
    UnsupportedFormat { name: String },

    /// Input file parsed but contained no usable rows or columns
    #[error("Input '{name}' contains no tabular data")]
    EmptyInput { name: String },

    /// Column name collision while building a dataset
    #[error("Duplicate column name '{name}' in dataset")]
    DuplicateColumn { name: String },

    /// Column length does not match the dataset's row count
    #[error("Column '{name}' has {actual} values, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Requested column does not exist in the dataset
    #[error("Column '{name}' not found in dataset")]
    ColumnNotFound { name: String },

    /// Requested column exists but is not numeric
    #[error("Column '{name}' is not numeric")]
    ColumnNotNumeric { name: String },

    /// Anomaly detection could not be applied to the selected column
    #[error("Anomaly detection not applicable for column '{column}': {source}")]
    Anomaly {
        column: String,
        #[source]
        source: AnomalyError,
    },

    /// No files selected (or every selected file failed to parse)
    #[error("No input data selected; nothing to analyze")]
    EmptySelection,

    /// Chart rendering error
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    /// No usable font family found for PDF rendering
    #[error("No suitable fonts found for PDF rendering (searched: {searched})")]
    FontDiscovery { searched: String },

    /// PDF rendering error
    #[error("Report rendering failed: {0}")]
    Render(String),

    /// Generic error for external library failures
    #[error("{context}: {message}")]
    External { context: String, message: String },
}

/// Result type alias using SentinelError
pub type SentinelResult<T> = Result<T, SentinelError>;

impl SentinelError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a CSV error with file-name context
    pub fn csv(name: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            name: name.into(),
            source,
        }
    }

    /// Create a spreadsheet error with file-name context
    pub fn spreadsheet(name: impl Into<String>, message: impl ToString) -> Self {
        Self::Spreadsheet {
            name: name.into(),
            message: message.to_string(),
        }
    }

    /// Create a JSON error with file-name context
    pub fn json(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            name: name.into(),
            source,
        }
    }

    /// Create an anomaly error with column context
    pub fn anomaly(column: impl Into<String>, source: AnomalyError) -> Self {
        Self::Anomaly {
            column: column.into(),
            source,
        }
    }

    /// Create a chart rendering error
    pub fn chart(message: impl ToString) -> Self {
        Self::Chart(message.to_string())
    }

    /// Create a PDF rendering error
    pub fn render(message: impl ToString) -> Self {
        Self::Render(message.to_string())
    }

    /// Create an external error with context
    pub fn external(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::External {
            context: context.into(),
            message: message.into(),
        }
    }

    /// True when the error means "blocked, nothing to do" rather than a fault.
    pub fn is_blocked_state(&self) -> bool {
        matches!(self, Self::EmptySelection)
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for SentinelError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
