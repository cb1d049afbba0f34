//! Error types for the salary survey pipeline.
//!
//! - [`CsvError`] - CSV reading and decoding errors
//! - [`SchemaError`] - Input table does not have the expected columns
//! - [`AnalysisError`] - Transformation and statistics errors
//! - [`ConfigError`] - Options and translation table loading errors
//! - [`RenderError`] - Report rendering errors
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Invalid CSV format at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(0);
        CsvError::ParseError {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Schema Errors
// =============================================================================

/// The input table does not match the survey layout.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A required column is absent from the header.
    #[error("Missing required column: '{0}'")]
    MissingColumn(String),

    /// A column would appear twice after renaming.
    #[error("Column '{from}' cannot be renamed: '{to}' already exists")]
    DuplicateColumn { from: String, to: String },
}

// =============================================================================
// Analysis Errors
// =============================================================================

/// Errors while transforming or summarizing the survey.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A selection or statistic was requested over zero rows.
    #[error("Cannot compute statistics over an empty dataset ({0})")]
    EmptyDataset(String),

    /// Percentile fraction outside (0, 1].
    #[error("Fraction must be in (0, 1], got {0}")]
    InvalidFraction(f64),

    /// A numeric cell could not be parsed.
    #[error("Row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    /// Schema problem discovered while reading typed rows.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors loading analysis options or translation tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error.
    #[error("Config IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("Config JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid value in options or environment.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors while rendering a report.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON render error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Text render error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline::analyze_file`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Schema error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Render error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
