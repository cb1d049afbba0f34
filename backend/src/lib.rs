//! # Salary Survey - canonicalization and summary statistics
//!
//! Turns a raw developer salary survey (Norwegian column names and answers,
//! salaries in NOK) into a canonical English table, then computes the
//! dashboard: top and bottom percentile summaries, median salary by
//! expertise, and chart series.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Transform  │────▶│    Stats    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (rename/NOK)│     │  + Report   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salary_survey::{analyze_file, AnalysisOptions, TextRenderer, Renderer, TranslationTables};
//! use std::path::Path;
//!
//! let outcome = analyze_file(
//!     Path::new("survey.csv"),
//!     &TranslationTables::norwegian(),
//!     &AnalysisOptions::default(),
//! )?;
//! println!("{}", TextRenderer::default().render(&outcome.report)?);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Table, categories and respondents
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Translation tables, canonicalization and pipeline
//! - [`stats`] - Percentile slices and group aggregates
//! - [`report`] - Charts and renderers
//! - [`validation`] - Canonical value validation
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Statistics
pub mod stats;

// Report
pub mod report;

// Validation
pub mod validation;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AnalysisError, ConfigError, CsvError, PipelineError, RenderError, SchemaError, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    columns, Categorical, Category, EmploymentType, Expertise, Gender, Respondent, Table,
};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file,
    parse_csv_file_auto, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    convert_amount, normalize_currency, rename_columns, translate_values, TranslationTables,
    NOK_CONVERSION_RATE,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    analyze_bytes, analyze_file, analyze_table, canonicalize, canonicalize_file,
    AnalysisOptions, AnalysisOutcome, CsvInfo,
};

// =============================================================================
// Re-exports - Statistics
// =============================================================================

pub use stats::{
    bottom_percentile, median_salary_by_expertise, top_percentile, BottomSelection,
    PercentileSlice, SummaryStatistic, SurveySummary,
};

// =============================================================================
// Re-exports - Report
// =============================================================================

pub use report::{ChartKind, ChartRequest, JsonRenderer, Renderer, Report, TextRenderer};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{canonical_schema, is_valid, validate, validate_canonical_table};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, AnalysisResponse, CsvMetadata, ResponseMetadata};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
