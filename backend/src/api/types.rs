//! REST API types.
//!
//! The analyze endpoint returns the canonical records together with the
//! summaries and chart series, so a client can draw the dashboard without
//! further computation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::report::Chart;
use crate::stats::SummaryStatistic;
use crate::transform::pipeline::AnalysisOutcome;

/// Response sent after a CSV upload has been analyzed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning" (values not translated), "error"
    pub status: String,

    /// Canonical table as JSON objects
    pub records: Vec<Value>,

    pub summary: SummaryResponse,

    pub charts: Vec<Chart>,

    pub warnings: Vec<String>,

    pub metadata: ResponseMetadata,
}

/// Percentile and group summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub top: SummaryStatistic,
    pub bottom: SummaryStatistic,
    pub median_by_expertise: BTreeMap<String, f64>,
    /// Text form of the summaries
    pub lines: Vec<String>,
}

/// Metadata about the run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub title: String,
    pub generated_at: String,
    pub respondents: usize,
    pub csv_info: CsvMetadata,
}

/// CSV file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let report = outcome.report;
        let csv_info = outcome.csv_info;

        AnalysisResponse {
            job_id: report.id.to_string(),
            status: if report.warnings.is_empty() { "ready" } else { "warning" }.to_string(),
            records: report.table.to_records(),
            summary: SummaryResponse {
                top: report.summary.top.summary,
                bottom: report.summary.bottom.summary,
                median_by_expertise: report.summary.median_by_expertise,
                lines: report.lines,
            },
            charts: report.charts,
            warnings: report.warnings,
            metadata: ResponseMetadata {
                title: report.title,
                generated_at: report.generated_at.to_rfc3339(),
                respondents: outcome.respondents.len(),
                csv_info: CsvMetadata {
                    encoding: csv_info.encoding,
                    delimiter: format_delimiter(csv_info.delimiter),
                    row_count: csv_info.row_count,
                    columns: csv_info.headers,
                },
            },
        }
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "records": [],
        "charts": [],
        "warnings": []
    })
}
