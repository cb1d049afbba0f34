//! Dashboard report: the canonical table, chart series and summary lines.
//!
//! - [`charts`] - Chart requests and computed series
//! - [`render`] - Text and JSON renderers

pub mod charts;
pub mod render;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Respondent, Table};
use crate::stats::SurveySummary;

pub use charts::{default_dashboard, Aggregate, Chart, ChartKind, ChartPoint, ChartRequest};
pub use render::{JsonRenderer, Renderer, TextRenderer};

/// Everything the dashboard displays for one survey run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub title: String,
    /// Full canonical table
    pub table: Table,
    pub summary: SurveySummary,
    pub charts: Vec<Chart>,
    /// Plain text lines shown under the charts
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
}

impl Report {
    /// Compute every requested chart and the summary lines.
    pub fn build(
        title: impl Into<String>,
        table: Table,
        respondents: &[Respondent],
        summary: SurveySummary,
        requests: &[ChartRequest],
        warnings: Vec<String>,
    ) -> Self {
        let charts = requests
            .iter()
            .map(|request| charts::compute(request, respondents))
            .collect();

        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            title: title.into(),
            table,
            lines: summary.lines(),
            summary,
            charts,
            warnings,
        }
    }
}
