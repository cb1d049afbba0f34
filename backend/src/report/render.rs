//! Report renderers.
//!
//! [`TextRenderer`] draws a terminal dashboard (table preview, ASCII bar
//! charts, summary lines). [`JsonRenderer`] emits the report as JSON for the
//! HTTP API and for external plotting.

use std::fmt::Write as _;

use crate::error::RenderResult;
use crate::models::{cell_text, Table};

use super::{Chart, ChartKind, Report};

/// Turns a [`Report`] into displayable output.
pub trait Renderer {
    fn render(&self, report: &Report) -> RenderResult<String>;
}

// =============================================================================
// Text
// =============================================================================

/// Plain-text dashboard.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Table rows shown before the charts
    pub preview_rows: usize,
    /// Width of the longest bar
    pub bar_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            bar_width: 40,
        }
    }
}

impl TextRenderer {
    pub fn new(preview_rows: usize) -> Self {
        Self {
            preview_rows,
            ..Self::default()
        }
    }

    fn write_table(&self, out: &mut String, table: &Table) -> std::fmt::Result {
        let preview = table.head(self.preview_rows);
        writeln!(
            out,
            "Table: {} rows, {} columns (showing {})",
            table.len(),
            table.headers.len(),
            preview.len()
        )?;

        let cells: Vec<Vec<String>> = preview
            .rows
            .iter()
            .map(|row| row.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
            .collect();

        let widths: Vec<usize> = preview
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |values: &[String]| {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = w))
                .collect::<Vec<_>>()
                .join(" | ")
        };

        writeln!(out, "{}", line(&preview.headers))?;
        writeln!(
            out,
            "{}",
            widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
        )?;
        for row in &cells {
            writeln!(out, "{}", line(row))?;
        }
        Ok(())
    }

    fn write_chart(&self, out: &mut String, chart: &Chart) -> std::fmt::Result {
        let kind = match chart.request.kind {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Histogram => "histogram",
            ChartKind::Density => "density",
        };
        writeln!(out, "--- {} ({}) ---", chart.request.title, kind)?;

        if chart.points.is_empty() {
            return writeln!(out, "  (no data)");
        }

        let max = chart.points.iter().map(|p| p.value).fold(0.0, f64::max);
        let label_width = chart
            .points
            .iter()
            .map(|p| p.label.chars().count())
            .max()
            .unwrap_or(0);

        for point in &chart.points {
            let len = if max > 0.0 {
                ((point.value / max) * self.bar_width as f64).round() as usize
            } else {
                0
            };
            writeln!(
                out,
                "  {:<lw$} {} {}",
                point.label,
                "█".repeat(len),
                format_value(point.value),
                lw = label_width
            )?;
        }
        Ok(())
    }
}

impl Renderer for TextRenderer {
    fn render(&self, report: &Report) -> RenderResult<String> {
        let mut out = String::new();
        let rule = "=".repeat(70);

        writeln!(out, "{}", rule)?;
        writeln!(out, "{}", report.title)?;
        writeln!(
            out,
            "Generated {} ({})",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.id
        )?;
        writeln!(out, "{}", rule)?;
        writeln!(out)?;

        self.write_table(&mut out, &report.table)?;

        for chart in &report.charts {
            writeln!(out)?;
            self.write_chart(&mut out, chart)?;
        }

        writeln!(out)?;
        for line in &report.lines {
            writeln!(out, "{}", line)?;
        }

        if !report.warnings.is_empty() {
            writeln!(out)?;
            writeln!(out, "Warnings:")?;
            for warning in &report.warnings {
                writeln!(out, "  {}", warning)?;
            }
        }

        Ok(out)
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else if value.abs() < 0.01 {
        format!("{:.3e}", value)
    } else {
        format!("{:.2}", value)
    }
}

// =============================================================================
// JSON
// =============================================================================

/// Report as JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, report: &Report) -> RenderResult<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}
