//! Summary statistics over survey respondents.
//!
//! - [`percentile`] - Top and bottom slices of the table
//! - [`group`] - Per-category aggregates (median salary by expertise, ...)

pub mod group;
pub mod percentile;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::Respondent;

pub use group::{group_by, group_median, median_salary_by_expertise, Field};
pub use percentile::{
    bottom_percentile, selection_count, top_percentile, BottomSelection, PercentileSlice,
};

/// Label, count, min, max, mean and median of a set of salaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistic {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

impl SummaryStatistic {
    /// Summarize `values`; fails on an empty slice.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> AnalysisResult<Self> {
        let label = label.into();
        let median = median(values).ok_or_else(|| AnalysisError::EmptyDataset(label.clone()))?;

        Ok(Self {
            count: values.len(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: mean(values).unwrap_or(median),
            median,
            label,
        })
    }

    /// One-line text form used by the dashboard.
    pub fn describe(&self) -> String {
        format!(
            "{}: {} respondents, min {:.2}, max {:.2}, mean {:.2}, median {:.2}",
            self.label, self.count, self.min, self.max, self.mean, self.median
        )
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median, averaging the two middle values for even sizes.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Salaries of a set of respondents.
pub fn salaries(respondents: &[Respondent]) -> Vec<f64> {
    respondents.iter().map(|r| r.salary).collect()
}

/// The summaries shown under the dashboard charts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub top: PercentileSlice,
    pub bottom: PercentileSlice,
    pub median_by_expertise: BTreeMap<String, f64>,
}

impl SurveySummary {
    pub fn compute(
        respondents: &[Respondent],
        top_fraction: f64,
        bottom_fraction: f64,
        bottom_selection: BottomSelection,
    ) -> AnalysisResult<Self> {
        Ok(Self {
            top: top_percentile(respondents, top_fraction)?,
            bottom: bottom_percentile(respondents, bottom_fraction, bottom_selection)?,
            median_by_expertise: median_salary_by_expertise(respondents),
        })
    }

    /// Text lines for the report.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.top.summary.describe(), self.bottom.summary.describe()];
        lines.push("Median salary by expertise:".to_string());
        for (expertise, median) in &self.median_by_expertise {
            lines.push(format!("  {}: {:.2}", expertise, median));
        }
        lines
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{
        Bonus, Categorical, Category, EmploymentType, Expertise, Gender, Respondent,
    };

    pub fn respondent(expertise: &str, salary: f64) -> Respondent {
        Respondent {
            gender: Categorical::Known(Gender::Male),
            education: 4,
            years_of_experience: 5.0,
            region: "Oslo".to_string(),
            employment_type: Categorical::Known(EmploymentType::Consultant),
            expertise: Categorical::<Expertise>::from_canonical(expertise),
            salary,
            bonus: Categorical::Known(Bonus::No),
        }
    }

    /// Respondents with salaries `1..=n` in ascending row order.
    pub fn ascending(n: usize) -> Vec<Respondent> {
        (1..=n)
            .map(|i| respondent(Expertise::Software.label(), i as f64))
            .collect()
    }
}
