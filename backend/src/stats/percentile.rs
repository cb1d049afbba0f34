//! Top and bottom percentile slices.
//!
//! The top slice is the highest salaries. The bottom slice is, by default,
//! the last rows of the table in table order; [`BottomSelection::Lowest`]
//! selects the lowest salaries instead.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::Respondent;

use super::{salaries, SummaryStatistic};

/// How the bottom slice is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BottomSelection {
    /// Last rows of the table, in table order.
    #[default]
    Tail,
    /// Rows with the smallest salaries.
    Lowest,
}

impl std::str::FromStr for BottomSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tail" => Ok(Self::Tail),
            "lowest" => Ok(Self::Lowest),
            other => Err(format!("expected 'tail' or 'lowest', got '{}'", other)),
        }
    }
}

/// A selected subset of respondents and the summary of their salaries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileSlice {
    pub label: String,
    pub fraction: f64,
    pub rows: Vec<Respondent>,
    pub summary: SummaryStatistic,
}

impl PercentileSlice {
    fn new(label: String, fraction: f64, rows: Vec<Respondent>) -> AnalysisResult<Self> {
        let summary = SummaryStatistic::from_values(label.clone(), &salaries(&rows))?;
        Ok(Self {
            label,
            fraction,
            rows,
            summary,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Number of rows a fraction selects: `round(n * fraction)`, half away from zero.
pub fn selection_count(n: usize, fraction: f64) -> AnalysisResult<usize> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(AnalysisError::InvalidFraction(fraction));
    }

    let count = (n as f64 * fraction).round() as usize;
    if count == 0 {
        return Err(AnalysisError::EmptyDataset(format!(
            "{}% of {} rows selects no rows",
            percent(fraction),
            n
        )));
    }
    Ok(count)
}

/// The `round(n * fraction)` highest salaries; ties keep table order.
pub fn top_percentile(respondents: &[Respondent], fraction: f64) -> AnalysisResult<PercentileSlice> {
    let count = selection_count(respondents.len(), fraction)?;

    let mut ordered: Vec<&Respondent> = respondents.iter().collect();
    ordered.sort_by(|a, b| b.salary.total_cmp(&a.salary));

    let rows = ordered.into_iter().take(count).cloned().collect();
    PercentileSlice::new(format!("Top {}%", percent(fraction)), fraction, rows)
}

/// The bottom `round(n * fraction)` rows, chosen per `selection`.
pub fn bottom_percentile(
    respondents: &[Respondent],
    fraction: f64,
    selection: BottomSelection,
) -> AnalysisResult<PercentileSlice> {
    let count = selection_count(respondents.len(), fraction)?;

    let rows: Vec<Respondent> = match selection {
        BottomSelection::Tail => respondents[respondents.len() - count..].to_vec(),
        BottomSelection::Lowest => {
            let mut ordered: Vec<&Respondent> = respondents.iter().collect();
            ordered.sort_by(|a, b| a.salary.total_cmp(&b.salary));
            ordered.into_iter().take(count).cloned().collect()
        }
    };

    PercentileSlice::new(format!("Bottom {}%", percent(fraction)), fraction, rows)
}

fn percent(fraction: f64) -> f64 {
    (fraction * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::{ascending, respondent};

    #[test]
    fn test_selection_count_rounds() {
        assert_eq!(selection_count(100, 0.01).unwrap(), 1);
        assert_eq!(selection_count(100, 0.10).unwrap(), 10);
        assert_eq!(selection_count(15, 0.10).unwrap(), 2);
        assert_eq!(selection_count(25, 0.10).unwrap(), 3);
        assert_eq!(selection_count(7, 1.0).unwrap(), 7);
    }

    #[test]
    fn test_selection_count_zero_is_empty_dataset() {
        assert!(matches!(selection_count(0, 0.5), Err(AnalysisError::EmptyDataset(_))));
        assert!(matches!(selection_count(49, 0.01), Err(AnalysisError::EmptyDataset(_))));
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(matches!(selection_count(10, 0.0), Err(AnalysisError::InvalidFraction(_))));
        assert!(matches!(selection_count(10, 1.5), Err(AnalysisError::InvalidFraction(_))));
        assert!(matches!(
            selection_count(10, f64::NAN),
            Err(AnalysisError::InvalidFraction(_))
        ));
    }

    #[test]
    fn test_top_length_matches_fraction() {
        for n in [10usize, 37, 100, 251] {
            let respondents = ascending(n);
            for fraction in [0.1, 0.25, 0.5, 0.9] {
                let slice = top_percentile(&respondents, fraction).unwrap();
                assert_eq!(slice.len(), (n as f64 * fraction).round() as usize);
            }
        }
    }

    #[test]
    fn test_top_selects_highest_salaries() {
        let respondents = ascending(100);
        let slice = top_percentile(&respondents, 0.05).unwrap();

        let picked: Vec<f64> = slice.rows.iter().map(|r| r.salary).collect();
        assert_eq!(picked, vec![100.0, 99.0, 98.0, 97.0, 96.0]);
        assert_eq!(slice.label, "Top 5%");
        assert_eq!(slice.summary.min, 96.0);
        assert_eq!(slice.summary.median, 98.0);
    }

    #[test]
    fn test_top_ties_keep_table_order() {
        let respondents = vec![
            respondent("software", 10.0),
            respondent("databases", 20.0),
            respondent("safety", 20.0),
            respondent("other", 5.0),
        ];
        let slice = top_percentile(&respondents, 0.5).unwrap();
        let picked: Vec<&str> = slice.rows.iter().map(|r| r.expertise.label()).collect();
        assert_eq!(picked, vec!["databases", "safety"]);
    }

    #[test]
    fn test_bottom_is_tail_rows_not_lowest_salaries() {
        let respondents = ascending(100);
        let slice = bottom_percentile(&respondents, 0.10, BottomSelection::Tail).unwrap();

        let picked: Vec<f64> = slice.rows.iter().map(|r| r.salary).collect();
        let expected: Vec<f64> = (91..=100).map(|i| i as f64).collect();
        assert_eq!(picked, expected);
        assert_eq!(slice.label, "Bottom 10%");
    }

    #[test]
    fn test_bottom_lowest_selection() {
        let respondents = ascending(100);
        let slice = bottom_percentile(&respondents, 0.10, BottomSelection::Lowest).unwrap();

        let picked: Vec<f64> = slice.rows.iter().map(|r| r.salary).collect();
        let expected: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(top_percentile(&[], 0.01), Err(AnalysisError::EmptyDataset(_))));
        assert!(matches!(
            bottom_percentile(&[], 0.10, BottomSelection::Tail),
            Err(AnalysisError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_bottom_selection_from_str() {
        assert_eq!("tail".parse::<BottomSelection>().unwrap(), BottomSelection::Tail);
        assert_eq!(" Lowest ".parse::<BottomSelection>().unwrap(), BottomSelection::Lowest);
        assert!("smallest".parse::<BottomSelection>().is_err());
    }
}
