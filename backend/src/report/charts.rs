//! Chart requests and the series computed for them.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::models::Respondent;
use crate::stats::group::{group_count, group_mean, group_median, Field};

/// Chart types understood by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Histogram,
    Density,
}

/// How values are combined per x group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Count,
    Mean,
    Median,
}

/// A chart to draw: its kind and the field(s) plotted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub title: String,
    pub x: Field,
    /// Aggregated field; `None` plots counts.
    #[serde(default)]
    pub y: Option<Field>,
    #[serde(default)]
    pub aggregate: Aggregate,
    /// Histogram bins / density sample points.
    #[serde(default)]
    pub bins: Option<usize>,
}

impl ChartRequest {
    pub fn new(kind: ChartKind, title: impl Into<String>, x: Field) -> Self {
        Self {
            kind,
            title: title.into(),
            x,
            y: None,
            aggregate: Aggregate::Count,
            bins: None,
        }
    }

    pub fn with_y(mut self, y: Field, aggregate: Aggregate) -> Self {
        self.y = Some(y);
        self.aggregate = aggregate;
        self
    }

    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Reject requests that aggregate or bin a non-numeric field.
    pub fn check(&self) -> ConfigResult<()> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: format!("charts.{}", self.title),
            message,
        };

        match self.kind {
            ChartKind::Histogram | ChartKind::Density if !self.x.is_numeric() => Err(invalid(
                format!("x '{}' is not numeric", self.x.column()),
            )),
            ChartKind::Bar | ChartKind::Line => match (self.y, self.aggregate) {
                (Some(y), Aggregate::Mean | Aggregate::Median) if !y.is_numeric() => Err(
                    invalid(format!("y '{}' is not numeric", y.column())),
                ),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

/// One point of a series: category label (or bin), optional numeric x, value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    pub value: f64,
}

/// A chart request with its computed series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(flatten)]
    pub request: ChartRequest,
    pub points: Vec<ChartPoint>,
}

const DEFAULT_BINS: usize = 20;
const DENSITY_POINTS: usize = 50;

/// The charts of the salary dashboard.
pub fn default_dashboard(bins: usize) -> Vec<ChartRequest> {
    vec![
        ChartRequest::new(ChartKind::Histogram, "Salary distribution", Field::Salary)
            .with_bins(bins),
        ChartRequest::new(ChartKind::Density, "Salary density", Field::Salary),
        ChartRequest::new(ChartKind::Bar, "Median salary by expertise", Field::Expertise)
            .with_y(Field::Salary, Aggregate::Median),
        ChartRequest::new(
            ChartKind::Bar,
            "Median salary by employment type",
            Field::EmploymentType,
        )
        .with_y(Field::Salary, Aggregate::Median),
        ChartRequest::new(ChartKind::Bar, "Median salary by gender", Field::Gender)
            .with_y(Field::Salary, Aggregate::Median),
        ChartRequest::new(ChartKind::Bar, "Median salary by education", Field::Education)
            .with_y(Field::Salary, Aggregate::Median),
        ChartRequest::new(
            ChartKind::Line,
            "Mean salary by years of experience",
            Field::YearsOfExperience,
        )
        .with_y(Field::Salary, Aggregate::Mean),
        ChartRequest::new(ChartKind::Bar, "Respondents with bonus", Field::Bonus),
    ]
}

/// Compute the series for one request.
pub fn compute(request: &ChartRequest, respondents: &[Respondent]) -> Chart {
    let points = match request.kind {
        ChartKind::Histogram => histogram(
            &numeric_values(respondents, request.x),
            request.bins.unwrap_or(DEFAULT_BINS),
        ),
        ChartKind::Density => density(
            &numeric_values(respondents, request.x),
            request.bins.unwrap_or(DENSITY_POINTS),
        ),
        ChartKind::Bar | ChartKind::Line => grouped(request, respondents),
    };

    Chart {
        request: request.clone(),
        points,
    }
}

fn numeric_values(respondents: &[Respondent], field: Field) -> Vec<f64> {
    respondents.iter().filter_map(|r| field.numeric(r)).collect()
}

fn grouped(request: &ChartRequest, respondents: &[Respondent]) -> Vec<ChartPoint> {
    let values = match (request.y, request.aggregate) {
        (Some(y), Aggregate::Median) => group_median(respondents, request.x, y),
        (Some(y), Aggregate::Mean) => group_mean(respondents, request.x, y),
        (None, _) | (Some(_), Aggregate::Count) => group_count(respondents, request.x)
            .into_iter()
            .map(|(k, n)| (k, n as f64))
            .collect(),
    };

    let mut points: Vec<ChartPoint> = values
        .into_iter()
        .map(|(label, value)| ChartPoint {
            x: if request.x.is_numeric() { label.parse().ok() } else { None },
            label,
            value,
        })
        .collect();

    if request.x.is_numeric() {
        points.sort_by(|a, b| {
            a.x.unwrap_or(f64::NAN).total_cmp(&b.x.unwrap_or(f64::NAN))
        });
    }
    points
}

/// Equal-width histogram over `[min, max]`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<ChartPoint> {
    let Some((min, max)) = bounds(values) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    if min == max {
        return vec![ChartPoint {
            label: format_range(min, max),
            x: Some(min),
            value: values.len() as f64,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + width * i as f64;
            let hi = lo + width;
            ChartPoint {
                label: format_range(lo, hi),
                x: Some((lo + hi) / 2.0),
                value: count as f64,
            }
        })
        .collect()
}

/// Gaussian kernel density estimate sampled at `points` evenly spaced x values.
///
/// Bandwidth follows Silverman's rule of thumb.
pub fn density(values: &[f64], points: usize) -> Vec<ChartPoint> {
    let Some((min, max)) = bounds(values) else {
        return Vec::new();
    };
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let bandwidth = if std_dev > 0.0 {
        1.06 * std_dev * n.powf(-0.2)
    } else {
        1.0
    };

    let points = points.max(2);
    let lo = min - 3.0 * bandwidth;
    let hi = max + 3.0 * bandwidth;
    let step = (hi - lo) / (points - 1) as f64;
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    (0..points)
        .map(|i| {
            let x = lo + step * i as f64;
            let value = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            ChartPoint {
                label: format!("{:.0}", x),
                x: Some(x),
                value,
            }
        })
        .collect()
}

fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max))
}

fn format_range(lo: f64, hi: f64) -> String {
    format!("{:.0}-{:.0}", lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::fixtures::{ascending, respondent};

    #[test]
    fn test_histogram_counts_every_value() {
        let values: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let points = histogram(&values, 10);

        assert_eq!(points.len(), 10);
        assert_eq!(points.iter().map(|p| p.value).sum::<f64>(), 100.0);
        assert_eq!(points[9].value, 10.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let points = histogram(&[5.0, 5.0], 10);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].value, 2.0);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn test_density_integrates_to_about_one() {
        let values: Vec<f64> = (1..=50).map(|i| i as f64).collect();
        let points = density(&values, 200);

        let step = points[1].x.unwrap() - points[0].x.unwrap();
        let area: f64 = points.iter().map(|p| p.value * step).sum();
        assert!((area - 1.0).abs() < 0.02, "area was {}", area);
    }

    #[test]
    fn test_bar_median_by_expertise() {
        let respondents = vec![
            respondent("software", 100.0),
            respondent("software", 300.0),
            respondent("databases", 200.0),
        ];
        let request = ChartRequest::new(ChartKind::Bar, "m", Field::Expertise)
            .with_y(Field::Salary, Aggregate::Median);
        let chart = compute(&request, &respondents);

        assert_eq!(chart.points.len(), 2);
        assert_eq!(chart.points[0].label, "databases");
        assert_eq!(chart.points[1].value, 200.0);
        assert!(chart.points[0].x.is_none());
    }

    #[test]
    fn test_bar_aggregates_requested_field() {
        let mut junior = respondent("software", 1000.0);
        junior.years_of_experience = 2.0;
        let mut senior = respondent("software", 3000.0);
        senior.years_of_experience = 4.0;
        let request = ChartRequest::new(ChartKind::Bar, "Experience", Field::Expertise)
            .with_y(Field::YearsOfExperience, Aggregate::Mean);

        let chart = compute(&request, &[junior, senior]);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].label, "software");
        assert_eq!(chart.points[0].value, 3.0);
    }

    #[test]
    fn test_check_rejects_non_numeric_fields() {
        let by_gender = ChartRequest::new(ChartKind::Bar, "g", Field::Expertise)
            .with_y(Field::Gender, Aggregate::Median);
        assert!(matches!(
            by_gender.check(),
            Err(ConfigError::InvalidValue { ref message, .. }) if message.contains("gender")
        ));
        assert!(compute(&by_gender, &[respondent("software", 1.0)]).points.is_empty());

        let histogram = ChartRequest::new(ChartKind::Histogram, "h", Field::Region);
        assert!(histogram.check().is_err());

        let counted = ChartRequest::new(ChartKind::Bar, "c", Field::Expertise)
            .with_y(Field::Gender, Aggregate::Count);
        assert!(counted.check().is_ok());
        assert!(default_dashboard(20).iter().all(|c| c.check().is_ok()));
    }

    #[test]
    fn test_line_sorted_numerically() {
        let mut respondents = Vec::new();
        for (years, salary) in [(10.0, 900.0), (2.0, 300.0), (1.0, 100.0)] {
            let mut r = respondent("software", salary);
            r.years_of_experience = years;
            respondents.push(r);
        }
        let request = ChartRequest::new(ChartKind::Line, "l", Field::YearsOfExperience)
            .with_y(Field::Salary, Aggregate::Mean);
        let chart = compute(&request, &respondents);

        let xs: Vec<f64> = chart.points.iter().map(|p| p.x.unwrap()).collect();
        assert_eq!(xs, vec![1.0, 2.0, 10.0]);
    }

    #[test]
    fn test_default_dashboard() {
        let charts = default_dashboard(20);
        assert_eq!(charts.len(), 8);
        assert!(charts.iter().any(|c| c.kind == ChartKind::Density));

        let respondents = ascending(40);
        for request in &charts {
            let chart = compute(request, &respondents);
            assert!(!chart.points.is_empty(), "{} has no points", request.title);
        }
    }

    #[test]
    fn test_chart_request_from_json() {
        let request: ChartRequest = serde_json::from_value(serde_json::json!({
            "kind": "bar",
            "title": "By region",
            "x": "region of residence",
            "y": "salary",
            "aggregate": "median"
        }))
        .unwrap();
        assert_eq!(request.x, Field::Region);
        assert_eq!(request.aggregate, Aggregate::Median);
    }
}
