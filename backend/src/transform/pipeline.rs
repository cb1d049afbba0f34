//! High-level pipeline API: raw survey CSV to dashboard report.
//!
//! Stages run in a fixed order, each taking the table by value and
//! returning the next one:
//!
//! 1. Parse (encoding and delimiter auto-detection)
//! 2. Rename columns to canonical names
//! 3. Translate categorical values
//! 4. Convert salaries to the normalized currency
//! 5. Validate canonical values (warnings only)
//! 6. Percentile slices, group medians and chart series
//!
//! # Example
//!
//! ```rust,ignore
//! use salary_survey::transform::{analyze_file, AnalysisOptions, TranslationTables};
//! use std::path::Path;
//!
//! let outcome = analyze_file(
//!     Path::new("survey.csv"),
//!     &TranslationTables::norwegian(),
//!     &AnalysisOptions::default(),
//! )?;
//! for line in &outcome.report.lines {
//!     println!("{}", line);
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::api::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::error::{ConfigError, ConfigResult, PipelineResult};
use crate::models::{Respondent, Table};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::report::{default_dashboard, ChartRequest, Report};
use crate::stats::{BottomSelection, SurveySummary};
use crate::validation::validate_canonical_table;

use super::currency::normalize_currency;
use super::rename::{missing_columns, rename_columns};
use super::tables::TranslationTables;
use super::translate::{translate_values, untranslated_values};

pub const ENV_TOP_FRACTION: &str = "SURVEY_TOP_FRACTION";
pub const ENV_BOTTOM_FRACTION: &str = "SURVEY_BOTTOM_FRACTION";
pub const ENV_BOTTOM_SELECTION: &str = "SURVEY_BOTTOM_SELECTION";

/// Options for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Fraction of respondents in the top slice
    pub top_fraction: f64,

    /// Fraction of respondents in the bottom slice
    pub bottom_fraction: f64,

    /// Tail rows or lowest salaries
    pub bottom_selection: BottomSelection,

    /// Report unmapped categorical values as warnings
    pub validate: bool,

    /// Maximum number of validation warnings
    pub max_warnings: usize,

    /// Table rows shown by the text dashboard
    pub preview_rows: usize,

    /// Bins of the salary histogram
    pub histogram_bins: usize,

    /// Charts to compute; empty means the default dashboard
    pub charts: Vec<ChartRequest>,

    /// Report title
    pub title: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_fraction: 0.01,
            bottom_fraction: 0.10,
            bottom_selection: BottomSelection::Tail,
            validate: true,
            max_warnings: crate::validation::MAX_WARNINGS,
            preview_rows: 10,
            histogram_bins: 20,
            charts: Vec::new(),
            title: "Salary survey".to_string(),
        }
    }
}

impl AnalysisOptions {
    /// Load options from a JSON file; missing keys keep their defaults.
    ///
    /// Chart requests that aggregate or bin a non-numeric field are rejected.
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&content)?;
        for chart in &options.charts {
            chart.check()?;
        }
        Ok(options)
    }

    /// Apply `SURVEY_*` environment variables on top of these options.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_TOP_FRACTION) {
            self.top_fraction = parse_fraction(ENV_TOP_FRACTION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BOTTOM_FRACTION) {
            self.bottom_fraction = parse_fraction(ENV_BOTTOM_FRACTION, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BOTTOM_SELECTION) {
            self.bottom_selection = raw.parse().map_err(|message| ConfigError::InvalidValue {
                key: ENV_BOTTOM_SELECTION.to_string(),
                message,
            })?;
        }
        Ok(self)
    }

    /// Chart requests for this run.
    pub fn chart_requests(&self) -> Vec<ChartRequest> {
        if self.charts.is_empty() {
            default_dashboard(self.histogram_bins)
        } else {
            self.charts.clone()
        }
    }
}

fn parse_fraction(key: &str, raw: &str) -> ConfigResult<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}' is not a number", raw),
    })?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{} is outside (0, 1]", value),
        });
    }
    Ok(value)
}

/// CSV file information
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl CsvInfo {
    fn from_parsed(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.table.headers.clone(),
            row_count: parsed.table.len(),
        }
    }
}

/// Result of a complete analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub csv_info: CsvInfo,
    pub respondents: Vec<Respondent>,
    pub report: Report,
}

/// Rename, translate and convert a raw survey table.
///
/// Fails with a schema error naming the first missing source column, or with
/// an invalid-number error for a salary that cannot be read.
pub fn canonicalize(table: Table, tables: &TranslationTables) -> PipelineResult<Table> {
    let table = rename_columns(table, tables)?;
    let table = translate_values(table, tables);
    Ok(normalize_currency(table, &tables.currency)?)
}

/// Parse a CSV file and return its canonical table.
pub fn canonicalize_file(
    path: &Path,
    tables: &TranslationTables,
) -> PipelineResult<(CsvInfo, Table)> {
    let parsed = parse_csv_file_auto(path)?;
    log_csv_info(&parsed);
    let csv_info = CsvInfo::from_parsed(&parsed);
    let table = canonicalize_logged(parsed.table, tables)?;
    Ok((csv_info, table))
}

/// Analyze a survey CSV file.
pub fn analyze_file(
    path: &Path,
    tables: &TranslationTables,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome> {
    let parsed = parse_csv_file_auto(path)?;
    analyze_parsed(parsed, tables, options)
}

/// Analyze survey CSV bytes (HTTP uploads).
pub fn analyze_bytes(
    bytes: &[u8],
    tables: &TranslationTables,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome> {
    let parsed = parse_bytes_auto(bytes)?;
    analyze_parsed(parsed, tables, options)
}

/// Analyze an already-loaded raw table.
pub fn analyze_table(
    table: Table,
    tables: &TranslationTables,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome> {
    let parsed = ParseResult {
        table,
        encoding: "utf-8".to_string(),
        delimiter: ',',
    };
    analyze_parsed(parsed, tables, options)
}

fn analyze_parsed(
    parsed: ParseResult,
    tables: &TranslationTables,
    options: &AnalysisOptions,
) -> PipelineResult<AnalysisOutcome> {
    log_csv_info(&parsed);
    let csv_info = CsvInfo::from_parsed(&parsed);

    let table = canonicalize_logged(parsed.table, tables)?;

    let warnings = if options.validate {
        log_info("✔️  Validating canonical values...");
        let warnings = validate_canonical_table(&table, tables, options.max_warnings);
        if warnings.is_empty() {
            log_success("All values canonical");
        } else {
            log_warning(format!("{} validation warning(s)", warnings.len()));
        }
        warnings
    } else {
        log_info("(validation skipped)");
        Vec::new()
    };

    log_info("📊 Computing summaries...");
    let respondents = Respondent::from_table(&table)?;
    let summary = SurveySummary::compute(
        &respondents,
        options.top_fraction,
        options.bottom_fraction,
        options.bottom_selection,
    )?;
    log_success(summary.top.summary.describe());
    log_success(summary.bottom.summary.describe());
    log_success(format!(
        "Median salary for {} expertise groups",
        summary.median_by_expertise.len()
    ));

    let requests = options.chart_requests();
    log_info(format!("📈 Computing {} charts...", requests.len()));
    let report = Report::build(
        options.title.clone(),
        table,
        &respondents,
        summary,
        &requests,
        warnings,
    );

    Ok(AnalysisOutcome {
        csv_info,
        respondents,
        report,
    })
}

fn canonicalize_logged(table: Table, tables: &TranslationTables) -> PipelineResult<Table> {
    log_info("🔄 Renaming columns...");
    let missing = missing_columns(&table.headers, tables);
    if !missing.is_empty() {
        log_warning(format!("Missing columns: {}", missing.join(", ")));
    }
    for rename in &tables.columns {
        log_info_indent(format!("{} → {}", rename.from, rename.to), 1);
    }

    let table = canonicalize(table, tables)?;

    let untranslated = untranslated_values(&table, tables);
    if !untranslated.is_empty() {
        log_warning(format!("{} value(s) kept untranslated", untranslated.len()));
        for (column, value) in untranslated.iter().take(5) {
            log_info_indent(format!("{}: {}", column, value), 1);
        }
    }
    log_success(format!(
        "Canonical table: {} rows, salaries × {}",
        table.len(),
        tables.currency.rate
    ));
    Ok(table)
}

fn log_csv_info(parsed: &ParseResult) {
    log_info("📖 Reading CSV file...");
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parsed.delimiter)
    ));
    log_success(format!("Read {} rows", parsed.table.len()));
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, PipelineError, SchemaError};
    use crate::models::columns;
    use serde_json::json;

    const SURVEY_CSV: &str = "\
kjønn;utdanning;erfaring;arbeidssted;arbeidssituasjon;fag;lønn;bonus?
mann;4;5;Oslo;konsulent;sikkerhet;1000000;Ja
kvinne;5;10;Bergen;in-house, privat sektor;databaser;650000;Nei
";

    fn raw_table() -> Table {
        crate::parser::parse_str(SURVEY_CSV, ';').unwrap()
    }

    #[test]
    fn test_default_options() {
        let opts = AnalysisOptions::default();
        assert_eq!(opts.top_fraction, 0.01);
        assert_eq!(opts.bottom_fraction, 0.10);
        assert_eq!(opts.bottom_selection, BottomSelection::Tail);
        assert!(opts.validate);
        assert_eq!(opts.chart_requests().len(), 8);
    }

    #[test]
    fn test_canonical_row() {
        let table = canonicalize(raw_table(), &TranslationTables::norwegian()).unwrap();
        let records = table.to_records();

        assert_eq!(records[0]["salary"], json!(85706.42));
        assert_eq!(records[0]["gender"], json!("male"));
        assert_eq!(records[0]["education"], json!(4));
        assert_eq!(records[0]["expertise"], json!("safety"));
        assert_eq!(records[0]["employment type and sector"], json!("consultant"));
        assert_eq!(records[0]["bonus?"], json!("Yes"));
        assert_eq!(records[0]["years of experience"], json!(5));
        assert_eq!(records[0]["region of residence"], json!("Oslo"));
        assert_eq!(records[1]["salary"], json!(55709.17));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let mut table = raw_table();
        table.headers[6] = "inntekt".to_string();

        let err = canonicalize(table, &TranslationTables::norwegian()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Schema(SchemaError::MissingColumn(ref c)) if c == "lønn"
        ));
    }

    #[test]
    fn test_analyze_table() {
        let options = AnalysisOptions {
            top_fraction: 0.5,
            bottom_fraction: 0.5,
            ..AnalysisOptions::default()
        };
        let outcome = analyze_table(raw_table(), &TranslationTables::norwegian(), &options).unwrap();

        assert_eq!(outcome.respondents.len(), 2);
        assert_eq!(outcome.report.summary.top.rows[0].salary, 85706.42);
        assert_eq!(outcome.report.summary.bottom.rows[0].salary, 55709.17);
        assert_eq!(outcome.report.summary.median_by_expertise["databases"], 55709.17);
        assert!(outcome.report.warnings.is_empty());
        assert_eq!(outcome.csv_info.row_count, 2);
    }

    #[test]
    fn test_default_fraction_on_small_table_is_empty_dataset() {
        let err = analyze_table(
            raw_table(),
            &TranslationTables::norwegian(),
            &AnalysisOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Analysis(AnalysisError::EmptyDataset(_))));
    }

    #[test]
    fn test_unmapped_value_becomes_warning() {
        let csv = SURVEY_CSV.replace("databaser", "kvantedata");
        let table = crate::parser::parse_str(&csv, ';').unwrap();
        let options = AnalysisOptions {
            top_fraction: 0.5,
            bottom_fraction: 0.5,
            ..AnalysisOptions::default()
        };

        let outcome = analyze_table(table, &TranslationTables::norwegian(), &options).unwrap();
        assert_eq!(outcome.report.warnings.len(), 1);
        assert!(outcome.report.warnings[0].contains("kvantedata"));
        assert!(outcome.report.summary.median_by_expertise.contains_key("kvantedata"));
    }

    #[test]
    fn test_analyze_bytes_detects_delimiter() {
        let options = AnalysisOptions {
            top_fraction: 1.0,
            bottom_fraction: 1.0,
            ..AnalysisOptions::default()
        };
        let outcome =
            analyze_bytes(SURVEY_CSV.as_bytes(), &TranslationTables::norwegian(), &options).unwrap();
        assert_eq!(outcome.csv_info.delimiter, ';');
        assert_eq!(outcome.csv_info.headers[0], "kjønn");
        assert_eq!(outcome.report.table.headers[0], columns::GENDER);
    }

    #[test]
    fn test_env_overrides() {
        let options = AnalysisOptions::default()
            .with_overrides(|key| match key {
                ENV_TOP_FRACTION => Some("0.05".to_string()),
                ENV_BOTTOM_SELECTION => Some("lowest".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(options.top_fraction, 0.05);
        assert_eq!(options.bottom_fraction, 0.10);
        assert_eq!(options.bottom_selection, BottomSelection::Lowest);
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let err = AnalysisOptions::default()
            .with_overrides(|key| (key == ENV_BOTTOM_FRACTION).then(|| "2".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ENV_BOTTOM_FRACTION));
    }

    #[test]
    fn test_options_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "topFraction": 0.02, "bottomSelection": "lowest" }}"#).unwrap();

        let options = AnalysisOptions::from_json_file(file.path()).unwrap();
        assert_eq!(options.top_fraction, 0.02);
        assert_eq!(options.bottom_selection, BottomSelection::Lowest);
        assert_eq!(options.preview_rows, 10);
    }

    #[test]
    fn test_options_reject_non_numeric_chart_value() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "charts": [{{ "kind": "bar", "title": "Gender by expertise", "x": "expertise", "y": "gender", "aggregate": "median" }}] }}"#
        )
        .unwrap();

        let err = AnalysisOptions::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key.contains("Gender by expertise")));
    }
}
