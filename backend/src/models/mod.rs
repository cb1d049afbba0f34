//! Domain models for the salary survey pipeline.
//!
//! - [`Table`] - Generic in-memory table (ordered headers, rows of JSON cells)
//! - [`Respondent`] - One typed row of the canonical table
//! - [`Categorical`] - A category value that is either known or passed through
//! - [`Gender`], [`EmploymentType`], [`Expertise`], [`Bonus`] - Survey categories

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{AnalysisError, AnalysisResult, SchemaError};

/// Canonical (English) column names.
pub mod columns {
    pub const GENDER: &str = "gender";
    pub const EDUCATION: &str = "education";
    pub const YEARS_OF_EXPERIENCE: &str = "years of experience";
    pub const REGION: &str = "region of residence";
    pub const EMPLOYMENT_TYPE: &str = "employment type and sector";
    pub const EXPERTISE: &str = "expertise";
    pub const SALARY: &str = "salary";
    pub const BONUS: &str = "bonus?";

    /// Every column a [`super::Respondent`] is read from.
    pub const ALL: [&str; 8] = [
        GENDER,
        EDUCATION,
        YEARS_OF_EXPERIENCE,
        REGION,
        EMPLOYMENT_TYPE,
        EXPERTISE,
        SALARY,
        BONUS,
    ];
}

// =============================================================================
// Table
// =============================================================================

/// An in-memory table: ordered column names and one cell vector per row.
///
/// Cells are strings as read from CSV, numbers once converted, and `null`
/// for empty values. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Create a table, padding short rows with `null` and truncating long ones.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Append a row (padded or truncated to the table width).
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.headers.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Index of a column that must exist.
    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    /// Cell at `row` in column `name`.
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Iterate over the cells of one column.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Rename a column in place. Returns `false` if `from` is not present.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.headers[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Rewrite every cell of one column, failing on the first error.
    ///
    /// The closure receives the row index and the current cell.
    pub fn map_column<F, E>(mut self, name: &str, mut f: F) -> Result<Self, E>
    where
        F: FnMut(usize, &Value) -> Result<Value, E>,
    {
        if let Some(idx) = self.column_index(name) {
            for (row_idx, row) in self.rows.iter_mut().enumerate() {
                row[idx] = f(row_idx, &row[idx])?;
            }
        }
        Ok(self)
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// The last `n` rows in table order.
    pub fn tail(&self, n: usize) -> Table {
        let start = self.rows.len().saturating_sub(n);
        Table {
            headers: self.headers.clone(),
            rows: self.rows[start..].to_vec(),
        }
    }

    /// Rows as JSON objects keyed by column name.
    pub fn to_records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect();
                Value::Object(obj)
            })
            .collect()
    }

    /// Build a table from JSON objects, using the first object's keys as headers.
    pub fn from_records(records: &[Value]) -> Self {
        let headers: Vec<String> = records
            .first()
            .and_then(|r| r.as_object())
            .map(|obj| obj.keys().cloned().collect())
            .unwrap_or_default();

        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }
}

// =============================================================================
// Cell helpers
// =============================================================================

static NUMBER_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+|kr\.?|nok").expect("valid number regex"));

/// Parse a human-written number: `"1 000 000"`, `"650000 kr"`, `"12,5"`,
/// `"650,000"`, `"1.000,50"`.
///
/// When both `,` and `.` appear, the last one is the decimal mark and the
/// other groups thousands. A lone comma followed by exactly three digits
/// groups thousands; any other lone comma or dot is the decimal mark.
/// Repeated separators must split the digits into groups of three.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = NUMBER_NOISE.replace_all(raw.trim(), "");
    if cleaned.is_empty() {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) => {
            let (thousands, decimal) = if comma > dot { ('.', ',') } else { (',', '.') };
            let (int_part, frac_part) = cleaned.split_at(comma.max(dot));
            if frac_part[1..].contains(decimal) || !is_grouped(int_part, thousands) {
                return None;
            }
            format!("{}.{}", int_part.replace(thousands, ""), &frac_part[1..])
        }
        (Some(_), None) => normalize_single_separator(&cleaned, ',')?,
        (None, Some(_)) => normalize_single_separator(&cleaned, '.')?,
        (None, None) => cleaned.into_owned(),
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn normalize_single_separator(s: &str, sep: char) -> Option<String> {
    let lone = s.matches(sep).count() == 1;
    if lone && sep == '.' {
        return Some(s.to_string());
    }
    if is_grouped(s, sep) {
        return Some(s.replace(sep, ""));
    }
    lone.then(|| s.replace(sep, "."))
}

/// `1,000,000`-style digit grouping: 1-3 leading digits (no leading zero),
/// then groups of 3.
fn is_grouped(s: &str, sep: char) -> bool {
    let all_digits = |g: &str| g.bytes().all(|b| b.is_ascii_digit());
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split(sep);
    let Some(head) = groups.next() else {
        return false;
    };
    (1..=3).contains(&head.len())
        && !head.starts_with('0')
        && all_digits(head)
        && groups.all(|g| g.len() == 3 && all_digits(g))
}

/// Text form of a cell (`None` for null/empty).
pub fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric form of a cell; `Ok(None)` for null/empty, `Err(())` if not a number.
pub(crate) fn cell_number(value: &Value) -> Result<Option<f64>, ()> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or(()),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_number(s).map(Some).ok_or(()),
        _ => Err(()),
    }
}

// =============================================================================
// Categories
// =============================================================================

/// A closed set of survey answers with a canonical English label and the
/// label used in the Norwegian source data.
pub trait Category: Sized + Copy + 'static {
    const ALL: &'static [Self];

    /// Canonical English label.
    fn label(&self) -> &'static str;

    /// Label in the source dataset.
    fn source_label(&self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

/// Respondent gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female, Self::Unspecified];

    fn label(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unspecified => "other / do not wish to specify",
        }
    }

    fn source_label(&self) -> &'static str {
        match self {
            Self::Male => "mann",
            Self::Female => "kvinne",
            Self::Unspecified => "annet / ønsker ikke oppgi",
        }
    }
}

/// Employment type and sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmploymentType {
    Freelance,
    InHousePublic,
    InHousePrivate,
    Consultant,
}

impl Category for EmploymentType {
    const ALL: &'static [Self] = &[
        Self::Freelance,
        Self::InHousePublic,
        Self::InHousePrivate,
        Self::Consultant,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Freelance => "freelance / self-employed",
            Self::InHousePublic => "in-house, public / municipal sector",
            Self::InHousePrivate => "in-house, private sector",
            Self::Consultant => "consultant",
        }
    }

    fn source_label(&self) -> &'static str {
        match self {
            Self::Freelance => "frilans / selvstendig",
            Self::InHousePublic => "in-house, offentlig / kommunal sektor",
            Self::InHousePrivate => "in-house, privat sektor",
            Self::Consultant => "konsulent",
        }
    }
}

/// Area of expertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expertise {
    AiMachineLearning,
    Other,
    Architecture,
    Automation,
    Databases,
    DevopsOperations,
    EmbeddedIotHardware,
    ManagementAdministrative,
    Software,
    Safety,
}

impl Category for Expertise {
    const ALL: &'static [Self] = &[
        Self::AiMachineLearning,
        Self::Other,
        Self::Architecture,
        Self::Automation,
        Self::Databases,
        Self::DevopsOperations,
        Self::EmbeddedIotHardware,
        Self::ManagementAdministrative,
        Self::Software,
        Self::Safety,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::AiMachineLearning => "AI / machine learning",
            Self::Other => "other",
            Self::Architecture => "architecture",
            Self::Automation => "automation",
            Self::Databases => "databases",
            Self::DevopsOperations => "devops / operations",
            Self::EmbeddedIotHardware => "embedded / IoT / hardware",
            Self::ManagementAdministrative => "management / administrative",
            Self::Software => "software",
            Self::Safety => "safety",
        }
    }

    fn source_label(&self) -> &'static str {
        match self {
            Self::AiMachineLearning => "AI / maskinlæring",
            Self::Other => "annet",
            Self::Architecture => "arkitektur",
            Self::Automation => "automatisering",
            Self::Databases => "databaser",
            Self::DevopsOperations => "devops / drift",
            Self::EmbeddedIotHardware => "embedded / IoT / maskinvare",
            Self::ManagementAdministrative => "ledelse / administrativt",
            Self::Software => "programvare",
            Self::Safety => "sikkerhet",
        }
    }
}

/// Answer to the bonus question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bonus {
    Yes,
    No,
}

impl Category for Bonus {
    const ALL: &'static [Self] = &[Self::Yes, Self::No];

    fn label(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    fn source_label(&self) -> &'static str {
        match self {
            Self::Yes => "Ja",
            Self::No => "Nei",
        }
    }
}

/// A category value after translation: either one of the known answers or
/// a value the translation tables did not cover, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Categorical<T> {
    Known(T),
    Unmapped(String),
}

impl<T: Category> Categorical<T> {
    pub fn from_canonical(label: &str) -> Self {
        T::from_label(label)
            .map(Categorical::Known)
            .unwrap_or_else(|| Categorical::Unmapped(label.to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            Categorical::Known(c) => c.label(),
            Categorical::Unmapped(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Categorical::Known(_))
    }
}

impl<T: Category> Serialize for Categorical<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// =============================================================================
// Respondent
// =============================================================================

/// One survey respondent, read from the canonical table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Respondent {
    pub gender: Categorical<Gender>,
    /// Education level code (4 = bachelor's, 5 = master's).
    pub education: i64,
    pub years_of_experience: f64,
    pub region: String,
    pub employment_type: Categorical<EmploymentType>,
    pub expertise: Categorical<Expertise>,
    /// Salary in the normalized currency unit.
    pub salary: f64,
    /// Unmapped answers stay their own group, like the other categories.
    pub bonus: Categorical<Bonus>,
}

impl Respondent {
    pub fn has_bonus(&self) -> bool {
        self.bonus == Categorical::Known(Bonus::Yes)
    }

    /// Read every row of a canonical table, failing on the first bad cell.
    pub fn from_table(table: &Table) -> AnalysisResult<Vec<Respondent>> {
        for name in columns::ALL {
            table.require_column(name)?;
        }

        (0..table.len())
            .map(|row| Self::from_row(table, row))
            .collect()
    }

    fn from_row(table: &Table, row: usize) -> AnalysisResult<Respondent> {
        let text = |name: &str| {
            table
                .get(row, name)
                .and_then(cell_text)
                .unwrap_or_default()
        };

        let years_of_experience = required_number(table, row, columns::YEARS_OF_EXPERIENCE)?;
        if years_of_experience < 0.0 {
            return Err(invalid_number(table, row, columns::YEARS_OF_EXPERIENCE));
        }

        Ok(Respondent {
            gender: Categorical::from_canonical(&text(columns::GENDER)),
            education: required_number(table, row, columns::EDUCATION)? as i64,
            years_of_experience,
            region: text(columns::REGION),
            employment_type: Categorical::from_canonical(&text(columns::EMPLOYMENT_TYPE)),
            expertise: Categorical::from_canonical(&text(columns::EXPERTISE)),
            salary: required_number(table, row, columns::SALARY)?,
            bonus: Categorical::from_canonical(&text(columns::BONUS)),
        })
    }
}

fn required_number(table: &Table, row: usize, name: &str) -> AnalysisResult<f64> {
    let cell = table.get(row, name).unwrap_or(&Value::Null);
    match cell_number(cell) {
        Ok(Some(v)) => Ok(v),
        _ => Err(invalid_number(table, row, name)),
    }
}

fn invalid_number(table: &Table, row: usize, name: &str) -> AnalysisError {
    AnalysisError::InvalidNumber {
        row: row + 1,
        column: name.to_string(),
        value: table
            .get(row, name)
            .and_then(cell_text)
            .unwrap_or_default(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canonical_table() -> Table {
        Table::from_rows(
            columns::ALL.iter().map(|c| c.to_string()).collect(),
            vec![vec![
                json!("male"),
                json!("4"),
                json!("5"),
                json!("Oslo"),
                json!("consultant"),
                json!("safety"),
                json!(85706.42),
                json!("Yes"),
            ]],
        )
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number("1000000"), Some(1_000_000.0));
        assert_eq!(parse_number("1 000 000"), Some(1_000_000.0));
        assert_eq!(parse_number("1\u{a0}000\u{a0}000"), Some(1_000_000.0));
        assert_eq!(parse_number("650000 kr"), Some(650_000.0));
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("mye"), None);
    }

    #[test]
    fn test_parse_number_thousands_separators() {
        assert_eq!(parse_number("650,000"), Some(650_000.0));
        assert_eq!(parse_number("650,000 kr"), Some(650_000.0));
        assert_eq!(parse_number("1.000,50"), Some(1000.5));
        assert_eq!(parse_number("1.000.000"), Some(1_000_000.0));
        assert_eq!(parse_number("1,000.50"), Some(1000.5));
        assert_eq!(parse_number("-1.250,75"), Some(-1250.75));
        assert_eq!(parse_number("12,50"), Some(12.5));
        assert_eq!(parse_number("0,500"), Some(0.5));
        assert_eq!(parse_number("0.085"), Some(0.085));
    }

    #[test]
    fn test_parse_number_rejects_ambiguous_grouping() {
        assert_eq!(parse_number("1,00,000"), None);
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("10.00,5"), None);
        assert_eq!(parse_number("1.000,5,0"), None);
    }

    #[test]
    fn test_respondent_unmapped_bonus() {
        let mut table = canonical_table();
        table.rows[0][7] = json!("Kanskje");
        let respondents = Respondent::from_table(&table).unwrap();
        assert_eq!(
            respondents[0].bonus,
            Categorical::Unmapped("Kanskje".to_string())
        );
        assert!(!respondents[0].has_bonus());
    }

    #[test]
    fn test_table_rows_are_padded() {
        let table = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![json!("1")], vec![json!("1"), json!("2"), json!("3")]],
        );
        assert_eq!(table.rows[0], vec![json!("1"), Value::Null]);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn test_tail_keeps_order() {
        let mut table = Table::new(vec!["n".into()]);
        for i in 1..=5 {
            table.push_row(vec![json!(i)]);
        }
        let tail = table.tail(2);
        assert_eq!(tail.rows, vec![vec![json!(4)], vec![json!(5)]]);
        assert_eq!(table.tail(10).len(), 5);
    }

    #[test]
    fn test_records_roundtrip() {
        let table = canonical_table();
        let records = table.to_records();
        assert_eq!(records[0]["salary"], 85706.42);
        let back = Table::from_records(&records);
        assert_eq!(back.len(), 1);
        assert_eq!(back.get(0, "gender"), Some(&json!("male")));
    }

    #[test]
    fn test_respondent_from_table() {
        let respondents = Respondent::from_table(&canonical_table()).unwrap();
        let r = &respondents[0];
        assert_eq!(r.gender, Categorical::Known(Gender::Male));
        assert_eq!(r.education, 4);
        assert_eq!(r.years_of_experience, 5.0);
        assert_eq!(r.employment_type, Categorical::Known(EmploymentType::Consultant));
        assert_eq!(r.expertise, Categorical::Known(Expertise::Safety));
        assert_eq!(r.salary, 85706.42);
        assert!(r.has_bonus());
    }

    #[test]
    fn test_respondent_keeps_unmapped_values() {
        let mut table = canonical_table();
        table.rows[0][5] = json!("kvantedata");
        let respondents = Respondent::from_table(&table).unwrap();
        assert_eq!(
            respondents[0].expertise,
            Categorical::Unmapped("kvantedata".to_string())
        );
        assert_eq!(respondents[0].expertise.label(), "kvantedata");
    }

    #[test]
    fn test_respondent_missing_column() {
        let mut table = canonical_table();
        table.rename_column("bonus?", "bonus");
        let err = Respondent::from_table(&table).unwrap_err();
        assert!(err.to_string().contains("bonus?"));
    }

    #[test]
    fn test_respondent_bad_salary() {
        let mut table = canonical_table();
        table.rows[0][6] = json!("a lot");
        let err = Respondent::from_table(&table).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidNumber { row: 1, .. }));
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(Expertise::ALL.len(), 10);
        assert_eq!(EmploymentType::ALL.len(), 4);
        assert_eq!(Gender::from_label("female"), Some(Gender::Female));
        assert_eq!(Expertise::from_label("sikkerhet"), None);
    }

    #[test]
    fn test_categorical_serializes_as_label() {
        let value = serde_json::to_value(Categorical::Known(Expertise::Software)).unwrap();
        assert_eq!(value, json!("software"));
        let value = serde_json::to_value(Categorical::<Gender>::Unmapped("x".into())).unwrap();
        assert_eq!(value, json!("x"));
    }
}
