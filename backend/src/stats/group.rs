//! Group-by aggregates over respondents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{columns, Respondent};

use super::{mean, median};

/// A respondent field, named by its canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "education")]
    Education,
    #[serde(rename = "years of experience")]
    YearsOfExperience,
    #[serde(rename = "region of residence")]
    Region,
    #[serde(rename = "employment type and sector")]
    EmploymentType,
    #[serde(rename = "expertise")]
    Expertise,
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "bonus?")]
    Bonus,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Gender => columns::GENDER,
            Field::Education => columns::EDUCATION,
            Field::YearsOfExperience => columns::YEARS_OF_EXPERIENCE,
            Field::Region => columns::REGION,
            Field::EmploymentType => columns::EMPLOYMENT_TYPE,
            Field::Expertise => columns::EXPERTISE,
            Field::Salary => columns::SALARY,
            Field::Bonus => columns::BONUS,
        }
    }

    /// Numeric value of this field, for numeric fields.
    pub fn numeric(&self, r: &Respondent) -> Option<f64> {
        match self {
            Field::Education => Some(r.education as f64),
            Field::YearsOfExperience => Some(r.years_of_experience),
            Field::Salary => Some(r.salary),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::Education | Field::YearsOfExperience | Field::Salary)
    }

    /// Group key of a respondent for this field.
    pub fn key(&self, r: &Respondent) -> String {
        match self {
            Field::Gender => r.gender.label().to_string(),
            Field::Region => r.region.clone(),
            Field::EmploymentType => r.employment_type.label().to_string(),
            Field::Expertise => r.expertise.label().to_string(),
            Field::Bonus => r.bonus.label().to_string(),
            Field::Education | Field::YearsOfExperience | Field::Salary => {
                self.numeric(r).map(|v| v.to_string()).unwrap_or_default()
            }
        }
    }
}

/// Respondents grouped by the key of `field`, keys in sorted order.
pub fn group_by(respondents: &[Respondent], field: Field) -> BTreeMap<String, Vec<&Respondent>> {
    let mut groups: BTreeMap<String, Vec<&Respondent>> = BTreeMap::new();
    for r in respondents {
        groups.entry(field.key(r)).or_default().push(r);
    }
    groups
}

/// Values of the numeric field `of`, grouped by `by`. Groups where `of` has
/// no value are dropped.
fn group_values(respondents: &[Respondent], by: Field, of: Field) -> BTreeMap<String, Vec<f64>> {
    group_by(respondents, by)
        .into_iter()
        .map(|(key, members)| {
            let values: Vec<f64> = members.iter().filter_map(|r| of.numeric(r)).collect();
            (key, values)
        })
        .filter(|(_, values)| !values.is_empty())
        .collect()
}

/// Median of `of` per group of `by`. Groups are never empty.
pub fn group_median(respondents: &[Respondent], by: Field, of: Field) -> BTreeMap<String, f64> {
    group_values(respondents, by, of)
        .into_iter()
        .filter_map(|(key, values)| median(&values).map(|m| (key, m)))
        .collect()
}

/// Mean of `of` per group of `by`.
pub fn group_mean(respondents: &[Respondent], by: Field, of: Field) -> BTreeMap<String, f64> {
    group_values(respondents, by, of)
        .into_iter()
        .filter_map(|(key, values)| mean(&values).map(|m| (key, m)))
        .collect()
}

/// Number of respondents per group.
pub fn group_count(respondents: &[Respondent], field: Field) -> BTreeMap<String, usize> {
    group_by(respondents, field)
        .into_iter()
        .map(|(key, members)| (key, members.len()))
        .collect()
}

/// Median salary per expertise, alphabetical by expertise.
pub fn median_salary_by_expertise(respondents: &[Respondent]) -> BTreeMap<String, f64> {
    group_median(respondents, Field::Expertise, Field::Salary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bonus, Categorical};
    use crate::stats::fixtures::respondent;

    #[test]
    fn test_median_by_expertise() {
        let respondents = vec![
            respondent("software", 100.0),
            respondent("software", 300.0),
            respondent("databases", 200.0),
        ];

        let medians = median_salary_by_expertise(&respondents);
        assert_eq!(medians.len(), 2);
        assert_eq!(medians["software"], 200.0);
        assert_eq!(medians["databases"], 200.0);
        let keys: Vec<&String> = medians.keys().collect();
        assert_eq!(keys, vec!["databases", "software"]);
    }

    #[test]
    fn test_unmapped_values_form_their_own_group() {
        let respondents = vec![respondent("software", 100.0), respondent("kvantedata", 50.0)];
        let medians = median_salary_by_expertise(&respondents);
        assert_eq!(medians["kvantedata"], 50.0);
    }

    #[test]
    fn test_group_mean_and_count() {
        let mut a = respondent("software", 100.0);
        a.years_of_experience = 2.0;
        let mut b = respondent("software", 200.0);
        b.years_of_experience = 2.0;
        let mut c = respondent("software", 600.0);
        c.years_of_experience = 10.0;
        let respondents = vec![a, b, c];

        let means = group_mean(&respondents, Field::YearsOfExperience, Field::Salary);
        assert_eq!(means["2"], 150.0);
        assert_eq!(means["10"], 600.0);

        let counts = group_count(&respondents, Field::YearsOfExperience);
        assert_eq!(counts["2"], 2);

        let years = group_mean(&respondents, Field::Expertise, Field::YearsOfExperience);
        assert_eq!(years["software"], 14.0 / 3.0);
    }

    #[test]
    fn test_non_numeric_values_give_no_groups() {
        let respondents = vec![respondent("software", 100.0)];
        assert!(group_median(&respondents, Field::Expertise, Field::Gender).is_empty());
    }

    #[test]
    fn test_bonus_key() {
        let mut with_bonus = respondent("software", 1.0);
        with_bonus.bonus = Categorical::Known(Bonus::Yes);
        assert_eq!(Field::Bonus.key(&with_bonus), "Yes");
        assert_eq!(Field::Bonus.key(&respondent("software", 1.0)), "No");

        let mut unsure = respondent("software", 1.0);
        unsure.bonus = Categorical::Unmapped("Kanskje".to_string());
        assert_eq!(Field::Bonus.key(&unsure), "Kanskje");
    }

    #[test]
    fn test_field_serde_uses_column_names() {
        let value = serde_json::to_value(Field::YearsOfExperience).unwrap();
        assert_eq!(value, serde_json::json!("years of experience"));
        let parsed: Field = serde_json::from_value(serde_json::json!("bonus?")).unwrap();
        assert_eq!(parsed, Field::Bonus);
        assert_eq!(parsed.column(), "bonus?");
    }
}
