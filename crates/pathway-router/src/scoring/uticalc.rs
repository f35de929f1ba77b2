use serde::{Deserialize, Serialize};

use super::ScoringError;

const MIN_AGE_MONTHS: f64 = 2.0;
const MAX_AGE_MONTHS: f64 = 24.0;
const AGE_SPLIT_MONTHS: f64 = 12.0;
const FEVER_THRESHOLD_C: f64 = 39.0;

/// Pretest probability at or above which urine testing (UA/UCx) is recommended.
pub const UTICALC_THRESHOLD_PERCENT: f64 = 2.0;

/// Inputs for the race-free UTICalc pretest lookup (children 2-24 months).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PretestInput {
    pub age_months: f64,
    pub sex: String,
    #[serde(default)]
    pub circumcised: Option<bool>,
    pub other_source: bool,
    /// Takes precedence over `tmax_c` when present.
    #[serde(default)]
    pub tmax_ge_39: Option<bool>,
    #[serde(default)]
    pub tmax_c: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Case and whitespace insensitive.
    pub fn parse(raw: &str) -> Result<Self, ScoringError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(ScoringError::InvalidSex(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SexGroup {
    FemaleOrUncircMale,
    CircMale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeverBand {
    Ge39,
    Lt39,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceBand {
    Other,
    NoOther,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgeBand {
    Lt12,
    Ge12,
}

/// Whether UTICalc applies at this age: [2, 24] months inclusive.
pub fn within_age_range(age_months: f64) -> bool {
    (MIN_AGE_MONTHS..=MAX_AGE_MONTHS).contains(&age_months)
}

/// Return the pretest UTI risk percent, or `None` when `age_months` falls outside [2, 24].
pub fn uticalc_pretest_percent(input: &PretestInput) -> Result<Option<f64>, ScoringError> {
    if !within_age_range(input.age_months) {
        return Ok(None);
    }

    let sex_group = match Sex::parse(&input.sex)? {
        Sex::Female => SexGroup::FemaleOrUncircMale,
        Sex::Male => match input.circumcised {
            Some(true) => SexGroup::CircMale,
            Some(false) => SexGroup::FemaleOrUncircMale,
            None => return Err(ScoringError::MissingCircumcision),
        },
    };

    let fever_ge_39 = match input.tmax_ge_39 {
        Some(flag) => flag,
        None => input.tmax_c.is_some_and(|tmax| tmax >= FEVER_THRESHOLD_C),
    };
    let fever = if fever_ge_39 {
        FeverBand::Ge39
    } else {
        FeverBand::Lt39
    };
    let source = if input.other_source {
        SourceBand::Other
    } else {
        SourceBand::NoOther
    };
    let age = if input.age_months < AGE_SPLIT_MONTHS {
        AgeBand::Lt12
    } else {
        AgeBand::Ge12
    };

    Ok(Some(lookup(sex_group, fever, source, age)))
}

// eFigure-derived percentages.
fn lookup(group: SexGroup, fever: FeverBand, source: SourceBand, age: AgeBand) -> f64 {
    use AgeBand::*;
    use FeverBand::*;
    use SexGroup::*;
    use SourceBand::*;

    match (group, fever, source, age) {
        (FemaleOrUncircMale, Ge39, Other, Ge12) => 2.14,
        (FemaleOrUncircMale, Ge39, Other, Lt12) => 6.46,
        (FemaleOrUncircMale, Ge39, NoOther, Ge12) => 8.05,
        (FemaleOrUncircMale, Ge39, NoOther, Lt12) => 21.51,
        (FemaleOrUncircMale, Lt39, Other, Ge12) => 0.91,
        (FemaleOrUncircMale, Lt39, Other, Lt12) => 2.82,
        (FemaleOrUncircMale, Lt39, NoOther, Ge12) => 3.54,
        (FemaleOrUncircMale, Lt39, NoOther, Lt12) => 10.41,
        (CircMale, Ge39, Other, Ge12) => 0.19,
        (CircMale, Ge39, Other, Lt12) => 0.62,
        (CircMale, Ge39, NoOther, Ge12) => 0.79,
        (CircMale, Ge39, NoOther, Lt12) => 2.45,
        (CircMale, Lt39, Other, Ge12) => 0.08,
        (CircMale, Lt39, Other, Lt12) => 0.26,
        (CircMale, Lt39, NoOther, Ge12) => 0.33,
        (CircMale, Lt39, NoOther, Lt12) => 1.04,
    }
}
