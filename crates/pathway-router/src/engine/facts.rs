use std::collections::BTreeSet;

use super::overrides::CriticalFlags;
use super::profile::{KdFeature, PatientProfile, UticalcFindings};
use crate::catalog::RouterSpec;
use crate::scoring::{uticalc_pretest_percent, within_age_range, PretestInput, ScoringError};

/// Outcome of the UTICalc lookup for this profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UticalcStatus {
    NotProvided,
    OutOfRange { age_months: f64 },
    Scored(f64),
}

impl UticalcStatus {
    pub fn percent(&self) -> Option<f64> {
        match self {
            UticalcStatus::Scored(percent) => Some(*percent),
            _ => None,
        }
    }
}

/// Values computed once from the profile and shared by every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFacts {
    pub age_months: f64,
    pub age_years: f64,
    pub kd_features: BTreeSet<KdFeature>,
    pub kd_count: u32,
    pub uticalc: UticalcStatus,
    pub critical: CriticalFlags,
}

impl DerivedFacts {
    pub fn derive(profile: &PatientProfile, spec: &RouterSpec) -> Result<Self, ScoringError> {
        let age_months = profile.age_months();
        let uticalc = match profile.uticalc.as_ref().filter(|block| !block.is_empty()) {
            None => UticalcStatus::NotProvided,
            Some(findings) => score_uticalc(findings, age_months, spec)?,
        };

        Ok(Self {
            age_months,
            age_years: profile.age_years(),
            kd_features: profile.kd_principal_features(),
            kd_count: profile.kd_feature_count(),
            uticalc,
            critical: CriticalFlags::from_profile(profile),
        })
    }
}

fn score_uticalc(
    findings: &UticalcFindings,
    age_months: f64,
    spec: &RouterSpec,
) -> Result<UticalcStatus, ScoringError> {
    if !within_age_range(age_months) {
        return Ok(UticalcStatus::OutOfRange { age_months });
    }

    let sex = findings.sex.clone().ok_or(ScoringError::MissingSex)?;
    let input = PretestInput {
        age_months,
        sex,
        circumcised: findings.circumcised,
        other_source: findings
            .other_source
            .unwrap_or(spec.uticalc.other_source_default),
        tmax_ge_39: findings.tmax_ge_39,
        tmax_c: findings.tmax_c,
    };

    Ok(match uticalc_pretest_percent(&input)? {
        Some(percent) => UticalcStatus::Scored(percent),
        None => UticalcStatus::OutOfRange { age_months },
    })
}
