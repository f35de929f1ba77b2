use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

const DAYS_PER_MONTH: f64 = 30.4375;

/// Structured findings for one febrile patient.
///
/// Every field defaults to absent (`false`, `0`, or `None`) so callers only send what they
/// observed. Unknown keys are rejected: a misspelled flag must fail loudly instead of silently
/// reading as "not present".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatientProfile {
    // Demographics and course.
    pub age_days: u32,
    /// Overrides the `age_days` derived value when supplied.
    pub age_months: Option<f64>,
    pub ga_weeks: Option<u32>,
    pub fever_days: u32,

    // Systemic.
    pub ill_appearing: bool,
    pub hemodynamic_instability: bool,
    pub altered_mental_status: bool,
    pub immunocompromised_or_onc: bool,
    pub fever_without_source: bool,
    pub high_fever: bool,

    // Neuro.
    pub seizure: bool,
    pub neck_stiffness: bool,
    pub severe_headache: bool,

    // Respiratory.
    pub influenza_like_illness: bool,
    pub hypoxia: bool,
    pub respiratory_distress: bool,
    pub cough: bool,
    pub wheeze: bool,
    pub stridor: bool,
    pub barky_cough: bool,
    pub coryza: bool,

    // Throat (Centor inputs).
    pub sore_throat: bool,
    pub centor_exudate_or_swelling: bool,
    pub centor_tender_anterior_cervical_nodes: bool,
    pub centor_fever_gt_38: bool,
    pub centor_cough_absent: bool,

    // HEENT.
    pub eye_swelling: bool,
    pub periorbital_erythema: bool,
    pub pain_with_eom: bool,
    pub drooling: bool,
    pub muffled_voice: bool,
    pub trismus: bool,

    // GI / GU.
    pub vomiting: bool,
    pub diarrhea: bool,
    pub severe_focal_abdominal_pain: bool,
    pub dysuria: bool,
    pub flank_pain: bool,

    // Musculoskeletal.
    pub joint_pain: bool,
    pub limp: bool,
    pub refusal_to_bear_weight: bool,

    // Skin and soft tissue.
    pub localized_erythema: bool,
    pub warmth_or_tenderness: bool,
    pub fluctuance_or_purulence: bool,
    pub localized_swelling: bool,

    // Kawasaki principal features.
    pub kd_features: u32,
    pub conjunctivitis: bool,
    pub kd_conjunctivitis: bool,
    pub strawberry_tongue: bool,
    pub fissured_lips: bool,
    pub kd_oral_changes: bool,
    pub kd_rash: bool,
    pub kd_extremity_changes: bool,
    pub kd_cervical_lymphadenopathy: bool,

    // Rash patterns.
    pub rash_pattern: Option<RashPattern>,
    pub rash_distribution: Option<RashDistribution>,
    pub herald_patch_christmas_tree: bool,
    pub sandpaper_rash_after_strep: bool,
    pub high_fever_3_4_days_before_rash: bool,
    pub posterior_auricular_lymphadenopathy: bool,
    pub slapped_cheek: bool,
    pub koplik_spots: bool,

    pub uticalc: Option<UticalcFindings>,
}

impl PatientProfile {
    pub fn age_months(&self) -> f64 {
        self.age_months
            .unwrap_or_else(|| f64::from(self.age_days) / DAYS_PER_MONTH)
    }

    pub fn age_years(&self) -> f64 {
        f64::from(self.age_days) / 365.0
    }

    /// Age in days after subtracting prematurity (`(37 - ga_weeks) * 7`), floored at zero.
    pub fn corrected_age_days(&self) -> u32 {
        match self.ga_weeks {
            Some(weeks) if weeks < 37 => self.age_days.saturating_sub((37 - weeks) * 7),
            _ => self.age_days,
        }
    }

    pub fn is_preterm(&self) -> bool {
        self.ga_weeks.is_some_and(|weeks| weeks < 37)
    }

    pub fn is_at_most_months_old(&self, months: f64) -> bool {
        f64::from(self.age_days) <= months * DAYS_PER_MONTH
    }

    /// Principal Kawasaki features evidenced by individual findings. Each feature counts once
    /// no matter how many findings support it.
    pub fn kd_principal_features(&self) -> BTreeSet<KdFeature> {
        let mut features = BTreeSet::new();
        if self.conjunctivitis || self.kd_conjunctivitis {
            features.insert(KdFeature::Conjunctivitis);
        }
        if self.strawberry_tongue || self.fissured_lips || self.kd_oral_changes {
            features.insert(KdFeature::OralChanges);
        }
        if self.kd_rash || self.rash_pattern.is_some() {
            features.insert(KdFeature::Rash);
        }
        if self.kd_extremity_changes {
            features.insert(KdFeature::ExtremityChanges);
        }
        if self.kd_cervical_lymphadenopathy {
            features.insert(KdFeature::CervicalLymphadenopathy);
        }
        features
    }

    /// The larger of the clinician-entered count and the count derived from findings.
    pub fn kd_feature_count(&self) -> u32 {
        let derived = self.kd_principal_features().len() as u32;
        self.kd_features.max(derived)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KdFeature {
    Conjunctivitis,
    OralChanges,
    Rash,
    ExtremityChanges,
    CervicalLymphadenopathy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RashPattern {
    Scaly,
    Maculopapular,
    Vesicular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RashDistribution {
    NoSetPattern,
    TrunkToFaceExtremities,
    HeadToToes,
}

impl RashDistribution {
    pub const fn label(self) -> &'static str {
        match self {
            RashDistribution::NoSetPattern => "no_set_pattern",
            RashDistribution::TrunkToFaceExtremities => "trunk_to_face_extremities",
            RashDistribution::HeadToToes => "head_to_toes",
        }
    }
}

/// UTICalc panel as entered for a 2-24 month old.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UticalcFindings {
    pub sex: Option<String>,
    pub circumcised: Option<bool>,
    pub tmax_c: Option<f64>,
    pub tmax_ge_39: Option<bool>,
    pub other_source: Option<bool>,
}

impl UticalcFindings {
    /// An empty panel counts as "not provided".
    pub fn is_empty(&self) -> bool {
        self.sex.is_none()
            && self.circumcised.is_none()
            && self.tmax_c.is_none()
            && self.tmax_ge_39.is_none()
            && self.other_source.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_absent() {
        let profile: PatientProfile =
            serde_json::from_str(r#"{"age_days": 400}"#).expect("sparse profile parses");
        assert_eq!(profile.age_days, 400);
        assert_eq!(profile.fever_days, 0);
        assert!(!profile.seizure);
        assert!(profile.uticalc.is_none());
    }

    #[test]
    fn misspelled_flags_are_rejected() {
        let err = serde_json::from_str::<PatientProfile>(r#"{"age_days": 400, "siezure": true}"#)
            .expect_err("unknown key rejected");
        assert!(err.to_string().contains("siezure"));
    }

    #[test]
    fn null_optionals_are_accepted() {
        let profile: PatientProfile = serde_json::from_str(
            r#"{"ga_weeks": null, "uticalc": {"sex": "female", "circumcised": null}}"#,
        )
        .expect("nulls parse");
        assert!(profile.ga_weeks.is_none());
        let uticalc = profile.uticalc.expect("uticalc present");
        assert_eq!(uticalc.sex.as_deref(), Some("female"));
        assert!(!uticalc.is_empty());
    }

    #[test]
    fn corrected_age_floors_at_zero() {
        let preterm = PatientProfile {
            age_days: 20,
            ga_weeks: Some(30),
            ..Default::default()
        };
        assert_eq!(preterm.corrected_age_days(), 0);

        let near_term = PatientProfile {
            age_days: 40,
            ga_weeks: Some(35),
            ..Default::default()
        };
        assert_eq!(near_term.corrected_age_days(), 26);

        let term = PatientProfile {
            age_days: 40,
            ga_weeks: Some(38),
            ..Default::default()
        };
        assert_eq!(term.corrected_age_days(), 40);
    }

    #[test]
    fn kd_features_count_each_principal_feature_once() {
        let profile = PatientProfile {
            conjunctivitis: true,
            kd_conjunctivitis: true,
            strawberry_tongue: true,
            fissured_lips: true,
            rash_pattern: Some(RashPattern::Maculopapular),
            ..Default::default()
        };
        assert_eq!(profile.kd_principal_features().len(), 3);
        assert_eq!(profile.kd_feature_count(), 3);

        let entered = PatientProfile {
            kd_features: 4,
            conjunctivitis: true,
            ..Default::default()
        };
        assert_eq!(entered.kd_feature_count(), 4);
    }

    #[test]
    fn age_months_prefers_explicit_value() {
        let derived = PatientProfile {
            age_days: 365,
            ..Default::default()
        };
        assert!((derived.age_months() - 365.0 / 30.4375).abs() < 1e-9);

        let explicit = PatientProfile {
            age_days: 365,
            age_months: Some(10.0),
            ..Default::default()
        };
        assert_eq!(explicit.age_months(), 10.0);
    }
}
