use serde::{Deserialize, Serialize};
use tracing::debug;

use super::profile::PatientProfile;
use super::registry::ActivationRegistry;
use crate::catalog::CriticalOverrides;
use crate::domain::RuleTraceRow;

pub const OVERRIDE_RULE_ID: &str = "critical_overrides";
pub const OVERRIDE_NOTE: &str = "Critical override applied";

/// Findings that force the configured pathways to CRITICAL regardless of what the rules chose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalFlags {
    pub hemodynamic_instability: bool,
    pub altered_mental_status: bool,
    pub hypoxia: bool,
    pub neck_stiffness: bool,
    pub refusal_to_bear_weight: bool,
    pub eye_swelling_and_pain_with_eom: bool,
    pub drooling_and_muffled_voice_or_trismus: bool,
}

impl CriticalFlags {
    pub fn from_profile(profile: &PatientProfile) -> Self {
        Self {
            hemodynamic_instability: profile.hemodynamic_instability,
            altered_mental_status: profile.altered_mental_status,
            hypoxia: profile.hypoxia,
            neck_stiffness: profile.neck_stiffness,
            refusal_to_bear_weight: profile.refusal_to_bear_weight,
            eye_swelling_and_pain_with_eom: profile.eye_swelling && profile.pain_with_eom,
            drooling_and_muffled_voice_or_trismus: profile.drooling
                && (profile.muffled_voice || profile.trismus),
        }
    }

    pub fn any(&self) -> bool {
        self.set_flags().next().is_some()
    }

    /// Names of the flags that are set, in declaration order.
    pub fn set_flags(&self) -> impl Iterator<Item = &'static str> {
        [
            ("hemodynamic_instability", self.hemodynamic_instability),
            ("altered_mental_status", self.altered_mental_status),
            ("hypoxia", self.hypoxia),
            ("neck_stiffness", self.neck_stiffness),
            ("refusal_to_bear_weight", self.refusal_to_bear_weight),
            (
                "eye_swelling_and_pain_with_eom",
                self.eye_swelling_and_pain_with_eom,
            ),
            (
                "drooling_and_muffled_voice_or_trismus",
                self.drooling_and_muffled_voice_or_trismus,
            ),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
    }
}

/// Escalation pass run once after every rule has registered.
pub(crate) fn apply_overrides(
    flags: &CriticalFlags,
    overrides: &CriticalOverrides,
    registry: &mut ActivationRegistry,
) -> RuleTraceRow {
    if !flags.any() {
        return RuleTraceRow::skipped(OVERRIDE_RULE_ID, "No critical flags set");
    }

    let triggers: Vec<&str> = flags.set_flags().collect();
    let escalated = registry.escalate(&overrides.forced_critical_pathways, OVERRIDE_NOTE);
    debug!(?triggers, ?escalated, "critical override applied");

    let escalated_text = if escalated.is_empty() {
        "none registered".to_string()
    } else {
        escalated.join(", ")
    };
    RuleTraceRow::fired(
        OVERRIDE_RULE_ID,
        format!(
            "Critical flags: {}; escalated: {escalated_text}",
            triggers.join(", ")
        ),
    )
}
