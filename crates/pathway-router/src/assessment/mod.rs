//! Companion differential for free-text findings.
//!
//! Independent of the pathway engine: it works from symptom and exam strings instead of a
//! structured profile, and narrows the common differential as more findings are supplied.

mod candidates;

use serde::{Deserialize, Serialize};
use tracing::debug;

use candidates::{Findings, ScoredCandidate, COMMON_CANDIDATES};

const SCORE_FLOOR: f64 = 0.7;
const MIN_COMMON: usize = 3;
const MAX_COMMON: usize = 7;
const YOUNG_INFANT_MONTHS: f64 = 3.0;
const UTI_MAX_MONTHS: f64 = 24.0;
const PROLONGED_FEVER_DAYS: u32 = 5;
const FUO_FEVER_DAYS: u32 = 8;

const MENINGEAL_TERMS: &[&str] = &[
    "neck stiffness",
    "stiff neck",
    "bulging fontanelle",
    "photophobia",
    "altered mental status",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentRequest {
    pub age_months: f64,
    pub fever_days: u32,
    pub symptoms: Vec<String>,
    pub exam: Vec<String>,
    pub high_risk: bool,
    pub toxic: bool,
    pub unstable: bool,
    pub fever_without_source: bool,
}

impl AssessmentRequest {
    /// Positive findings and flags supplied; more detail narrows the common list.
    pub fn detail_count(&self) -> usize {
        let flags = [
            self.high_risk,
            self.toxic,
            self.unstable,
            self.fever_without_source,
        ];
        self.symptoms.len() + self.exam.len() + flags.iter().filter(|flag| **flag).count()
    }

    fn findings(&self) -> Findings {
        let flag = self
            .fever_without_source
            .then_some("fever without source");
        Findings::new(
            self.symptoms
                .iter()
                .chain(self.exam.iter())
                .map(String::as_str)
                .chain(flag),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub cannot_miss: Vec<String>,
    pub common: Vec<String>,
    pub prolonged_or_special: Vec<String>,
    pub recommended_workup: Vec<String>,
    pub recommended_initial_management: Vec<String>,
}

impl Assessment {
    fn push_workup(&mut self, item: &str) {
        push_unique(&mut self.recommended_workup, item);
    }

    fn push_management(&mut self, item: &str) {
        push_unique(&mut self.recommended_initial_management, item);
    }
}

fn push_unique(bucket: &mut Vec<String>, item: &str) {
    if !bucket.iter().any(|existing| existing == item) {
        bucket.push(item.to_string());
    }
}

pub fn generate_assessment(request: &AssessmentRequest) -> Assessment {
    let findings = request.findings();
    let mut assessment = Assessment::default();

    add_cannot_miss(request, &findings, &mut assessment);
    add_prolonged(request, &mut assessment);

    let common = rank_common(request, &findings);
    for scored in &common {
        assessment.common.push(scored.candidate.name.to_string());
        for item in scored.candidate.workup {
            assessment.push_workup(item);
        }
        for item in scored.candidate.management {
            assessment.push_management(item);
        }
    }

    debug!(
        detail_count = request.detail_count(),
        cannot_miss = assessment.cannot_miss.len(),
        common = assessment.common.len(),
        "assessment generated"
    );
    assessment
}

fn rank_common(request: &AssessmentRequest, findings: &Findings) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = COMMON_CANDIDATES
        .iter()
        .map(|candidate| ScoredCandidate {
            candidate,
            score: candidate.score(findings, request.age_months, request.fever_days),
        })
        .filter(|scored| scored.score >= SCORE_FLOOR)
        .collect();

    scored.sort_by(|left, right| {
        right
            .score
            .total_cmp(&left.score)
            .then_with(|| left.candidate.name.cmp(right.candidate.name))
    });

    let limit = MIN_COMMON.max(MAX_COMMON.saturating_sub(request.detail_count()));
    scored.truncate(limit);
    scored
}

fn add_cannot_miss(request: &AssessmentRequest, findings: &Findings, out: &mut Assessment) {
    if request.age_months < YOUNG_INFANT_MONTHS {
        out.cannot_miss
            .push("Serious bacterial infection in febrile infant <90 days".to_string());
        out.push_workup("Blood culture");
        out.push_workup("Urinalysis and urine culture (catheter)");
        out.push_workup("CSF studies (lumbar puncture) per febrile infant pathway");
        out.push_management("Follow the febrile infant pathway; empiric antibiotics per age band");
    }

    if request.toxic || request.unstable {
        out.cannot_miss
            .push("Sepsis / septic shock (toxic or unstable appearance)".to_string());
        out.push_workup("Blood culture");
        out.push_workup("CBC with differential, lactate");
        out.push_management("Sepsis bundle: IV access, fluid bolus, antibiotics within 1 hour");
    }

    if request.high_risk {
        out.cannot_miss
            .push("Invasive bacterial infection in high-risk host".to_string());
        out.push_workup("Blood culture");
        out.push_workup("CBC with differential, lactate");
        out.push_management("Empiric broad-spectrum antibiotics per host-specific guideline");
    }

    if findings.mentions_any(MENINGEAL_TERMS) {
        out.cannot_miss.push("Bacterial meningitis".to_string());
        out.push_workup("CSF studies (lumbar puncture) when safe");
        out.push_management("Do not delay antibiotics for lumbar puncture");
    }

    if request.fever_without_source && request.age_months <= UTI_MAX_MONTHS {
        out.cannot_miss
            .push("UTI / pyelonephritis (fever without source, 24 months or younger)".to_string());
        out.push_workup("Urinalysis and urine culture (catheter)");
    }
}

fn add_prolonged(request: &AssessmentRequest, out: &mut Assessment) {
    if request.fever_days >= PROLONGED_FEVER_DAYS {
        out.prolonged_or_special
            .push("Kawasaki disease (fever 5 days or more: count principal features)".to_string());
        out.prolonged_or_special
            .push("MIS-C (multisystem inflammatory syndrome in children)".to_string());
        out.push_workup("CBC, CRP/ESR, albumin, ALT, urinalysis");
        out.push_workup("Echocardiogram if Kawasaki criteria are met");
    }

    if request.fever_days >= FUO_FEVER_DAYS {
        out.prolonged_or_special
            .push("Fever of unknown origin".to_string());
        out.push_workup("Structured fever of unknown origin evaluation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(bucket: &[String]) -> String {
        bucket.join("\n").to_lowercase()
    }

    fn request(age_months: f64, fever_days: u32) -> AssessmentRequest {
        AssessmentRequest {
            age_months,
            fever_days,
            ..Default::default()
        }
    }

    #[test]
    fn six_days_of_fever_raises_kawasaki_misc_and_uti() {
        let assessment = generate_assessment(&AssessmentRequest {
            fever_without_source: true,
            ..request(24.0, 6)
        });

        let prolonged = joined(&assessment.prolonged_or_special);
        assert!(prolonged.contains("kawasaki"));
        assert!(prolonged.contains("mis-c"));
        assert!(!prolonged.contains("unknown origin"));

        let uti = joined(&assessment.cannot_miss) + &joined(&assessment.common);
        assert!(uti.contains("uti"));
    }

    #[test]
    fn young_infant_gets_full_sepsis_workup() {
        let assessment = generate_assessment(&AssessmentRequest {
            fever_without_source: true,
            ..request(1.0, 1)
        });

        assert!(joined(&assessment.cannot_miss).contains("<90 days"));
        let workup = joined(&assessment.recommended_workup);
        assert!(workup.contains("blood culture"));
        assert!(workup.contains("urine culture"));
        assert!(workup.contains("csf"));
        assert_eq!(
            assessment
                .recommended_workup
                .iter()
                .filter(|item| item.as_str() == "Urinalysis and urine culture (catheter)")
                .count(),
            1
        );
    }

    #[test]
    fn sore_throat_with_nodes_ranks_strep_first() {
        let assessment = generate_assessment(&AssessmentRequest {
            symptoms: vec!["Sore throat".to_string()],
            exam: vec!["Swollen lymph nodes".to_string()],
            ..request(72.0, 2)
        });

        assert_eq!(assessment.common[0], "Group A streptococcal pharyngitis");
        assert!(joined(&assessment.recommended_workup).contains("rapid strep"));
        assert!(assessment.cannot_miss.is_empty());
    }

    #[test]
    fn cough_and_wheeze_at_one_year_suggest_bronchiolitis() {
        let assessment = generate_assessment(&AssessmentRequest {
            symptoms: vec!["Cough".to_string(), "Wheeze".to_string()],
            ..request(12.0, 2)
        });

        assert_eq!(assessment.common[0], "Bronchiolitis");
        assert!(joined(&assessment.recommended_initial_management).contains("supportive"));
    }

    #[test]
    fn more_detail_narrows_the_common_list() {
        let sparse = AssessmentRequest {
            symptoms: vec!["Cough".to_string()],
            ..request(18.0, 2)
        };
        let detailed = AssessmentRequest {
            symptoms: vec![
                "Cough".to_string(),
                "Runny nose".to_string(),
                "Congestion".to_string(),
                "Wheeze".to_string(),
                "Myalgia".to_string(),
            ],
            exam: vec!["Tachypnea".to_string()],
            ..request(18.0, 2)
        };

        assert_eq!(sparse.detail_count(), 1);
        assert_eq!(detailed.detail_count(), 6);
        assert!(generate_assessment(&sparse).common.len() <= 6);
        assert!(generate_assessment(&detailed).common.len() <= 3);
    }

    #[test]
    fn meningeal_signs_and_instability_are_cannot_miss() {
        let assessment = generate_assessment(&AssessmentRequest {
            exam: vec!["Neck stiffness".to_string()],
            unstable: true,
            ..request(60.0, 1)
        });

        let cannot_miss = joined(&assessment.cannot_miss);
        assert!(cannot_miss.contains("meningitis"));
        assert!(cannot_miss.contains("sepsis"));
    }

    #[test]
    fn eight_days_adds_fever_of_unknown_origin() {
        let assessment = generate_assessment(&request(48.0, 8));
        assert!(joined(&assessment.prolonged_or_special).contains("unknown origin"));
    }

    #[test]
    fn ties_sort_by_name() {
        let scored = rank_common(&request(30.0, 1), &Findings::new(["fatigue", "myalgia"]));
        for pair in scored.windows(2) {
            let ordered = pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score
                    && pair[0].candidate.name <= pair[1].candidate.name);
            assert!(ordered, "{:?} before {:?}", pair[0], pair[1]);
        }
    }
}
