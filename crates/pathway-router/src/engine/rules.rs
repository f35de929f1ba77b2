use std::fmt;

use super::facts::{DerivedFacts, UticalcStatus};
use super::profile::{PatientProfile, RashDistribution, RashPattern};
use super::registry::ActivationRegistry;
use super::RoutingError;
use crate::catalog::{PathwayCatalog, RouterSpec};
use crate::domain::{Activation, Priority, RuleTraceRow, Status};
use crate::scoring::{compute_centor_score, CentorInput, UTICALC_THRESHOLD_PERCENT};

const CROUP_MAX_AGE_DAYS: u32 = 6 * 365;
const KAWASAKI_INFANT_MAX_MONTHS: f64 = 6.0;

pub type RuleResult = Result<RuleTraceRow, RoutingError>;
pub type RuleFn = fn(&RuleContext<'_>, &mut ActivationRegistry) -> RuleResult;

/// Read-only inputs handed to every rule.
pub struct RuleContext<'a> {
    pub profile: &'a PatientProfile,
    pub facts: &'a DerivedFacts,
    pub catalog: &'a PathwayCatalog,
    pub spec: &'a RouterSpec,
}

impl RuleContext<'_> {
    /// Build an activation for a catalog pathway, taking name and source from the catalog.
    pub fn activate(
        &self,
        rule_id: &str,
        pathway_id: &str,
        status: Status,
        priority: Priority,
        reason: impl Into<String>,
    ) -> Result<Activation, RoutingError> {
        let entry = self
            .catalog
            .get(pathway_id)
            .ok_or_else(|| RoutingError::UnknownPathway {
                rule: rule_id.to_string(),
                pathway: pathway_id.to_string(),
            })?;

        Ok(Activation {
            id: entry.id.clone(),
            name: entry.title.clone(),
            status,
            priority,
            reason: reason.into(),
            source: entry.source(),
        })
    }
}

/// One predicate/action pair. `pathways` lists the catalog ids the rule may register so the
/// configuration can be validated before any patient is routed.
#[derive(Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub pathways: &'static [&'static str],
    apply: RuleFn,
}

impl Rule {
    pub const fn new(id: &'static str, pathways: &'static [&'static str], apply: RuleFn) -> Self {
        Self { id, pathways, apply }
    }

    pub fn apply(&self, ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
        (self.apply)(ctx, registry)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("pathways", &self.pathways)
            .finish_non_exhaustive()
    }
}

static STANDARD_RULES: [Rule; 19] = [
    Rule::new(INFANT_SPLIT, &[], infant_split),
    Rule::new(SEPSIS, &["sepsis"], sepsis_rule),
    Rule::new(ONC_FEVER, &["fever_onc_patient"], onc_fever_rule),
    Rule::new(SEIZURE, &["febrile_seizure", "meningitis"], seizure_rule),
    Rule::new(MENINGITIS, &["meningitis"], meningitis_rules),
    Rule::new(ILI, &["influenza", "covid"], ili_rule),
    Rule::new(PHARYNGITIS, &["pharyngitis"], pharyngitis_rule),
    Rule::new(RASH, &["kawasaki", "pharyngitis"], rash_module),
    Rule::new(BRONCHIOLITIS, &["bronchiolitis"], bronchiolitis_rule),
    Rule::new(PNEUMONIA, &["pneumonia"], pneumonia_rule),
    Rule::new(CROUP, &["croup"], croup_rule),
    Rule::new(ORBITAL, &["orbital_preseptal_cellulitis"], orbital_preseptal_rule),
    Rule::new(NECK_SPACE, &["neck_space_infection"], neck_space_rule),
    Rule::new(GASTRO, &["gastroenteritis"], gastro_rule),
    Rule::new(CELLULITIS, &["cellulitis_abscess"], cellulitis_abscess_rule),
    Rule::new(OSTEOMYELITIS, &["osteomyelitis"], osteomyelitis_rule),
    Rule::new(KAWASAKI, &["kawasaki"], kawasaki_rule),
    Rule::new(UTI_SYMPTOM, &["uti"], uti_symptom_rule),
    Rule::new(UTICALC, &["uti"], uticalc_rule),
];

/// The full battery in evaluation order.
pub fn standard_rules() -> &'static [Rule] {
    &STANDARD_RULES
}

/// `(rule id, pathway ids)` pairs for configuration validation.
pub fn rule_references() -> Vec<(&'static str, &'static [&'static str])> {
    STANDARD_RULES
        .iter()
        .map(|rule| (rule.id, rule.pathways))
        .collect()
}

pub const INFANT_SPLIT: &str = "infant_split";
pub const SEPSIS: &str = "sepsis_rule";
pub const ONC_FEVER: &str = "onc_fever_rule";
pub const SEIZURE: &str = "seizure_rule";
pub const MENINGITIS: &str = "meningitis_rules";
pub const MENINGITIS_DIRECT: &str = "meningitis_direct_rule";
pub const MENINGITIS_HEADACHE: &str = "meningitis_headache_consider_rule";
pub const ILI: &str = "ili_rule";
pub const PHARYNGITIS: &str = "pharyngitis_rule";
pub const RASH: &str = "rash_module";
pub const RASH_SCALY: &str = "rash_scaly_module";
pub const RASH_MACULOPAPULAR: &str = "rash_maculopapular_module";
pub const RASH_VESICULAR: &str = "rash_vesicular_module";
pub const BRONCHIOLITIS: &str = "bronchiolitis_rule";
pub const PNEUMONIA: &str = "pneumonia_rule";
pub const CROUP: &str = "croup_rule";
pub const ORBITAL: &str = "orbital_preseptal_rule";
pub const NECK_SPACE: &str = "neck_space_rule";
pub const GASTRO: &str = "gastro_rule";
pub const CELLULITIS: &str = "cellulitis_abscess_rule";
pub const OSTEOMYELITIS: &str = "osteomyelitis_rule";
pub const KAWASAKI: &str = "kawasaki_rule";
pub const UTI_SYMPTOM: &str = "uti_symptom_rule";
pub const UTICALC: &str = "uticalc_rule";

fn status_if(active: bool) -> Status {
    if active {
        Status::Active
    } else {
        Status::Consider
    }
}

fn priority_if(high: bool) -> Priority {
    if high {
        Priority::High
    } else {
        Priority::Normal
    }
}

fn infant_band(corrected_days: u32) -> Option<&'static str> {
    match corrected_days {
        0..=21 => Some("0-21"),
        22..=28 => Some("22-28"),
        29..=60 => Some("29-60"),
        _ => None,
    }
}

fn infant_split(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    let cutoff = ctx.spec.age_cutoffs.infant_days_max;
    if p.age_days >= cutoff {
        return Ok(RuleTraceRow::skipped(
            INFANT_SPLIT,
            format!("Age {} days is at or above {cutoff}", p.age_days),
        ));
    }

    let corrected = p.corrected_age_days();
    let band = infant_band(corrected);
    let targets = &ctx.spec.infant_split.targets;
    let target = if p.ill_appearing {
        &targets.ill_appearing
    } else {
        &targets.well_appearing
    };

    let mut reason = format!("Infant pathway: age {} days", p.age_days);
    if let Some(weeks) = p.ga_weeks.filter(|_| p.is_preterm()) {
        reason.push_str(&format!(", corrected {corrected} days (GA {weeks}w)"));
    }
    if let Some(band) = band {
        reason.push_str(&format!(", band {band}"));
    }
    reason.push_str(if p.ill_appearing {
        ", ill-appearing"
    } else {
        ", well-appearing"
    });

    registry.register(ctx.activate(
        INFANT_SPLIT,
        target,
        Status::Active,
        priority_if(p.ill_appearing),
        reason,
    )?);
    Ok(RuleTraceRow::fired(
        INFANT_SPLIT,
        format!("Infant split to {target} (band {})", band.unwrap_or("n/a")),
    ))
}

fn sepsis_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.ill_appearing || p.hemodynamic_instability || p.altered_mental_status) {
        return Ok(RuleTraceRow::skipped(SEPSIS, "No sepsis trigger"));
    }

    let elevated = p.hypoxia
        || p.respiratory_distress
        || p.altered_mental_status
        || p.hemodynamic_instability;
    registry.register(ctx.activate(
        SEPSIS,
        "sepsis",
        Status::Active,
        priority_if(elevated),
        "Active: ill-appearing, hemodynamic instability, or altered mental status",
    )?);
    Ok(RuleTraceRow::fired(
        SEPSIS,
        "ill_appearing OR hemodynamic_instability OR altered_mental_status",
    ))
}

fn onc_fever_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    if !ctx.profile.immunocompromised_or_onc {
        return Ok(RuleTraceRow::skipped(ONC_FEVER, "Not immunocompromised"));
    }

    registry.register(ctx.activate(
        ONC_FEVER,
        "fever_onc_patient",
        Status::Active,
        Priority::High,
        "Active: immunocompromised or oncology patient",
    )?);
    Ok(RuleTraceRow::fired(ONC_FEVER, "immunocompromised_or_onc"))
}

fn seizure_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !p.seizure {
        return Ok(RuleTraceRow::skipped(SEIZURE, "No seizure"));
    }

    registry.register(ctx.activate(
        SEIZURE,
        "febrile_seizure",
        Status::Active,
        Priority::Normal,
        "Active: seizure with fever",
    )?);
    registry.register(ctx.activate(
        SEIZURE,
        "meningitis",
        Status::Active,
        priority_if(p.neck_stiffness || p.altered_mental_status),
        "Active: seizure (meningitis evaluated in parallel)",
    )?);
    Ok(RuleTraceRow::fired(SEIZURE, "febrile_seizure + meningitis"))
}

fn meningitis_rules(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if p.neck_stiffness || p.altered_mental_status {
        registry.register(ctx.activate(
            MENINGITIS_DIRECT,
            "meningitis",
            Status::Active,
            Priority::High,
            "Active: neck stiffness or altered mental status",
        )?);
        return Ok(RuleTraceRow::fired(
            MENINGITIS_DIRECT,
            "neck_stiffness OR altered_mental_status",
        ));
    }

    if p.severe_headache {
        registry.register(ctx.activate(
            MENINGITIS_HEADACHE,
            "meningitis",
            Status::Consider,
            Priority::Normal,
            "Consider: severe headache without meningeal signs",
        )?);
        return Ok(RuleTraceRow::fired(
            MENINGITIS_HEADACHE,
            "severe_headache only",
        ));
    }

    Ok(RuleTraceRow::skipped(
        MENINGITIS,
        "No meningeal signs or severe headache",
    ))
}

fn ili_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    if !ctx.profile.influenza_like_illness {
        return Ok(RuleTraceRow::skipped(ILI, "No influenza-like illness"));
    }

    for pathway in ["influenza", "covid"] {
        registry.register(ctx.activate(
            ILI,
            pathway,
            Status::Active,
            Priority::Normal,
            "Active: influenza-like illness",
        )?);
    }
    Ok(RuleTraceRow::fired(ILI, "influenza + covid"))
}

fn pharyngitis_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !p.sore_throat {
        return Ok(RuleTraceRow::skipped(
            PHARYNGITIS,
            "No sore throat; Centor not scored",
        ));
    }

    let centor = compute_centor_score(&CentorInput {
        age_years: ctx.facts.age_years,
        tonsillar_exudate_or_swelling: p.centor_exudate_or_swelling,
        tender_anterior_cervical_nodes: p.centor_tender_anterior_cervical_nodes,
        fever_gt_38: p.centor_fever_gt_38,
        cough_absent: p.centor_cough_absent,
    });
    let score = centor.score;
    if score < 2 {
        return Ok(RuleTraceRow::skipped(
            PHARYNGITIS,
            format!("Centor score {score} below 2"),
        ));
    }

    registry.register(ctx.activate(
        PHARYNGITIS,
        "pharyngitis",
        Status::Active,
        Priority::Normal,
        format!(
            "Centor score {score} (>=2): consider strep testing; Centor breakdown: {}",
            centor.breakdown_summary()
        ),
    )?);
    Ok(RuleTraceRow::fired(
        PHARYNGITIS,
        format!("Centor score {score} >=2"),
    ))
}

fn rash_module(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    match ctx.profile.rash_pattern {
        None => Ok(RuleTraceRow::skipped(RASH, "No rash pattern")),
        Some(RashPattern::Scaly) => scaly_rash(ctx, registry),
        Some(RashPattern::Maculopapular) => maculopapular_rash(ctx, registry),
        Some(RashPattern::Vesicular) => {
            registry.note(Activation::note(
                "vesicular_lesions_algorithm",
                "See Vesicular Lesions Algorithm",
                Priority::Normal,
                "Vesicular rash; follow the vesicular lesions algorithm.",
            ));
            Ok(RuleTraceRow::fired(
                RASH_VESICULAR,
                "Vesicular lesions referral noted",
            ))
        }
    }
}

fn scaly_rash(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if p.herald_patch_christmas_tree {
        registry.note(Activation::note(
            "pityriasis_rosea",
            "Pityriasis Rosea",
            Priority::Normal,
            "Herald patch followed by Christmas-tree distribution; supportive care.",
        ));
    }
    if p.sandpaper_rash_after_strep {
        registry.note(Activation::note(
            "scarlet_fever",
            "Scarlet Fever",
            Priority::Normal,
            "Diffuse sandpaper rash after strep pharyngitis.",
        ));
        registry.register(ctx.activate(
            RASH_SCALY,
            "pharyngitis",
            Status::Active,
            Priority::Normal,
            "Active: scarlet fever pattern implies strep pharyngitis",
        )?);
    }
    Ok(RuleTraceRow::fired(RASH_SCALY, "Scaly rash evaluated"))
}

fn maculopapular_rash(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    match p.rash_distribution {
        Some(RashDistribution::NoSetPattern) => {
            if p.high_fever && p.conjunctivitis && p.strawberry_tongue && p.fissured_lips {
                registry.register(ctx.activate(
                    RASH_MACULOPAPULAR,
                    "kawasaki",
                    Status::Active,
                    Priority::High,
                    "Active: maculopapular rash without set pattern, high fever, conjunctivitis, strawberry tongue, fissured lips",
                )?);
            } else {
                registry.note(Activation::note(
                    "other_viral_exanthem",
                    "Other Viral Exanthem",
                    Priority::Normal,
                    "Maculopapular rash without set pattern or Kawasaki cluster.",
                ));
            }
        }
        Some(RashDistribution::TrunkToFaceExtremities) => {
            if p.high_fever_3_4_days_before_rash {
                registry.note(Activation::note(
                    "roseola",
                    "Roseola",
                    Priority::Normal,
                    "Rash spreading trunk to face and extremities after 3-4 days of high fever.",
                ));
            }
        }
        Some(RashDistribution::HeadToToes) => {
            if p.posterior_auricular_lymphadenopathy {
                registry.note(Activation::note(
                    "rubella",
                    "Rubella",
                    Priority::Normal,
                    "Head-to-toe rash with posterior auricular lymphadenopathy.",
                ));
            }
            if p.slapped_cheek {
                registry.note(Activation::note(
                    "erythema_infectiosum",
                    "Erythema Infectiosum",
                    Priority::Normal,
                    "Head-to-toe rash with slapped-cheek appearance.",
                ));
            }
            if p.cough && p.coryza && p.conjunctivitis && p.koplik_spots {
                registry.note(Activation::note(
                    "measles",
                    "Measles",
                    Priority::High,
                    "Head-to-toe rash with cough, coryza, conjunctivitis, and Koplik spots.",
                ));
            }
        }
        None => {}
    }

    let distribution = p
        .rash_distribution
        .map(RashDistribution::label)
        .unwrap_or("no_distribution");
    Ok(RuleTraceRow::fired(
        RASH_MACULOPAPULAR,
        format!("Maculopapular rash evaluated ({distribution})"),
    ))
}

fn bronchiolitis_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.respiratory_distress || p.hypoxia || p.wheeze) {
        return Ok(RuleTraceRow::skipped(BRONCHIOLITIS, "No lower airway signs"));
    }

    registry.register(ctx.activate(
        BRONCHIOLITIS,
        "bronchiolitis",
        Status::Active,
        priority_if(p.respiratory_distress || p.hypoxia),
        "Active: respiratory distress, hypoxia, or wheeze",
    )?);
    Ok(RuleTraceRow::fired(
        BRONCHIOLITIS,
        "respiratory_distress OR hypoxia OR wheeze",
    ))
}

fn pneumonia_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.respiratory_distress || p.hypoxia || p.cough) {
        return Ok(RuleTraceRow::skipped(PNEUMONIA, "No pneumonia trigger"));
    }

    let reason = if p.hypoxia {
        "Active: hypoxia"
    } else {
        "Consider: respiratory distress or cough"
    };
    registry.register(ctx.activate(
        PNEUMONIA,
        "pneumonia",
        status_if(p.hypoxia),
        priority_if(p.hypoxia),
        reason,
    )?);
    Ok(RuleTraceRow::fired(
        PNEUMONIA,
        "respiratory_distress OR hypoxia OR cough",
    ))
}

fn croup_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    let upper_airway = p.stridor || p.barky_cough;
    let young_in_distress = p.respiratory_distress && p.age_days <= CROUP_MAX_AGE_DAYS;
    if !(upper_airway || young_in_distress) {
        return Ok(RuleTraceRow::skipped(CROUP, "No croup trigger"));
    }

    registry.register(ctx.activate(
        CROUP,
        "croup",
        status_if(upper_airway),
        priority_if(p.respiratory_distress),
        "Stridor, barky cough, or respiratory distress under 6 years",
    )?);
    Ok(RuleTraceRow::fired(
        CROUP,
        "stridor OR barky_cough OR respiratory_distress (age <= 6y)",
    ))
}

fn orbital_preseptal_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.eye_swelling || p.periorbital_erythema) {
        return Ok(RuleTraceRow::skipped(ORBITAL, "No periorbital findings"));
    }

    registry.register(ctx.activate(
        ORBITAL,
        "orbital_preseptal_cellulitis",
        Status::Active,
        priority_if(p.eye_swelling && p.pain_with_eom),
        "Active: eye swelling or periorbital erythema",
    )?);
    Ok(RuleTraceRow::fired(
        ORBITAL,
        "eye_swelling OR periorbital_erythema",
    ))
}

fn neck_space_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.drooling || p.muffled_voice || p.trismus) {
        return Ok(RuleTraceRow::skipped(NECK_SPACE, "No deep neck signs"));
    }

    registry.register(ctx.activate(
        NECK_SPACE,
        "neck_space_infection",
        Status::Active,
        priority_if(p.drooling && (p.muffled_voice || p.trismus)),
        "Active: drooling, muffled voice, or trismus",
    )?);
    Ok(RuleTraceRow::fired(
        NECK_SPACE,
        "drooling OR muffled_voice OR trismus",
    ))
}

fn gastro_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if p.severe_focal_abdominal_pain {
        registry.note(Activation::note(
            "consider_surgical_abdomen",
            "Consider Surgical Abdomen",
            Priority::High,
            "Consider: severe focal abdominal pain",
        ));
        return Ok(RuleTraceRow::skipped(
            GASTRO,
            "Severe focal abdominal pain; surgical abdomen noted instead of gastroenteritis",
        ));
    }

    if !(p.vomiting || p.diarrhea) {
        return Ok(RuleTraceRow::skipped(GASTRO, "No vomiting or diarrhea"));
    }

    registry.register(ctx.activate(
        GASTRO,
        "gastroenteritis",
        Status::Active,
        Priority::Normal,
        "Active: vomiting or diarrhea without severe focal abdominal pain",
    )?);
    Ok(RuleTraceRow::fired(GASTRO, "vomiting OR diarrhea"))
}

fn cellulitis_abscess_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    let local_signs = p.warmth_or_tenderness || p.fluctuance_or_purulence || p.localized_swelling;
    if !(p.localized_erythema && local_signs) {
        return Ok(RuleTraceRow::skipped(
            CELLULITIS,
            "No localized erythema with local signs",
        ));
    }

    registry.register(ctx.activate(
        CELLULITIS,
        "cellulitis_abscess",
        Status::Active,
        Priority::Normal,
        "Active: localized erythema with warmth, fluctuance, or swelling",
    )?);
    Ok(RuleTraceRow::fired(
        CELLULITIS,
        "localized_erythema + local signs",
    ))
}

fn osteomyelitis_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.joint_pain || p.limp || p.refusal_to_bear_weight) {
        return Ok(RuleTraceRow::skipped(
            OSTEOMYELITIS,
            "No musculoskeletal trigger",
        ));
    }

    registry.register(ctx.activate(
        OSTEOMYELITIS,
        "osteomyelitis",
        Status::Active,
        priority_if(p.refusal_to_bear_weight),
        "Active: joint pain, limp, or refusal to bear weight",
    )?);
    Ok(RuleTraceRow::fired(
        OSTEOMYELITIS,
        "joint_pain OR limp OR refusal_to_bear_weight",
    ))
}

fn kawasaki_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    let kd = ctx.facts.kd_count;
    let mut findings = Vec::new();

    if p.age_days >= ctx.spec.age_cutoffs.kawasaki_min_days && p.fever_days >= 5 {
        if kd >= 4 {
            registry.register(ctx.activate(
                KAWASAKI,
                "kawasaki",
                Status::Active,
                Priority::High,
                format!("Active: fever {} days with {kd} principal KD features", p.fever_days),
            )?);
            findings.push("ACTIVE (KD features >=4)");
        } else if kd >= 2 {
            registry.register(ctx.activate(
                KAWASAKI,
                "kawasaki",
                Status::Consider,
                Priority::Normal,
                format!(
                    "Consider incomplete KD: fever {} days with {kd} principal features",
                    p.fever_days
                ),
            )?);
            findings.push("CONSIDER (KD features 2-3)");
        }
    }

    if p.fever_days >= 3 && kd >= 1 {
        registry.register(ctx.activate(
            KAWASAKI,
            "kawasaki",
            Status::Consider,
            Priority::Normal,
            "Consider KD: fever >=3 days with a principal feature",
        )?);
        findings.push("CONSIDER (fever >=3d + principal feature)");
    }

    if p.is_at_most_months_old(KAWASAKI_INFANT_MAX_MONTHS)
        && p.fever_days >= 7
        && p.fever_without_source
    {
        registry.register(ctx.activate(
            KAWASAKI,
            "kawasaki",
            Status::Consider,
            Priority::Normal,
            "Consider KD: infant <=6 months with >=7 days unexplained fever",
        )?);
        findings.push("CONSIDER (infant <=6mo + >=7d unexplained fever)");
    }

    if findings.is_empty() {
        return Ok(RuleTraceRow::skipped(
            KAWASAKI,
            format!("No KD criteria met (fever {} days, {kd} features)", p.fever_days),
        ));
    }
    Ok(RuleTraceRow::fired(KAWASAKI, findings.join("; ")))
}

fn uti_symptom_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    let p = ctx.profile;
    if !(p.dysuria || p.flank_pain || p.fever_without_source) {
        return Ok(RuleTraceRow::skipped(UTI_SYMPTOM, "No urinary trigger"));
    }

    registry.register(ctx.activate(
        UTI_SYMPTOM,
        "uti",
        Status::Active,
        Priority::Normal,
        "Active: dysuria, flank pain, or fever without source",
    )?);
    Ok(RuleTraceRow::fired(
        UTI_SYMPTOM,
        "dysuria OR flank_pain OR fever_without_source",
    ))
}

fn uticalc_rule(ctx: &RuleContext<'_>, registry: &mut ActivationRegistry) -> RuleResult {
    match ctx.facts.uticalc {
        UticalcStatus::NotProvided => Ok(RuleTraceRow::skipped(
            UTICALC,
            "UTICalc inputs not provided",
        )),
        UticalcStatus::OutOfRange { age_months } => Ok(RuleTraceRow::skipped(
            UTICALC,
            format!("Age {age_months:.1} months outside 2-24"),
        )),
        UticalcStatus::Scored(percent) if percent < UTICALC_THRESHOLD_PERCENT => Ok(
            RuleTraceRow::skipped(UTICALC, format!("UTICalc {percent:.2}% below 2%")),
        ),
        UticalcStatus::Scored(percent) => {
            registry.register(ctx.activate(
                UTICALC,
                "uti",
                Status::Active,
                Priority::Normal,
                format!("Active – UA/UCx recommended (UTICalc ≥2%): {percent:.2}%"),
            )?);
            Ok(RuleTraceRow::fired(
                UTICALC,
                format!("UTICalc {percent:.2}% >= 2%"),
            ))
        }
    }
}
