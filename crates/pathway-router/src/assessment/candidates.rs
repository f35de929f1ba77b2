//! Scoring table for common febrile diagnoses.

const SUPPORT_WEIGHT: f64 = 1.8;
const OPPOSE_WEIGHT: f64 = 1.0;
const AGE_PENALTY: f64 = 3.0;
const FEVER_PENALTY: f64 = 2.0;
const REQUIRED_PENALTY: f64 = 2.5;

/// One diagnosis in the common differential. Terms match case-insensitively as substrings of
/// the supplied findings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Candidate {
    pub name: &'static str,
    pub base: f64,
    pub supports: &'static [&'static str],
    pub opposes: &'static [&'static str],
    /// Inclusive band in months.
    pub age_months: Option<(f64, f64)>,
    /// Inclusive band in days.
    pub fever_days: Option<(u32, u32)>,
    /// At least one must be present or the candidate is penalized.
    pub requires_any: &'static [&'static str],
    pub workup: &'static [&'static str],
    pub management: &'static [&'static str],
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ScoredCandidate {
    pub candidate: &'static Candidate,
    pub score: f64,
}

/// Lower-cased findings with substring lookup.
pub(crate) struct Findings {
    items: Vec<String>,
}

impl Findings {
    pub fn new<'a>(raw: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            items: raw
                .into_iter()
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }

    pub fn mentions(&self, term: &str) -> bool {
        self.items.iter().any(|item| item.contains(term))
    }

    pub fn mentions_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| self.mentions(term))
    }

    fn count(&self, terms: &[&str]) -> usize {
        terms.iter().filter(|term| self.mentions(term)).count()
    }
}

impl Candidate {
    pub fn score(&self, findings: &Findings, age_months: f64, fever_days: u32) -> f64 {
        let mut score = self.base;
        score += SUPPORT_WEIGHT * findings.count(self.supports) as f64;
        score -= OPPOSE_WEIGHT * findings.count(self.opposes) as f64;

        if let Some((low, high)) = self.age_months {
            if !(low..=high).contains(&age_months) {
                score -= AGE_PENALTY;
            }
        }
        if let Some((low, high)) = self.fever_days {
            if !(low..=high).contains(&fever_days) {
                score -= FEVER_PENALTY;
            }
        }
        if !self.requires_any.is_empty() && !findings.mentions_any(self.requires_any) {
            score -= REQUIRED_PENALTY;
        }
        score
    }
}

pub(crate) static COMMON_CANDIDATES: &[Candidate] = &[
    Candidate {
        name: "Viral upper respiratory infection",
        base: 2.0,
        supports: &["cough", "runny nose", "congestion", "sore throat"],
        opposes: &["wheeze", "stridor"],
        age_months: None,
        fever_days: Some((0, 5)),
        requires_any: &["cough", "runny nose", "congestion", "sore throat"],
        workup: &[],
        management: &["Supportive care: fluids, antipyretics, nasal saline"],
    },
    Candidate {
        name: "Acute otitis media",
        base: 1.0,
        supports: &["ear pain", "ear tugging", "bulging tympanic membrane", "irritability"],
        opposes: &[],
        age_months: Some((6.0, 120.0)),
        fever_days: None,
        requires_any: &["ear", "tympanic"],
        workup: &["Otoscopic examination"],
        management: &["Analgesia; amoxicillin if criteria for antibiotics are met"],
    },
    Candidate {
        name: "Group A streptococcal pharyngitis",
        base: 1.0,
        supports: &[
            "sore throat",
            "lymph node",
            "tonsillar exudate",
            "headache",
            "abdominal pain",
            "sandpaper rash",
        ],
        opposes: &["cough", "runny nose", "congestion", "hoarse"],
        age_months: Some((36.0, 216.0)),
        fever_days: Some((0, 7)),
        requires_any: &["sore throat"],
        workup: &["Rapid strep test (throat culture if negative)"],
        management: &["Amoxicillin if strep test positive; analgesia"],
    },
    Candidate {
        name: "Bronchiolitis",
        base: 1.5,
        supports: &[
            "cough",
            "wheeze",
            "runny nose",
            "congestion",
            "retractions",
            "tachypnea",
        ],
        opposes: &["stridor"],
        age_months: Some((0.0, 24.0)),
        fever_days: None,
        requires_any: &["wheeze", "cough", "retractions"],
        workup: &["Pulse oximetry; no routine labs or chest radiograph"],
        management: &["Supportive care: nasal suction, hydration, oxygen if SpO2 below 90%"],
    },
    Candidate {
        name: "Community-acquired pneumonia",
        base: 0.8,
        supports: &[
            "cough",
            "tachypnea",
            "crackles",
            "difficulty breathing",
            "chest pain",
            "hypoxia",
        ],
        opposes: &["wheeze"],
        age_months: None,
        fever_days: Some((2, 14)),
        requires_any: &["cough", "tachypnea", "crackles", "difficulty breathing"],
        workup: &["Chest radiograph if moderate illness or hypoxia"],
        management: &["High-dose amoxicillin if bacterial pneumonia suspected"],
    },
    Candidate {
        name: "Croup",
        base: 0.8,
        supports: &["barky cough", "stridor", "hoarse"],
        opposes: &[],
        age_months: Some((6.0, 72.0)),
        fever_days: Some((0, 4)),
        requires_any: &["barky", "stridor"],
        workup: &[],
        management: &["Dexamethasone; nebulized epinephrine for stridor at rest"],
    },
    Candidate {
        name: "Viral gastroenteritis",
        base: 1.2,
        supports: &["vomiting", "diarrhea", "abdominal pain"],
        opposes: &["bloody stool", "severe abdominal pain"],
        age_months: None,
        fever_days: Some((0, 5)),
        requires_any: &["vomiting", "diarrhea"],
        workup: &["Assess hydration status"],
        management: &["Oral rehydration; ondansetron for persistent vomiting"],
    },
    Candidate {
        name: "Influenza",
        base: 0.8,
        supports: &["cough", "myalgia", "body aches", "headache", "sore throat"],
        opposes: &[],
        age_months: None,
        fever_days: Some((0, 7)),
        requires_any: &["cough", "myalgia", "body aches"],
        workup: &["Influenza testing if it changes management"],
        management: &["Oseltamivir for high-risk children or within 48 hours of onset"],
    },
    Candidate {
        name: "Hand, foot, and mouth disease",
        base: 0.6,
        supports: &["mouth sores", "oral ulcers", "rash on hands", "vesicles"],
        opposes: &[],
        age_months: Some((6.0, 84.0)),
        fever_days: Some((0, 5)),
        requires_any: &["mouth", "vesicle", "hand"],
        workup: &[],
        management: &["Supportive care; encourage oral fluids"],
    },
    Candidate {
        name: "Roseola",
        base: 0.5,
        supports: &["rash after fever", "irritability"],
        opposes: &[],
        age_months: Some((6.0, 36.0)),
        fever_days: Some((3, 5)),
        requires_any: &["rash"],
        workup: &[],
        management: &["Supportive care; reassurance"],
    },
    Candidate {
        name: "Urinary tract infection",
        base: 1.0,
        supports: &[
            "dysuria",
            "urinary frequency",
            "flank pain",
            "foul-smelling urine",
            "fever without source",
        ],
        opposes: &[],
        age_months: None,
        fever_days: None,
        requires_any: &[
            "dysuria",
            "urinary frequency",
            "flank pain",
            "foul-smelling urine",
            "fever without source",
        ],
        workup: &["Urinalysis and urine culture"],
        management: &["Oral cephalosporin if urinalysis suggests UTI"],
    },
    Candidate {
        name: "Nonspecific viral syndrome",
        base: 1.0,
        supports: &["fatigue", "decreased appetite", "myalgia"],
        opposes: &[],
        age_months: None,
        fever_days: Some((0, 4)),
        requires_any: &[],
        workup: &[],
        management: &["Supportive care and return precautions"],
    },
];
