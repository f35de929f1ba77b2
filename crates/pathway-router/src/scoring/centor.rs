use serde::{Deserialize, Serialize};

/// Inputs for the Modified Centor (McIsaac) pharyngitis score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CentorInput {
    pub age_years: f64,
    #[serde(default)]
    pub tonsillar_exudate_or_swelling: bool,
    #[serde(default)]
    pub tender_anterior_cervical_nodes: bool,
    #[serde(default)]
    pub fever_gt_38: bool,
    #[serde(default)]
    pub cough_absent: bool,
}

/// One row of the score breakdown. `points` keeps its sign even when the total is clamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CentorCriterion {
    pub name: &'static str,
    pub points: i8,
    pub rationale: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CentorScore {
    pub score: u8,
    pub probability_range: &'static str,
    pub recommendation: &'static str,
    pub breakdown: Vec<CentorCriterion>,
}

impl CentorScore {
    fn points_of(&self, name: &str) -> i8 {
        self.breakdown
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.points)
            .unwrap_or(0)
    }

    /// Compact signed summary, e.g. `Age(+1) Fever(+0) Nodes(+1) Cough absent(+1) Exudate(+0)`.
    pub fn breakdown_summary(&self) -> String {
        format!(
            "Age({:+}) Fever({:+}) Nodes({:+}) Cough absent({:+}) Exudate({:+})",
            self.points_of("Age"),
            self.points_of("Fever >38"),
            self.points_of("Ant cervical nodes"),
            self.points_of("Cough absent"),
            self.points_of("Exudate"),
        )
    }
}

// Half-open bands: [3, 15) and [15, 45) leave no gap for fractional ages.
fn age_points(age_years: f64) -> (i8, &'static str) {
    if age_years < 3.0 {
        (0, "Age <3 years (no age adjustment)")
    } else if age_years < 15.0 {
        (1, "Age 3-14 years")
    } else if age_years < 45.0 {
        (0, "Age 15-44 years")
    } else {
        (-1, "Age >=45 years")
    }
}

fn interpretation(score: u8) -> (&'static str, &'static str) {
    match score {
        0 => ("1-2.5%", "No further testing or antibiotics."),
        1 => ("5-10%", "No further testing or antibiotics."),
        2 => ("11-17%", "Optional rapid strep testing and/or culture."),
        3 => ("28-35%", "Consider rapid strep testing and/or culture."),
        _ => (
            "51-53%",
            "Consider rapid strep testing and/or culture. Empiric antibiotics may be appropriate depending on the specific scenario.",
        ),
    }
}

fn criterion(
    name: &'static str,
    present: bool,
    rationale: &'static str,
    absent: &'static str,
) -> CentorCriterion {
    CentorCriterion {
        name,
        points: i8::from(present),
        rationale: if present { rationale } else { absent },
    }
}

pub fn compute_centor_score(input: &CentorInput) -> CentorScore {
    let (age_pts, age_rationale) = age_points(input.age_years);

    let breakdown = vec![
        CentorCriterion {
            name: "Age",
            points: age_pts,
            rationale: age_rationale,
        },
        criterion(
            "Exudate",
            input.tonsillar_exudate_or_swelling,
            "Tonsillar exudate or swelling present",
            "Not present",
        ),
        criterion(
            "Ant cervical nodes",
            input.tender_anterior_cervical_nodes,
            "Tender/swollen anterior cervical lymph nodes present",
            "Not present",
        ),
        criterion(
            "Fever >38",
            input.fever_gt_38,
            "Temperature >38C / 100.4F",
            "Not present",
        ),
        criterion(
            "Cough absent",
            input.cough_absent,
            "Cough absent",
            "Cough present",
        ),
    ];

    let raw: i16 = breakdown.iter().map(|row| i16::from(row.points)).sum();
    let score = raw.max(0) as u8;
    let (probability_range, recommendation) = interpretation(score);

    CentorScore {
        score,
        probability_range,
        recommendation,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(age_years: f64) -> CentorInput {
        CentorInput {
            age_years,
            tonsillar_exudate_or_swelling: false,
            tender_anterior_cervical_nodes: false,
            fever_gt_38: false,
            cough_absent: false,
        }
    }

    fn age_row(score: &CentorScore) -> &CentorCriterion {
        score
            .breakdown
            .iter()
            .find(|row| row.name == "Age")
            .expect("age row present")
    }

    #[test]
    fn age_bands_cover_boundaries() {
        let cases = [
            (1.0, 0),
            (2.99, 0),
            (3.0, 1),
            (14.0, 1),
            (14.5, 1),
            (15.0, 0),
            (44.0, 0),
            (44.5, 0),
            (45.0, -1),
        ];
        for (age, expected) in cases {
            let score = compute_centor_score(&bare(age));
            assert_eq!(age_row(&score).points, expected, "age {age}");
        }
    }

    #[test]
    fn total_is_clamped_but_breakdown_keeps_sign() {
        let score = compute_centor_score(&bare(50.0));
        assert_eq!(score.score, 0);
        assert_eq!(age_row(&score).points, -1);
        assert_eq!(score.probability_range, "1-2.5%");
        assert_eq!(score.recommendation, "No further testing or antibiotics.");
    }

    #[test]
    fn score_of_two_maps_to_optional_testing() {
        let score = compute_centor_score(&CentorInput {
            tonsillar_exudate_or_swelling: true,
            tender_anterior_cervical_nodes: true,
            ..bare(25.0)
        });
        assert_eq!(score.score, 2);
        assert_eq!(score.probability_range, "11-17%");
        assert_eq!(
            score.recommendation,
            "Optional rapid strep testing and/or culture."
        );
    }

    #[test]
    fn four_or_more_uses_highest_band() {
        let score = compute_centor_score(&CentorInput {
            age_years: 10.0,
            tonsillar_exudate_or_swelling: true,
            tender_anterior_cervical_nodes: true,
            fever_gt_38: true,
            cough_absent: true,
        });
        assert_eq!(score.score, 5);
        assert_eq!(score.probability_range, "51-53%");
        assert!(score
            .recommendation
            .contains("Empiric antibiotics may be appropriate"));
    }

    #[test]
    fn breakdown_order_is_fixed() {
        let score = compute_centor_score(&bare(8.0));
        let names: Vec<_> = score.breakdown.iter().map(|row| row.name).collect();
        assert_eq!(
            names,
            ["Age", "Exudate", "Ant cervical nodes", "Fever >38", "Cough absent"]
        );
        assert_eq!(score.breakdown[4].rationale, "Cough present");
    }

    #[test]
    fn summary_reports_signed_points() {
        let score = compute_centor_score(&CentorInput {
            cough_absent: true,
            ..bare(50.0)
        });
        assert_eq!(
            score.breakdown_summary(),
            "Age(-1) Fever(+0) Nodes(+0) Cough absent(+1) Exudate(+0)"
        );
    }
}
