use metrics_exporter_prometheus::PrometheusHandle;
use pathway_router::error::AppError;
use pathway_router::scoring::{
    uticalc_pretest_percent, within_age_range, PretestInput, UTICALC_THRESHOLD_PERCENT,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// UTICalc result shared by the CLI and the HTTP endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct UticalcReport {
    pub(crate) age_months: f64,
    pub(crate) age_in_range: bool,
    pub(crate) pretest_percent: Option<f64>,
    pub(crate) testing_recommended: bool,
}

impl UticalcReport {
    pub(crate) fn compute(input: &PretestInput) -> Result<Self, AppError> {
        let pretest_percent = uticalc_pretest_percent(input)?;
        Ok(Self {
            age_months: input.age_months,
            age_in_range: within_age_range(input.age_months),
            pretest_percent,
            testing_recommended: pretest_percent
                .is_some_and(|percent| percent >= UTICALC_THRESHOLD_PERCENT),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathway_router::engine::UticalcFindings;
    use pathway_router::{route_patient, PathwayRouter, PatientProfile};

    fn input(age_months: f64, sex: &str) -> PretestInput {
        PretestInput {
            age_months,
            sex: sex.to_string(),
            circumcised: None,
            other_source: false,
            tmax_ge_39: Some(true),
            tmax_c: None,
        }
    }

    #[test]
    fn out_of_range_age_reports_no_percent() {
        let report = UticalcReport::compute(&input(30.0, "female")).expect("scores");
        assert!(!report.age_in_range);
        assert_eq!(report.pretest_percent, None);
        assert!(!report.testing_recommended);
    }

    #[test]
    fn testing_recommendation_matches_the_engine() {
        let router = PathwayRouter::bundled().expect("bundled configuration validates");
        // 2.45% and 0.79% straddle the threshold for circumcised boys with fever >= 39.
        for (age_months, expected) in [(10.0, true), (18.0, false)] {
            let report = UticalcReport::compute(&PretestInput {
                circumcised: Some(true),
                ..input(age_months, "male")
            })
            .expect("scores");
            assert_eq!(report.testing_recommended, expected, "{age_months} months");

            let routed = route_patient(
                &router,
                &PatientProfile {
                    age_days: (age_months * 30.4375) as u32,
                    age_months: Some(age_months),
                    uticalc: Some(UticalcFindings {
                        sex: Some("male".to_string()),
                        circumcised: Some(true),
                        tmax_ge_39: Some(true),
                        other_source: Some(false),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            )
            .expect("routes");
            assert_eq!(routed.uticalc_pretest_percent, report.pretest_percent);
            let uti_active = routed.pathways.iter().any(|entry| entry.id == "uti");
            assert_eq!(uti_active, report.testing_recommended, "{age_months} months");
        }
    }

    #[test]
    fn male_without_circumcision_status_is_rejected() {
        let err = UticalcReport::compute(&input(10.0, "male")).expect_err("rejected");
        assert!(err.is_input_error());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_json_file::<serde_json::Value>(Path::new("does/not/exist.json"))
            .expect_err("missing file");
        assert!(matches!(err, AppError::Io(_)));
    }
}
