use crate::catalog::SortOrder;
use crate::domain::{Activation, Priority, RuleTraceRow, Source, Status};
use crate::engine::{PathwayRouter, PatientProfile, RouteResult};

pub(super) const YEAR_DAYS: u32 = 365;

pub(super) fn router() -> PathwayRouter {
    PathwayRouter::bundled().expect("bundled configuration validates")
}

pub(super) fn child(age_years: u32) -> PatientProfile {
    PatientProfile {
        age_days: age_years * YEAR_DAYS,
        ..Default::default()
    }
}

pub(super) fn route(profile: &PatientProfile) -> RouteResult {
    router().route(profile).expect("profile routes")
}

pub(super) fn pathway<'a>(result: &'a RouteResult, id: &str) -> &'a Activation {
    result
        .pathways
        .iter()
        .find(|activation| activation.id == id)
        .unwrap_or_else(|| panic!("pathway {id} missing from {:?}", ids(result)))
}

pub(super) fn has_pathway(result: &RouteResult, id: &str) -> bool {
    result.pathways.iter().any(|activation| activation.id == id)
}

pub(super) fn ids(result: &RouteResult) -> Vec<&str> {
    result
        .pathways
        .iter()
        .map(|activation| activation.id.as_str())
        .collect()
}

pub(super) fn trace<'a>(result: &'a RouteResult, rule_id: &str) -> &'a RuleTraceRow {
    result
        .rule_trace
        .iter()
        .find(|row| row.rule_id == rule_id)
        .unwrap_or_else(|| panic!("trace row {rule_id} missing"))
}

pub(super) fn activation(
    id: &str,
    status: Status,
    priority: Priority,
    source: Source,
    reason: &str,
) -> Activation {
    Activation {
        id: id.to_string(),
        name: id.replace('_', " "),
        status,
        priority,
        reason: reason.to_string(),
        source,
    }
}

pub(super) fn default_order() -> SortOrder {
    SortOrder::default()
}
