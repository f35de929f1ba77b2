//! Rule evaluation: a profile goes in, a sorted list of pathway activations comes out.
//!
//! Every call builds its own [`ActivationRegistry`]; the router itself only holds the read-only
//! catalog and spec, so one instance can serve concurrent requests.

mod facts;
mod overrides;
pub mod profile;
mod registry;
pub mod rules;

#[cfg(test)]
mod tests;

pub use facts::{DerivedFacts, UticalcStatus};
pub use overrides::{CriticalFlags, OVERRIDE_NOTE};
pub use profile::{KdFeature, PatientProfile, RashDistribution, RashPattern, UticalcFindings};
pub use registry::ActivationRegistry;
pub use rules::{standard_rules, Rule, RuleContext};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{validate, CatalogError, PathwayCatalog, RouterSpec};
use crate::domain::{Activation, RuleTraceRow};
use crate::scoring::ScoringError;
use overrides::apply_overrides;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("rule {rule} references pathway '{pathway}' which is not in the catalog")]
    UnknownPathway { rule: String, pathway: String },
}

/// Engine output for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub pathways: Vec<Activation>,
    pub uticalc_pretest_percent: Option<f64>,
    pub critical_flags: CriticalFlags,
    pub rule_trace: Vec<RuleTraceRow>,
}

/// Registry and trace produced by a set of rules, before overrides and sorting.
#[derive(Debug, Clone)]
pub struct RuleEvaluation {
    pub facts: DerivedFacts,
    pub registry: ActivationRegistry,
    pub trace: Vec<RuleTraceRow>,
}

/// Validated catalog and router spec, shared read-only across routing calls.
#[derive(Debug, Clone)]
pub struct PathwayRouter {
    catalog: PathwayCatalog,
    spec: RouterSpec,
}

impl PathwayRouter {
    /// Refuses a catalog/spec pair that references unknown pathways or has a broken sort order.
    pub fn new(catalog: PathwayCatalog, spec: RouterSpec) -> Result<Self, CatalogError> {
        let issues = validate(&catalog, &spec, &rules::rule_references());
        if !issues.is_empty() {
            return Err(CatalogError::Inconsistent(issues));
        }
        Ok(Self { catalog, spec })
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::new(PathwayCatalog::bundled()?, RouterSpec::bundled()?)
    }

    pub fn catalog(&self) -> &PathwayCatalog {
        &self.catalog
    }

    pub fn spec(&self) -> &RouterSpec {
        &self.spec
    }

    pub fn route(&self, profile: &PatientProfile) -> Result<RouteResult, RoutingError> {
        let rules: Vec<&Rule> = standard_rules().iter().collect();
        let RuleEvaluation {
            facts,
            mut registry,
            mut trace,
        } = self.evaluate_rules(profile, &rules)?;

        trace.push(apply_overrides(
            &facts.critical,
            &self.spec.critical_overrides,
            &mut registry,
        ));

        let pathways = registry.into_sorted(&self.spec.sort_order);
        debug!(
            pathways = pathways.len(),
            critical = facts.critical.any(),
            "patient routed"
        );

        Ok(RouteResult {
            pathways,
            uticalc_pretest_percent: facts.uticalc.percent(),
            critical_flags: facts.critical,
            rule_trace: trace,
        })
    }

    /// Run `rules` in the given order against a fresh registry. No overrides, no sorting.
    pub fn evaluate_rules(
        &self,
        profile: &PatientProfile,
        rules: &[&Rule],
    ) -> Result<RuleEvaluation, RoutingError> {
        let facts = DerivedFacts::derive(profile, &self.spec)?;
        let ctx = RuleContext {
            profile,
            facts: &facts,
            catalog: &self.catalog,
            spec: &self.spec,
        };

        let mut registry = ActivationRegistry::new();
        let mut trace = Vec::with_capacity(rules.len() + 1);
        for rule in rules {
            let row = rule.apply(&ctx, &mut registry)?;
            if row.fired {
                debug!(rule = %row.rule_id, details = %row.details, "rule fired");
            }
            trace.push(row);
        }

        Ok(RuleEvaluation {
            facts,
            registry,
            trace,
        })
    }
}

/// Free-function form of [`PathwayRouter::route`].
pub fn route_patient(
    router: &PathwayRouter,
    profile: &PatientProfile,
) -> Result<RouteResult, RoutingError> {
    router.route(profile)
}
