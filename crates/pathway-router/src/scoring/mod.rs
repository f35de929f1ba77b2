//! Stateless clinical scores consumed by the routing rules.

pub mod centor;
pub mod uticalc;

pub use centor::{compute_centor_score, CentorCriterion, CentorInput, CentorScore};
pub use uticalc::{
    uticalc_pretest_percent, within_age_range, PretestInput, Sex, UTICALC_THRESHOLD_PERCENT,
};

/// Rejected scorer input. Never defaulted: guessing sex or circumcision status changes the
/// risk table row that is read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("sex must be 'female' or 'male' (got '{0}')")]
    InvalidSex(String),
    #[error("sex must be provided when UTICalc inputs are supplied")]
    MissingSex,
    #[error("circumcised must be provided for male sex")]
    MissingCircumcision,
}
