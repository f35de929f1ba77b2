//! Pediatric fever pathway routing: UTICalc and Centor scorers, the pathway rule engine, and a
//! companion differential generator.

pub mod assessment;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod scoring;
pub mod telemetry;

pub use assessment::{generate_assessment, Assessment, AssessmentRequest};
pub use catalog::{PathwayCatalog, RouterSpec};
pub use domain::{Activation, Priority, RuleTraceRow, Source, Status};
pub use engine::{route_patient, PathwayRouter, PatientProfile, RouteResult, RoutingError};
