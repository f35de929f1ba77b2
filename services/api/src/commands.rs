use crate::infra::{read_json_file, UticalcReport};
use clap::Args;
use pathway_router::config::AppConfig;
use pathway_router::engine::standard_rules;
use pathway_router::error::AppError;
use pathway_router::scoring::{
    compute_centor_score, CentorInput, PretestInput, UTICALC_THRESHOLD_PERCENT,
};
use pathway_router::telemetry;
use pathway_router::{
    generate_assessment, route_patient, Assessment, AssessmentRequest, PatientProfile,
    RouteResult,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RouteArgs {
    /// Patient profile JSON file
    #[arg(long)]
    pub(crate) profile: PathBuf,
    /// Include the per-rule trace in the output
    #[arg(long)]
    pub(crate) trace: bool,
    /// Print the raw JSON result instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Assessment request JSON file
    #[arg(long)]
    pub(crate) request: PathBuf,
    /// Print the raw JSON result instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CentorArgs {
    /// Age in years
    #[arg(long)]
    pub(crate) age_years: f64,
    /// Tonsillar exudate or swelling
    #[arg(long)]
    pub(crate) exudate: bool,
    /// Tender or swollen anterior cervical nodes
    #[arg(long)]
    pub(crate) nodes: bool,
    /// Temperature above 38 C
    #[arg(long)]
    pub(crate) fever: bool,
    /// Cough absent
    #[arg(long)]
    pub(crate) cough_absent: bool,
}

#[derive(Args, Debug)]
pub(crate) struct UticalcArgs {
    /// Age in months (UTICalc applies to 2-24)
    #[arg(long)]
    pub(crate) age_months: f64,
    /// female or male
    #[arg(long)]
    pub(crate) sex: String,
    /// Required for male patients
    #[arg(long)]
    pub(crate) circumcised: Option<bool>,
    /// Maximum recorded temperature in Celsius
    #[arg(long)]
    pub(crate) tmax_c: Option<f64>,
    /// Another source of fever was identified
    #[arg(long)]
    pub(crate) other_source: bool,
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;

    let profile: PatientProfile = read_json_file(&args.profile)?;
    let router = config.load_router()?;
    let result = route_patient(&router, &profile)?;

    if args.json {
        return print_json(&result);
    }
    render_route(&result, args.trace);
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;

    let request: AssessmentRequest = read_json_file(&args.request)?;
    let assessment = generate_assessment(&request);

    if args.json {
        return print_json(&assessment);
    }
    render_assessment(&assessment);
    Ok(())
}

pub(crate) fn run_centor(args: CentorArgs) -> Result<(), AppError> {
    let score = compute_centor_score(&CentorInput {
        age_years: args.age_years,
        tonsillar_exudate_or_swelling: args.exudate,
        tender_anterior_cervical_nodes: args.nodes,
        fever_gt_38: args.fever,
        cough_absent: args.cough_absent,
    });

    println!("Centor score {} ({})", score.score, score.probability_range);
    println!("Recommendation: {}", score.recommendation);
    for criterion in &score.breakdown {
        println!(
            "  - {}: {:+} ({})",
            criterion.name, criterion.points, criterion.rationale
        );
    }
    Ok(())
}

pub(crate) fn run_uticalc(args: UticalcArgs) -> Result<(), AppError> {
    let report = UticalcReport::compute(&PretestInput {
        age_months: args.age_months,
        sex: args.sex,
        circumcised: args.circumcised,
        other_source: args.other_source,
        tmax_ge_39: None,
        tmax_c: args.tmax_c,
    })?;

    match report.pretest_percent {
        Some(percent) => {
            println!("UTICalc pretest probability {percent:.2}%");
            if report.testing_recommended {
                println!("UA/UCx recommended (>= {UTICALC_THRESHOLD_PERCENT}%)");
            } else {
                println!("Below the {UTICALC_THRESHOLD_PERCENT}% testing threshold");
            }
        }
        None => println!(
            "UTICalc not applicable at {:.1} months (valid for 2-24)",
            report.age_months
        ),
    }
    Ok(())
}

pub(crate) fn run_validate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_for_cli(&config.telemetry)?;
    let router = config.load_router()?;

    println!(
        "Configuration valid: {} pathways, {} rules, {} forced critical pathways",
        router.catalog().len(),
        standard_rules().len(),
        router
            .spec()
            .critical_overrides
            .forced_critical_pathways
            .len()
    );
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_route(result: &RouteResult, include_trace: bool) {
    if result.pathways.is_empty() {
        println!("No pathways activated");
    } else {
        println!("Pathways ({})", result.pathways.len());
        for activation in &result.pathways {
            println!(
                "- [{}] {} {} ({})",
                activation.priority.label(),
                activation.status.label(),
                activation.name,
                activation.id
            );
            if !activation.reason.is_empty() {
                println!("    {}", activation.reason);
            }
        }
    }

    if let Some(percent) = result.uticalc_pretest_percent {
        println!("UTICalc pretest probability: {percent:.2}%");
    }

    let flags: Vec<&str> = result.critical_flags.set_flags().collect();
    if !flags.is_empty() {
        println!("Critical flags: {}", flags.join(", "));
    }

    if include_trace {
        println!("\nRule trace");
        for row in &result.rule_trace {
            let marker = if row.fired { "fired" } else { "skipped" };
            println!("  {:<36} {:<8} {}", row.rule_id, marker, row.details);
        }
    }
}

fn render_assessment(assessment: &Assessment) {
    let sections = [
        ("Cannot miss", &assessment.cannot_miss),
        ("Common", &assessment.common),
        ("Prolonged or special", &assessment.prolonged_or_special),
        ("Recommended workup", &assessment.recommended_workup),
        (
            "Recommended initial management",
            &assessment.recommended_initial_management,
        ),
    ];

    for (title, items) in sections {
        println!("{title}");
        if items.is_empty() {
            println!("  (none)");
        }
        for item in items.iter() {
            println!("  - {item}");
        }
    }
}
