use crate::commands::{
    run_assess, run_centor, run_route, run_uticalc, run_validate, AssessArgs, CentorArgs,
    RouteArgs, UticalcArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pathway_router::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pediatric Fever Pathway Router",
    about = "Route febrile pediatric patients to clinical pathways from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Route a patient profile (JSON) and print the ranked pathways
    Route(RouteArgs),
    /// Build the companion differential for a free-text request (JSON)
    Assess(AssessArgs),
    /// Compute the Modified Centor (McIsaac) score
    Centor(CentorArgs),
    /// Compute the UTICalc pretest probability
    Uticalc(UticalcArgs),
    /// Load and cross-check the configured catalog and router spec
    Validate,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Route(args) => run_route(args),
        Command::Assess(args) => run_assess(args),
        Command::Centor(args) => run_centor(args),
        Command::Uticalc(args) => run_uticalc(args),
        Command::Validate => run_validate(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["pathway-router-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn uticalc_flags_parse() {
        let cli = Cli::try_parse_from([
            "pathway-router-api",
            "uticalc",
            "--age-months",
            "18",
            "--sex",
            "male",
            "--circumcised",
            "false",
            "--tmax-c",
            "39.2",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Uticalc(args)) => {
                assert_eq!(args.age_months, 18.0);
                assert_eq!(args.circumcised, Some(false));
                assert!(!args.other_source);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn route_requires_profile_path() {
        assert!(Cli::try_parse_from(["pathway-router-api", "route"]).is_err());
    }
}
