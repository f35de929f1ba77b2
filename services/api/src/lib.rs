mod cli;
mod commands;
mod infra;
mod routes;
mod server;

use pathway_router::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
