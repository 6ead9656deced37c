mod cli;
mod infra;
mod routes;
mod server;

use surveypulse::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
