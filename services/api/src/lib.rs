mod cli;
mod infra;
mod routes;
mod server;

use fleet_safety::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
