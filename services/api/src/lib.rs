mod cli;
mod infra;
mod routes;
mod seed;
mod server;
mod users;

use prefab_directory::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
