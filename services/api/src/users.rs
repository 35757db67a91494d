use crate::infra::{open_store, parse_role};
use chrono::Duration;
use clap::Args;
use prefab_directory::accounts::{AccountService, Role, UserInput};
use prefab_directory::config::AppConfig;
use prefab_directory::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct CreateUserArgs {
    /// Login email for the new account
    #[arg(long)]
    pub(crate) email: String,
    /// Display name
    #[arg(long)]
    pub(crate) name: String,
    /// Initial password (at least 8 characters)
    #[arg(long)]
    pub(crate) password: String,
    /// Account role: admin or editor
    #[arg(long, default_value = "editor", value_parser = parse_role)]
    pub(crate) role: Role,
    /// Override DATABASE_PATH
    #[arg(long)]
    pub(crate) database: Option<String>,
}

pub(crate) fn run_create_user(args: CreateUserArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(database) = args.database {
        config.database.path = database;
    }

    let store = open_store(&config)?;
    let accounts = AccountService::new(store, Duration::hours(config.auth.session_ttl_hours));
    let user = accounts.create_user(UserInput {
        email: args.email,
        name: args.name,
        password: args.password,
        role: args.role,
    })?;

    println!(
        "Created {} account #{} for {} <{}>",
        user.role.label(),
        user.id.0,
        user.name,
        user.email
    );
    Ok(())
}
