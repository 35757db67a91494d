use crate::seed::{run_seed, SeedArgs};
use crate::server;
use crate::users::{run_create_user, CreateUserArgs};
use clap::{Args, Parser, Subcommand};
use prefab_directory::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Prefab Directory",
    about = "Serve and administer the prefab home directory from the command line",
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
    /// Load demo manufacturers, models, a blog post, and a builder
    Seed(SeedArgs),
    /// Manage CMS accounts
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create an admin or editor account
    Create(CreateUserArgs),
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
        Command::Seed(args) => run_seed(args),
        Command::User {
            command: UserCommand::Create(args),
        } => run_create_user(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use prefab_directory::accounts::Role;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["prefab-directory-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn user_create_parses_role() {
        let cli = Cli::try_parse_from([
            "prefab-directory-api",
            "user",
            "create",
            "--email",
            "ops@example.com",
            "--name",
            "Ops",
            "--password",
            "long-enough-pw",
            "--role",
            "admin",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::User {
                command: UserCommand::Create(args),
            }) => {
                assert_eq!(args.email, "ops@example.com");
                assert_eq!(args.role, Role::Admin);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = Cli::try_parse_from([
            "prefab-directory-api",
            "user",
            "create",
            "--email",
            "ops@example.com",
            "--name",
            "Ops",
            "--password",
            "long-enough-pw",
            "--role",
            "owner",
        ]);
        assert!(result.is_err());
    }
}
