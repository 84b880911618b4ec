//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{login, logout, refresh, request, signup, whoami};

/// Talk to a session-authenticated API, refreshing credentials as needed.
#[derive(Parser, Debug)]
#[command(name = "reauth")]
#[command(author, version = env!("REAUTH_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// API base URL [default: http://localhost:3000/api]
    #[arg(long, env = "REAUTH_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Credentials file (defaults to the user data directory)
    #[arg(long, env = "REAUTH_STORE", global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with email and password
    Login(login::LoginArgs),

    /// Create an account and log in
    Signup(signup::SignupArgs),

    /// End the session and forget the stored credentials
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session credentials now
    Refresh(refresh::RefreshArgs),

    /// Send a request through the authenticated dispatcher
    Request(request::RequestArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn request_accepts_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reauth",
            "request",
            "post",
            "/tasks",
            "--data",
            r#"{"title":"x"}"#,
            "--api-url",
            "https://tasks.example.com/api",
        ])
        .unwrap();

        assert_eq!(
            cli.global.api_url.as_deref(),
            Some("https://tasks.example.com/api")
        );
        match cli.command {
            Commands::Request(args) => {
                assert_eq!(args.path, "/tasks");
                assert!(!args.public);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
