use std::path::PathBuf;
use std::rc::Rc;

use clap::{Parser, Subcommand};
use gamehub_session::file_storage::FileStorage;
use gamehub_session::identity::http::HttpIdentityClient;
use gamehub_session::{
    AuthSession, ConfigError, Credentials, Decision, IdentityError, IdentityService, LoginError, Registration,
    RouteRequirement, SessionConfig, SessionSnapshot,
};
use serde_json::{Value, json};

const STORAGE_DIR: &str = ".gamehub";
const STORAGE_FILE: &str = "session.json";
const API_URL_FLAG: &str = "--api-url";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("identity client setup failed: {0}")]
    Identity(#[from] IdentityError),
    #[error("{code}: {message}", code = .0.error_code(), message = .0.user_message())]
    Login(#[from] LoginError),
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "gamehub", about = "GameHub session CLI")]
struct Cli {
    /// Identity service base URL; overrides the value from the environment.
    #[arg(long, env = "GAMEHUB_API_URL")]
    api_url: Option<String>,

    /// JSON file that holds the durable session (default ~/.gamehub/session.json).
    #[arg(long, env = "GAMEHUB_STORAGE_PATH")]
    storage_path: Option<PathBuf>,

    /// Log to stderr: -v info, -vv debug.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the issued token.
    Login {
        email: String,
        #[arg(long, env = "GAMEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in with it.
    Signup {
        username: String,
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "GAMEHUB_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Verify the stored token and print the session.
    Status,
    /// Sign out locally and tell the server.
    Logout,
    /// Show what a route with the given requirement would do right now.
    Authorize {
        /// public, authenticated, admin or anonymous
        requirement: RouteRequirement,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = resolve_config(cli.api_url.as_deref())?;
    let storage_path = cli.storage_path.unwrap_or_else(default_storage_path);
    tracing::debug!(api_url = %config.api_base_url, storage = %storage_path.display(), "starting");

    let identity: Rc<dyn IdentityService> =
        Rc::new(HttpIdentityClient::new(config.api_base_url.clone(), config.timeouts)?);
    let session = AuthSession::create(Rc::new(FileStorage::new(storage_path)), identity, &config);

    match cli.command {
        Command::Login { email, password } => {
            let user = session.login(&Credentials::new(email, password)).await?;
            print_json(&json!({ "status": "authenticated", "user": user }))
        }
        Command::Signup { username, email, full_name, password } => {
            let registration = Registration { username, full_name, email, password };
            let user = session.signup(&registration).await?;
            print_json(&json!({ "status": "authenticated", "user": user }))
        }
        Command::Status => {
            session.bootstrap().await;
            print_json(&status_json(&session.get_snapshot()))
        }
        Command::Logout => {
            session.logout().await;
            print_json(&status_json(&session.get_snapshot()))
        }
        Command::Authorize { requirement } => {
            session.bootstrap().await;
            print_json(&decision_json(requirement, session.authorize(requirement)))
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();
}

fn resolve_config(api_url: Option<&str>) -> Result<SessionConfig, CliError> {
    let config = SessionConfig::from_env()?;
    Ok(match api_url {
        Some(url) => config.with_api_base_url(API_URL_FLAG, url)?,
        None => config,
    })
}

fn default_storage_path() -> PathBuf {
    let base = std::env::var_os("HOME").map_or_else(PathBuf::new, PathBuf::from);
    base.join(STORAGE_DIR).join(STORAGE_FILE)
}

fn status_json(snapshot: &SessionSnapshot) -> Value {
    json!({ "status": snapshot.status, "user": snapshot.user })
}

fn decision_json(requirement: RouteRequirement, decision: Decision) -> Value {
    json!({
        "requirement": requirement,
        "decision": decision,
        "redirect": decision.redirect_path(),
    })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
