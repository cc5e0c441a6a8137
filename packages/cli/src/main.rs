mod commands;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use client::{ClientConfig, ClientState, SessionStore};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::terminal::{ConsoleNotifier, LoginHint};

#[derive(Parser)]
#[command(name = "cdsctf", version, about = "Command-line client for the CdsCTF platform")]
struct Cli {
    /// Platform URL, overriding the config file.
    #[arg(long, global = true, env = "CDSCTF_SERVER_URL")]
    server: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        account: String,
        /// Prompted for when omitted.
        #[arg(short, long, env = "CDSCTF_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit a flag and wait for its verdict
    Submit {
        #[arg(short, long)]
        challenge: Uuid,
        #[arg(long)]
        team: Option<i64>,
        #[arg(long)]
        game: Option<i64>,
        flag: String,
    },
    /// Wait for the verdicts of existing submissions
    Watch {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = ClientConfig::load().context("Failed to load config")?;
    if let Some(url) = cli.server {
        config.server.url = url;
    }

    let session_path = match &config.session.path {
        Some(path) => path.clone(),
        None => default_session_path()?,
    };
    let session = Arc::new(
        SessionStore::load(&session_path)
            .with_context(|| format!("Failed to load session from {}", session_path.display()))?,
    );

    let notifier = Arc::new(ConsoleNotifier::new());
    let state = ClientState::new(&config, session, notifier.clone(), Arc::new(LoginHint))
        .context("Failed to build HTTP client")?;

    let ok = match cli.command {
        Command::Login { account, password } => {
            commands::login(&state, &account, password).await?
        }
        Command::Logout => commands::logout(&state).await?,
        Command::Whoami => commands::whoami(&state).await?,
        Command::Submit {
            challenge,
            team,
            game,
            flag,
        } => {
            let request = common::CreateSubmissionRequest {
                content: flag,
                challenge_id: challenge,
                team_id: team,
                game_id: game,
            };
            commands::submit(&state, &notifier, &request).await?
        }
        Command::Watch { ids } => commands::watch(&state, &notifier, &ids).await?,
    };

    state.shutdown();
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn default_session_path() -> anyhow::Result<PathBuf> {
    let dir = dirs::data_dir().context("Could not determine the data directory")?;
    Ok(dir.join("cdsctf").join("session.json"))
}
