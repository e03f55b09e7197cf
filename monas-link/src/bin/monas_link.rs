//! Link client binary entry point.
//!
//! Lists and revokes the keys linked to an account, and runs link handshakes
//! from a recorded transcript.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use monas_link::config::LinkConfig;
use monas_link::domain::link::LinkToken;
use monas_link::infrastructure::{ReplayTransport, SledKeyListing};
use monas_link::port::LinkCoordinator;
use monas_link::presentation::{
    prompt_confirmation, render, render_inventory, KeyStyle, TerminalLinkHandler,
};
use monas_link::{KeyService, LinkSession};

#[derive(Parser, Debug)]
#[command(name = "monas-link")]
#[command(about = "Monas Link - link machines to your account and manage linked keys")]
struct Args {
    /// Config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity file (ssh key) path.
    #[arg(short = 'i', long)]
    identity: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the keys linked to the account.
    Keys,
    /// Link a machine. Without a token a new one is generated.
    Link {
        token: Option<String>,

        /// Recorded handshake to replay (JSON lines).
        #[arg(long)]
        transcript: PathBuf,
    },
    /// Revoke the linked key at INDEX (as listed by `keys`, starting at 0).
    Revoke { index: usize },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    }
    .apply_env();
    if let Some(identity) = args.identity {
        config.identity_path = Some(identity);
    }
    if let Some(identity) = &config.identity_path {
        tracing::info!("Using identity {}", identity.display());
    }

    let listing = SledKeyListing::open(&config.keys_db_path).with_context(|| {
        format!(
            "Failed to open key database at {}",
            config.keys_db_path.display()
        )
    })?;
    let style = if config.color {
        KeyStyle::default()
    } else {
        KeyStyle::plain()
    };

    match args.command {
        Command::Keys => {
            let inventory = KeyService::load_inventory(&listing)?;
            print!("{}", render_inventory(&inventory, &style));
        }
        Command::Link { token, transcript } => {
            let file = File::open(&transcript)
                .with_context(|| format!("Failed to open transcript {}", transcript.display()))?;
            let transport = ReplayTransport::from_reader(BufReader::new(file))?;

            let stdin = std::io::stdin();
            let handler = TerminalLinkHandler::new(stdin.lock(), std::io::stdout());
            let mut session = match token {
                Some(token) => LinkSession::accept(LinkToken::new(token)?, handler),
                None => LinkSession::generate(handler),
            };

            transport.run(&mut session);
            if !session.is_terminal() {
                tracing::warn!("Transcript ended before the handshake finished");
                session.timeout();
            }

            let outcome = session
                .take_outcome()
                .context("Link session ended without an outcome")?;
            if let Some(remote_key) = session.remote_public_key() {
                KeyService::record_link(&listing, outcome, remote_key, Utc::now())?;
            }
            if outcome.is_protocol_error() {
                bail!("Link failed: {outcome}. Start a new link to try again");
            }
            if !outcome.is_success() {
                bail!("Link {outcome}");
            }
        }
        Command::Revoke { index } => {
            let mut inventory = KeyService::load_inventory(&listing)?;
            if index >= inventory.len() {
                bail!("No linked key at index {index} ({} linked)", inventory.len());
            }
            inventory.move_selection(index as isize);
            inventory.request_delete()?;

            let pending = &inventory.records()[index];
            print!("{}", render(pending, inventory.state_of(index), &style));

            let confirmed = prompt_confirmation(
                &mut std::io::stdin().lock(),
                &mut std::io::stdout(),
                "Revoke this key? (yes/no)",
            );
            match KeyService::resolve_pending(&mut inventory, &listing, confirmed)? {
                Some(removed) => match removed.fingerprint() {
                    Ok(fp) => println!("Revoked {fp}"),
                    Err(_) => println!("Revoked key {index}"),
                },
                None => println!("Kept key {index}"),
            }
        }
    }

    Ok(())
}
