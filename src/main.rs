//! Lead response assistant CLI entry point.
//!
//! Provides `serve` (the web form), `draft` (one reply to stdout) and
//! `tones` (list tone labels).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::Read as _;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use leadreply::client::{shared_client, MODEL_ID};
use leadreply::config::Config;
use leadreply::credentials::{load_dotenv, Credentials};
use leadreply::prompt::{Tone, ToneSelection};
use leadreply::session::{DraftError, Drafter, SessionState};
use leadreply::web::{self, WebState};

/// Lead response assistant — drafts replies to customer enquiries.
#[derive(Parser)]
#[command(name = "leadreply", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Serve the single-page form.
    Serve {
        /// Address to listen on; overrides the configured one.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Draft one reply and print it as Markdown.
    Draft {
        /// Tone label.
        #[arg(long, default_value = "Friendly & Casual")]
        tone: String,
        /// Enquiry text; read from stdin when omitted.
        enquiry: Option<String>,
    },
    /// List the available tone labels.
    Tones,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => handle_serve(bind).await,
        Command::Draft { tone, enquiry } => handle_draft(&tone, enquiry).await,
        Command::Tones => {
            for tone in Tone::ALL {
                println!("{}", tone.label());
            }
            Ok(())
        }
    }
}

/// Load `.env`, then config. The credential is read by each handler once
/// logging is up, so a missing key is reported.
fn bootstrap() -> anyhow::Result<Config> {
    load_dotenv(Path::new(".env"))?;
    Config::load().context("failed to load configuration")
}

async fn handle_serve(bind: Option<String>) -> anyhow::Result<()> {
    let config = bootstrap()?;
    let logs_dir = config.logs_dir()?;
    let _logging_guard = leadreply::logging::init_server(&logs_dir, &config.logging.level)?;
    let credentials = Credentials::from_env(&config.provider.api_key_env);

    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind:?}"))?;

    info!(model = MODEL_ID, logs = %logs_dir.display(), "starting lead response assistant");
    let client = shared_client(&config.provider, &credentials).clone();
    let state = WebState::with_limits(
        client,
        Duration::from_secs(config.server.session_ttl_secs),
        config.server.max_sessions,
    );
    web::serve(addr, Arc::new(state)).await
}

async fn handle_draft(tone: &str, enquiry: Option<String>) -> anyhow::Result<()> {
    let config = bootstrap()?;
    leadreply::logging::init_cli(&config.logging.level);
    let credentials = Credentials::from_env(&config.provider.api_key_env);

    let enquiry = match enquiry {
        Some(text) => text,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read enquiry from stdin")?;
            buf
        }
    };

    let client = shared_client(&config.provider, &credentials);
    let mut state = SessionState::default();
    let selection = ToneSelection::from_label(tone);
    if let ToneSelection::Unrecognised(label) = &selection {
        info!(tone = %label, "unrecognised tone, drafting without tone instruction");
    }

    match Drafter::new(client)
        .generate(&mut state, &enquiry, &selection)
        .await
    {
        Ok(draft) => {
            println!("{draft}");
            Ok(())
        }
        Err(DraftError::Provider(e)) => {
            error!(error = %e, "draft generation failed");
            Err(anyhow::anyhow!("error from provider: {e}"))
        }
        Err(e) => Err(e.into()),
    }
}
