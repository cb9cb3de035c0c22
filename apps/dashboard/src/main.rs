use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{load_settings, DashboardSettings, ListPolicy, Orchestrator};
use shared::domain::PersonaId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::{
    wrappers::{errors::BroadcastStreamRecvError, BroadcastStream},
    StreamExt,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

use commands::{parse_command, DashboardCommand, HELP};
use render::{event_effect, DashboardView, EventEffect};

#[derive(Parser, Debug, Default)]
#[command(name = "dashboard", about = "Persona recommendation dashboard")]
struct Args {
    /// Base URL of the recommendation service, e.g. http://localhost:8080/api
    #[arg(long)]
    api_url: Option<String>,
    /// Persona shown first: user1, user2 or user3
    #[arg(long)]
    persona: Option<PersonaId>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Forwarded to the service as `?limit=`
    #[arg(long)]
    limit: Option<u32>,
    /// What happens to the shown list while a new one loads: retain or clear
    #[arg(long)]
    list_policy: Option<ListPolicy>,
    /// Render once after the initial loads settle, then exit
    #[arg(long)]
    once: bool,
    /// Print snapshots as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = apply_args(load_settings()?, &args)?;
    info!(
        api = %settings.api_base_url,
        persona = %settings.initial_persona,
        policy = ?settings.list_policy,
        "starting dashboard"
    );
    let orchestrator = Orchestrator::from_settings(&settings)?;

    if args.once {
        orchestrator.start().await.settled().await;
        show(&orchestrator, args.json).await?;
        return Ok(());
    }

    run_interactive(orchestrator, args.json).await
}

/// Command-line flags override file and environment settings.
fn apply_args(mut settings: DashboardSettings, args: &Args) -> Result<DashboardSettings> {
    if let Some(url) = &args.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(persona) = args.persona {
        settings.initial_persona = persona;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.request_timeout_ms = timeout_ms;
    }
    if args.limit.is_some() {
        settings.recommendation_limit = args.limit;
    }
    if let Some(policy) = args.list_policy {
        settings.list_policy = policy;
    }
    settings.validate()?;
    Ok(settings)
}

async fn run_interactive(orchestrator: Arc<Orchestrator>, json: bool) -> Result<()> {
    let mut events = BroadcastStream::new(orchestrator.subscribe_events());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Loads run detached; progress arrives through the event stream.
    let _initial = orchestrator.start().await;
    println!("{HELP}");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("stdin closed");
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(DashboardCommand::Quit)) => break,
                    Ok(Some(command)) => dispatch(&orchestrator, command, json).await?,
                    Ok(None) => {}
                    Err(err) => println!("{err}"),
                }
            }
            Some(event) = events.next() => match event {
                Ok(event) => match event_effect(&event) {
                    EventEffect::Status(line) => println!("{line}"),
                    EventEffect::Redraw => show(&orchestrator, json).await?,
                    EventEffect::Ignore => debug!(?event, "event not rendered"),
                },
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "dashboard fell behind on events; redrawing");
                    show(&orchestrator, json).await?;
                }
            },
        }
    }
    Ok(())
}

async fn dispatch(orchestrator: &Arc<Orchestrator>, command: DashboardCommand, json: bool) -> Result<()> {
    debug!(command = command.name(), "dispatching dashboard command");
    match command {
        DashboardCommand::SelectPersona(key) => {
            if orchestrator.select_persona_key(&key).await.is_none() {
                println!("unknown persona '{key}'; expected user1, user2 or user3");
            }
        }
        DashboardCommand::Refresh => {
            let _pending = orchestrator.refresh().await;
        }
        DashboardCommand::Show => show(orchestrator, json).await?,
        DashboardCommand::Help => println!("{HELP}"),
        DashboardCommand::Quit => {}
    }
    Ok(())
}

async fn show(orchestrator: &Orchestrator, json: bool) -> Result<()> {
    let snapshot = orchestrator.snapshot().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", DashboardView(&snapshot));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
