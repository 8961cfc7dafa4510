//! Ideaforge CLI entry point.

mod cli;
mod report;

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use ideaforge_agent::{create_client, BackendConfig};
use ideaforge_orchestrator::Orchestrator;
use rustyline::DefaultEditor;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::Cli;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    // Local overrides first; dotenvy never replaces variables already set
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.team_config()?;
    let backend = BackendConfig::from_env(cli.api_key.as_deref())?;
    let topic = match cli.topic.clone() {
        Some(topic) => topic,
        None => prompt_topic()?,
    };

    println!(
        "Using {} backend ({}) with a {}-agent team",
        backend.provider,
        backend.model,
        config.team_size()
    );

    let client = create_client(&backend)?;
    let mut orchestrator = Orchestrator::new(client, config)?
        .with_progress_callback(Arc::new(|line: &str| println!("{}", line)));

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling discussion...");
            token.cancel();
        }
    });

    let handle = orchestrator.handle();
    let started = Instant::now();
    let outcome = orchestrator.start_discussion(&topic).await;
    let elapsed = started.elapsed();

    let Some(discussion) = handle.snapshot().await else {
        return outcome.map(|_| ()).map_err(Into::into);
    };

    if outcome.is_ok() {
        println!("\nDiscussion completed in {:.1} seconds", elapsed.as_secs_f64());
    }

    let artifact = discussion.report_artifact();
    if !artifact.is_empty() {
        let path = cli.output_path(chrono::Utc::now().timestamp());
        match std::fs::write(&path, artifact) {
            Ok(()) => println!("Idea sheet saved to: {}", path.display()),
            Err(e) => warn!(path = %path.display(), error = %e, "Could not save idea sheet"),
        }
    }

    print!("{}", report::summary(&discussion, orchestrator.config()));

    outcome.map(|_| ()).map_err(Into::into)
}

fn prompt_topic() -> Result<String> {
    println!("What topic would you like the team to explore?");
    let mut editor = DefaultEditor::new()?;
    let topic = editor.readline("> ")?;
    Ok(topic.trim().to_string())
}
