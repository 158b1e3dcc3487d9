#![allow(missing_docs)]

//! Campaign-management backend binary.
//!
//! Serves the campaign HTTP API: script generation via an LLM completion
//! endpoint, approval hand-off to an automation webhook, call-status
//! accumulation, and campaign summaries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use outcall::api;
use outcall::config::OutcallConfig;
use outcall::logging;
use outcall::notifier::WebhookNotifier;
use outcall::providers::openrouter::OpenRouterProvider;
use outcall::service::CampaignService;
use outcall::store::CampaignStore;

#[derive(Debug, Parser)]
#[command(name = "outcall", version, about = "Campaign-management backend")]
struct Cli {
    /// Path to the config file (default: ./outcall.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print the resolved configuration with secrets redacted.
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is honored before config resolution, matching how the service
    // is deployed alongside the automation tooling.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = OutcallConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::CheckConfig => {
            // Prints the redacted config to stdout; no subscriber needed.
            println!("{config:#?}");
            Ok(())
        }
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: OutcallConfig) -> Result<()> {
    let _log_guard = logging::init(Path::new(&config.paths.logs_dir))
        .context("failed to initialise logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "outcall starting");
    if config.llm.api_key.is_none() {
        info!("no OpenRouter API key configured -- script generation will fail until one is set");
    }
    if config.automation.webhook_url.is_none() {
        info!("no automation webhook configured -- campaign approval will fail until one is set");
    }

    let provider = Arc::new(
        OpenRouterProvider::new(
            config.llm.base_url.clone(),
            config.llm.model.clone(),
            config.llm.api_key.clone(),
        )
        .context("failed to build LLM client")?,
    );
    let notifier = Arc::new(
        WebhookNotifier::new(config.automation.webhook_url.clone())
            .context("failed to build webhook client")?,
    );
    let store = CampaignStore::open(&config.paths.store);

    let service = Arc::new(CampaignService::new(
        store,
        provider,
        notifier,
        &config.paths.knowledge_base,
        &config.paths.prompt_template,
    ));

    let app = api::api_router(service);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "listening");

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
