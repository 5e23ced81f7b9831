//! Ask DB chat client
//!
//! A terminal client for the Ask DB agent: natural-language questions in,
//! answers and downloadable report links out.

mod api;
mod config;
mod reports;
mod repl;
mod runtime;
mod state_machine;
mod store;

use api::{AskDbService, HttpAskDbService, LoggingService};
use config::ClientConfig;
use runtime::{ProductionOrchestrator, ServiceClient, TokioSleeper};
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askdb_chat=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        environment = ?config.environment,
        base_url = %config.base_url,
        school_id = %config.school.school_id,
        "Configuration loaded"
    );

    let http = HttpAskDbService::new(&config.base_url, config.api_key.clone(), config.http_timeout)?;
    let service: Arc<dyn AskDbService> = Arc::new(LoggingService::new(Arc::new(http)));

    let orchestrator: ProductionOrchestrator = ProductionOrchestrator::new(
        ServiceClient::new(service),
        TokioSleeper,
        config.school.clone(),
    );

    repl::run(
        BufReader::new(tokio::io::stdin()),
        &orchestrator,
        config.show_metadata,
    )
    .await?;

    Ok(())
}
