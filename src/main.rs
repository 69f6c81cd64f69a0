use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

mod config;
mod context;
mod dashboard;
mod data;
mod pipeline;
mod views;

use config::Config;
use context::{DataContext, InputPaths};
use dashboard::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!(
        "Roster: {:?}, excluded puzzles: {:?}, max puzzle: {:?}",
        config.roster, config.exclude_puzzles, config.max_puzzle
    );

    // Load inputs and build the derived tables; nothing is served on failure
    let ctx = DataContext::load(
        InputPaths {
            outcomes: &config.outcomes_path,
            predictions: &config.predictions_path,
            model_output: &config.model_output_path,
        },
        config.cohort_rules(),
    )?;

    let state = AppState {
        ctx: Arc::new(ctx),
        title: config.title.clone(),
        default_player: config.selected_by_default(),
    };
    let app = dashboard::router(state);
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
