mod applications;
mod config;
mod db;
mod errors;
mod indexing;
mod models;
mod process;
mod ranking;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::applications::PgApplicationRepository;
use crate::config::Config;
use crate::db::create_pool;
use crate::indexing::ResumeIndexer;
use crate::process::extractor::DocumentTextExtractor;
use crate::process::scorer::ScoringProcessInvoker;
use crate::ranking::corpus::ApplicationCorpusAssembler;
use crate::ranking::orchestrator::RankingOrchestrator;
use crate::ranking::store::PgRankingStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Kaam API v{}", env!("CARGO_PKG_VERSION"));

    config.scorer.verify().context("Scoring engine is not runnable")?;
    config
        .extractor
        .verify()
        .context("Text extractor is not runnable")?;
    info!(
        scorer = %config.scorer.program.display(),
        extractor = %config.extractor.program.display(),
        "External engines configured"
    );

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;

    let applications = Arc::new(PgApplicationRepository::new(db.clone()));
    let rankings = RankingOrchestrator::new(
        Arc::new(PgRankingStore::new(db)),
        ApplicationCorpusAssembler::new(applications.clone()),
        Arc::new(ScoringProcessInvoker::new(config.scorer.clone())),
    );
    let indexer = ResumeIndexer::new(
        applications,
        Arc::new(DocumentTextExtractor::new(config.extractor.clone())),
    );

    let state = AppState {
        rankings: Arc::new(rankings),
        indexer: Arc::new(indexer),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the Kaam web client

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
