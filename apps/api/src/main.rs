mod auth;
mod config;
mod db;
mod errors;
mod identity;
mod models;
mod pipeline;
mod relations;
mod routes;
mod state;
mod store;
mod sync;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::jwt::JwtVerifier;
use crate::config::Config;
use crate::db::create_pool;
use crate::identity::IdentityClient;
use crate::pipeline::scoring::HeuristicResumeScorer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::sync::SyncHub;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails with context on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(&config.rust_log))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Real-time sync hub: one snapshot channel per collection
    let hub = SyncHub::new();

    // Identity provider client with cached service-token auth
    let identity = IdentityClient::new(
        &config.identity_api_url,
        config.identity_service_key.clone(),
    )?;
    info!("Identity client initialized ({})", config.identity_api_url);

    // JWT verifier for inbound bearer tokens
    let jwt = Arc::new(JwtVerifier::new(&config.auth_secret));

    // Resume scorer (HeuristicResumeScorer by default; trait object so a
    // model-backed scorer can be swapped in)
    let scorer = Arc::new(HeuristicResumeScorer);

    let state = AppState {
        db,
        hub,
        identity,
        jwt,
        scorer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Default filter directive when `RUST_LOG` is unset. The tracing target is
/// the crate's module path, so the package name's hyphen must become an
/// underscore or the directive matches nothing.
fn default_log_directive(level: &str) -> String {
    format!("{}={level}", env!("CARGO_PKG_NAME").replace('-', "_"))
}
