// HTTP surface consumed by the swipe UI

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{DecisionsRequest, RewriteNewsRequest, RewriteNewsResponse, RewriteRequest};

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::alignment::PartyStanceTable;
use crate::assistant::Assistants;
use crate::config::Config;

/// Shared, read-only state for every request
#[derive(Clone)]
pub struct AppState {
    pub parties: Arc<PartyStanceTable>,
    pub assistants: Assistants,
}

impl AppState {
    pub fn new(parties: PartyStanceTable, assistants: Assistants) -> Self {
        Self {
            parties: Arc::new(parties),
            assistants,
        }
    }

    /// Party table and assistant services as configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let parties = PartyStanceTable::load_or_builtin(config.parties_path.as_deref())?;
        let assistants =
            Assistants::from_config(&config.provider).context("Failed to build assistant services")?;
        Ok(Self::new(parties, assistants))
    }
}

/// All routes, without transport layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/parties", get(handlers::list_parties))
        .route("/api/alignment", post(handlers::handle_alignment))
        .route("/api/analyze", post(handlers::handle_analyze))
        .route("/api/rewrite", post(handlers::handle_rewrite))
        .route("/api/rewrite/news", post(handlers::handle_rewrite_news))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind_address))?;

    let app = create_router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    tracing::info!("Starting partysim server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
