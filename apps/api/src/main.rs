mod auth;
mod autofill;
mod config;
mod errors;
mod extract;
mod fetcher;
mod llm_client;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::SupabaseVerifier;
use crate::config::Config;
use crate::fetcher::HttpPageFetcher;
use crate::llm_client::{LlmClient, OpenAiBackend};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting autofill-prep v{}", env!("CARGO_PKG_VERSION"));

    if config.supabase_url.is_none() || config.supabase_anon_key.is_none() {
        warn!("SUPABASE_URL / SUPABASE_ANON_KEY not set; every request will fail with 500");
    }
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set; generation requests will fail with 500");
    }

    let fetcher = Arc::new(HttpPageFetcher::new()?);
    let identity = Arc::new(SupabaseVerifier::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let backend = Arc::new(OpenAiBackend::new(&config.openai_base_url)?);
    let llm = LlmClient::new(
        backend,
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        config: config.clone(),
        fetcher,
        identity,
        llm,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
