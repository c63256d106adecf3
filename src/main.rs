//! Agrikart farmer bot
//!
//! A WhatsApp dialogue service that registers farmers, suggests market prices
//! from Agmarknet and lists their produce on the Agrikart backend.

mod api;
mod backend;
mod catalog;
mod config;
mod locale;
mod price;
mod runtime;
mod state_machine;
mod store;
mod whatsapp;

use api::{create_router, AppState};
use backend::BackendClient;
use config::{BotConfig, DialogueConfig};
use price::{AgmarknetClient, BoundedPriceSource};
use runtime::{DialogueRuntime, RuntimeManager};
use std::net::SocketAddr;
use std::sync::Arc;
use store::SessionStore;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whatsapp::WhatsAppClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal in production
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agrikart_bot=info,tower_http=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Configuration
    let config = BotConfig::from_env();

    // Collaborators
    let registry = Arc::new(BackendClient::new(
        &config.backend_base_url,
        config.registry_timeout,
    )?);
    tracing::info!(url = %config.backend_base_url, "Registry client initialized");

    let mut agmarknet = AgmarknetClient::new(config.price_lookup_timeout);
    if let Some(url) = &config.agmarknet_url {
        agmarknet = agmarknet.with_search_url(url.clone());
    }
    let prices = Arc::new(BoundedPriceSource::new(
        Arc::new(agmarknet),
        config.price_lookup_timeout,
    ));

    let sender = Arc::new(WhatsAppClient::from_config(&config)?);
    if !sender.is_enabled() {
        tracing::warn!("ACCESS_TOKEN or PHONE_NUMBER_ID not set; replies will only be logged");
    }
    if config.verify_token.is_none() {
        tracing::warn!("VERIFY_TOKEN not set; webhook verification will always fail");
    }

    // Dialogue runtime
    let runtime = DialogueRuntime::new(
        Arc::new(DialogueConfig::default()),
        Arc::new(SessionStore::new()),
        registry,
        prices,
    );
    let manager = Arc::new(
        RuntimeManager::new(runtime, sender).with_idle_timeout(config.inbox_idle_timeout),
    );
    let state = AppState::new(manager, config.verify_token.clone());

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Agrikart bot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
