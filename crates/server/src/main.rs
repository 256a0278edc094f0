//! Loan agent server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use loan_agent_config::{load_settings, ProductRegistry, Settings};
use loan_agent_llm::backend_from_settings;
use loan_agent_persistence::FileApplicationStore;
use loan_agent_scoring::ScorerRegistry;
use loan_agent_server::{create_router, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults.
    let env = std::env::var("LOAN_AGENT_ENV").ok();
    let settings = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing isn't up yet.
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&settings);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?settings.environment,
        "Starting loan agent server"
    );

    // Product registry: built-in tables, or a YAML override file.
    let registry = match &settings.product_registry_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading product registry from file");
            ProductRegistry::from_yaml(path)?
        }
        None => ProductRegistry::builtin(),
    };
    tracing::info!(products = registry.available().len(), "Product registry ready");

    // Scoring models: one artifact per product; missing artifacts mean that
    // product cannot decide, never a default output.
    let scorers = Arc::new(ScorerRegistry::load_dir(&settings.models.dir));

    // Application storage and the optional language-model collaborator.
    let store = Arc::new(FileApplicationStore::new(&settings.storage.data_dir));
    let llm = backend_from_settings(&settings.llm);

    let metrics_handle = if settings.observability.metrics_enabled {
        metrics::init_metrics()
    } else {
        None
    };

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let state = AppState::new(settings, registry, llm, scorers, store, metrics_handle);

    // Evict idle sessions in the background.
    let cleanup_shutdown = state.sessions.start_cleanup_task();

    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = cleanup_shutdown.send(true);
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

fn init_tracing(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.observability.log_filter));

    let fmt_layer = if settings.observability.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
