//! DUDU Industrial Visit Hub chatbot server.
//!
//! Wires the `PostgreSQL` stores, the optional Anthropic provider and the
//! response orchestrator into the HTTP router, then serves until Ctrl+C or
//! SIGTERM.

mod config;

use anyhow::Context;
use config::ServerConfig;
use dudu_hub_anthropic::AnthropicClient;
use dudu_hub_core::catalog::CatalogSource;
use dudu_hub_core::completion::AnthropicCompletion;
use dudu_hub_core::config::ResponseMode;
use dudu_hub_core::conversation::ConversationLogger;
use dudu_hub_core::environment::SystemClock;
use dudu_hub_core::knowledge::{JsonFileKnowledgeStore, KnowledgeStore};
use dudu_hub_core::orchestrator::ResponseOrchestrator;
use dudu_hub_postgres::{PostgresCatalog, PostgresConversationLog, PostgresKnowledgeStore};
use dudu_hub_web::AppState;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    init_tracing();

    info!("Starting DUDU Hub chatbot server");

    let config = ServerConfig::from_env().context("Invalid configuration")?;
    info!(
        http_addr = %config.http_addr(),
        metrics_addr = %config.metrics_addr(),
        mode = ?config.effective_mode(),
        "Configuration loaded"
    );

    if config.mode == ResponseMode::Assisted && config.effective_mode() == ResponseMode::Local {
        warn!("CHATBOT_FALLBACK_MODE=assisted but ANTHROPIC_API_KEY is not set, answering locally");
    }

    PrometheusBuilder::new()
        .with_http_listener(config.metrics_addr())
        .install()
        .context("Failed to install Prometheus exporter")?;
    info!(address = %config.metrics_addr(), "Metrics exporter listening");

    info!("Connecting to PostgreSQL...");
    let pool = dudu_hub_postgres::connect(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;

    info!("Running database migrations...");
    dudu_hub_postgres::migrate(&pool)
        .await
        .context("Failed to run migrations")?;

    let catalog = PostgresCatalog::new(pool.clone());
    catalog.ping().await.context("Catalog database not reachable")?;
    let catalog: Arc<dyn CatalogSource> = Arc::new(catalog);
    info!("PostgreSQL connected");

    let knowledge: Arc<dyn KnowledgeStore> = if let Some(path) = &config.knowledge_file {
        info!(path = %path.display(), "Using knowledge file");
        Arc::new(JsonFileKnowledgeStore::new(path))
    } else {
        Arc::new(PostgresKnowledgeStore::new(pool.clone()))
    };

    let logger = ConversationLogger::new(
        Arc::new(PostgresConversationLog::new(pool)),
        Arc::new(SystemClock),
    );

    let mut orchestrator =
        ResponseOrchestrator::new(config.chatbot_config(), knowledge, Arc::clone(&catalog), logger);

    if config.effective_mode() == ResponseMode::Assisted {
        if let Some(api_key) = &config.anthropic_api_key {
            let client = AnthropicClient::new(api_key.clone());
            orchestrator = orchestrator.with_completion_provider(Arc::new(AnthropicCompletion::new(
                client,
                config.anthropic_model.clone(),
            )));
            info!(model = %config.anthropic_model, "Anthropic completion enabled");
        }
    }

    let app = dudu_hub_web::router(AppState::new(orchestrator, catalog));

    let listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.http_addr()))?;
    info!(address = %config.http_addr(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "dudu_hub_server=info,dudu_hub_core=info,dudu_hub_web=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
