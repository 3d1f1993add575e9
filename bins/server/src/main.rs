//! Innkeep API Server
//!
//! Main entry point for the Innkeep booking and folio service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use innkeep_api::{AppState, create_router};
use innkeep_core::events::{EventSink, TracingAuditLog};
use innkeep_core::{Clock, CoreSettings, EventPublisher, Services, SystemClock};
use innkeep_db::DocumentStore;
use innkeep_shared::{AppConfig, JwtConfig, JwtService};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "innkeep=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let relational = match &config.database.url {
        Some(url) => {
            let db = innkeep_db::connect(url, config.database.max_connections, config.database.min_connections)
                .await
                .context("failed to connect to database")?;
            info!("Connected to database, room inventory served from PostgreSQL");
            Some(db)
        }
        None => {
            warn!("No database URL configured, room inventory kept in the document store");
            None
        }
    };

    let store = Arc::new(DocumentStore::new());
    let repos = innkeep_db::repositories(&store, relational);

    let sinks: Vec<Arc<dyn EventSink>> = vec![Arc::new(TracingAuditLog)];
    let (events, dispatcher) = EventPublisher::spawn(sinks);

    let services = Services::new(
        repos,
        events,
        Arc::new(SystemClock) as Arc<dyn Clock>,
        CoreSettings::from(&config),
    );

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60).unwrap_or(i64::MAX),
    });

    let state = AppState {
        services: Arc::new(services),
        jwt_service: Arc::new(jwt_service),
    };
    let app = create_router(state, Duration::from_secs(config.server.request_timeout_secs));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and every publisher clone are gone; drain queued events.
    if let Err(e) = dispatcher.await {
        warn!(error = %e, "event dispatcher ended abnormally");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
