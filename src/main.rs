//! petify-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use petify_gateway::app_state::AppState;
use petify_gateway::config::{GatewayConfig, LogFormat};
use petify_gateway::domain::{AppointmentLedger, ClinicDirectory, EventBus, SystemClock};
use petify_gateway::persistence::{
    PostgresPersistence, spawn_event_log_cleanup, spawn_ledger_writer,
};
use petify_gateway::server::{build_app, seed_clinics};
use petify_gateway::service::BookingPolicy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Plain => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting petify-gateway");

    // Build domain layer
    let directory = Arc::new(ClinicDirectory::new());
    let ledger = Arc::new(AppointmentLedger::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Warm state from PostgreSQL and start the write-through task
    if config.persistence_enabled {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;
        let persistence = PostgresPersistence::new(pool);
        persistence.migrate().await?;

        let clinics = persistence.load_clinics().await?;
        let clinic_count = clinics.len();
        for clinic in clinics {
            let _ = directory.upsert(clinic).await;
        }
        let restored = ledger.restore(persistence.load_appointments().await?).await;
        tracing::info!(clinics = clinic_count, appointments = restored, "restored state");

        spawn_ledger_writer(
            persistence.clone(),
            event_bus.subscribe(),
            config.event_log_enabled,
        );
        if config.event_log_enabled {
            spawn_event_log_cleanup(persistence, config.cleanup_after_days);
        }
    } else {
        tracing::warn!("persistence disabled; state lives in memory only");
    }

    // Build service layer
    let policy = BookingPolicy {
        capacity_policy: config.capacity_policy,
        max_pending_per_user: config.pending_limit(),
    };
    let app_state = AppState::new(
        directory,
        ledger,
        event_bus,
        Arc::new(SystemClock),
        policy,
    );

    if let Some(path) = &config.clinics_seed_path {
        seed_clinics(&app_state.clinic_service, path).await?;
    }

    // Build router
    let app = build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
