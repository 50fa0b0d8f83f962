//! Background tasks that write ledger events through to PostgreSQL.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::domain::LedgerEvent;
use crate::error::GatewayError;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawns the task that mirrors every ledger event into the database.
///
/// Appointment events upsert the appointment row and clinic events the
/// clinic row. With `event_log_enabled` the event is also appended to the
/// event log. Failures are logged and the event is dropped; memory stays
/// authoritative.
pub fn spawn_ledger_writer(
    persistence: PostgresPersistence,
    mut receiver: broadcast::Receiver<LedgerEvent>,
    event_log_enabled: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = write_event(&persistence, &event, event_log_enabled).await {
                        tracing::error!(
                            event_type = event.event_type_str(),
                            clinic_id = %event.clinic_id(),
                            error = %e,
                            "failed to persist ledger event"
                        );
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::error!(skipped = n, "ledger writer lagged; events were not persisted");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("ledger writer stopped");
    })
}

async fn write_event(
    persistence: &PostgresPersistence,
    event: &LedgerEvent,
    event_log_enabled: bool,
) -> Result<(), GatewayError> {
    match event {
        LedgerEvent::AppointmentBooked { appointment, .. }
        | LedgerEvent::AppointmentStatusChanged { appointment, .. } => {
            persistence.upsert_appointment(appointment).await?;
        }
        LedgerEvent::ClinicUpserted { clinic, .. } => {
            persistence.upsert_clinic(clinic).await?;
        }
    }
    if event_log_enabled {
        persistence.save_event(event).await?;
    }
    Ok(())
}

/// Spawns the hourly task that prunes logged events older than
/// `after_days`. Returns `None` when pruning is disabled (`0`).
pub fn spawn_event_log_cleanup(
    persistence: PostgresPersistence,
    after_days: u64,
) -> Option<JoinHandle<()>> {
    if after_days == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match persistence.delete_old_events(after_days).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, after_days, "pruned ledger event log"),
                Err(e) => tracing::error!(error = %e, "failed to prune ledger event log"),
            }
        }
    }))
}
