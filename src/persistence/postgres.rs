//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{AppointmentRow, ClinicRow};
use crate::domain::{AppointmentRecord, ClinicProfile, LedgerEvent};
use crate::error::GatewayError;

type AppointmentTuple = (
    Uuid,
    String,
    String,
    String,
    Option<String>,
    String,
    String,
    i64,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

type ClinicTuple = (
    String,
    String,
    Option<i32>,
    Option<f64>,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))
    }

    /// Inserts or replaces a clinic profile.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_clinic(&self, profile: &ClinicProfile) -> Result<(), GatewayError> {
        let row = ClinicRow::from_profile(profile);
        sqlx::query(
            "INSERT INTO clinics (id, name, staff_count, lat, lng, phone, email, address, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now()) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, staff_count = EXCLUDED.staff_count, \
             lat = EXCLUDED.lat, lng = EXCLUDED.lng, phone = EXCLUDED.phone, email = EXCLUDED.email, \
             address = EXCLUDED.address, updated_at = now()",
        )
        .bind(row.id)
        .bind(row.name)
        .bind(row.staff_count)
        .bind(row.lat)
        .bind(row.lng)
        .bind(row.phone)
        .bind(row.email)
        .bind(row.address)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Loads every stored clinic.
    ///
    /// Rows that no longer convert are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_clinics(&self) -> Result<Vec<ClinicProfile>, GatewayError> {
        let rows = sqlx::query_as::<_, ClinicTuple>(
            "SELECT id, name, staff_count, lat, lng, phone, email, address FROM clinics ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, name, staff_count, lat, lng, phone, email, address)| ClinicRow {
                    id,
                    name,
                    staff_count,
                    lat,
                    lng,
                    phone,
                    email,
                    address,
                },
            )
            .filter_map(|row| {
                row.into_profile()
                    .inspect_err(|e| tracing::warn!(error = %e, "skipping clinic row"))
                    .ok()
            })
            .collect())
    }

    /// Inserts or replaces an appointment record.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn upsert_appointment(&self, record: &AppointmentRecord) -> Result<(), GatewayError> {
        let row = AppointmentRow::from_record(record);
        sqlx::query(
            "INSERT INTO appointments (id, clinic_id, pet_id, user_id, vet_id, reason, urgency, price, \
             scheduled_at, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             ON CONFLICT (id) DO UPDATE SET vet_id = EXCLUDED.vet_id, status = EXCLUDED.status, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(row.id)
        .bind(row.clinic_id)
        .bind(row.pet_id)
        .bind(row.user_id)
        .bind(row.vet_id)
        .bind(row.reason)
        .bind(row.urgency)
        .bind(row.price)
        .bind(row.scheduled_at)
        .bind(row.status)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Loads every stored appointment.
    ///
    /// Rows that no longer convert are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn load_appointments(&self) -> Result<Vec<AppointmentRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, AppointmentTuple>(
            "SELECT id, clinic_id, pet_id, user_id, vet_id, reason, urgency, price, scheduled_at, \
             status, created_at, updated_at FROM appointments ORDER BY scheduled_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    id,
                    clinic_id,
                    pet_id,
                    user_id,
                    vet_id,
                    reason,
                    urgency,
                    price,
                    scheduled_at,
                    status,
                    created_at,
                    updated_at,
                )| AppointmentRow {
                    id,
                    clinic_id,
                    pet_id,
                    user_id,
                    vet_id,
                    reason,
                    urgency,
                    price,
                    scheduled_at,
                    status,
                    created_at,
                    updated_at,
                },
            )
            .filter_map(|row| {
                row.into_record()
                    .inspect_err(|e| tracing::warn!(error = %e, "skipping appointment row"))
                    .ok()
            })
            .collect())
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn save_event(&self, event: &LedgerEvent) -> Result<i64, GatewayError> {
        let payload = serde_json::to_value(event)
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO ledger_events (clinic_id, appointment_id, event_type, payload) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(event.clinic_id().as_str())
        .bind(event.appointment_id().map(|id| *id.as_uuid()))
        .bind(event.event_type_str())
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Deletes logged events older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError::PersistenceError`] on database failure.
    pub async fn delete_old_events(&self, before_days: u64) -> Result<u64, GatewayError> {
        let cutoff = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let result = sqlx::query("DELETE FROM ledger_events WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| GatewayError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
