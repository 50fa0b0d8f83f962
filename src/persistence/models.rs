//! Database row models and their conversion into domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::slot::SCHEDULED_AT_FORMAT;
use crate::domain::{
    AppointmentId, AppointmentRecord, ClinicId, ClinicProfile, Contact, Coordinates, PetId,
    UserId, VetId,
};
use crate::error::GatewayError;

/// Legacy placeholder stored in `vet_id` before a vet confirms.
const UNASSIGNED_VET: &str = "pending";

/// A row of the `clinics` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicRow {
    /// Clinic identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Staff count, if configured.
    pub staff_count: Option<i32>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lng: Option<f64>,
    /// Phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Street address.
    pub address: Option<String>,
}

impl ClinicRow {
    /// Flattens a profile into a row.
    #[must_use]
    pub fn from_profile(profile: &ClinicProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name.clone(),
            staff_count: profile
                .staff_count
                .map(|n| i32::try_from(n).unwrap_or(i32::MAX)),
            lat: profile.coordinates.map(|c| c.lat),
            lng: profile.coordinates.map(|c| c.lng),
            phone: profile.contact.phone.clone(),
            email: profile.contact.email.clone(),
            address: profile.contact.address.clone(),
        }
    }

    /// Rebuilds the domain profile.
    ///
    /// A negative staff count reads as missing.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] for a blank id.
    pub fn into_profile(self) -> Result<ClinicProfile, GatewayError> {
        let id = ClinicId::new(self.id).map_err(corrupt)?;
        let coordinates = match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };
        Ok(ClinicProfile {
            id,
            name: self.name,
            staff_count: self.staff_count.and_then(|n| u32::try_from(n).ok()),
            coordinates,
            contact: Contact {
                phone: self.phone,
                email: self.email,
                address: self.address,
            },
        })
    }
}

/// A row of the `appointments` table.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentRow {
    /// Appointment UUID.
    pub id: Uuid,
    /// Clinic identifier.
    pub clinic_id: String,
    /// Pet identifier.
    pub pet_id: String,
    /// Owner identifier.
    pub user_id: String,
    /// Assigned vet.
    pub vet_id: Option<String>,
    /// Reason for the visit.
    pub reason: String,
    /// Urgency wire name.
    pub urgency: String,
    /// Price.
    pub price: i64,
    /// Start time as `YYYY-MM-DD HH:MM`.
    pub scheduled_at: String,
    /// Status name; legacy localized names are accepted.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl AppointmentRow {
    /// Flattens a record into a row.
    #[must_use]
    pub fn from_record(record: &AppointmentRecord) -> Self {
        Self {
            id: *record.id.as_uuid(),
            clinic_id: record.clinic_id.to_string(),
            pet_id: record.pet_id.to_string(),
            user_id: record.user_id.to_string(),
            vet_id: record.vet_id.as_ref().map(ToString::to_string),
            reason: record.reason.clone(),
            urgency: record.urgency.as_str().to_string(),
            price: i64::try_from(record.price).unwrap_or(i64::MAX),
            scheduled_at: record.scheduled_at.format(SCHEDULED_AT_FORMAT).to_string(),
            status: record.status.as_str().to_string(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Rebuilds the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::PersistenceError`] when a column does not
    /// hold a valid value.
    pub fn into_record(self) -> Result<AppointmentRecord, GatewayError> {
        let scheduled_at = NaiveDateTime::parse_from_str(&self.scheduled_at, SCHEDULED_AT_FORMAT)
            .map_err(|e| {
                GatewayError::PersistenceError(format!(
                    "appointment {}: bad scheduled_at {:?}: {e}",
                    self.id, self.scheduled_at
                ))
            })?;
        let price = u64::try_from(self.price).map_err(|_| {
            GatewayError::PersistenceError(format!(
                "appointment {}: negative price {}",
                self.id, self.price
            ))
        })?;

        Ok(AppointmentRecord {
            id: AppointmentId::from_uuid(self.id),
            clinic_id: ClinicId::new(self.clinic_id).map_err(corrupt)?,
            pet_id: PetId::new(self.pet_id).map_err(corrupt)?,
            user_id: UserId::new(self.user_id).map_err(corrupt)?,
            vet_id: self
                .vet_id
                .filter(|v| v != UNASSIGNED_VET)
                .map(VetId::new)
                .transpose()
                .map_err(corrupt)?,
            reason: self.reason,
            urgency: self.urgency.parse().map_err(corrupt)?,
            price,
            scheduled_at,
            status: self.status.parse().map_err(corrupt)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn corrupt(e: GatewayError) -> GatewayError {
    GatewayError::PersistenceError(format!("corrupt row: {e}"))
}
