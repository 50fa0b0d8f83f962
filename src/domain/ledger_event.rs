//! Domain events reflecting ledger and directory mutations.
//!
//! Every state change emits a [`LedgerEvent`] through the
//! [`super::EventBus`]. Events drive live slot watches and the optional
//! PostgreSQL write-through.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{AppointmentId, AppointmentRecord, AppointmentStatus, ClinicId, ClinicProfile};

/// Domain event emitted after every state mutation.
///
/// Each variant carries the full record or profile after the change so
/// subscribers never need to read back.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A booking was admitted as pending.
    AppointmentBooked {
        /// The new record.
        appointment: AppointmentRecord,
        /// Admission timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An appointment moved through the state machine.
    AppointmentStatusChanged {
        /// The record after the change.
        appointment: AppointmentRecord,
        /// Status before the change.
        previous_status: AppointmentStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A clinic profile was created or replaced.
    ClinicUpserted {
        /// The profile after the change.
        clinic: ClinicProfile,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Clinic the event concerns.
    #[must_use]
    pub fn clinic_id(&self) -> &ClinicId {
        match self {
            Self::AppointmentBooked { appointment, .. }
            | Self::AppointmentStatusChanged { appointment, .. } => &appointment.clinic_id,
            Self::ClinicUpserted { clinic, .. } => &clinic.id,
        }
    }

    /// Appointment the event concerns, if any.
    #[must_use]
    pub fn appointment_id(&self) -> Option<AppointmentId> {
        self.appointment().map(|a| a.id)
    }

    /// Appointment record carried by the event, if any.
    #[must_use]
    pub fn appointment(&self) -> Option<&AppointmentRecord> {
        match self {
            Self::AppointmentBooked { appointment, .. }
            | Self::AppointmentStatusChanged { appointment, .. } => Some(appointment),
            Self::ClinicUpserted { .. } => None,
        }
    }

    /// Calendar date whose occupancy the event may change.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.appointment().map(AppointmentRecord::date)
    }

    /// Returns `true` if blocked slots for `clinic_id` on `date` may have
    /// changed.
    ///
    /// Appointment events matter for every clinic on their date because a
    /// pet's own booking blocks its slot everywhere.
    #[must_use]
    pub fn affects(&self, clinic_id: &ClinicId, date: NaiveDate) -> bool {
        match self {
            Self::ClinicUpserted { clinic, .. } => &clinic.id == clinic_id,
            _ => self.date() == Some(date),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::AppointmentBooked { .. } => "appointment_booked",
            Self::AppointmentStatusChanged { .. } => "appointment_status_changed",
            Self::ClinicUpserted { .. } => "clinic_upserted",
        }
    }
}
