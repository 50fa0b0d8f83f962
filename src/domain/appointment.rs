//! Appointment records and the status state machine.
//!
//! ```text
//!   pending ──► confirmed ──► completed
//!      │            │
//!      ├──► rejected│
//!      └──► cancelled ◄┘
//! ```
//!
//! `rejected`, `cancelled` and `completed` are terminal. A `confirmed`
//! appointment whose time has passed is displayed (and treated for
//! cancellation) as `completed` even before staff record it explicitly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::slot::{Slot, scheduled_at_format};
use super::{AppointmentId, ClinicId, PetId, UserId, VetId};
use crate::error::GatewayError;

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Requested by the owner, awaiting staff.
    Pending,
    /// Accepted by a vet.
    Confirmed,
    /// Declined by staff.
    Rejected,
    /// Withdrawn by the owner or staff.
    Cancelled,
    /// Took place.
    Completed,
}

impl AppointmentStatus {
    /// Returns `true` for statuses that consume slot capacity.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Returns `true` for states with no outgoing transition.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }

    /// Returns `true` if the state machine allows `self → to`.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = GatewayError;

    /// Accepts the English wire names and the legacy Portuguese labels
    /// still present in older documents.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendente" => Ok(Self::Pending),
            "confirmed" | "confirmado" | "confirmada" => Ok(Self::Confirmed),
            "rejected" | "recusado" | "recusada" => Ok(Self::Rejected),
            "cancelled" | "canceled" | "cancelada" | "cancelado" => Ok(Self::Cancelled),
            "completed" | "concluida" | "concluída" | "concluido" | "concluído" => {
                Ok(Self::Completed)
            }
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown appointment status: {other}"
            ))),
        }
    }
}

/// Urgency the owner attaches to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Routine visit.
    Low,
    /// Should be seen soon.
    Medium,
    /// Needs attention today.
    High,
}

impl Urgency {
    /// Wire name of the urgency level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for Urgency {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixa" => Ok(Self::Low),
            "medium" | "media" | "média" => Ok(Self::Medium),
            "high" | "alta" => Ok(Self::High),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown urgency level: {other}"
            ))),
        }
    }
}

/// Result of checking a requested transition against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCheck {
    /// The record must move to the requested status.
    Apply,
    /// The record is already in the requested status; nothing to write.
    AlreadyApplied,
}

/// One booking in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    /// Appointment identifier.
    pub id: AppointmentId,
    /// Clinic hosting the appointment.
    pub clinic_id: ClinicId,
    /// Pet being seen.
    pub pet_id: PetId,
    /// Owner who booked.
    pub user_id: UserId,
    /// Vet assigned on confirmation; `None` while unassigned.
    pub vet_id: Option<VetId>,
    /// Reason for the visit.
    pub reason: String,
    /// Urgency level.
    pub urgency: Urgency,
    /// Quoted price in whole currency units.
    pub price: u64,
    /// Local start time of the appointment.
    #[serde(with = "scheduled_at_format")]
    pub scheduled_at: NaiveDateTime,
    /// Stored lifecycle status.
    pub status: AppointmentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last status change.
    pub updated_at: DateTime<Utc>,
}

impl AppointmentRecord {
    /// Calendar date of the appointment.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.scheduled_at.date()
    }

    /// Hour slot the appointment occupies, if within opening hours.
    #[must_use]
    pub fn slot(&self) -> Option<Slot> {
        Slot::containing(self.scheduled_at.time())
    }

    /// Returns `true` while the appointment consumes slot capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Status as shown to users at wall-clock time `now`.
    ///
    /// A confirmed appointment whose start time has been reached is shown
    /// as completed.
    #[must_use]
    pub fn display_status(&self, now: NaiveDateTime) -> AppointmentStatus {
        if self.status == AppointmentStatus::Confirmed && self.scheduled_at <= now {
            AppointmentStatus::Completed
        } else {
            self.status
        }
    }

    /// Validates moving this record to `to` at wall-clock time `now`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] when the state machine
    /// forbids the move, and [`GatewayError::InvalidRequest`] when staff try
    /// to complete an appointment that has not started yet.
    pub fn check_transition(
        &self,
        to: AppointmentStatus,
        now: NaiveDateTime,
    ) -> Result<TransitionCheck, GatewayError> {
        let from = match to {
            AppointmentStatus::Cancelled => self.display_status(now),
            _ => self.status,
        };

        if to == AppointmentStatus::Cancelled && from == AppointmentStatus::Cancelled {
            return Ok(TransitionCheck::AlreadyApplied);
        }

        if !from.can_transition_to(to) {
            return Err(GatewayError::InvalidTransition { from, to });
        }

        if to == AppointmentStatus::Completed && self.scheduled_at > now {
            return Err(GatewayError::InvalidRequest(format!(
                "appointment {} has not started yet",
                self.id
            )));
        }

        Ok(TransitionCheck::Apply)
    }
}
