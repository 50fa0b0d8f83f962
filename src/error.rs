//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AppointmentId, AppointmentStatus, ClinicId, PetId, Slot, VetId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2004,
///     "message": "slot 10:00 is full (capacity: 2 staff)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category             | HTTP Status                  |
/// |-----------|----------------------|------------------------------|
/// | 1000–1999 | Validation           | 400 Bad Request              |
/// | 2000–2999 | Not Found / Conflict | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server               | 500 Internal Server Error    |
/// | 4000–4999 | Booking rules        | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A calendar date could not be parsed.
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A slot is not one of the hourly markers 09:00–20:00.
    #[error("invalid slot: {0} (expected an hour marker between 09:00 and 20:00)")]
    InvalidSlot(String),

    /// Clinic with the given ID was not found.
    #[error("clinic not found: {0}")]
    ClinicNotFound(ClinicId),

    /// Appointment with the given ID was not found.
    #[error("appointment not found: {0}")]
    AppointmentNotFound(AppointmentId),

    /// The pet has no upcoming appointment.
    #[error("no upcoming appointment for pet {0}")]
    NoUpcomingAppointment(PetId),

    /// The pet already holds an active appointment at that time.
    #[error("pet {pet_id} already has an appointment at {scheduled_at}")]
    PetAlreadyBooked {
        /// Pet that is already booked.
        pet_id: PetId,
        /// Conflicting start time.
        scheduled_at: NaiveDateTime,
    },

    /// The clinic slot has no free staff.
    #[error("slot {slot} is full (capacity: {capacity} staff)")]
    SlotFull {
        /// Saturated slot.
        slot: Slot,
        /// Clinic capacity per slot.
        capacity: u32,
    },

    /// The status state machine forbids this move.
    #[error("cannot move appointment from {from} to {to}")]
    InvalidTransition {
        /// Current (or displayed) status.
        from: AppointmentStatus,
        /// Requested status.
        to: AppointmentStatus,
    },

    /// The vet already holds a confirmed appointment at that time.
    #[error("vet {vet_id} is already booked at {scheduled_at}")]
    VetUnavailable {
        /// Vet that is already booked.
        vet_id: VetId,
        /// Conflicting start time.
        scheduled_at: NaiveDateTime,
    },

    /// The owner has reached the maximum number of pending requests.
    #[error("pending appointment limit reached ({limit})")]
    PendingLimitReached {
        /// Configured limit.
        limit: usize,
    },

    /// The requested slot has already started.
    #[error("slot {0} has already started")]
    SlotElapsed(NaiveDateTime),

    /// The clinic has no usable staff capacity and the policy is strict.
    #[error("clinic {0} has no staff capacity configured")]
    ClinicCapacityMissing(ClinicId),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidDate(_) => 1002,
            Self::InvalidSlot(_) => 1003,
            Self::ClinicNotFound(_) => 2001,
            Self::AppointmentNotFound(_) => 2002,
            Self::NoUpcomingAppointment(_) => 2003,
            Self::PetAlreadyBooked { .. } => 2004,
            Self::SlotFull { .. } => 2005,
            Self::InvalidTransition { .. } => 2006,
            Self::VetUnavailable { .. } => 2007,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::PendingLimitReached { .. } => 4001,
            Self::SlotElapsed(_) => 4002,
            Self::ClinicCapacityMissing(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidDate(_) | Self::InvalidSlot(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ClinicNotFound(_)
            | Self::AppointmentNotFound(_)
            | Self::NoUpcomingAppointment(_) => StatusCode::NOT_FOUND,
            Self::PetAlreadyBooked { .. }
            | Self::SlotFull { .. }
            | Self::InvalidTransition { .. }
            | Self::VetUnavailable { .. } => StatusCode::CONFLICT,
            Self::PendingLimitReached { .. }
            | Self::SlotElapsed(_)
            | Self::ClinicCapacityMissing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
