//! Appointment DTOs for booking, lifecycle actions and listings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::slot::SCHEDULED_AT_FORMAT;
use crate::domain::{AppointmentStatus, Urgency};
use crate::service::AppointmentView;

/// Request body for `POST /appointments`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateAppointmentRequest {
    /// Clinic to book at.
    pub clinic_id: String,
    /// Pet to be seen.
    pub pet_id: String,
    /// Owner making the request.
    pub user_id: String,
    /// Day of the visit, `YYYY-MM-DD`.
    pub date: String,
    /// Hour marker, `HH:00` between `09:00` and `20:00`.
    pub slot: String,
    /// Reason for the visit.
    pub reason: String,
    /// Urgency level.
    pub urgency: Urgency,
    /// Quoted price in whole currency units.
    pub price: i64,
}

/// Request body for `POST /appointments/{id}/confirm`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ConfirmAppointmentRequest {
    /// Vet taking the appointment.
    pub vet_id: String,
}

/// Query parameters for `GET /clinics/{id}/appointments`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AppointmentFilterParams {
    /// Only return appointments with this stored status.
    #[serde(default)]
    pub status: Option<String>,
}

/// An appointment as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentResponse {
    /// Appointment identifier.
    pub appointment_id: uuid::Uuid,
    /// Clinic identifier.
    pub clinic_id: String,
    /// Pet identifier.
    pub pet_id: String,
    /// Owner identifier.
    pub user_id: String,
    /// Assigned vet; `null` until confirmed.
    pub vet_id: Option<String>,
    /// Reason for the visit.
    pub reason: String,
    /// Urgency level.
    pub urgency: Urgency,
    /// Quoted price.
    pub price: u64,
    /// Start time, `YYYY-MM-DD HH:MM`.
    pub scheduled_at: String,
    /// Stored status.
    pub status: AppointmentStatus,
    /// Status shown to users: past confirmed visits read as completed.
    pub display_status: AppointmentStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<AppointmentView> for AppointmentResponse {
    fn from(view: AppointmentView) -> Self {
        let r = view.record;
        Self {
            appointment_id: *r.id.as_uuid(),
            clinic_id: r.clinic_id.to_string(),
            pet_id: r.pet_id.to_string(),
            user_id: r.user_id.to_string(),
            vet_id: r.vet_id.map(|v| v.to_string()),
            reason: r.reason,
            urgency: r.urgency,
            price: r.price,
            scheduled_at: r.scheduled_at.format(SCHEDULED_AT_FORMAT).to_string(),
            status: r.status,
            display_status: view.display_status,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// List response for appointment collections.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AppointmentListResponse {
    /// Appointments in the order documented by the endpoint.
    pub data: Vec<AppointmentResponse>,
    /// Number of appointments returned.
    pub total: usize,
}

impl FromIterator<AppointmentView> for AppointmentListResponse {
    fn from_iter<I: IntoIterator<Item = AppointmentView>>(iter: I) -> Self {
        let data: Vec<AppointmentResponse> = iter.into_iter().map(Into::into).collect();
        Self {
            total: data.len(),
            data,
        }
    }
}
