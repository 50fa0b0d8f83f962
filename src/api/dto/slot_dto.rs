//! Slot availability DTOs.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for `GET /clinics/{id}/slots`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotQueryParams {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Pet the owner wants to book for.
    pub pet_id: String,
}

/// Response body for `GET /clinics/{id}/slots`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotAvailabilityResponse {
    /// Clinic identifier.
    pub clinic_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Pet the lookup was made for.
    pub pet_id: String,
    /// Appointments the clinic hosts per slot.
    pub capacity: u32,
    /// Slots that cannot be booked, e.g. `["09:00", "14:00"]`.
    pub blocked: Vec<String>,
    /// Slots still open, in chronological order.
    pub available: Vec<String>,
}

/// Response body for `GET /config/slots`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlotCatalogResponse {
    /// Every bookable hour marker of a day.
    pub slots: Vec<String>,
    /// Length of one slot in minutes.
    pub slot_minutes: u32,
}
