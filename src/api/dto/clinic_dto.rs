//! Clinic DTOs for upsert, get, list and stats.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{ClinicId, ClinicProfile, Contact, Coordinates};
use crate::service::ClinicStats;

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoordinatesDto {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// Request body for `PUT /clinics/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpsertClinicRequest {
    /// Display name.
    pub name: String,
    /// Appointments the clinic can host in the same hour slot.
    #[serde(default)]
    pub staff_count: Option<u32>,
    /// Optional map position.
    #[serde(default)]
    pub coordinates: Option<CoordinatesDto>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Street address.
    #[serde(default)]
    pub address: Option<String>,
}

impl UpsertClinicRequest {
    /// Builds the domain profile for the clinic at `id`.
    #[must_use]
    pub fn into_profile(self, id: ClinicId) -> ClinicProfile {
        ClinicProfile {
            id,
            name: self.name,
            staff_count: self.staff_count,
            coordinates: self.coordinates.map(|c| Coordinates {
                lat: c.lat,
                lng: c.lng,
            }),
            contact: Contact {
                phone: self.phone,
                email: self.email,
                address: self.address,
            },
        }
    }
}

/// A clinic as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicResponse {
    /// Clinic identifier.
    pub clinic_id: String,
    /// Display name.
    pub name: String,
    /// Configured staff count; `null` when the clinic never set one.
    pub staff_count: Option<u32>,
    /// Optional map position.
    pub coordinates: Option<CoordinatesDto>,
    /// Phone number.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Street address.
    pub address: Option<String>,
}

impl From<ClinicProfile> for ClinicResponse {
    fn from(profile: ClinicProfile) -> Self {
        Self {
            clinic_id: profile.id.to_string(),
            name: profile.name,
            staff_count: profile.staff_count,
            coordinates: profile.coordinates.map(|c| CoordinatesDto {
                lat: c.lat,
                lng: c.lng,
            }),
            phone: profile.contact.phone,
            email: profile.contact.email,
            address: profile.contact.address,
        }
    }
}

/// Paginated list response for `GET /clinics`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClinicListResponse {
    /// Clinics on this page.
    pub data: Vec<ClinicResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Response body for `GET /clinics/{id}/stats`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClinicStatsResponse {
    /// Clinic identifier.
    pub clinic_id: String,
    /// Appointments that took place.
    pub visits: usize,
    /// Distinct owners seen.
    pub distinct_clients: usize,
    /// Distinct pets treated.
    pub distinct_pets: usize,
    /// Sum of appointment prices.
    pub revenue: u64,
}

impl ClinicStatsResponse {
    /// Pairs service figures with the clinic they describe.
    #[must_use]
    pub fn new(clinic_id: &ClinicId, stats: ClinicStats) -> Self {
        Self {
            clinic_id: clinic_id.to_string(),
            visits: stats.visits,
            distinct_clients: stats.distinct_clients,
            distinct_pets: stats.distinct_pets,
            revenue: stats.revenue,
        }
    }
}
