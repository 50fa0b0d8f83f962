//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    AppointmentListResponse, AppointmentResponse, ClinicListResponse, ClinicResponse,
    ClinicStatsResponse, ConfirmAppointmentRequest, CoordinatesDto, CreateAppointmentRequest,
    PaginationMeta, SlotAvailabilityResponse, SlotCatalogResponse, UpsertClinicRequest,
};
use super::handlers::{appointment, clinic, history, system};
use crate::domain::{AppointmentStatus, Urgency};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI 3 document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "petify-gateway",
        description = "Veterinary appointment slot allocation: clinic directory, slot availability and the appointment lifecycle."
    ),
    paths(
        system::health_handler,
        system::slots_handler,
        clinic::list_clinics,
        clinic::get_clinic,
        clinic::upsert_clinic,
        clinic::get_slots,
        clinic::clinic_appointments,
        clinic::clinic_stats,
        appointment::create_appointment,
        appointment::get_appointment,
        appointment::cancel_appointment,
        appointment::confirm_appointment,
        appointment::reject_appointment,
        appointment::complete_appointment,
        history::pet_history,
        history::next_appointment,
        history::user_appointments,
    ),
    components(schemas(
        AppointmentListResponse,
        AppointmentResponse,
        AppointmentStatus,
        ClinicListResponse,
        ClinicResponse,
        ClinicStatsResponse,
        ConfirmAppointmentRequest,
        CoordinatesDto,
        CreateAppointmentRequest,
        ErrorBody,
        ErrorResponse,
        PaginationMeta,
        SlotAvailabilityResponse,
        SlotCatalogResponse,
        UpsertClinicRequest,
        Urgency,
        system::HealthResponse,
    )),
    tags(
        (name = "System", description = "Health and static configuration"),
        (name = "Clinics", description = "Clinic directory, queue and statistics"),
        (name = "Slots", description = "Hour slot availability"),
        (name = "Appointments", description = "Booking and lifecycle actions"),
        (name = "Pets", description = "Per-pet appointment views"),
        (name = "Users", description = "Per-owner appointment views"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_booking_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/appointments"));
        assert!(doc.paths.paths.contains_key("/api/v1/clinics/{id}/slots"));
        assert!(doc.paths.paths.contains_key("/health"));
    }
}
