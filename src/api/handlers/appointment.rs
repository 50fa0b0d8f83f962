//! Appointment handlers: booking and lifecycle actions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AppointmentResponse, ConfirmAppointmentRequest, CreateAppointmentRequest};
use crate::app_state::AppState;
use crate::domain::slot::parse_date;
use crate::domain::{AppointmentId, AppointmentRecord, ClinicId, PetId, UserId, VetId};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::{AppointmentView, BookingRequest};

/// `POST /appointments` — Submit a booking.
///
/// # Errors
///
/// Returns [`GatewayError`] when the request is invalid or a booking rule
/// refuses it.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tag = "Appointments",
    summary = "Submit a booking",
    description = "Books a pending appointment for the pet at the clinic's hour slot. The check against capacity, the pet's other bookings and the owner's pending limit is atomic.",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid request, date or slot", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
        (status = 409, description = "Slot full or pet already booked", body = ErrorResponse),
        (status = 422, description = "Pending limit reached or slot elapsed", body = ErrorResponse),
    )
)]
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = BookingRequest {
        clinic_id: ClinicId::new(req.clinic_id)?,
        pet_id: PetId::new(req.pet_id)?,
        user_id: UserId::new(req.user_id)?,
        date: parse_date(&req.date)?,
        slot: req.slot.parse()?,
        reason: req.reason,
        urgency: req.urgency,
        price: req.price,
    };

    let record = state.booking_service.submit_booking(request).await?;
    Ok((StatusCode::CREATED, Json(respond(record))))
}

/// `GET /appointments/:id` — Get one appointment.
///
/// # Errors
///
/// Returns [`GatewayError::AppointmentNotFound`] for an unknown id.
#[utoipa::path(
    get,
    path = "/api/v1/appointments/{id}",
    tag = "Appointments",
    summary = "Get appointment",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Appointment", body = AppointmentResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
    )
)]
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .booking_service
        .get_appointment(AppointmentId::from_uuid(id))
        .await?;
    Ok(Json(AppointmentResponse::from(view)))
}

/// `POST /appointments/:id/cancel` — Cancel an appointment.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] for rejected or completed
/// appointments.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/cancel",
    tag = "Appointments",
    summary = "Cancel appointment",
    description = "Cancels a pending or upcoming confirmed appointment and frees its slot. Cancelling twice is a no-op.",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Appointment can no longer be cancelled", body = ErrorResponse),
    )
)]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state
        .booking_service
        .cancel_booking(AppointmentId::from_uuid(id))
        .await?;
    Ok(Json(respond(record)))
}

/// `POST /appointments/:id/confirm` — Accept a pending request.
///
/// # Errors
///
/// Returns [`GatewayError`] if the appointment is not pending or the vet is
/// already booked at that time.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/confirm",
    tag = "Appointments",
    summary = "Confirm appointment",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    request_body = ConfirmAppointmentRequest,
    responses(
        (status = 200, description = "Appointment confirmed", body = AppointmentResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Not pending or vet unavailable", body = ErrorResponse),
    )
)]
pub async fn confirm_appointment(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ConfirmAppointmentRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let vet_id = VetId::new(req.vet_id)?;
    let record = state
        .booking_service
        .confirm_booking(AppointmentId::from_uuid(id), vet_id)
        .await?;
    Ok(Json(respond(record)))
}

/// `POST /appointments/:id/reject` — Decline a pending request.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidTransition`] unless the appointment is
/// pending.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/reject",
    tag = "Appointments",
    summary = "Reject appointment",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Appointment rejected", body = AppointmentResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Not pending", body = ErrorResponse),
    )
)]
pub async fn reject_appointment(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state
        .booking_service
        .reject_booking(AppointmentId::from_uuid(id))
        .await?;
    Ok(Json(respond(record)))
}

/// `POST /appointments/:id/complete` — Record that a visit took place.
///
/// # Errors
///
/// Returns [`GatewayError`] unless the appointment is confirmed and has
/// started.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/complete",
    tag = "Appointments",
    summary = "Complete appointment",
    params(
        ("id" = uuid::Uuid, Path, description = "Appointment UUID"),
    ),
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentResponse),
        (status = 400, description = "Appointment has not started", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse),
        (status = 409, description = "Not confirmed", body = ErrorResponse),
    )
)]
pub async fn complete_appointment(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let record = state
        .booking_service
        .complete_booking(AppointmentId::from_uuid(id))
        .await?;
    Ok(Json(respond(record)))
}

/// Renders a freshly written record; its stored status is what users see.
fn respond(record: AppointmentRecord) -> AppointmentResponse {
    let display_status = record.status;
    AppointmentResponse::from(AppointmentView {
        record,
        display_status,
    })
}

/// Appointment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/appointments", post(create_appointment))
        .route("/appointments/{id}", get(get_appointment))
        .route("/appointments/{id}/cancel", post(cancel_appointment))
        .route("/appointments/{id}/confirm", post(confirm_appointment))
        .route("/appointments/{id}/reject", post(reject_appointment))
        .route("/appointments/{id}/complete", post(complete_appointment))
}
