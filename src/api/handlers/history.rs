//! Owner-facing appointment listings by pet and by user.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{AppointmentListResponse, AppointmentResponse};
use crate::app_state::AppState;
use crate::domain::{PetId, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /pets/:id/appointments` — Pet history, newest first.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank pet id.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}/appointments",
    tag = "Pets",
    summary = "Pet appointment history",
    description = "Every appointment of the pet, newest first. Past confirmed visits carry `display_status: completed`.",
    params(
        ("id" = String, Path, description = "Pet identifier"),
    ),
    responses(
        (status = 200, description = "Pet history", body = AppointmentListResponse),
    )
)]
pub async fn pet_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let pet_id = PetId::new(id)?;
    let views = state.booking_service.pet_history(&pet_id).await;
    Ok(Json(views.into_iter().collect::<AppointmentListResponse>()))
}

/// `GET /pets/:id/appointments/next` — The pet's next visit.
///
/// # Errors
///
/// Returns [`GatewayError::NoUpcomingAppointment`] if nothing is scheduled.
#[utoipa::path(
    get,
    path = "/api/v1/pets/{id}/appointments/next",
    tag = "Pets",
    summary = "Next appointment",
    params(
        ("id" = String, Path, description = "Pet identifier"),
    ),
    responses(
        (status = 200, description = "Earliest upcoming active appointment", body = AppointmentResponse),
        (status = 404, description = "No upcoming appointment", body = ErrorResponse),
    )
)]
pub async fn next_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let pet_id = PetId::new(id)?;
    let view = state.booking_service.next_appointment(&pet_id).await?;
    Ok(Json(AppointmentResponse::from(view)))
}

/// `GET /users/:id/appointments` — Appointments booked by a user.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank user id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/appointments",
    tag = "Users",
    summary = "User appointments",
    description = "Every appointment the user booked, oldest first.",
    params(
        ("id" = String, Path, description = "User identifier"),
    ),
    responses(
        (status = 200, description = "User appointments", body = AppointmentListResponse),
    )
)]
pub async fn user_appointments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let user_id = UserId::new(id)?;
    let views = state.booking_service.user_appointments(&user_id).await;
    Ok(Json(views.into_iter().collect::<AppointmentListResponse>()))
}

/// Pet and user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pets/{id}/appointments", get(pet_history))
        .route("/pets/{id}/appointments/next", get(next_appointment))
        .route("/users/{id}/appointments", get(user_appointments))
}
