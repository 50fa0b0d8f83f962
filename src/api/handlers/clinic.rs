//! Clinic handlers: list, get, upsert, slot availability, queue and stats.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    AppointmentFilterParams, AppointmentListResponse, ClinicListResponse, ClinicResponse,
    ClinicStatsResponse, PaginationParams, SlotAvailabilityResponse, SlotQueryParams,
    UpsertClinicRequest,
};
use crate::app_state::AppState;
use crate::domain::slot::{DATE_FORMAT, parse_date};
use crate::domain::{AppointmentStatus, ClinicId, PetId};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::SlotQuery;

/// `GET /clinics` — List clinics with pagination.
///
/// # Errors
///
/// Returns [`GatewayError`] on internal failures.
#[utoipa::path(
    get,
    path = "/api/v1/clinics",
    tag = "Clinics",
    summary = "List clinics",
    description = "Returns a paginated list of clinics sorted by name.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated clinic list", body = ClinicListResponse),
    )
)]
pub async fn list_clinics(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let clinics = state.clinic_service.list_clinics().await;
    let (page, pagination) = params.paginate(clinics);

    Ok(Json(ClinicListResponse {
        data: page.into_iter().map(ClinicResponse::from).collect(),
        pagination,
    }))
}

/// `GET /clinics/:id` — Get one clinic.
///
/// # Errors
///
/// Returns [`GatewayError::ClinicNotFound`] if the clinic does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/clinics/{id}",
    tag = "Clinics",
    summary = "Get clinic",
    params(
        ("id" = String, Path, description = "Clinic identifier"),
    ),
    responses(
        (status = 200, description = "Clinic profile", body = ClinicResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
    )
)]
pub async fn get_clinic(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let clinic_id = ClinicId::new(id)?;
    let clinic = state.clinic_service.get_clinic(&clinic_id).await?;
    Ok(Json(ClinicResponse::from(clinic)))
}

/// `PUT /clinics/:id` — Create or replace a clinic profile.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank name or zero staff.
#[utoipa::path(
    put,
    path = "/api/v1/clinics/{id}",
    tag = "Clinics",
    summary = "Create or replace clinic",
    description = "Upserts the clinic profile. `staff_count` sets how many appointments the clinic can host in the same hour slot.",
    params(
        ("id" = String, Path, description = "Clinic identifier"),
    ),
    request_body = UpsertClinicRequest,
    responses(
        (status = 200, description = "Stored clinic profile", body = ClinicResponse),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
    )
)]
pub async fn upsert_clinic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpsertClinicRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let clinic_id = ClinicId::new(id)?;
    let stored = state
        .clinic_service
        .register_clinic(req.into_profile(clinic_id))
        .await?;
    Ok(Json(ClinicResponse::from(stored)))
}

/// `GET /clinics/:id/slots` — Blocked and available slots for a pet.
///
/// # Errors
///
/// Returns [`GatewayError`] for a bad date, unknown clinic or missing
/// capacity under the strict policy.
#[utoipa::path(
    get,
    path = "/api/v1/clinics/{id}/slots",
    tag = "Slots",
    summary = "Slot availability",
    description = "Returns the hour slots the pet cannot book at this clinic on the given day: slots at capacity, slots the pet already holds anywhere, and slots that have already started today.",
    params(
        ("id" = String, Path, description = "Clinic identifier"),
        SlotQueryParams,
    ),
    responses(
        (status = 200, description = "Blocked and available slots", body = SlotAvailabilityResponse),
        (status = 400, description = "Invalid date or id", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
        (status = 422, description = "Clinic has no staff capacity", body = ErrorResponse),
    )
)]
pub async fn get_slots(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<SlotQueryParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let query = SlotQuery {
        clinic_id: ClinicId::new(id)?,
        date: parse_date(&params.date)?,
        pet_id: PetId::new(params.pet_id)?,
    };
    let availability = state.booking_service.slot_availability(&query).await?;

    Ok(Json(SlotAvailabilityResponse {
        clinic_id: query.clinic_id.to_string(),
        date: query.date.format(DATE_FORMAT).to_string(),
        pet_id: query.pet_id.to_string(),
        capacity: availability.capacity,
        available: availability
            .available()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
        blocked: availability.blocked.iter().map(ToString::to_string).collect(),
    }))
}

/// `GET /clinics/:id/appointments` — Clinic queue, optionally by status.
///
/// # Errors
///
/// Returns [`GatewayError`] for an unknown clinic or status.
#[utoipa::path(
    get,
    path = "/api/v1/clinics/{id}/appointments",
    tag = "Clinics",
    summary = "Clinic appointments",
    description = "Lists the clinic's appointments oldest first. Use `status=pending` for the requests awaiting a decision.",
    params(
        ("id" = String, Path, description = "Clinic identifier"),
        AppointmentFilterParams,
    ),
    responses(
        (status = 200, description = "Clinic appointments", body = AppointmentListResponse),
        (status = 400, description = "Unknown status", body = ErrorResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
    )
)]
pub async fn clinic_appointments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<AppointmentFilterParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let clinic_id = ClinicId::new(id)?;
    let status = params
        .status
        .as_deref()
        .map(str::parse::<AppointmentStatus>)
        .transpose()?;

    let views = state.booking_service.clinic_queue(&clinic_id, status).await?;
    Ok(Json(views.into_iter().collect::<AppointmentListResponse>()))
}

/// `GET /clinics/:id/stats` — Dashboard figures.
///
/// # Errors
///
/// Returns [`GatewayError::ClinicNotFound`] for an unknown clinic.
#[utoipa::path(
    get,
    path = "/api/v1/clinics/{id}/stats",
    tag = "Clinics",
    summary = "Clinic statistics",
    description = "Visit count, distinct clients, distinct pets and revenue over appointments that took place.",
    params(
        ("id" = String, Path, description = "Clinic identifier"),
    ),
    responses(
        (status = 200, description = "Clinic statistics", body = ClinicStatsResponse),
        (status = 404, description = "Clinic not found", body = ErrorResponse),
    )
)]
pub async fn clinic_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let clinic_id = ClinicId::new(id)?;
    let stats = state.booking_service.clinic_stats(&clinic_id).await?;
    Ok(Json(ClinicStatsResponse::new(&clinic_id, stats)))
}

/// Clinic routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clinics", get(list_clinics))
        .route("/clinics/{id}", get(get_clinic).put(upsert_clinic))
        .route("/clinics/{id}/slots", get(get_slots))
        .route("/clinics/{id}/appointments", get(clinic_appointments))
        .route("/clinics/{id}/stats", get(clinic_stats))
}
