//! Appointment endpoints.
//!
//! - `GET /api/appointments?date=&doctorId=&patientId=` — list, optionally filtered
//! - `POST /api/appointments` — schedule (422 with every violated rule on rejection)
//! - `POST /api/appointments/check` — evaluate rules without writing
//! - `GET|PUT|DELETE /api/appointments/:id` — fetch, reschedule, cancel

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, JsonBody, ViolationBody};
use crate::db;
use crate::models::{Appointment, AppointmentDraft, AppointmentFilter};
use crate::scheduling::ScheduleOutcome;

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub accepted: bool,
    pub violations: Vec<ViolationBody>,
}

fn into_result(outcome: ScheduleOutcome) -> Result<Appointment, ApiError> {
    match outcome {
        ScheduleOutcome::Scheduled(appointment) => Ok(appointment),
        ScheduleOutcome::Rejected(violations) => Err(ApiError::Rejected(violations)),
    }
}

/// `GET /api/appointments`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let appointments = ctx
        .with_db(move |_, conn| db::list_appointments(conn, &filter).map_err(ApiError::from))
        .await?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = ctx
        .with_db(move |_, conn| db::get_appointment(conn, id).map_err(ApiError::from))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Appointment {id} not found")))?;
    Ok(Json(appointment))
}

/// `POST /api/appointments`
pub async fn create(
    State(ctx): State<ApiContext>,
    JsonBody(draft): JsonBody<AppointmentDraft>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let appointment = ctx
        .with_db(move |core, conn| {
            let outcome = core.scheduler().schedule(conn, &draft)?;
            into_result(outcome)
        })
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// `POST /api/appointments/check`
pub async fn check(
    State(ctx): State<ApiContext>,
    JsonBody(draft): JsonBody<AppointmentDraft>,
) -> Result<Json<CheckResponse>, ApiError> {
    let violations = ctx
        .with_db(move |core, conn| core.scheduler().preview(conn, &draft).map_err(ApiError::from))
        .await?;
    Ok(Json(CheckResponse {
        accepted: violations.is_empty(),
        violations: violations.iter().map(ViolationBody::from).collect(),
    }))
}

/// `PUT /api/appointments/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    JsonBody(draft): JsonBody<AppointmentDraft>,
) -> Result<Json<Appointment>, ApiError> {
    let appointment = ctx
        .with_db(move |core, conn| {
            let outcome = core.scheduler().reschedule(conn, id, &draft)?;
            into_result(outcome)
        })
        .await?;
    Ok(Json(appointment))
}

/// `DELETE /api/appointments/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |core, conn| core.scheduler().cancel(conn, id).map_err(ApiError::from))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
