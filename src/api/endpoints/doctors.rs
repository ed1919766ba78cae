//! Doctor endpoints.
//!
//! - `GET /api/doctors`, `POST /api/doctors`
//! - `GET|PUT|DELETE /api/doctors/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::{ensure_same_id, required_text};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, JsonBody};
use crate::db;
use crate::models::{Doctor, DoctorInput};

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<Doctor>,
}

fn clean(input: DoctorInput) -> Result<DoctorInput, ApiError> {
    Ok(DoctorInput {
        id: input.id,
        name: required_text("name", &input.name)?,
        specialization: required_text("specialization", &input.specialization)?,
    })
}

/// `GET /api/doctors`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<DoctorsResponse>, ApiError> {
    let doctors = ctx
        .with_db(|_, conn| db::list_doctors(conn).map_err(ApiError::from))
        .await?;
    Ok(Json(DoctorsResponse { doctors }))
}

/// `GET /api/doctors/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, ApiError> {
    let doctor = ctx
        .with_db(move |_, conn| db::get_doctor(conn, id).map_err(ApiError::from))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Doctor {id} not found")))?;
    Ok(Json(doctor))
}

/// `POST /api/doctors`
pub async fn create(
    State(ctx): State<ApiContext>,
    JsonBody(input): JsonBody<DoctorInput>,
) -> Result<(StatusCode, Json<Doctor>), ApiError> {
    let input = clean(input)?;
    let doctor = ctx
        .with_db(move |_, conn| db::insert_doctor(conn, &input).map_err(ApiError::from))
        .await?;
    tracing::info!(doctor_id = doctor.id, "Doctor created");
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// `PUT /api/doctors/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<DoctorInput>,
) -> Result<Json<Doctor>, ApiError> {
    ensure_same_id(id, input.id)?;
    let input = clean(input)?;
    let doctor = ctx
        .with_db(move |_, conn| db::update_doctor(conn, id, &input).map_err(ApiError::from))
        .await?;
    Ok(Json(doctor))
}

/// `DELETE /api/doctors/:id` — refused with 409 while appointments reference the doctor.
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |_, conn| db::delete_doctor(conn, id).map_err(ApiError::from))
        .await?;
    tracing::info!(doctor_id = id, "Doctor deleted");
    Ok(StatusCode::NO_CONTENT)
}
