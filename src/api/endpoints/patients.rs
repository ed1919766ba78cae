//! Patient endpoints.
//!
//! - `GET /api/patients`, `POST /api/patients`
//! - `GET|PUT|DELETE /api/patients/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::endpoints::{ensure_same_id, required_text};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, JsonBody};
use crate::db;
use crate::models::{Patient, PatientInput};

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
}

/// `GET /api/patients`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<PatientsResponse>, ApiError> {
    let patients = ctx
        .with_db(|_, conn| db::list_patients(conn).map_err(ApiError::from))
        .await?;
    Ok(Json(PatientsResponse { patients }))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let patient = ctx
        .with_db(move |_, conn| db::get_patient(conn, id).map_err(ApiError::from))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Patient {id} not found")))?;
    Ok(Json(patient))
}

/// `POST /api/patients`
pub async fn create(
    State(ctx): State<ApiContext>,
    JsonBody(input): JsonBody<PatientInput>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    let input = PatientInput {
        id: None,
        name: required_text("name", &input.name)?,
    };
    let patient = ctx
        .with_db(move |_, conn| db::insert_patient(conn, &input).map_err(ApiError::from))
        .await?;
    tracing::info!(patient_id = patient.id, "Patient created");
    Ok((StatusCode::CREATED, Json(patient)))
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    ensure_same_id(id, input.id)?;
    let input = PatientInput {
        id: Some(id),
        name: required_text("name", &input.name)?,
    };
    let patient = ctx
        .with_db(move |_, conn| db::update_patient(conn, id, &input).map_err(ApiError::from))
        .await?;
    Ok(Json(patient))
}

/// `DELETE /api/patients/:id`
pub async fn remove(
    State(ctx): State<ApiContext>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ctx.with_db(move |_, conn| db::delete_patient(conn, id).map_err(ApiError::from))
        .await?;
    tracing::info!(patient_id = id, "Patient deleted");
    Ok(StatusCode::NO_CONTENT)
}
