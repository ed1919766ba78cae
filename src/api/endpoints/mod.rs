//! API endpoint handlers, one module per resource.

pub mod appointments;
pub mod doctors;
pub mod health;
pub mod patients;

use crate::api::error::ApiError;

/// Longest accepted value for free-text name fields.
pub(crate) const MAX_NAME_LEN: usize = 200;

/// Trimmed, non-empty, bounded text field.
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{field} is required")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// A body id, when present, must match the path id.
pub(crate) fn ensure_same_id(path_id: i64, body_id: Option<i64>) -> Result<(), ApiError> {
    match body_id {
        Some(body) if body != path_id => Err(ApiError::BadRequest(format!(
            "Path id {path_id} does not match body id {body}"
        ))),
        _ => Ok(()),
    }
}
