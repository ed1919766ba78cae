//! Shared types for the API layer.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use rusqlite::Connection;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::scheduling::Violation;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    /// Run `f` with a fresh connection on the blocking pool.
    ///
    /// Appointment writes may wait on the SQLite write lock, so database
    /// work never runs on the async worker threads.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&CoreState, &Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let core = Arc::clone(&self.core);
        tokio::task::spawn_blocking(move || -> Result<T, ApiError> {
            let conn = core.open_db()?;
            f(&core, &conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}

/// Wire form of a scheduling violation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViolationBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&Violation> for ViolationBody {
    fn from(v: &Violation) -> Self {
        Self {
            code: v.code(),
            message: v.message(),
        }
    }
}

/// `Json` extractor whose rejections use the API error envelope.
///
/// Bodies that fail to parse (bad date text, a string where an id belongs,
/// missing content type) answer 400 `BAD_REQUEST`, never axum's plain-text
/// 422, which is reserved for scheduling rejections.
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
