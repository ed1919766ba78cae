//! HTTP API for doctors, patients and appointments.
//!
//! Routes are nested under `/api/`. Every request passes through the access
//! logger; responses carry `Cache-Control: no-store`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ApiSession};
pub use types::ApiContext;
