//! Shared application state handed to every HTTP handler.
//!
//! SQLite connections are not `Sync`, so the state holds the database path
//! and handlers open a connection per request.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rusqlite::Connection;

use crate::config::ServerConfig;
use crate::db;
use crate::scheduling::{AppointmentService, SchedulingRules};

pub struct CoreState {
    db_path: PathBuf,
    scheduler: AppointmentService,
    started_at: Instant,
}

impl CoreState {
    pub fn new(db_path: PathBuf, rules: SchedulingRules) -> Self {
        Self {
            db_path,
            scheduler: AppointmentService::new(rules),
            started_at: Instant::now(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.database_path.clone(), config.rules.clone())
    }

    /// Create the database file and apply migrations ahead of the first request.
    pub fn initialize(&self) -> Result<(), CoreError> {
        let conn = db::open_database(&self.db_path)?;
        let tables = db::count_tables(&conn)?;
        tracing::info!(path = %self.db_path.display(), tables, "Database ready");
        Ok(())
    }

    /// Open a per-request connection. Requires a prior [`Self::initialize`].
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        db::open_connection(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn scheduler(&self) -> &AppointmentService {
        &self.scheduler
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
