//! Appointment write path: read the same-day snapshot, validate, write.
//!
//! Each write runs inside a `BEGIN IMMEDIATE` transaction. SQLite grants the
//! reserved lock to one writer at a time, so a second scheduler blocks (up to
//! the connection busy timeout) until the first commits, and then validates
//! against the committed state. Two concurrent requests can no longer both
//! pass validation against the same stale snapshot.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use super::rules::{SchedulingRules, Violation};
use super::validator::{AppointmentValidator, Candidate, InputError};
use crate::db::{self, DatabaseError};
use crate::models::{Appointment, AppointmentDraft, AppointmentFields};

/// Result of a schedule or reschedule request that passed input checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled(Appointment),
    Rejected(Vec<Violation>),
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Doctor {0} does not exist")]
    UnknownDoctor(i64),
    #[error("Patient {0} does not exist")]
    UnknownPatient(i64),
    #[error("Path id {path} does not match body id {body}")]
    IdMismatch { path: i64, body: i64 },
    #[error("Appointment {0} not found")]
    NotFound(i64),
    /// The stored row changed since the caller read it. Re-fetch and retry.
    #[error("Appointment {id} was modified concurrently (expected version {expected}, stored {actual})")]
    ConcurrencyConflict { id: i64, expected: i64, actual: i64 },
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Database(DatabaseError::Sqlite(err))
    }
}

/// Scheduling entry point used by the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct AppointmentService {
    validator: AppointmentValidator,
}

impl AppointmentService {
    pub fn new(rules: SchedulingRules) -> Self {
        Self {
            validator: AppointmentValidator::new(rules),
        }
    }

    pub fn rules(&self) -> &SchedulingRules {
        self.validator.rules()
    }

    /// Validate and insert a new appointment. Any id on the draft is ignored.
    pub fn schedule(
        &self,
        conn: &Connection,
        draft: &AppointmentDraft,
    ) -> Result<ScheduleOutcome, ServiceError> {
        let mut candidate = Candidate::try_from(draft)?;
        candidate.id = None;

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        ensure_references(&tx, &candidate)?;

        if let Some(violations) = self.violations(&tx, &candidate)? {
            return Ok(ScheduleOutcome::Rejected(violations));
        }

        let appointment = db::insert_appointment(&tx, &fields_of(&candidate))?;
        tx.commit()?;

        tracing::info!(
            appointment_id = appointment.id,
            doctor_id = appointment.doctor_id,
            patient_id = appointment.patient_id,
            date = %appointment.date,
            "Appointment scheduled"
        );
        Ok(ScheduleOutcome::Scheduled(appointment))
    }

    /// Validate and rewrite an existing appointment.
    ///
    /// When the draft carries `version`, it must match the stored row or the
    /// call fails with `ConcurrencyConflict` before any rule is evaluated.
    pub fn reschedule(
        &self,
        conn: &Connection,
        id: i64,
        draft: &AppointmentDraft,
    ) -> Result<ScheduleOutcome, ServiceError> {
        if let Some(body) = draft.id {
            if body != id {
                return Err(ServiceError::IdMismatch { path: id, body });
            }
        }
        let mut candidate = Candidate::try_from(draft)?;
        candidate.id = Some(id);

        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        let stored = db::get_appointment(&tx, id)?.ok_or(ServiceError::NotFound(id))?;
        if let Some(expected) = draft.version {
            if expected != stored.version {
                return Err(ServiceError::ConcurrencyConflict {
                    id,
                    expected,
                    actual: stored.version,
                });
            }
        }
        ensure_references(&tx, &candidate)?;

        if let Some(violations) = self.violations(&tx, &candidate)? {
            return Ok(ScheduleOutcome::Rejected(violations));
        }

        let updated = db::update_appointment(&tx, id, &fields_of(&candidate), draft.version)
            .map_err(|e| match e {
                DatabaseError::StaleVersion {
                    id,
                    expected,
                    actual,
                    ..
                } => ServiceError::ConcurrencyConflict {
                    id,
                    expected,
                    actual,
                },
                DatabaseError::NotFound { .. } => ServiceError::NotFound(id),
                other => ServiceError::Database(other),
            })?;
        tx.commit()?;

        tracing::info!(
            appointment_id = id,
            version = updated.version,
            date = %updated.date,
            "Appointment rescheduled"
        );
        Ok(ScheduleOutcome::Scheduled(updated))
    }

    /// Evaluate a draft against the current state without writing anything.
    /// A draft with an id is checked as a reschedule of that appointment.
    pub fn preview(
        &self,
        conn: &Connection,
        draft: &AppointmentDraft,
    ) -> Result<Vec<Violation>, ServiceError> {
        let candidate = Candidate::try_from(draft)?;
        ensure_references(conn, &candidate)?;
        let same_day = db::same_day_appointments(conn, candidate.day())?;
        Ok(self.validator.check(&candidate, &same_day))
    }

    /// Delete an appointment.
    pub fn cancel(&self, conn: &Connection, id: i64) -> Result<(), ServiceError> {
        match db::delete_appointment(conn, id) {
            Ok(()) => {
                tracing::info!(appointment_id = id, "Appointment cancelled");
                Ok(())
            }
            Err(DatabaseError::NotFound { .. }) => Err(ServiceError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// `None` when the candidate may be written.
    fn violations(
        &self,
        conn: &Connection,
        candidate: &Candidate,
    ) -> Result<Option<Vec<Violation>>, ServiceError> {
        let same_day = db::same_day_appointments(conn, candidate.day())?;
        let violations = self.validator.check(candidate, &same_day);
        if violations.is_empty() {
            return Ok(None);
        }

        let codes: Vec<&str> = violations.iter().map(Violation::code).collect();
        tracing::info!(
            doctor_id = candidate.doctor_id,
            patient_id = candidate.patient_id,
            date = %candidate.date,
            ?codes,
            "Appointment rejected"
        );
        Ok(Some(violations))
    }
}

fn ensure_references(conn: &Connection, candidate: &Candidate) -> Result<(), ServiceError> {
    if !db::doctor_exists(conn, candidate.doctor_id)? {
        return Err(ServiceError::UnknownDoctor(candidate.doctor_id));
    }
    if !db::patient_exists(conn, candidate.patient_id)? {
        return Err(ServiceError::UnknownPatient(candidate.patient_id));
    }
    Ok(())
}

fn fields_of(candidate: &Candidate) -> AppointmentFields {
    AppointmentFields {
        date: candidate.date,
        doctor_id: candidate.doctor_id,
        patient_id: candidate.patient_id,
    }
}
