// Write-time scheduling checks for a candidate appointment.
// Pure function of (candidate, same-day snapshot): no I/O, no logging, no state.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::rules::{SchedulingRules, Violation};
use crate::models::{Appointment, AppointmentDraft};

/// Candidate fields are missing or malformed; the rules cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("appointment date is required")]
    MissingDate,
    #[error("doctorId is required")]
    MissingDoctor,
    #[error("patientId is required")]
    MissingPatient,
    #[error("{field} must be a positive integer, got {value}")]
    InvalidId { field: &'static str, value: i64 },
    #[error("appointment year must be between 0 and 9999, got {0}")]
    YearOutOfRange(i32),
}

/// Stored dates are `YYYY-MM-DD HH:MM:SS` text and the same-day lookup keys on
/// the first ten characters, so only four-digit years are accepted.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// A draft whose required fields are present and well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub id: Option<i64>,
    pub date: NaiveDateTime,
    pub doctor_id: i64,
    pub patient_id: i64,
}

impl Candidate {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

impl TryFrom<&AppointmentDraft> for Candidate {
    type Error = InputError;

    fn try_from(draft: &AppointmentDraft) -> Result<Self, Self::Error> {
        let date = draft.date.ok_or(InputError::MissingDate)?;
        if !SUPPORTED_YEARS.contains(&date.year()) {
            return Err(InputError::YearOutOfRange(date.year()));
        }
        let doctor_id = positive_id("doctorId", draft.doctor_id.ok_or(InputError::MissingDoctor)?)?;
        let patient_id =
            positive_id("patientId", draft.patient_id.ok_or(InputError::MissingPatient)?)?;
        let id = draft.id.map(|id| positive_id("id", id)).transpose()?;

        Ok(Self {
            id,
            date,
            doctor_id,
            patient_id,
        })
    }
}

fn positive_id(field: &'static str, value: i64) -> Result<i64, InputError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(InputError::InvalidId { field, value })
    }
}

/// Applies [`SchedulingRules`] to candidates.
#[derive(Debug, Clone, Default)]
pub struct AppointmentValidator {
    rules: SchedulingRules,
}

impl AppointmentValidator {
    pub fn new(rules: SchedulingRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &SchedulingRules {
        &self.rules
    }

    /// Evaluate every rule against `same_day` and return the violations in
    /// rule order. An empty list means the appointment may be committed.
    ///
    /// Entries of `same_day` that fall on another calendar date, or that are
    /// the candidate itself (same id), are ignored.
    pub fn validate(
        &self,
        draft: &AppointmentDraft,
        same_day: &[Appointment],
    ) -> Result<Vec<Violation>, InputError> {
        let candidate = Candidate::try_from(draft)?;
        Ok(self.check(&candidate, same_day))
    }

    /// Rule evaluation for an already well-formed candidate.
    pub fn check(&self, candidate: &Candidate, same_day: &[Appointment]) -> Vec<Violation> {
        let day = candidate.day();
        let others: Vec<&Appointment> = same_day
            .iter()
            .filter(|a| a.day() == day)
            .filter(|a| Some(a.id) != candidate.id)
            .collect();

        let mut violations = Vec::new();

        if others.iter().any(|a| a.patient_id == candidate.patient_id) {
            violations.push(Violation::PatientDoubleBooked);
        }

        let doctor_load = others
            .iter()
            .filter(|a| a.doctor_id == candidate.doctor_id)
            .count();
        if doctor_load >= self.rules.max_daily_per_doctor {
            violations.push(Violation::DoctorAtCapacity {
                limit: self.rules.max_daily_per_doctor,
            });
        }

        if !self.rules.within_operating_hours(candidate.date.time()) {
            violations.push(Violation::OutsideOperatingHours {
                opens_at: self.rules.opens_at,
                closes_at: self.rules.closes_at,
            });
        }

        violations
    }
}

/// Validate with the default clinic rules.
pub fn validate(
    draft: &AppointmentDraft,
    same_day: &[Appointment],
) -> Result<Vec<Violation>, InputError> {
    AppointmentValidator::default().validate(draft, same_day)
}
