use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A persisted appointment.
///
/// `version` starts at 1 and is bumped on every reschedule; clients echo it
/// back on update to detect concurrent edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: i64,
    pub date: NaiveDateTime,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub version: i64,
}

impl Appointment {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }
}

/// Candidate appointment as received from a scheduling request.
///
/// Every field is optional on the wire so that missing values surface as
/// input errors from the validator rather than as opaque decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub patient_id: Option<i64>,
    #[serde(default)]
    pub version: Option<i64>,
}

impl AppointmentDraft {
    pub fn new(date: NaiveDateTime, doctor_id: i64, patient_id: i64) -> Self {
        Self {
            id: None,
            date: Some(date),
            doctor_id: Some(doctor_id),
            patient_id: Some(patient_id),
            version: None,
        }
    }

    /// Draft that reschedules an existing appointment.
    pub fn for_update(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Optional filters for appointment listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilter {
    pub date: Option<NaiveDate>,
    #[serde(rename = "doctorId")]
    pub doctor_id: Option<i64>,
    #[serde(rename = "patientId")]
    pub patient_id: Option<i64>,
}

/// Column values written on insert and reschedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentFields {
    pub date: NaiveDateTime,
    pub doctor_id: i64,
    pub patient_id: i64,
}
