use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::db::{classify, DatabaseError};
use crate::models::*;

const SELECT_APPOINTMENT: &str = "SELECT id, date, doctor_id, patient_id, version FROM appointments";

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        date: row.get(1)?,
        doctor_id: row.get(2)?,
        patient_id: row.get(3)?,
        version: row.get(4)?,
    })
}

pub fn insert_appointment(
    conn: &Connection,
    fields: &AppointmentFields,
) -> Result<Appointment, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (date, doctor_id, patient_id, version) VALUES (?1, ?2, ?3, 1)",
        params![fields.date, fields.doctor_id, fields.patient_id],
    )
    .map_err(classify)?;

    Ok(Appointment {
        id: conn.last_insert_rowid(),
        date: fields.date,
        doctor_id: fields.doctor_id,
        patient_id: fields.patient_id,
        version: 1,
    })
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    conn.query_row(
        &format!("{SELECT_APPOINTMENT} WHERE id = ?1"),
        params![id],
        appointment_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Lists appointments ordered by date, narrowed by whichever filters are set.
pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(day) = filter.date {
        clauses.push("substr(date, 1, 10) = ?");
        values.push(Value::Text(day.format("%Y-%m-%d").to_string()));
    }
    if let Some(doctor_id) = filter.doctor_id {
        clauses.push("doctor_id = ?");
        values.push(Value::Integer(doctor_id));
    }
    if let Some(patient_id) = filter.patient_id {
        clauses.push("patient_id = ?");
        values.push(Value::Integer(patient_id));
    }

    let mut sql = SELECT_APPOINTMENT.to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY date ASC, id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values), appointment_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// All appointments on `day`, regardless of time of day. This is the
/// comparison set handed to the scheduling validator.
pub fn same_day_appointments(
    conn: &Connection,
    day: NaiveDate,
) -> Result<Vec<Appointment>, DatabaseError> {
    list_appointments(
        conn,
        &AppointmentFilter {
            date: Some(day),
            ..AppointmentFilter::default()
        },
    )
}

/// Rewrites date, doctor and patient and bumps `version`.
///
/// With `expected_version`, the write only happens when the stored version
/// still matches; otherwise `StaleVersion` is returned and nothing changes.
pub fn update_appointment(
    conn: &Connection,
    id: i64,
    fields: &AppointmentFields,
    expected_version: Option<i64>,
) -> Result<Appointment, DatabaseError> {
    let stored: Option<i64> = conn
        .query_row(
            "SELECT version FROM appointments WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    let stored = stored.ok_or_else(|| DatabaseError::not_found("Appointment", id))?;
    let expected = expected_version.unwrap_or(stored);

    let changed = conn
        .execute(
            "UPDATE appointments
             SET date = ?1, doctor_id = ?2, patient_id = ?3, version = version + 1
             WHERE id = ?4 AND version = ?5",
            params![fields.date, fields.doctor_id, fields.patient_id, id, expected],
        )
        .map_err(classify)?;

    if changed == 0 {
        return Err(DatabaseError::StaleVersion {
            entity_type: "Appointment".into(),
            id,
            expected,
            actual: stored,
        });
    }

    Ok(Appointment {
        id,
        date: fields.date,
        doctor_id: fields.doctor_id,
        patient_id: fields.patient_id,
        version: expected + 1,
    })
}

pub fn delete_appointment(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Appointment", id));
    }
    Ok(())
}
