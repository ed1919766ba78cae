use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{classify, DatabaseError};
use crate::models::*;

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

pub fn insert_patient(conn: &Connection, input: &PatientInput) -> Result<Patient, DatabaseError> {
    conn.execute("INSERT INTO patients (name) VALUES (?1)", params![input.name])
        .map_err(classify)?;

    Ok(Patient {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
    })
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    conn.query_row(
        "SELECT id, name FROM patients WHERE id = ?1",
        params![id],
        patient_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn patient_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM patients WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name FROM patients ORDER BY id")?;
    let rows = stmt.query_map([], patient_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_patient(
    conn: &Connection,
    id: i64,
    input: &PatientInput,
) -> Result<Patient, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE patients SET name = ?1 WHERE id = ?2",
            params![input.name, id],
        )
        .map_err(classify)?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Patient", id));
    }
    Ok(Patient {
        id,
        name: input.name.clone(),
    })
}

/// Deletes a patient. Fails with `ConstraintViolation` while appointments still reference it.
pub fn delete_patient(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn
        .execute("DELETE FROM patients WHERE id = ?1", params![id])
        .map_err(classify)?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Patient", id));
    }
    Ok(())
}
