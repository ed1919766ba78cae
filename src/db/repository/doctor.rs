use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{classify, DatabaseError};
use crate::models::*;

fn doctor_from_row(row: &Row<'_>) -> rusqlite::Result<Doctor> {
    Ok(Doctor {
        id: row.get(0)?,
        name: row.get(1)?,
        specialization: row.get(2)?,
    })
}

pub fn insert_doctor(conn: &Connection, input: &DoctorInput) -> Result<Doctor, DatabaseError> {
    conn.execute(
        "INSERT INTO doctors (name, specialization) VALUES (?1, ?2)",
        params![input.name, input.specialization],
    )
    .map_err(classify)?;

    Ok(Doctor {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        specialization: input.specialization.clone(),
    })
}

pub fn get_doctor(conn: &Connection, id: i64) -> Result<Option<Doctor>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, specialization FROM doctors WHERE id = ?1",
        params![id],
        doctor_from_row,
    )
    .optional()
    .map_err(DatabaseError::from)
}

pub fn doctor_exists(conn: &Connection, id: i64) -> Result<bool, DatabaseError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM doctors WHERE id = ?1", params![id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

pub fn list_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id, name, specialization FROM doctors ORDER BY id")?;
    let rows = stmt.query_map([], doctor_from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn update_doctor(
    conn: &Connection,
    id: i64,
    input: &DoctorInput,
) -> Result<Doctor, DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE doctors SET name = ?1, specialization = ?2 WHERE id = ?3",
            params![input.name, input.specialization, id],
        )
        .map_err(classify)?;
    if changed == 0 {
        return Err(DatabaseError::not_found("Doctor", id));
    }
    Ok(Doctor {
        id,
        name: input.name.clone(),
        specialization: input.specialization.clone(),
    })
}

/// Deletes a doctor. Fails with `ConstraintViolation` while appointments still reference it.
pub fn delete_doctor(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let deleted = conn
        .execute("DELETE FROM doctors WHERE id = ?1", params![id])
        .map_err(classify)?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Doctor", id));
    }
    Ok(())
}
