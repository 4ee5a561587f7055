//! Department database operations.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{Department, DepartmentKind};

impl Database {
    /// Write the live state of a department.
    pub fn upsert_department(&self, department: &Department) -> DbResult<()> {
        upsert_department(&self.conn, department)
    }

    /// Get a department by kind.
    pub fn get_department(&self, kind: DepartmentKind) -> DbResult<Option<Department>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, current_token, next_token, total_served, waiting_count
                FROM departments
                WHERE id = ?
                "#,
                [kind.id()],
                department_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List departments in display order.
    pub fn list_departments(&self) -> DbResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, current_token, next_token, total_served, waiting_count
            FROM departments
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map([], department_from_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

pub(super) fn upsert_department(conn: &Connection, department: &Department) -> DbResult<()> {
    let kind = department
        .kind()
        .ok_or_else(|| DbError::Constraint(format!("Unknown department: {}", department.name)))?;

    conn.execute(
        r#"
        INSERT INTO departments (
            id, name, position, current_token, next_token, total_served, waiting_count
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            current_token = excluded.current_token,
            next_token = excluded.next_token,
            total_served = excluded.total_served,
            waiting_count = excluded.waiting_count,
            updated_at = datetime('now')
        "#,
        params![
            kind.id(),
            kind.name(),
            kind.position() as i64,
            department.current_token,
            department.next_token,
            department.total_served,
            department.waiting_count,
        ],
    )?;
    Ok(())
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        current_token: row.get(2)?,
        next_token: row.get(3)?,
        total_served: row.get(4)?,
        waiting_count: row.get(5)?,
    })
}
