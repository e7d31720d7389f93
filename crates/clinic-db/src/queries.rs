use crate::models::{AppointmentRow, QueueStatusRow};
use crate::Database;
use anyhow::{Result, anyhow};
use clinic_types::models::AppointmentStatus;
use rusqlite::{Connection, Row, TransactionBehavior};

/// Fixed identity of the single queue status row.
const QUEUE_ROW_ID: i64 = 1;

const APPOINTMENT_COLUMNS: &str = "id, phone, patient_name, status, created_at, token_number";

/// Result of an approval attempt. Only `Approved` mutates the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    Approved { token_number: i64, phone: String },
    NotFound,
    AlreadyApproved,
}

impl Database {
    // -- Appointments --

    pub fn insert_appointment(&self, phone: &str, patient_name: &str) -> Result<AppointmentRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO appointments (phone, patient_name, status) VALUES (?1, ?2, ?3)
                 RETURNING {APPOINTMENT_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                (phone, patient_name, AppointmentStatus::Pending.as_str()),
                map_appointment,
            )?;
            Ok(row)
        })
    }

    /// Insert with an explicit `created_at` (`YYYY-MM-DD HH:MM:SS[.sss]`).
    /// Test fixture helper for requests from earlier days.
    #[cfg(any(test, feature = "test-util"))]
    pub fn insert_appointment_at(
        &self,
        phone: &str,
        patient_name: &str,
        created_at: &str,
    ) -> Result<AppointmentRow> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO appointments (phone, patient_name, status, created_at) VALUES (?1, ?2, ?3, ?4)
                 RETURNING {APPOINTMENT_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                (phone, patient_name, AppointmentStatus::Pending.as_str(), created_at),
                map_appointment,
            )?;
            Ok(row)
        })
    }

    pub fn get_appointment(&self, id: i64) -> Result<Option<AppointmentRow>> {
        self.with_conn(|conn| query_appointment(conn, id))
    }

    /// Oldest first. `None` lists every appointment regardless of status.
    pub fn list_appointments(&self, status: Option<&str>) -> Result<Vec<AppointmentRow>> {
        self.with_conn(|conn| query_appointments(conn, status))
    }

    /// Approve a pending appointment and stamp it with the next token of the
    /// current day. Requests left pending overnight join today's sequence.
    ///
    /// The token is computed and written by one `UPDATE` inside an IMMEDIATE
    /// transaction, so two approvals can never read the same daily maximum.
    /// Any error rolls the transaction back and leaves the row untouched.
    pub fn approve_appointment(&self, id: i64) -> Result<ApprovalOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let approved: Option<(i64, String)> = tx
                .query_row(
                    "UPDATE appointments
                     SET status = ?2,
                         token_date = date('now'),
                         token_number = (
                             SELECT COALESCE(MAX(t.token_number), 0) + 1
                             FROM appointments t
                             WHERE t.token_date = date('now')
                         )
                     WHERE id = ?1 AND status = ?3
                     RETURNING token_number, phone",
                    rusqlite::params![
                        id,
                        AppointmentStatus::Approved.as_str(),
                        AppointmentStatus::Pending.as_str(),
                    ],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;

            let outcome = match approved {
                Some((token_number, phone)) => ApprovalOutcome::Approved { token_number, phone },
                None => {
                    let exists: Option<i64> = tx
                        .query_row("SELECT id FROM appointments WHERE id = ?1", [id], |row| row.get(0))
                        .optional()?;
                    if exists.is_some() {
                        ApprovalOutcome::AlreadyApproved
                    } else {
                        ApprovalOutcome::NotFound
                    }
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    // -- Queue status --

    pub fn queue_status(&self) -> Result<QueueStatusRow> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT is_open, updated_at FROM queue_status WHERE id = ?1",
                [QUEUE_ROW_ID],
                map_queue_status,
            )
            .optional()?
            .ok_or_else(|| anyhow!("Queue status row missing"))
        })
    }

    /// Set the gate flag and bump `updated_at`. Returns the new state.
    pub fn set_queue_open(&self, is_open: bool) -> Result<QueueStatusRow> {
        self.with_conn(|conn| {
            conn.query_row(
                "UPDATE queue_status
                 SET is_open = ?2,
                     updated_at = MAX(updated_at, strftime('%Y-%m-%d %H:%M:%f', 'now'))
                 WHERE id = ?1
                 RETURNING is_open, updated_at",
                rusqlite::params![QUEUE_ROW_ID, is_open],
                map_queue_status,
            )
            .optional()?
            .ok_or_else(|| anyhow!("Queue status row missing"))
        })
    }
}

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        phone: row.get(1)?,
        patient_name: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        token_number: row.get(5)?,
    })
}

fn map_queue_status(row: &Row<'_>) -> rusqlite::Result<QueueStatusRow> {
    Ok(QueueStatusRow {
        is_open: row.get(0)?,
        updated_at: row.get(1)?,
    })
}

fn query_appointment(conn: &Connection, id: i64) -> Result<Option<AppointmentRow>> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1");
    let row = conn.query_row(&sql, [id], map_appointment).optional()?;
    Ok(row)
}

fn query_appointments(conn: &Connection, status: Option<&str>) -> Result<Vec<AppointmentRow>> {
    let rows = match status {
        Some(status) => {
            let sql = format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 WHERE status = ?1
                 ORDER BY created_at ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([status], map_appointment)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        None => {
            let sql = format!(
                "SELECT {APPOINTMENT_COLUMNS} FROM appointments
                 ORDER BY created_at ASC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            stmt.query_map([], map_appointment)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
