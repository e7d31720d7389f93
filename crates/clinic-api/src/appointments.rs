use axum::{
    Json,
    extract::{Path, Query, State},
};
use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use tracing::warn;

use clinic_db::models::AppointmentRow;
use clinic_types::api::{ApproveResponse, ListAppointmentsQuery};
use clinic_types::models::{Appointment, AppointmentStatus};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};
use crate::tokens;

/// GET /appointments?status=<value>
///
/// Oldest first. A missing or blank `status` lists everything; an unknown
/// status matches nothing.
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let status = query
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let db = state.db.clone();
    let rows = run_blocking(move || db.list_appointments(status.as_deref())).await?;

    let appointments = rows.into_iter().map(to_appointment).collect::<Result<Vec<_>>>()?;
    Ok(Json(appointments))
}

/// GET /appointments/{id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let db = state.db.clone();
    let row = run_blocking(move || db.get_appointment(id))
        .await?
        .ok_or(ApiError::NotFound(id))?;

    Ok(Json(to_appointment(row)?))
}

/// POST /appointments/{id}/approve
pub async fn approve_appointment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApproveResponse>, ApiError> {
    let token = tokens::approve(&state, id).await?;
    Ok(Json(ApproveResponse { token }))
}

/// Row to API model. An unknown status is a storage error, never guessed.
pub(crate) fn to_appointment(row: AppointmentRow) -> Result<Appointment> {
    let status = row
        .status
        .parse::<AppointmentStatus>()
        .map_err(|e| anyhow!("Corrupt status on appointment {}: {}", row.id, e))?;

    Ok(Appointment {
        created_at: parse_timestamp(&row.created_at, "appointments"),
        id: row.id,
        phone: row.phone,
        patient_name: row.patient_name,
        status,
        token_number: row.token_number,
    })
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS[.fff]" without timezone.
pub(crate) fn parse_timestamp(raw: &str, table: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").unwrap_or_else(|e| {
        warn!("Corrupt timestamp '{}' in {}: {}", raw, table, e);
        NaiveDateTime::default()
    })
}
