//! The intake gate: a single open/closed flag deciding whether new
//! appointment requests are accepted.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use clinic_db::Database;
use clinic_db::models::QueueStatusRow;
use clinic_types::api::{MessageResponse, QueueStatusResponse};
use clinic_types::models::QueueState;

use crate::appointments::parse_timestamp;
use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Owns the singleton queue state. Nothing else reads or writes the
/// underlying row.
#[derive(Clone)]
pub struct QueueGate {
    db: Arc<Database>,
}

impl QueueGate {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn status(&self) -> anyhow::Result<QueueState> {
        let db = self.db.clone();
        let row = run_blocking(move || db.queue_status()).await?;
        Ok(to_queue_state(row))
    }

    pub async fn is_open(&self) -> anyhow::Result<bool> {
        Ok(self.status().await?.is_open)
    }

    pub async fn open(&self) -> anyhow::Result<QueueState> {
        self.set_open(true).await
    }

    pub async fn close(&self) -> anyhow::Result<QueueState> {
        self.set_open(false).await
    }

    async fn set_open(&self, is_open: bool) -> anyhow::Result<QueueState> {
        let db = self.db.clone();
        let row = run_blocking(move || db.set_queue_open(is_open)).await?;
        info!("Appointment queue {}", if is_open { "opened" } else { "closed" });
        Ok(to_queue_state(row))
    }
}

fn to_queue_state(row: QueueStatusRow) -> QueueState {
    QueueState {
        is_open: row.is_open,
        updated_at: parse_timestamp(&row.updated_at, "queue_status"),
    }
}

pub async fn get_status(State(state): State<AppState>) -> Result<Json<QueueStatusResponse>, ApiError> {
    let status = state.gate.status().await?;
    Ok(Json(QueueStatusResponse {
        is_open: status.is_open,
        updated_at: status.updated_at,
    }))
}

pub async fn open_queue(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.open().await?;
    Ok(Json(MessageResponse {
        message: "Queue opened successfully".to_string(),
    }))
}

pub async fn close_queue(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.gate.close().await?;
    Ok(Json(MessageResponse {
        message: "Queue closed successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn last_toggle_wins_and_time_advances() {
        let gate = QueueGate::new(Arc::new(Database::open_in_memory().unwrap()));
        assert!(!gate.is_open().await.unwrap());

        let first = gate.open().await.unwrap();
        let second = gate.close().await.unwrap();
        let third = gate.open().await.unwrap();

        assert!(gate.is_open().await.unwrap());
        assert!(first.updated_at <= second.updated_at);
        assert!(second.updated_at <= third.updated_at);
        assert_eq!(gate.status().await.unwrap(), third);
    }
}
