use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::state::AppState;
use crate::{appointments, queue, webhook};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route("/appointments", get(appointments::list_appointments))
        .route("/appointments/{id}", get(appointments::get_appointment))
        .route("/appointments/{id}/approve", post(appointments::approve_appointment))
        .route("/queue/status", get(queue::get_status))
        .route("/queue/open", post(queue::open_queue))
        .route("/queue/close", post(queue::close_queue))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
