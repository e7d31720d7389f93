//! Turns inbound chat messages into pending appointment requests.

use tracing::{debug, error, info};

use clinic_types::models::Appointment;

use crate::appointments::to_appointment;
use crate::intent::Intent;
use crate::notifier::deliver;
use crate::state::{AppStateInner, run_blocking};

pub const QUEUE_CLOSED_TEXT: &str =
    "Appointment queue is currently closed. Please message during OPD hours.";
pub const REQUEST_RECEIVED_TEXT: &str =
    "Your appointment request is received. Please wait for confirmation.";

/// What happened to one inbound message.
#[derive(Debug)]
pub enum IntakeOutcome {
    /// Not an appointment request. Nothing stored, nothing sent.
    Ignored,
    /// Request refused because the queue is closed.
    QueueClosed,
    Accepted(Appointment),
    /// Store failure. Logged, nothing sent.
    Failed,
}

/// Handle one inbound message. Never fails: the webhook acknowledges
/// receipt whatever happens here.
pub async fn handle_inbound_message(state: &AppStateInner, sender_id: &str, raw_text: &str) -> IntakeOutcome {
    if state.classifier.classify(raw_text) != Intent::AppointmentRequest {
        debug!("Ignoring message from {}: not an appointment request", sender_id);
        return IntakeOutcome::Ignored;
    }

    let is_open = match state.gate.is_open().await {
        Ok(open) => open,
        Err(e) => {
            error!("Failed to read queue status: {:#}", e);
            return IntakeOutcome::Failed;
        }
    };

    if !is_open {
        deliver(state.notifier.as_ref(), sender_id, QUEUE_CLOSED_TEXT).await;
        info!("Appointment request from {} denied - queue closed", sender_id);
        return IntakeOutcome::QueueClosed;
    }

    let patient_name = state.classifier.patient_name(raw_text);

    let db = state.db.clone();
    let phone = sender_id.to_string();
    let inserted = run_blocking(move || db.insert_appointment(&phone, &patient_name)).await;

    let appointment = match inserted.and_then(to_appointment) {
        Ok(appointment) => appointment,
        Err(e) => {
            error!("Error saving appointment from {}: {:#}", sender_id, e);
            return IntakeOutcome::Failed;
        }
    };
    info!("Appointment {} saved for {}", appointment.id, sender_id);

    deliver(state.notifier.as_ref(), sender_id, REQUEST_RECEIVED_TEXT).await;

    IntakeOutcome::Accepted(appointment)
}
