use tracing::info;

use clinic_db::ApprovalOutcome;

use crate::error::ApiError;
use crate::notifier::deliver;
use crate::state::{AppStateInner, run_blocking};

pub fn confirmation_text(token: i64) -> String {
    format!("Your appointment is confirmed. Token number: #{}", token)
}

/// Approve a pending appointment and hand out the next token of the day.
///
/// The store assigns the token atomically; the requester is notified only
/// after the approval has committed, and a failed notification does not undo it.
pub async fn approve(state: &AppStateInner, appointment_id: i64) -> Result<i64, ApiError> {
    let db = state.db.clone();
    let outcome = run_blocking(move || db.approve_appointment(appointment_id))
        .await
        .map_err(ApiError::TokenAssignment)?;

    let (token, phone) = match outcome {
        ApprovalOutcome::Approved { token_number, phone } => (token_number, phone),
        ApprovalOutcome::NotFound => return Err(ApiError::NotFound(appointment_id)),
        ApprovalOutcome::AlreadyApproved => return Err(ApiError::AlreadyApproved(appointment_id)),
    };
    info!("Appointment {} approved with token #{}", appointment_id, token);

    deliver(state.notifier.as_ref(), &phone, &confirmation_text(token)).await;

    Ok(token)
}
