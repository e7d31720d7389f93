mod common;

use clinic_api::intake::{IntakeOutcome, QUEUE_CLOSED_TEXT, REQUEST_RECEIVED_TEXT, handle_inbound_message};
use clinic_types::models::AppointmentStatus;

use common::{RecordingNotifier, TestApp};

fn appointment_count(app: &TestApp) -> usize {
    app.state.db.list_appointments(None).unwrap().len()
}

#[tokio::test]
async fn unrelated_messages_create_nothing_and_send_nothing() {
    let app = TestApp::new();
    app.open_queue().await;

    for text in ["hello", "Thanks!", "what time do you open?", ""] {
        let outcome = handle_inbound_message(&app.state, "111", text).await;
        assert!(matches!(outcome, IntakeOutcome::Ignored), "{text:?} was not ignored");
    }

    assert_eq!(appointment_count(&app), 0);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn closed_queue_sends_one_notice_and_stores_nothing() {
    let app = TestApp::new();

    let outcome = handle_inbound_message(&app.state, "111", "Hi Ravi").await;

    assert!(matches!(outcome, IntakeOutcome::QueueClosed));
    assert_eq!(appointment_count(&app), 0);
    assert_eq!(
        app.notifier.sent(),
        vec![("111".to_string(), QUEUE_CLOSED_TEXT.to_string())]
    );
}

#[tokio::test]
async fn open_queue_stores_pending_request_and_acknowledges() {
    let app = TestApp::new();
    app.open_queue().await;

    let outcome = handle_inbound_message(&app.state, "919800000001", "Hi Ravi Kumar").await;

    let IntakeOutcome::Accepted(appointment) = outcome else {
        panic!("expected an accepted request, got {outcome:?}");
    };
    assert_eq!(appointment.phone, "919800000001");
    assert_eq!(appointment.patient_name, "Ravi");
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.token_number, None);

    assert_eq!(appointment_count(&app), 1);
    assert_eq!(
        app.notifier.sent(),
        vec![("919800000001".to_string(), REQUEST_RECEIVED_TEXT.to_string())]
    );
}

#[tokio::test]
async fn single_word_request_uses_placeholder_name() {
    let app = TestApp::new();
    app.open_queue().await;

    let IntakeOutcome::Accepted(appointment) =
        handle_inbound_message(&app.state, "222", "APPOINTMENT").await
    else {
        panic!("expected an accepted request");
    };

    assert_eq!(appointment.patient_name, "Patient");
}

#[tokio::test]
async fn same_sender_may_request_more_than_once() {
    let app = TestApp::new();
    app.open_queue().await;

    handle_inbound_message(&app.state, "333", "hi").await;
    handle_inbound_message(&app.state, "333", "hi again").await;

    let rows = app.state.db.list_appointments(Some("pending")).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.phone == "333"));
}

#[tokio::test]
async fn failed_notification_keeps_the_stored_request() {
    let app = TestApp::with_notifier(RecordingNotifier::failing());
    app.open_queue().await;

    let outcome = handle_inbound_message(&app.state, "444", "hi Noor").await;

    assert!(matches!(outcome, IntakeOutcome::Accepted(_)));
    assert_eq!(appointment_count(&app), 1);
    assert_eq!(app.notifier.sent().len(), 1);
}

#[tokio::test]
async fn failed_insert_is_swallowed_without_acknowledgement() {
    let app = TestApp::new();
    app.open_queue().await;
    app.break_appointment_writes("INSERT");

    let outcome = handle_inbound_message(&app.state, "555", "hi Ila").await;

    assert!(matches!(outcome, IntakeOutcome::Failed));
    assert_eq!(appointment_count(&app), 0);
    assert!(app.notifier.sent().is_empty());
}
