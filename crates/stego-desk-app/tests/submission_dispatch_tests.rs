//! Integration tests for dispatch, settlement and artifact capture.

mod common;

use std::sync::Arc;

use common::{
    FailingSink, MemorySink, RecordingTransport, client_with, json_body, png_body,
    ready_decode_session, ready_encode_session,
};
use serde_json::json;
use stego_desk_app::{
    BeginSubmit, FailureKind, Session, SubmissionOrchestrator, SubmissionPhase, SubmitDisposition,
};
use stego_desk_client::{EnvelopePart, RequestMethod};
use stego_desk_core::Mode;

#[test]
fn submission_dispatch_tests_encode_success_saves_the_artifact() {
    let encoded = vec![0x89, 0x50, 0x4E, 0x47, 0x01, 0x02, 0x03];
    let transport = RecordingTransport::scripted(vec![png_body(encoded.clone())]);
    let sink = Arc::new(MemorySink::default());
    let orchestrator = SubmissionOrchestrator::new(client_with(transport.clone()), sink.clone());

    let mut session = ready_encode_session();
    let SubmitDisposition::Settled(outcome) = orchestrator.submit(&mut session) else {
        panic!("valid encode should settle");
    };

    assert!(outcome.is_success());
    assert!(outcome.message.starts_with("Encoding successful."));
    assert!(outcome.message.contains("encoded_image.png"));
    assert_eq!(session.phase(), SubmissionPhase::Settled);
    assert_eq!(session.last_failure(), None);

    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "encoded_image.png");
    assert_eq!(saved[0].1, encoded);
}

#[test]
fn submission_dispatch_tests_encode_envelope_carries_the_form_fields() {
    let transport = RecordingTransport::scripted(vec![png_body(vec![1])]);
    let orchestrator =
        SubmissionOrchestrator::new(client_with(transport.clone()), Arc::new(MemorySink::default()));

    let mut session = ready_encode_session();
    orchestrator.submit(&mut session);

    let seen = transport.seen();
    assert_eq!(seen.len(), 1);
    let envelope = &seen[0];
    assert_eq!(envelope.method, RequestMethod::Post);
    assert!(envelope.url.ends_with("/api/hide"));
    assert!(envelope.parts.iter().any(|part| matches!(
        part,
        EnvelopePart::File { name, file_name, .. } if name == "image" && file_name == "cover.png"
    )));
    assert!(envelope.parts.iter().any(|part| matches!(
        part,
        EnvelopePart::Text { name, value } if name == "key" && value == "correct horse"
    )));
    assert!(envelope.parts.iter().any(|part| matches!(
        part,
        EnvelopePart::Text { name, value } if name == "message" && value == "meet at dawn"
    )));
}

#[test]
fn submission_dispatch_tests_decode_success_presents_the_banner() {
    let transport = RecordingTransport::scripted(vec![json_body(
        200,
        json!({"status": "success", "message": "meet at dawn", "messageLength": 12}),
    )]);
    let sink = Arc::new(MemorySink::default());
    let orchestrator = SubmissionOrchestrator::new(client_with(transport.clone()), sink.clone());

    let mut session = ready_decode_session();
    let SubmitDisposition::Settled(outcome) = orchestrator.submit(&mut session) else {
        panic!("valid decode should settle");
    };

    assert!(outcome.is_success());
    assert_eq!(outcome.message, "Message Revealed:\n\nmeet at dawn");
    assert_eq!(outcome.revealed_text.as_deref(), Some("meet at dawn"));
    assert!(transport.seen()[0].url.ends_with("/api/reveal"));
    assert!(sink.saved().is_empty());
}

#[test]
fn submission_dispatch_tests_decode_refusal_settles_as_failure() {
    let transport = RecordingTransport::scripted(vec![json_body(
        200,
        json!({"status": "error", "message": "Invalid key or corrupted data"}),
    )]);
    let orchestrator =
        SubmissionOrchestrator::new(client_with(transport), Arc::new(MemorySink::default()));

    let mut session = ready_decode_session();
    let SubmitDisposition::Settled(outcome) = orchestrator.submit(&mut session) else {
        panic!("refused decode should settle");
    };

    assert!(!outcome.is_success());
    assert_eq!(outcome.message, "Decoding Failed: Invalid key or corrupted data");
    assert_eq!(session.last_failure(), Some(FailureKind::Application));
}

#[test]
fn submission_dispatch_tests_busy_session_is_refused_without_network() {
    let transport = RecordingTransport::scripted(vec![]);
    let orchestrator =
        SubmissionOrchestrator::new(client_with(transport.clone()), Arc::new(MemorySink::default()));

    let mut session = ready_encode_session();
    assert!(matches!(session.begin_submission(), BeginSubmit::Ready(_)));

    let disposition = orchestrator.submit(&mut session);
    assert_eq!(disposition, SubmitDisposition::RefusedBusy);
    assert!(transport.seen().is_empty());
    assert_eq!(session.phase(), SubmissionPhase::Dispatched);
}

#[test]
fn submission_dispatch_tests_validation_failure_never_touches_the_network() {
    let transport = RecordingTransport::scripted(vec![]);
    let orchestrator =
        SubmissionOrchestrator::new(client_with(transport.clone()), Arc::new(MemorySink::default()));

    let mut session = Session::new(Mode::Encode);
    let SubmitDisposition::Settled(outcome) = orchestrator.submit(&mut session) else {
        panic!("invalid submission should settle");
    };

    assert!(!outcome.is_success());
    assert!(transport.seen().is_empty());
}

#[test]
fn submission_dispatch_tests_sink_failure_settles_as_application_failure() {
    let transport = RecordingTransport::scripted(vec![png_body(vec![1, 2, 3])]);
    let orchestrator = SubmissionOrchestrator::new(client_with(transport), Arc::new(FailingSink));

    let mut session = ready_encode_session();
    let SubmitDisposition::Settled(outcome) = orchestrator.submit(&mut session) else {
        panic!("sink failure should still settle");
    };

    assert!(!outcome.is_success());
    assert!(outcome.message.starts_with("Could not save the encoded image:"));
    assert_eq!(session.last_failure(), Some(FailureKind::Application));
    assert_eq!(session.phase(), SubmissionPhase::Settled);
}
