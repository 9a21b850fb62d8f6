//! Shared fixtures for app integration tests.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use stego_desk_app::{
    AppError, DownloadSink, Session, SubmissionOrchestrator,
};
use stego_desk_client::{
    RequestEnvelope, ServiceError, ServiceTransport, StegoClient, WireResponse,
};
use stego_desk_core::Mode;

/// Transport double that replays scripted responses and records every
/// envelope it receives.
#[allow(dead_code)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<Result<WireResponse, ServiceError>>>,
    seen: Mutex<Vec<RequestEnvelope>>,
}

#[allow(dead_code)]
impl RecordingTransport {
    /// Builds a transport that will serve `responses` in order.
    pub fn scripted(responses: Vec<Result<WireResponse, ServiceError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Returns the envelopes executed so far, oldest first.
    pub fn seen(&self) -> Vec<RequestEnvelope> {
        self.seen.lock().expect("seen lock should not be poisoned").clone()
    }
}

impl ServiceTransport for RecordingTransport {
    fn execute(&self, envelope: &RequestEnvelope) -> Result<WireResponse, ServiceError> {
        self.seen
            .lock()
            .expect("seen lock should not be poisoned")
            .push(envelope.clone());
        self.responses
            .lock()
            .expect("responses lock should not be poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("no scripted response remains".to_string())))
    }
}

/// Download sink that keeps artifacts in memory.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
}

#[allow(dead_code)]
impl MemorySink {
    /// Returns the saved artifacts, oldest first.
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().expect("saved lock should not be poisoned").clone()
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        self.saved
            .lock()
            .expect("saved lock should not be poisoned")
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("downloads").join(file_name))
    }
}

/// Download sink that always fails.
#[allow(dead_code)]
pub struct FailingSink;

impl DownloadSink for FailingSink {
    fn save(&self, _file_name: &str, _bytes: &[u8]) -> Result<PathBuf, AppError> {
        Err(AppError::Artifact("disk is full".to_string()))
    }
}

/// Returns a minimal valid PNG byte fixture.
#[allow(dead_code)]
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.resize(64, 0);
    bytes
}

/// Returns a scripted 2xx response carrying `body` as JSON.
#[allow(dead_code)]
pub fn json_body(status: u16, body: serde_json::Value) -> Result<WireResponse, ServiceError> {
    Ok(WireResponse {
        status,
        body: body.to_string().into_bytes(),
    })
}

/// Returns a scripted 200 response carrying raw PNG bytes.
#[allow(dead_code)]
pub fn png_body(bytes: Vec<u8>) -> Result<WireResponse, ServiceError> {
    Ok(WireResponse { status: 200, body: bytes })
}

/// Builds a client over `transport` with the default loopback endpoint.
#[allow(dead_code)]
pub fn client_with(transport: Arc<RecordingTransport>) -> StegoClient {
    StegoClient::new("http://localhost:8080", transport)
        .expect("loopback endpoint should validate")
}

/// Builds an orchestrator over the given doubles.
#[allow(dead_code)]
pub fn orchestrator_with(
    transport: Arc<RecordingTransport>,
    sink: Arc<dyn DownloadSink>,
) -> SubmissionOrchestrator {
    SubmissionOrchestrator::new(client_with(transport), sink)
}

/// Returns an encode session that passes every pre-dispatch gate.
#[allow(dead_code)]
pub fn ready_encode_session() -> Session {
    let mut session = Session::new(Mode::Encode);
    session
        .select_image("cover.png", "image/png", png_bytes())
        .expect("png fixture should attach");
    session.set_key("correct horse");
    session.set_message("meet at dawn");
    session
}

/// Returns a decode session that passes every pre-dispatch gate.
#[allow(dead_code)]
pub fn ready_decode_session() -> Session {
    let mut session = Session::new(Mode::Decode);
    session
        .select_image("encoded_image.png", "image/png", png_bytes())
        .expect("png fixture should attach");
    session.set_key("correct horse");
    session
}
