#![warn(missing_docs)]
//! # stego-desk-app
//!
//! ## Purpose
//! Orchestrates mode state, form validation, capacity probing, and submission
//! settlement for `stego-desk`.
//!
//! ## Responsibilities
//! - Enforce attachment/key/message gates before any dispatch.
//! - Keep capacity probes honest across rapid attachment changes.
//! - Drive the Idle -> Validating -> Dispatched -> Settled submission
//!   lifecycle, refusing re-entry while a submission is in flight.
//! - Normalize service failures into the fixed operator-facing outcome text.
//! - Persist encoded artifacts through a pluggable download sink.
//!
//! ## Data flow
//! Mode activation + form edits -> validation gates -> payload assembly ->
//! service dispatch -> outcome settlement -> UI projection.
//!
//! ## Ownership and lifetimes
//! [`Session`] owns all form state. Payloads handed to the service layer are
//! owned clones, so a settled session never aliases in-flight request
//! buffers.
//!
//! ## Error model
//! Shell-level failures (configuration, file I/O) are [`AppError`] values.
//! Service failures inside a submission never surface as errors: they are
//! absorbed into the settled [`OperationOutcome`] the result presenter shows.
//!
//! ## Security and privacy notes
//! - The session exposes no key readback, only the strength classification.
//! - Use [`redact_sensitive`] on log details that may embed form input.
//! - Submissions are refused, not queued, while one is already dispatched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stego_desk_client::{ServiceError, StegoClient, validate_service_endpoint};
use stego_desk_core::{
    CapacityBound, CoreError, ENCODED_ARTIFACT_NAME, ImageAsset, KeyStrength, Mode,
    OperationOutcome, SubmissionPayload, score_key,
};
use stego_desk_service_contract::StatusResponse;
use stego_desk_ui::{CapacityDisplay, CounterView, counter_view, mode_view};
use thiserror::Error;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("STEGO_DESK_VERSION");

/// Env var overriding the service endpoint.
pub const ENDPOINT_ENV: &str = "STEGO_DESK_ENDPOINT";

/// Env var overriding the artifact download directory.
pub const DOWNLOAD_DIR_ENV: &str = "STEGO_DESK_DOWNLOAD_DIR";

/// Endpoint assumed when no override is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080";

/// Download directory assumed when no override is configured.
pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

/// Rejection text when no image is attached.
pub const MESSAGE_IMAGE_REQUIRED: &str = "Please upload a PNG image.";

/// Rejection text when the key field is blank.
pub const MESSAGE_KEY_REQUIRED: &str = "An encryption/decryption key is required.";

/// Rejection text when an encode submission carries no message.
pub const MESSAGE_TEXT_REQUIRED: &str = "A message to hide is required.";

/// Rejection text when the attached file is not a PNG.
pub const MESSAGE_INVALID_FILE: &str = "Invalid File: Only PNG images are supported.";

/// Fallback text for transport-level submission failures.
pub const MESSAGE_NETWORK_FAILURE: &str = "A network or server error occurred. Please try again.";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Runtime configuration resolved from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Service endpoint base URL.
    pub endpoint: String,
    /// Directory receiving downloaded artifacts.
    pub download_dir: PathBuf,
}

/// Resolves app configuration from `STEGO_DESK_*` env vars.
///
/// Unset or blank variables fall back to [`DEFAULT_ENDPOINT`] and
/// [`DEFAULT_DOWNLOAD_DIR`]; values are trimmed before use.
///
/// # Errors
/// Returns [`AppError::Config`] when the configured endpoint violates the
/// transport policy (plain http off loopback, unsupported scheme).
pub fn config_from_env() -> Result<AppConfig, AppError> {
    let endpoint = env_or(ENDPOINT_ENV, DEFAULT_ENDPOINT);
    validate_service_endpoint(&endpoint)
        .map_err(|error| AppError::Config(format!("{ENDPOINT_ENV}: {error}")))?;

    let download_dir = PathBuf::from(env_or(DOWNLOAD_DIR_ENV, DEFAULT_DOWNLOAD_DIR));
    Ok(AppConfig {
        endpoint,
        download_dir,
    })
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Pre-dispatch form gate failures, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No image is attached to the form.
    #[error("image attachment is missing")]
    MissingImage,
    /// The key field is blank after trimming.
    #[error("key field is blank")]
    MissingKey,
    /// An encode submission carries a blank message field.
    #[error("message field is blank")]
    MissingMessage,
}

impl ValidationError {
    /// Fixed operator-facing text for this gate failure.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::MissingImage => MESSAGE_IMAGE_REQUIRED,
            ValidationError::MissingKey => MESSAGE_KEY_REQUIRED,
            ValidationError::MissingMessage => MESSAGE_TEXT_REQUIRED,
        }
    }
}

/// Lifecycle of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// No submission in progress.
    Idle,
    /// Form gates are being evaluated.
    Validating,
    /// Payload handed to the service; submit and reset controls are locked.
    Dispatched,
    /// A final outcome has been recorded.
    Settled,
}

/// Category recorded alongside a settled failure outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Form gates rejected the submission before dispatch.
    Validation,
    /// The service could not be reached or answered unusably.
    Transport,
    /// The service processed the request and refused it, or the returned
    /// artifact could not be persisted.
    Application,
}

/// Result of opening a submission attempt on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginSubmit {
    /// A previous submission is still dispatched; the attempt was refused.
    Busy,
    /// A form gate failed; the session settled immediately with this outcome.
    Invalid(OperationOutcome),
    /// All gates passed; the payload is ready for dispatch.
    Ready(SubmissionPayload),
}

/// Result of one orchestrated submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitDisposition {
    /// The attempt ran to a settled outcome.
    Settled(OperationOutcome),
    /// The attempt was refused because one is already dispatched.
    RefusedBusy,
}

/// Capacity probe progress for the current attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapacityProbe {
    /// No probe has been issued for the current attachment.
    Idle,
    /// A probe is outstanding; only a matching token may settle it.
    Pending,
    /// The probe settled with a usable bound.
    Resolved,
    /// The probe settled without a usable bound.
    Failed,
}

/// Form and lifecycle state for one operator session.
///
/// All mutation goes through phase-checked entry points: while a submission
/// is dispatched the session refuses mode changes, resets, and further
/// submissions instead of queueing them.
#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    image: Option<ImageAsset>,
    capacity: CapacityBound,
    capacity_probe: CapacityProbe,
    capacity_token: u64,
    key: String,
    message: String,
    phase: SubmissionPhase,
    last_outcome: Option<OperationOutcome>,
    last_failure: Option<FailureKind>,
}

impl Session {
    /// Creates an idle session in the given mode.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            image: None,
            capacity: CapacityBound::UNKNOWN,
            capacity_probe: CapacityProbe::Idle,
            capacity_token: 0,
            key: String::new(),
            message: String::new(),
            phase: SubmissionPhase::Idle,
            last_outcome: None,
            last_failure: None,
        }
    }

    /// Active mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Currently attached image, if any.
    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    /// Capacity bound reported for the current attachment.
    pub fn capacity(&self) -> CapacityBound {
        self.capacity
    }

    /// Current submission phase.
    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    /// Outcome recorded by the most recent settlement.
    pub fn last_outcome(&self) -> Option<&OperationOutcome> {
        self.last_outcome.as_ref()
    }

    /// Failure category recorded by the most recent settlement.
    pub fn last_failure(&self) -> Option<FailureKind> {
        self.last_failure
    }

    /// Replaces the key field.
    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
    }

    /// Replaces the message field.
    pub fn set_message(&mut self, message: &str) {
        self.message = message.to_string();
    }

    /// Switches the active mode, clearing all form state.
    ///
    /// Returns `false` without changes while a submission is dispatched.
    pub fn activate(&mut self, mode: Mode) -> bool {
        if self.phase == SubmissionPhase::Dispatched {
            return false;
        }

        self.mode = mode;
        self.clear_form();
        true
    }

    /// Clears all form state, keeping the active mode.
    ///
    /// Returns `false` without changes while a submission is dispatched.
    pub fn reset(&mut self) -> bool {
        if self.phase == SubmissionPhase::Dispatched {
            return false;
        }

        self.clear_form();
        true
    }

    // The capacity token intentionally survives clears: a probe issued before
    // the clear must not be able to settle into the fresh form.
    fn clear_form(&mut self) {
        self.image = None;
        self.capacity = CapacityBound::UNKNOWN;
        self.capacity_probe = CapacityProbe::Idle;
        self.key.clear();
        self.message.clear();
        self.phase = SubmissionPhase::Idle;
        self.last_outcome = None;
        self.last_failure = None;
    }

    /// Attaches a candidate image to the form.
    ///
    /// A rejected candidate records a failure outcome with the fixed
    /// invalid-file text and leaves any prior attachment untouched. An
    /// accepted candidate replaces the prior attachment; in encode mode it
    /// also invalidates the previous capacity result and returns the token a
    /// fresh probe must settle with.
    ///
    /// # Errors
    /// Returns [`CoreError::UnsupportedMediaType`] for non-PNG candidates.
    pub fn select_image(
        &mut self,
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Option<u64>, CoreError> {
        let asset = match ImageAsset::new(file_name, media_type, bytes) {
            Ok(asset) => asset,
            Err(error) => {
                self.last_outcome = Some(OperationOutcome::failure(MESSAGE_INVALID_FILE));
                self.last_failure = Some(FailureKind::Validation);
                return Err(error);
            }
        };

        self.image = Some(asset);
        if self.mode == Mode::Encode {
            self.capacity = CapacityBound::UNKNOWN;
            self.capacity_probe = CapacityProbe::Pending;
            self.capacity_token += 1;
            Ok(Some(self.capacity_token))
        } else {
            self.capacity = CapacityBound::UNKNOWN;
            self.capacity_probe = CapacityProbe::Idle;
            Ok(None)
        }
    }

    /// Applies a finished capacity probe.
    ///
    /// The result is discarded unless `token` matches the most recent probe
    /// and that probe is still pending, so a slow response for a replaced
    /// attachment can never overwrite the bound of the current one. Returns
    /// `true` when the result was applied.
    pub fn apply_capacity_result(
        &mut self,
        token: u64,
        result: Result<u32, ServiceError>,
    ) -> bool {
        if token != self.capacity_token || self.capacity_probe != CapacityProbe::Pending {
            return false;
        }

        match result {
            Ok(bound) => {
                self.capacity = CapacityBound::known(bound);
                self.capacity_probe = CapacityProbe::Resolved;
            }
            Err(_) => {
                self.capacity = CapacityBound::UNKNOWN;
                self.capacity_probe = CapacityProbe::Failed;
            }
        }
        true
    }

    /// Capacity line for the info bar.
    pub fn capacity_display(&self) -> CapacityDisplay {
        if self.mode != Mode::Encode || self.image.is_none() {
            return CapacityDisplay::Hidden;
        }

        match self.capacity_probe {
            CapacityProbe::Idle => CapacityDisplay::Hidden,
            CapacityProbe::Pending => CapacityDisplay::Pending,
            CapacityProbe::Resolved => match self.capacity.characters() {
                Some(bound) => CapacityDisplay::Known(bound),
                None => CapacityDisplay::Unavailable,
            },
            CapacityProbe::Failed => CapacityDisplay::Unavailable,
        }
    }

    /// Message-length counter for the current form state.
    ///
    /// Blank outside encode mode and while no usable bound exists.
    pub fn counter(&self) -> CounterView {
        if self.mode != Mode::Encode {
            return CounterView::blank();
        }

        counter_view(self.message.chars().count(), self.capacity)
    }

    /// Key strength classification, when the active mode shows indicators.
    pub fn key_strength(&self) -> Option<KeyStrength> {
        mode_view(self.mode)
            .indicators_visible
            .then(|| score_key(&self.key))
    }

    /// Opens a submission attempt.
    ///
    /// Gates run in fixed order and short-circuit at the first violation,
    /// settling the session with the matching rejection text. While a
    /// previous submission is dispatched the attempt is refused untouched.
    /// On success the session moves to dispatched and hands back the
    /// assembled payload; the key and message travel exactly as entered,
    /// trimming applies to the emptiness gates only.
    pub fn begin_submission(&mut self) -> BeginSubmit {
        if self.phase == SubmissionPhase::Dispatched {
            return BeginSubmit::Busy;
        }

        self.phase = SubmissionPhase::Validating;
        let Some(image) = self.image.clone() else {
            return BeginSubmit::Invalid(self.settle_invalid(ValidationError::MissingImage));
        };
        if self.key.trim().is_empty() {
            return BeginSubmit::Invalid(self.settle_invalid(ValidationError::MissingKey));
        }
        if self.mode == Mode::Encode && self.message.trim().is_empty() {
            return BeginSubmit::Invalid(self.settle_invalid(ValidationError::MissingMessage));
        }

        self.phase = SubmissionPhase::Dispatched;
        let payload = match self.mode {
            Mode::Encode => {
                SubmissionPayload::for_hide(image, self.key.clone(), self.message.clone())
            }
            Mode::Decode => SubmissionPayload::for_reveal(image, self.key.clone()),
        };
        BeginSubmit::Ready(payload)
    }

    /// Records the final outcome of a submission and unlocks the session.
    pub fn settle_submission(&mut self, outcome: OperationOutcome, failure: Option<FailureKind>) {
        self.phase = SubmissionPhase::Settled;
        self.last_outcome = Some(outcome);
        self.last_failure = failure;
    }

    fn settle_invalid(&mut self, error: ValidationError) -> OperationOutcome {
        let outcome = OperationOutcome::failure(error.message());
        self.phase = SubmissionPhase::Settled;
        self.last_outcome = Some(outcome.clone());
        self.last_failure = Some(FailureKind::Validation);
        outcome
    }
}

/// Persistence seam for downloaded artifacts.
pub trait DownloadSink: Send + Sync {
    /// Persists one downloaded artifact, returning its final location.
    ///
    /// # Errors
    /// Returns [`AppError::Artifact`] when the artifact cannot be written.
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError>;
}

/// Download sink writing artifacts into a fixed directory.
#[derive(Debug, Clone)]
pub struct DiskDownloadSink {
    directory: PathBuf,
}

impl DiskDownloadSink {
    /// Creates a sink rooted at `directory`. The directory is created on
    /// first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl DownloadSink for DiskDownloadSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.directory).map_err(|error| {
            AppError::Artifact(format!(
                "unable to create '{}': {error}",
                self.directory.display()
            ))
        })?;

        let path = self.directory.join(file_name);
        std::fs::write(&path, bytes).map_err(|error| {
            AppError::Artifact(format!("unable to write '{}': {error}", path.display()))
        })?;

        Ok(path)
    }
}

/// Drives validated sessions through dispatch and settlement.
pub struct SubmissionOrchestrator {
    client: StegoClient,
    sink: Arc<dyn DownloadSink>,
}

impl SubmissionOrchestrator {
    /// Creates the orchestrator over a validated client and a download sink.
    pub fn new(client: StegoClient, sink: Arc<dyn DownloadSink>) -> Self {
        Self { client, sink }
    }

    /// Runs one full submission attempt against the session.
    ///
    /// Exactly one remote call is issued per accepted attempt: the hide
    /// operation in encode mode, the reveal operation in decode mode. No
    /// call is retried automatically.
    pub fn submit(&self, session: &mut Session) -> SubmitDisposition {
        match session.begin_submission() {
            BeginSubmit::Busy => SubmitDisposition::RefusedBusy,
            BeginSubmit::Invalid(outcome) => SubmitDisposition::Settled(outcome),
            BeginSubmit::Ready(payload) => {
                let (outcome, failure) = self.dispatch(session.mode(), &payload);
                session.settle_submission(outcome.clone(), failure);
                SubmitDisposition::Settled(outcome)
            }
        }
    }

    /// Dispatches one assembled payload without touching session state.
    ///
    /// Shells that run remote calls off-thread use this between
    /// [`Session::begin_submission`] and [`Session::settle_submission`].
    pub fn dispatch(
        &self,
        mode: Mode,
        payload: &SubmissionPayload,
    ) -> (OperationOutcome, Option<FailureKind>) {
        match mode {
            Mode::Encode => self.dispatch_hide(payload),
            Mode::Decode => self.dispatch_reveal(payload),
        }
    }

    fn dispatch_hide(&self, payload: &SubmissionPayload) -> (OperationOutcome, Option<FailureKind>) {
        let bytes = match self.client.hide_message(payload) {
            Ok(bytes) => bytes,
            Err(error) => {
                let (outcome, kind) = failure_outcome(Mode::Encode, &error);
                return (outcome, Some(kind));
            }
        };

        match self.sink.save(ENCODED_ARTIFACT_NAME, &bytes) {
            Ok(path) => (
                OperationOutcome::success(format!(
                    "Encoding successful. Your new image has been downloaded to {}.",
                    path.display()
                )),
                None,
            ),
            Err(error) => (
                OperationOutcome::failure(format!("Could not save the encoded image: {error}")),
                Some(FailureKind::Application),
            ),
        }
    }

    fn dispatch_reveal(
        &self,
        payload: &SubmissionPayload,
    ) -> (OperationOutcome, Option<FailureKind>) {
        match self.client.reveal_message(payload) {
            Ok(revealed) => {
                let banner = format!("Message Revealed:\n\n{revealed}");
                (OperationOutcome::revealed(banner, revealed), None)
            }
            Err(error) => {
                let (outcome, kind) = failure_outcome(Mode::Decode, &error);
                (outcome, Some(kind))
            }
        }
    }
}

/// Maps one service failure onto the operator-facing outcome text.
///
/// # Semantics
/// - Non-success HTTP statuses render `Error: <message>` when the body
///   carried a structured error message, otherwise the status-derived
///   fallback `An unexpected error occurred (HTTP <status>).`.
/// - A 2xx application-level refusal of a reveal renders
///   `Decoding Failed: <message>`, with a fixed fallback when the body
///   carried no message.
/// - Everything else (the call never completed, or the body was unusable)
///   renders the fixed generic network failure text.
pub fn failure_outcome(mode: Mode, error: &ServiceError) -> (OperationOutcome, FailureKind) {
    match error {
        ServiceError::Http { status, message } => {
            let text = match message {
                Some(detail) => format!("Error: {detail}"),
                None => format!("An unexpected error occurred (HTTP {status})."),
            };
            (OperationOutcome::failure(text), FailureKind::Application)
        }
        ServiceError::Application { message } if mode == Mode::Decode => {
            let detail = message
                .as_deref()
                .unwrap_or("Invalid key or no message found.");
            (
                OperationOutcome::failure(format!("Decoding Failed: {detail}")),
                FailureKind::Application,
            )
        }
        _ => (
            OperationOutcome::failure(MESSAGE_NETWORK_FAILURE),
            FailureKind::Transport,
        ),
    }
}

/// Runs one capacity probe and applies it to the session when still current.
///
/// Returns `true` when the result was applied; a stale `token` makes this a
/// no-op regardless of what the probe reported.
pub fn refresh_capacity(client: &StegoClient, session: &mut Session, token: u64) -> bool {
    let Some(asset) = session.image().cloned() else {
        return false;
    };

    let result = client.check_capacity(&asset);
    session.apply_capacity_result(token, result)
}

/// Probes the service health endpoint.
///
/// # Errors
/// Returns [`AppError::Service`] when the probe fails at any layer.
pub fn probe_service(client: &StegoClient) -> Result<StatusResponse, AppError> {
    Ok(client.probe_status()?)
}

/// Loads one image attachment from disk.
///
/// # Errors
/// Returns [`AppError::Artifact`] when the file cannot be read and
/// [`AppError::Core`] when it is not an acceptable PNG attachment.
pub fn load_image_asset(path: &Path) -> Result<ImageAsset, AppError> {
    let bytes = std::fs::read(path).map_err(|error| {
        AppError::Artifact(format!("unable to read '{}': {error}", path.display()))
    })?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let media_type = media_type_for_path(path);

    Ok(ImageAsset::new(file_name, media_type, bytes)?)
}

/// Maps a file extension onto the media type declared for the attachment.
///
/// Only `.png` (case-insensitive) maps to `image/png`; everything else is
/// declared as an opaque octet stream and rejected downstream.
pub fn media_type_for_path(path: &Path) -> &'static str {
    let is_png = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.eq_ignore_ascii_case("png"))
        .unwrap_or(false);

    if is_png {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

/// Redacts common secret markers in log-safe output.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for marker in ["key", "password", "secret"] {
        redacted = redact_marker(&redacted, marker);
    }
    redacted
}

fn redact_marker(input: &str, marker: &str) -> String {
    let lower = input.to_ascii_lowercase();
    if let Some(position) = lower.find(marker) {
        let prefix = &input[..position];
        return format!("{prefix}{marker}=<redacted>");
    }

    input.to_string()
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Environment configuration rejected at startup.
    #[error("config error: {0}")]
    Config(String),
    /// Core model error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    /// Service call error outside a submission.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    /// Attachment or artifact file I/O failure.
    #[error("artifact error: {0}")]
    Artifact(String),
}
