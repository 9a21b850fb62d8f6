#![warn(missing_docs)]
//! # stego-desk-client
//!
//! ## Purpose
//! Implements the remote operations client for the steganography service.
//!
//! ## Responsibilities
//! - Validate service endpoint policy (http/https, https off loopback).
//! - Build multipart request envelopes for the four remote operations.
//! - Execute requests through an injectable transport abstraction.
//! - Map wire responses into typed results or [`ServiceError`] values.
//!
//! ## Data flow
//! Session layer assembles a payload -> [`StegoClient`] builds a
//! [`RequestEnvelope`] -> [`ServiceTransport`] executes it -> the raw
//! [`WireResponse`] is decoded against the service contract and surfaced as a
//! typed result.
//!
//! ## Ownership and lifetimes
//! Envelopes and wire responses own their buffers so mock transports and the
//! real HTTP transport share one seam without lifetime coupling.
//!
//! ## Error model
//! Every failure is a [`ServiceError`]: endpoint policy violations at
//! construction, `Network` when a call never completes, `Http` for
//! non-success statuses, `Application` for 2xx logical failures, and `Decode`
//! when a completed call produces an unusable body.
//!
//! ## Security and privacy notes
//! This crate never logs key material or image bytes. [`asset_digest`] exists
//! so callers can correlate submissions in logs without recording either.
//!
//! ## Example
//! ```rust
//! use stego_desk_client::validate_service_endpoint;
//!
//! validate_service_endpoint("http://localhost:8080").expect("loopback http is allowed");
//! assert!(validate_service_endpoint("http://stego.example.net").is_err());
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::multipart;
use sha2::{Digest, Sha256};
use stego_desk_core::{ImageAsset, SubmissionPayload};
use stego_desk_service_contract::{
    ServiceContractError, StatusResponse, lenient_error_message, parse_capacity_response,
    parse_reveal_response, parse_status_response, strip_null_padding,
};
use thiserror::Error;
use url::Url;

/// Path of the capacity-query operation.
pub const CAPACITY_PATH: &str = "/api/capacity";
/// Path of the hide operation.
pub const HIDE_PATH: &str = "/api/hide";
/// Path of the reveal operation.
pub const REVEAL_PATH: &str = "/api/reveal";
/// Path of the status-probe operation.
pub const STATUS_PATH: &str = "/api/test";

/// Multipart field name carrying the image file.
pub const FIELD_IMAGE: &str = "image";
/// Multipart field name carrying the key.
pub const FIELD_KEY: &str = "key";
/// Multipart field name carrying the message to hide.
pub const FIELD_MESSAGE: &str = "message";

/// HTTP method of a request envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    /// Bare GET without a body.
    Get,
    /// Multipart form POST.
    Post,
}

/// One multipart field of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopePart {
    /// Plain UTF-8 form field.
    Text {
        /// Form field name.
        name: String,
        /// Field value exactly as entered.
        value: String,
    },
    /// Binary file form field.
    File {
        /// Form field name.
        name: String,
        /// File name hint forwarded to the service.
        file_name: String,
        /// Declared media type of the file.
        media_type: String,
        /// Raw file bytes.
        bytes: Vec<u8>,
    },
}

/// Transport-agnostic request for one remote operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEnvelope {
    /// HTTP method to use.
    pub method: RequestMethod,
    /// Absolute operation URL.
    pub url: String,
    /// Multipart fields in declaration order. Empty for GET probes.
    pub parts: Vec<EnvelopePart>,
}

impl RequestEnvelope {
    /// Builds the POST envelope for a multipart operation.
    pub fn multipart(url: impl Into<String>, parts: Vec<EnvelopePart>) -> Self {
        Self {
            method: RequestMethod::Post,
            url: url.into(),
            parts,
        }
    }

    /// Builds the bare GET envelope used by the status probe.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: RequestMethod::Get,
            url: url.into(),
            parts: Vec::new(),
        }
    }

    /// Returns the image part for `asset` under the fixed field name.
    pub fn image_part(asset: &ImageAsset) -> EnvelopePart {
        EnvelopePart::File {
            name: FIELD_IMAGE.to_string(),
            file_name: asset.file_name.clone(),
            media_type: asset.media_type.clone(),
            bytes: asset.bytes.clone(),
        }
    }
}

/// Raw response surfaced by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl WireResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body decoded as UTF-8, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Abstract transport used by the remote operations client.
pub trait ServiceTransport: Send + Sync {
    /// Executes one prepared request against the service.
    fn execute(&self, request: &RequestEnvelope) -> Result<WireResponse, ServiceError>;
}

/// Blocking HTTP transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates the transport.
    ///
    /// `timeout` bounds each request when given. `None` disables the
    /// underlying client's default request timeout; a hung call then settles
    /// only when the server responds.
    ///
    /// # Errors
    /// Returns [`ServiceError::Network`] when the underlying client cannot be
    /// constructed.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ServiceError::Network(error.to_string()))?;

        Ok(Self { client })
    }
}

impl ServiceTransport for HttpTransport {
    fn execute(&self, request: &RequestEnvelope) -> Result<WireResponse, ServiceError> {
        let response = match request.method {
            RequestMethod::Get => self
                .client
                .get(&request.url)
                .send()
                .map_err(|error| ServiceError::Network(error.to_string()))?,
            RequestMethod::Post => {
                let mut form = multipart::Form::new();
                for part in &request.parts {
                    form = match part {
                        EnvelopePart::Text { name, value } => {
                            form.text(name.clone(), value.clone())
                        }
                        EnvelopePart::File {
                            name,
                            file_name,
                            media_type,
                            bytes,
                        } => {
                            let file_part = multipart::Part::bytes(bytes.clone())
                                .file_name(file_name.clone())
                                .mime_str(media_type)
                                .map_err(|error| {
                                    ServiceError::Network(format!(
                                        "multipart media type rejected: {error}"
                                    ))
                                })?;
                            form.part(name.clone(), file_part)
                        }
                    };
                }

                self.client
                    .post(&request.url)
                    .multipart(form)
                    .send()
                    .map_err(|error| ServiceError::Network(error.to_string()))?
            }
        };

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|error| ServiceError::Network(error.to_string()))?
            .to_vec();

        Ok(WireResponse { status, body })
    }
}

/// Remote operations client that validates endpoint policy and maps wire
/// responses into typed results.
#[derive(Clone)]
pub struct StegoClient {
    endpoint: Url,
    transport: Arc<dyn ServiceTransport>,
}

impl StegoClient {
    /// Creates a validated client.
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidEndpoint`] when the endpoint violates
    /// scheme or host policy.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn ServiceTransport>,
    ) -> Result<Self, ServiceError> {
        let endpoint = endpoint.into();
        validate_service_endpoint(&endpoint)?;
        let endpoint = Url::parse(&endpoint)
            .map_err(|error| ServiceError::InvalidEndpoint(format!("invalid service url: {error}")))?;

        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Returns the configured service endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Issues the capacity query for `asset` and returns the reported bound
    /// in characters.
    ///
    /// # Errors
    /// Returns [`ServiceError::Http`] for non-success statuses,
    /// [`ServiceError::Application`] when a 2xx body does not signal
    /// application success, and [`ServiceError::Decode`] for unusable bodies.
    pub fn check_capacity(&self, asset: &ImageAsset) -> Result<u32, ServiceError> {
        let envelope = RequestEnvelope::multipart(
            self.operation_url(CAPACITY_PATH)?,
            vec![RequestEnvelope::image_part(asset)],
        );
        let response = self.transport.execute(&envelope)?;
        if !response.is_success() {
            return Err(http_failure(&response));
        }

        let parsed = parse_capacity_response(&response.body_text())?;
        match parsed.success_capacity() {
            Some(capacity) => Ok(capacity),
            None => Err(ServiceError::Application { message: None }),
        }
    }

    /// Issues the hide operation and returns the encoded PNG bytes.
    ///
    /// The message part is included only when the payload carries one.
    ///
    /// # Errors
    /// Returns [`ServiceError::Http`] for non-success statuses with the
    /// leniently extracted error message attached.
    pub fn hide_message(&self, payload: &SubmissionPayload) -> Result<Vec<u8>, ServiceError> {
        let mut parts = vec![
            RequestEnvelope::image_part(&payload.image),
            EnvelopePart::Text {
                name: FIELD_KEY.to_string(),
                value: payload.key.clone(),
            },
        ];
        if let Some(message) = &payload.message {
            parts.push(EnvelopePart::Text {
                name: FIELD_MESSAGE.to_string(),
                value: message.clone(),
            });
        }

        let envelope = RequestEnvelope::multipart(self.operation_url(HIDE_PATH)?, parts);
        let response = self.transport.execute(&envelope)?;
        if !response.is_success() {
            return Err(http_failure(&response));
        }

        Ok(response.body)
    }

    /// Issues the reveal operation and returns the revealed text with
    /// trailing null padding removed.
    ///
    /// # Errors
    /// Returns [`ServiceError::Application`] when a 2xx body does not signal
    /// application success (invalid key, no embedded message).
    pub fn reveal_message(&self, payload: &SubmissionPayload) -> Result<String, ServiceError> {
        let envelope = RequestEnvelope::multipart(
            self.operation_url(REVEAL_PATH)?,
            vec![
                RequestEnvelope::image_part(&payload.image),
                EnvelopePart::Text {
                    name: FIELD_KEY.to_string(),
                    value: payload.key.clone(),
                },
            ],
        );
        let response = self.transport.execute(&envelope)?;
        if !response.is_success() {
            return Err(http_failure(&response));
        }

        let parsed = parse_reveal_response(&response.body_text())?;
        if parsed.is_success() {
            let revealed = parsed.message.unwrap_or_default();
            return Ok(strip_null_padding(&revealed).to_string());
        }

        Err(ServiceError::Application {
            message: parsed.message,
        })
    }

    /// Issues the status probe and returns the parsed banner body.
    ///
    /// # Errors
    /// Returns [`ServiceError::Application`] when the probe body does not
    /// signal application success.
    pub fn probe_status(&self) -> Result<StatusResponse, ServiceError> {
        let envelope = RequestEnvelope::get(self.operation_url(STATUS_PATH)?);
        let response = self.transport.execute(&envelope)?;
        if !response.is_success() {
            return Err(http_failure(&response));
        }

        let parsed = parse_status_response(&response.body_text())?;
        if !parsed.is_success() {
            return Err(ServiceError::Application {
                message: parsed.message,
            });
        }

        Ok(parsed)
    }

    fn operation_url(&self, path: &str) -> Result<String, ServiceError> {
        let url = self
            .endpoint
            .join(path)
            .map_err(|error| ServiceError::InvalidEndpoint(format!("invalid operation url: {error}")))?;

        Ok(url.to_string())
    }
}

/// Validates service endpoint policy.
///
/// # Semantics
/// Only `http` and `https` schemes are accepted, and `http` only for
/// loopback hosts (`localhost` or loopback addresses). Everything else must
/// use `https`.
///
/// # Errors
/// Returns [`ServiceError::InvalidEndpoint`] describing the violation.
pub fn validate_service_endpoint(endpoint: &str) -> Result<(), ServiceError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| ServiceError::InvalidEndpoint(format!("invalid service url: {error}")))?;

    match parsed.scheme() {
        "https" => {}
        "http" => {
            if !is_loopback_host(&parsed) {
                return Err(ServiceError::InvalidEndpoint(
                    "plain http is allowed for loopback hosts only".to_string(),
                ));
            }
        }
        other => {
            return Err(ServiceError::InvalidEndpoint(format!(
                "unsupported scheme: {other}"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(ServiceError::InvalidEndpoint(
            "service endpoint is missing a host".to_string(),
        ));
    }

    Ok(())
}

fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(address)) => address.is_loopback(),
        Some(url::Host::Ipv6(address)) => address.is_loopback(),
        None => false,
    }
}

/// Computes a short, log-safe digest of the selected image bytes.
///
/// Used to correlate submissions in run logs without recording image content
/// or key material. First 16 hex characters of SHA-256 over the file bytes.
pub fn asset_digest(asset: &ImageAsset) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&asset.bytes);
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(16);
    digest
}

fn http_failure(response: &WireResponse) -> ServiceError {
    ServiceError::Http {
        status: response.status,
        message: lenient_error_message(&response.body_text()),
    }
}

/// Errors produced by the remote operations client.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Endpoint violates scheme or host policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// The call never completed (connect, timeout or read failure).
    #[error("network failure: {0}")]
    Network(String),
    /// The service answered with a non-success HTTP status.
    #[error("service returned http status {status}")]
    Http {
        /// HTTP status code of the response.
        status: u16,
        /// Message extracted from a structured error body, when present.
        message: Option<String>,
    },
    /// The service answered 2xx with an application-level failure.
    #[error("service reported an application failure")]
    Application {
        /// Failure detail carried by the body, when present.
        message: Option<String>,
    },
    /// A completed call produced a body the contract cannot decode.
    #[error("unusable response body: {0}")]
    Decode(#[from] ServiceContractError),
}
