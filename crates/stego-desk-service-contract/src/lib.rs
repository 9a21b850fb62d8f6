#![warn(missing_docs)]
//! # stego-desk-service-contract
//!
//! ## Purpose
//! Defines the steganography service response schema and client-side
//! normalization helpers.
//!
//! ## Responsibilities
//! - Parse capacity, reveal and status-probe response payloads.
//! - Extract error messages from structured failure bodies leniently.
//! - Strip trailing null padding from revealed message text.
//!
//! ## Data flow
//! Raw JSON response -> [`parse_reveal_response`] (or its capacity/status
//! siblings) -> client outcome normalization -> result presenter.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers. [`strip_null_padding`] is the one borrowing helper; it trims in
//! place over the caller's string.
//!
//! ## Error model
//! Invalid JSON or success bodies missing their mandatory fields return
//! [`ServiceContractError`]. Failure bodies are never parsed strictly:
//! [`lenient_error_message`] degrades to `None` instead of erroring.
//!
//! ## Security and privacy notes
//! Response bodies carry no key material. Revealed message text is returned
//! to the caller untouched apart from null-padding removal and is never
//! logged here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status literal carried by successful structured bodies.
pub const STATUS_SUCCESS: &str = "success";
/// Status literal carried by structured error bodies.
pub const STATUS_ERROR: &str = "error";

/// Structured body of a capacity-query response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityResponse {
    /// Application-level status literal (`success` or `error`).
    pub status: String,
    /// Reported embedding capacity in characters.
    #[serde(rename = "capacityCharacters", default)]
    pub capacity_characters: Option<u32>,
    /// Server-side timestamp. Opaque to the client.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl CapacityResponse {
    /// Returns the reported bound when the body signals application success.
    pub fn success_capacity(&self) -> Option<u32> {
        if self.status == STATUS_SUCCESS {
            self.capacity_characters
        } else {
            None
        }
    }
}

/// Structured body of a reveal response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealResponse {
    /// Application-level status literal (`success` or `error`).
    pub status: String,
    /// Revealed message on success, failure detail otherwise.
    #[serde(default)]
    pub message: Option<String>,
    /// Server-reported length of the revealed message. Opaque to the client.
    #[serde(rename = "messageLength", default)]
    pub message_length: Option<u32>,
    /// Server-side timestamp. Opaque to the client.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl RevealResponse {
    /// Returns `true` when the body signals application success.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Structured body of a status-probe response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Application-level status literal (`success` or `error`).
    pub status: String,
    /// Human-readable service banner.
    #[serde(default)]
    pub message: Option<String>,
    /// Server-side timestamp. Opaque to the client.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl StatusResponse {
    /// Returns `true` when the body signals application success.
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Parses raw JSON into a validated capacity response.
///
/// # Errors
/// Returns [`ServiceContractError::Decode`] for invalid JSON.
/// Returns [`ServiceContractError::InvalidContract`] when the status literal
/// is blank, or when a success body omits `capacityCharacters`.
pub fn parse_capacity_response(raw: &str) -> Result<CapacityResponse, ServiceContractError> {
    let parsed: CapacityResponse = serde_json::from_str(raw)?;

    if parsed.status.trim().is_empty() {
        return Err(ServiceContractError::InvalidContract(
            "status is empty".to_string(),
        ));
    }

    if parsed.status == STATUS_SUCCESS && parsed.capacity_characters.is_none() {
        return Err(ServiceContractError::InvalidContract(
            "success body is missing capacityCharacters".to_string(),
        ));
    }

    Ok(parsed)
}

/// Parses raw JSON into a validated reveal response.
///
/// # Errors
/// Returns [`ServiceContractError::Decode`] for invalid JSON.
/// Returns [`ServiceContractError::InvalidContract`] when the status literal
/// is blank, or when a success body omits `message`.
pub fn parse_reveal_response(raw: &str) -> Result<RevealResponse, ServiceContractError> {
    let parsed: RevealResponse = serde_json::from_str(raw)?;

    if parsed.status.trim().is_empty() {
        return Err(ServiceContractError::InvalidContract(
            "status is empty".to_string(),
        ));
    }

    if parsed.status == STATUS_SUCCESS && parsed.message.is_none() {
        return Err(ServiceContractError::InvalidContract(
            "success body is missing message".to_string(),
        ));
    }

    Ok(parsed)
}

/// Parses raw JSON into a validated status-probe response.
///
/// # Errors
/// Returns [`ServiceContractError::Decode`] for invalid JSON.
/// Returns [`ServiceContractError::InvalidContract`] when the status literal
/// is blank.
pub fn parse_status_response(raw: &str) -> Result<StatusResponse, ServiceContractError> {
    let parsed: StatusResponse = serde_json::from_str(raw)?;

    if parsed.status.trim().is_empty() {
        return Err(ServiceContractError::InvalidContract(
            "status is empty".to_string(),
        ));
    }

    Ok(parsed)
}

/// Extracts the `message` field from a structured failure body.
///
/// # Semantics
/// Lenient by design: non-JSON bodies, bodies without a string `message`, and
/// blank messages all yield `None` so the caller can fall back to a
/// status-derived message. Never errors.
pub fn lenient_error_message(raw: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
    }

    let body: ErrorBody = serde_json::from_str(raw).ok()?;
    body.message.filter(|message| !message.trim().is_empty())
}

/// Removes trailing null padding from revealed message text.
///
/// # Semantics
/// Only a trailing run of `\0` characters is removed; interior nulls are
/// preserved.
pub fn strip_null_padding(text: &str) -> &str {
    text.trim_end_matches('\0')
}

/// Service contract errors.
#[derive(Debug, Error)]
pub enum ServiceContractError {
    /// JSON decode failure.
    #[error("response decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed payload violates contract invariants.
    #[error("response contract violation: {0}")]
    InvalidContract(String),
}

#[cfg(test)]
mod tests {
    //! Unit tests for response parsing and normalization helpers.

    use super::*;

    #[test]
    fn capacity_success_exposes_reported_bound() {
        let raw = r#"{"status":"success","capacityCharacters":120,"timestamp":1700000000000}"#;
        let parsed = parse_capacity_response(raw).expect("capacity body should parse");
        assert_eq!(parsed.success_capacity(), Some(120));
    }

    #[test]
    fn capacity_success_without_bound_violates_contract() {
        let raw = r#"{"status":"success","timestamp":1700000000000}"#;
        let err = parse_capacity_response(raw).expect_err("missing bound should be rejected");
        assert!(matches!(err, ServiceContractError::InvalidContract(_)));
    }

    #[test]
    fn reveal_failure_body_keeps_detail_message() {
        let raw = r#"{"status":"error","message":"Invalid key or corrupted data"}"#;
        let parsed = parse_reveal_response(raw).expect("failure body should still parse");
        assert!(!parsed.is_success());
        assert_eq!(parsed.message.as_deref(), Some("Invalid key or corrupted data"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let raw = r#"{"status":"success","message":"hi","messageLength":2,"extra":{"a":1}}"#;
        let parsed = parse_reveal_response(raw).expect("unknown fields should be opaque");
        assert_eq!(parsed.message.as_deref(), Some("hi"));
        assert_eq!(parsed.message_length, Some(2));
    }

    #[test]
    fn lenient_error_message_degrades_to_none() {
        assert_eq!(lenient_error_message("<html>502</html>"), None);
        assert_eq!(lenient_error_message(r#"{"status":"error"}"#), None);
        assert_eq!(lenient_error_message(r#"{"message":"  "}"#), None);
        assert_eq!(
            lenient_error_message(r#"{"status":"error","message":"bad key"}"#),
            Some("bad key".to_string())
        );
    }

    #[test]
    fn null_padding_strips_trailing_run_only() {
        assert_eq!(strip_null_padding("secret\0\0\0"), "secret");
        assert_eq!(strip_null_padding("se\0cret"), "se\0cret");
        assert_eq!(strip_null_padding("plain"), "plain");
    }
}
