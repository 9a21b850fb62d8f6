#![warn(missing_docs)]
//! # stego-desk-core
//!
//! ## Purpose
//! Defines the pure session data model used across the `stego-desk` workspace.
//!
//! ## Responsibilities
//! - Validate candidate image files into [`ImageAsset`] values (PNG only).
//! - Represent the operating [`Mode`] and the per-image [`CapacityBound`].
//! - Score key strength with the additive five-predicate model.
//! - Assemble [`SubmissionPayload`] bundles for the remote operations.
//! - Shape every remote result as a uniform [`OperationOutcome`].
//!
//! ## Data flow
//! The shell feeds selected files through [`ImageAsset::new`], the session
//! layer pairs the asset with a key (and, for hides, a message) into a
//! [`SubmissionPayload`], and whatever the remote call produces is collapsed
//! into one [`OperationOutcome`] for the result presenter.
//!
//! ## Ownership and lifetimes
//! Assets and payloads own their backing buffers (`Vec<u8>`, `String`) to
//! avoid hidden borrow coupling between the session layer and the transport.
//!
//! ## Error model
//! Validation failures (non-PNG media type) and outcome codec failures return
//! [`CoreError`] variants with caller-actionable categorization.
//!
//! ## Security and privacy notes
//! This crate never logs key material or image bytes. Key strings enter only
//! through [`SubmissionPayload`] and [`score_key`], both of which keep the
//! value opaque.
//!
//! ## Example
//! ```rust
//! use stego_desk_core::{score_key, ImageAsset, KeyStrength};
//!
//! let asset = ImageAsset::new("photo.png", "image/png", vec![0; 2048]).expect("png accepted");
//! assert_eq!(asset.size_label, "2 KB");
//! assert_eq!(score_key("Tr0ub4dor&3x"), KeyStrength::Strong);
//! ```

use serde::Serialize;
use thiserror::Error;

/// Fixed file name for the artifact produced by a successful hide.
pub const ENCODED_ARTIFACT_NAME: &str = "encoded_image.png";

/// The two mutually exclusive operating modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Hide a message inside a PNG image.
    Encode,
    /// Reveal a message from a PNG image.
    Decode,
}

impl Mode {
    /// Returns the lowercase mode name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Encode => "encode",
            Mode::Decode => "decode",
        }
    }
}

/// The currently selected candidate file with derived preview metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Display name of the selected file.
    pub file_name: String,
    /// Declared media type (for example `image/png`).
    pub media_type: String,
    /// Raw file bytes as selected.
    pub bytes: Vec<u8>,
    /// Human-readable size label derived at ingestion.
    pub size_label: String,
}

impl ImageAsset {
    /// Constructs a validated asset.
    ///
    /// # Errors
    /// Returns [`CoreError::UnsupportedMediaType`] when the declared media
    /// type does not identify PNG.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, CoreError> {
        let media_type = media_type.into();
        if !is_png_media_type(&media_type) {
            return Err(CoreError::UnsupportedMediaType(media_type));
        }

        let size_label = format_byte_size(bytes.len());
        Ok(Self {
            file_name: file_name.into(),
            media_type,
            bytes,
            size_label,
        })
    }
}

/// Returns `true` when a declared media type identifies PNG.
///
/// # Semantics
/// Matching is by case-insensitive substring, so `image/png`, `image/x-png`
/// and bare `png` all qualify.
pub fn is_png_media_type(media_type: &str) -> bool {
    media_type.to_ascii_lowercase().contains("png")
}

/// Formats a byte count as a human-readable label.
///
/// # Semantics
/// Binary-prefixed scaling (1024) over the units `Bytes`, `KB`, `MB`, capped
/// at `MB`. At most two decimals, with trailing zeros trimmed. Zero renders
/// as the literal `0 Bytes`.
pub fn format_byte_size(len: usize) -> String {
    const UNITS: [&str; 3] = ["Bytes", "KB", "MB"];

    if len == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = len as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    let mut rendered = format!("{value:.2}");
    if rendered.contains('.') {
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
    }

    format!("{rendered} {}", UNITS[unit])
}

/// Upper bound on acceptable message length for the selected image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapacityBound {
    characters: Option<u32>,
}

impl CapacityBound {
    /// The unknown/unset bound. Disables length-based feedback.
    pub const UNKNOWN: Self = Self { characters: None };

    /// Creates a known bound of `characters`.
    pub fn known(characters: u32) -> Self {
        Self {
            characters: Some(characters),
        }
    }

    /// Returns the bound when known.
    pub fn characters(&self) -> Option<u32> {
        self.characters
    }

    /// Returns `true` when the bound is known.
    pub fn is_known(&self) -> bool {
        self.characters.is_some()
    }

    /// Returns `true` when `length` exceeds a known bound.
    ///
    /// An unknown bound never reports overflow.
    pub fn exceeded_by(&self, length: usize) -> bool {
        match self.characters {
            Some(bound) => length > bound as usize,
            None => false,
        }
    }
}

/// Advisory key strength classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrength {
    /// Empty key: no indicator shown.
    None,
    /// Fewer than three predicates satisfied.
    Weak,
    /// Three or four predicates satisfied.
    Medium,
    /// All five predicates satisfied.
    Strong,
}

/// Computes the additive strength score for a key.
///
/// # Semantics
/// Five independent predicates contribute one point each: length of at least
/// 8 characters, length of at least 12 characters, mixed upper and lower
/// case, at least one digit, at least one character outside the ASCII
/// alphanumeric set. Lengths count characters, not bytes.
pub fn strength_points(key: &str) -> u8 {
    let length = key.chars().count();
    let mut points = 0;

    if length >= 8 {
        points += 1;
    }
    if length >= 12 {
        points += 1;
    }
    if key.chars().any(|c| c.is_ascii_uppercase()) && key.chars().any(|c| c.is_ascii_lowercase()) {
        points += 1;
    }
    if key.chars().any(|c| c.is_ascii_digit()) {
        points += 1;
    }
    if key.chars().any(|c| !c.is_ascii_alphanumeric()) {
        points += 1;
    }

    points
}

/// Classifies a key by its additive strength score.
///
/// # Semantics
/// Empty keys classify as [`KeyStrength::None`]. Otherwise scores below 3 are
/// weak, 3 and 4 are medium, and the full score of 5 is strong. Advisory
/// only: classification never blocks submission.
pub fn score_key(key: &str) -> KeyStrength {
    if key.is_empty() {
        return KeyStrength::None;
    }

    match strength_points(key) {
        0..=2 => KeyStrength::Weak,
        3..=4 => KeyStrength::Medium,
        _ => KeyStrength::Strong,
    }
}

/// Outbound bundle for one submission attempt.
///
/// Constructed fresh per attempt and never cached across attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    /// The validated image the operation acts on.
    pub image: ImageAsset,
    /// Encryption/decryption key exactly as entered.
    pub key: String,
    /// Message to hide. Present only for the hide operation.
    pub message: Option<String>,
}

impl SubmissionPayload {
    /// Assembles the payload for a hide operation.
    pub fn for_hide(
        image: ImageAsset,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            image,
            key: key.into(),
            message: Some(message.into()),
        }
    }

    /// Assembles the payload for a reveal operation.
    pub fn for_reveal(image: ImageAsset, key: impl Into<String>) -> Self {
        Self {
            image,
            key: key.into(),
            message: None,
        }
    }
}

/// Success/failure discriminator for a normalized outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// The remote operation succeeded end to end.
    Success,
    /// The operation failed at any layer (validation, transport, application).
    Failure,
}

/// Normalized result of one remote operation.
///
/// The single shape the result presenter consumes, regardless of which
/// operation produced it or where a failure originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    /// Success/failure discriminator.
    pub kind: OutcomeKind,
    /// Presentation message for the single result channel.
    pub message: String,
    /// Revealed text carried by a successful reveal operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_text: Option<String>,
}

impl OperationOutcome {
    /// Builds a success outcome with no revealed text.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            message: message.into(),
            revealed_text: None,
        }
    }

    /// Builds a failure outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Failure,
            message: message.into(),
            revealed_text: None,
        }
    }

    /// Builds a success outcome carrying revealed text.
    pub fn revealed(message: impl Into<String>, revealed_text: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            message: message.into(),
            revealed_text: Some(revealed_text.into()),
        }
    }

    /// Returns `true` for success outcomes.
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }

    /// Serializes the outcome to a compact JSON string.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_string(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(CoreError::Codec)
    }
}

/// Error type for core domain validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Declared media type does not identify a PNG image.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// JSON encoding/decoding error.
    #[error("outcome codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
