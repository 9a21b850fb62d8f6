#![warn(missing_docs)]
//! # stego-desk-ui
//!
//! ## Purpose
//! Defines the UI-facing projections for the `stego-desk` session.
//!
//! ## Responsibilities
//! - Fix the per-mode view configuration (titles, labels, visibility).
//! - Project capacity state, message-length counter and key-strength
//!   indicator into display-safe values.
//! - Compose the result panel from the last operation outcome.
//!
//! ## Data flow
//! Session state owned by the app layer is projected through these pure
//! functions; the shell renders the returned values verbatim.
//!
//! ## Ownership and lifetimes
//! Projections return owned values (or `'static` labels) so shells can hold
//! them across frames without borrowing session state.
//!
//! ## Error model
//! This crate has no failure cases. Every projection is total over its input
//! domain.
//!
//! ## Security and privacy notes
//! Projections never receive key material; strength is projected from the
//! derived classification only.

use stego_desk_core::{CapacityBound, ImageAsset, KeyStrength, Mode, OperationOutcome};

/// Fixed view configuration for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeView {
    /// Form title text.
    pub title: &'static str,
    /// Whether the message field is rendered.
    pub message_field_visible: bool,
    /// Label text for the key field.
    pub key_label: &'static str,
    /// Label text for the submit control.
    pub submit_label: &'static str,
    /// Whether the capacity and strength indicators are rendered.
    pub indicators_visible: bool,
    /// Whether a successful result exposes the copy affordance.
    pub copy_on_success: bool,
}

/// Returns the fixed view configuration for `mode`.
///
/// Total over the two-mode domain; there is no error case.
pub fn mode_view(mode: Mode) -> ModeView {
    match mode {
        Mode::Encode => ModeView {
            title: "Encode Message",
            message_field_visible: true,
            key_label: "Encryption Key",
            submit_label: "Encode & Download",
            indicators_visible: true,
            copy_on_success: false,
        },
        Mode::Decode => ModeView {
            title: "Decode Message",
            message_field_visible: false,
            key_label: "Decryption Key",
            submit_label: "Decode Message",
            indicators_visible: false,
            copy_on_success: true,
        },
    }
}

/// Capacity indicator states shown under the image selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityDisplay {
    /// No indicator rendered.
    Hidden,
    /// A capacity query is outstanding.
    Pending,
    /// The service reported a bound, in characters.
    Known(u32),
    /// The query failed; length feedback is unavailable.
    Unavailable,
}

impl CapacityDisplay {
    /// Returns the indicator text for this state.
    pub fn text(&self) -> String {
        match self {
            CapacityDisplay::Hidden => String::new(),
            CapacityDisplay::Pending => "Calculating capacity...".to_string(),
            CapacityDisplay::Known(bound) => format!("Image capacity: ~{bound} characters."),
            CapacityDisplay::Unavailable => "Could not determine capacity.".to_string(),
        }
    }
}

/// Message-length counter projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterView {
    /// Rendered counter text. Blank while no usable bound exists.
    pub text: String,
    /// Whether the counter is in the over-capacity visual state.
    pub over_capacity: bool,
}

impl CounterView {
    /// The blank counter shown while no usable bound exists.
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            over_capacity: false,
        }
    }
}

/// Projects the message-length counter for `length` characters against
/// `bound`.
///
/// # Semantics
/// Blank (and never over capacity) when the bound is unknown or zero. A zero
/// bound disables the counter rather than flagging every keystroke.
pub fn counter_view(length: usize, bound: CapacityBound) -> CounterView {
    match bound.characters() {
        Some(limit) if limit > 0 => CounterView {
            text: format!("{length} / {limit}"),
            over_capacity: bound.exceeded_by(length),
        },
        _ => CounterView::blank(),
    }
}

/// Key-strength indicator projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthIndicator {
    /// Indicator label text. Blank for an empty key.
    pub label: &'static str,
    /// Style class applied to the indicator. Blank for an empty key.
    pub style_class: &'static str,
}

/// Projects the strength indicator for `strength`.
pub fn strength_indicator(strength: KeyStrength) -> StrengthIndicator {
    match strength {
        KeyStrength::None => StrengthIndicator {
            label: "",
            style_class: "",
        },
        KeyStrength::Weak => StrengthIndicator {
            label: "Weak",
            style_class: "weak",
        },
        KeyStrength::Medium => StrengthIndicator {
            label: "Medium",
            style_class: "medium",
        },
        KeyStrength::Strong => StrengthIndicator {
            label: "Strong",
            style_class: "strong",
        },
    }
}

/// Result panel projection consumed by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    /// Rendered result text.
    pub text: String,
    /// Whether the result is styled as a success.
    pub success: bool,
    /// Whether the copy affordance is rendered.
    pub copy_visible: bool,
    /// Exact text placed on the clipboard by the copy affordance.
    pub copy_payload: Option<String>,
}

/// Projects the result panel for the last outcome in `mode`.
///
/// The copy affordance appears only for successful outcomes in a mode whose
/// view enables it, and copies the raw revealed text rather than the
/// rendered banner.
pub fn result_view(mode: Mode, outcome: &OperationOutcome) -> ResultView {
    let copyable = outcome.is_success()
        && mode_view(mode).copy_on_success
        && outcome.revealed_text.is_some();

    ResultView {
        text: outcome.message.clone(),
        success: outcome.is_success(),
        copy_visible: copyable,
        copy_payload: if copyable {
            outcome.revealed_text.clone()
        } else {
            None
        },
    }
}

/// Composes the file-info line shown next to the image selector.
pub fn asset_info_label(asset: &ImageAsset) -> String {
    format!("{} ({})", asset.file_name, asset.size_label)
}
