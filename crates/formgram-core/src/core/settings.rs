// crates/formgram-core/src/core/settings.rs
// ============================================================================
// Module: Formgram Form Settings
// Description: Form-level presentation settings and payload limits.
// Purpose: Centralize the strings that shape the message body and keyboard.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`FormSettings`] carries every form-level string that participates in the
//! message layout (separator, missing value) or the keyboard (button labels,
//! icons), plus the payload size ceiling. The separator and missing value are
//! part of the persisted layout: changing them invalidates forms already sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default separator between a label and its value.
pub const DEFAULT_SEPARATOR: &str = ": ";
/// Default payload ceiling in bytes (Telegram callback data limit).
pub const DEFAULT_PAYLOAD_MAX_BYTES: usize = 64;
/// Smallest accepted payload ceiling in bytes.
pub const MIN_PAYLOAD_MAX_BYTES: usize = 16;
/// Largest accepted payload ceiling in bytes.
pub const MAX_PAYLOAD_MAX_BYTES: usize = 256;

// ============================================================================
// SECTION: Form Settings
// ============================================================================

/// Presentation settings shared by every field of a form.
///
/// # Invariants
/// - `separator` is non-empty and contains no line break.
/// - `missing_value` contains no line break.
/// - `payload_max_bytes` lies within [`MIN_PAYLOAD_MAX_BYTES`]..=[`MAX_PAYLOAD_MAX_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// String inserted between a label and its value.
    pub separator: String,
    /// String rendered for a missing value and read back as missing.
    pub missing_value: String,
    /// Label of the submit button.
    pub ok_label: String,
    /// Label of the cancel button.
    pub cancel_label: String,
    /// Prompt prefix shown while a field awaits text input.
    pub edit_prompt: String,
    /// Prefix of the notice sent when text input fails to parse.
    pub invalid_value_message: String,
    /// Label of the button that clears a noneable field during editing.
    pub clear_label: String,
    /// Label of the button that leaves editing without a change.
    pub cancel_edit_label: String,
    /// Icon on the edit button of a field.
    pub edit_icon: String,
    /// Icon on the edit button of a required field with a missing value.
    pub required_icon: String,
    /// Icon on the previous-option button of a choice field.
    pub previous_icon: String,
    /// Icon on the next-option button of a choice field.
    pub next_icon: String,
    /// Maximum encoded button payload length in bytes.
    pub payload_max_bytes: usize,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            missing_value: String::new(),
            ok_label: "OK".to_string(),
            cancel_label: "Cancel".to_string(),
            edit_prompt: "Send a new value for".to_string(),
            invalid_value_message: "Invalid value for".to_string(),
            clear_label: "Clear".to_string(),
            cancel_edit_label: "Cancel edit".to_string(),
            edit_icon: "✏️".to_string(),
            required_icon: "💢".to_string(),
            previous_icon: "◀".to_string(),
            next_icon: "▶".to_string(),
            payload_max_bytes: DEFAULT_PAYLOAD_MAX_BYTES,
        }
    }
}

impl FormSettings {
    /// Returns the first violated settings invariant, if any.
    #[must_use]
    pub fn violation(&self) -> Option<String> {
        if self.separator.is_empty() {
            return Some("separator must not be empty".to_string());
        }
        if has_line_break(&self.separator) {
            return Some("separator must not contain line breaks".to_string());
        }
        if has_line_break(&self.missing_value) {
            return Some("missing_value must not contain line breaks".to_string());
        }
        if self.missing_value.contains(&self.separator) {
            return Some("missing_value must not contain the separator".to_string());
        }
        let labels = [
            ("ok_label", &self.ok_label),
            ("cancel_label", &self.cancel_label),
            ("clear_label", &self.clear_label),
            ("cancel_edit_label", &self.cancel_edit_label),
        ];
        for (name, label) in labels {
            if label.trim().is_empty() {
                return Some(format!("{name} must not be empty"));
            }
        }
        if has_line_break(&self.edit_prompt) {
            return Some("edit_prompt must not contain line breaks".to_string());
        }
        if !(MIN_PAYLOAD_MAX_BYTES ..= MAX_PAYLOAD_MAX_BYTES).contains(&self.payload_max_bytes) {
            return Some(format!(
                "payload_max_bytes must be between {MIN_PAYLOAD_MAX_BYTES} and {MAX_PAYLOAD_MAX_BYTES}"
            ));
        }
        None
    }
}

/// Returns true when the text contains a line break.
pub(crate) fn has_line_break(text: &str) -> bool {
    text.contains(['\n', '\r'])
}
