// crates/formgram-core/src/core/payload.rs
// ============================================================================
// Module: Formgram Payload Codec
// Description: Encoding and decoding of button payloads.
// Purpose: Carry editing intent through the stateless round trip.
// Dependencies: crate::core::{fingerprint, identifiers}, serde, thiserror
// ============================================================================

//! ## Overview
//! Every button a form renders carries a payload produced by [`PayloadCodec`]:
//!
//! ```text
//! fg1/<form_id>/<op>[/<field_or_action>[/<cursor_or_editor>]]/<fingerprint>
//! ```
//!
//! Op codes: `e` start edit, `v` submit value, `x` cancel edit, `i` increment,
//! `d` decrement, `ok` submit form, `c` cancel form, `a` custom action. The
//! cancel-edit payload also carries the editor tag of the user whose text
//! reply the form is waiting for.
//! Invariants:
//! - `decode(encode(a)) == a` for every action.
//! - Decoding is canonical: a string is accepted only when re-encoding the
//!   decoded action reproduces it byte-for-byte, so no foreign string can
//!   collide with a legitimately encoded payload.
//! - Payloads from another layout (different fingerprint) are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::fingerprint::is_editor_tag;
use crate::core::identifiers::ActionId;
use crate::core::identifiers::EditorTag;
use crate::core::identifiers::FieldName;
use crate::core::identifiers::FormId;
use crate::core::identifiers::validate_payload_token;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Version tag leading every payload.
pub const PAYLOAD_VERSION: &str = "fg1";
/// Delimiter between payload segments.
const DELIMITER: char = '/';

// ============================================================================
// SECTION: Button Actions
// ============================================================================

/// Editing intent carried by a button payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Begin editing a field (free text) or advance it in place.
    StartEdit {
        /// Target field.
        field: FieldName,
    },
    /// Assign the value at `cursor`, or the missing value when absent.
    SubmitValue {
        /// Target field.
        field: FieldName,
        /// Kind-specific value index.
        cursor: Option<u16>,
    },
    /// Leave editing without a change.
    CancelEdit {
        /// Field being edited.
        field: FieldName,
        /// Tag of the user expected to reply.
        editor: EditorTag,
    },
    /// Move a choice field forward to the option at `cursor`.
    Increment {
        /// Target field.
        field: FieldName,
        /// Target option index.
        cursor: u16,
    },
    /// Move a choice field backward to the option at `cursor`.
    Decrement {
        /// Target field.
        field: FieldName,
        /// Target option index.
        cursor: u16,
    },
    /// Submit the form.
    Ok,
    /// Cancel the form.
    Cancel,
    /// Invoke a custom action.
    Custom {
        /// Custom action identifier.
        action: ActionId,
    },
}

impl ButtonAction {
    /// Returns the op code used on the wire.
    #[must_use]
    pub const fn op_code(&self) -> &'static str {
        match self {
            Self::StartEdit {
                ..
            } => "e",
            Self::SubmitValue {
                ..
            } => "v",
            Self::CancelEdit {
                ..
            } => "x",
            Self::Increment {
                ..
            } => "i",
            Self::Decrement {
                ..
            } => "d",
            Self::Ok => "ok",
            Self::Cancel => "c",
            Self::Custom {
                ..
            } => "a",
        }
    }

    /// Returns the targeted field, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&FieldName> {
        match self {
            Self::StartEdit {
                field,
            }
            | Self::SubmitValue {
                field,
                ..
            }
            | Self::CancelEdit {
                field,
                ..
            }
            | Self::Increment {
                field,
                ..
            }
            | Self::Decrement {
                field,
                ..
            } => Some(field),
            Self::Ok
            | Self::Cancel
            | Self::Custom {
                ..
            } => None,
        }
    }
}

// ============================================================================
// SECTION: Decode Errors
// ============================================================================

/// Errors raised when decoding a button payload.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Decode errors are per-event and cause the event to be ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Payload is not a formgram payload.
    #[error("payload is not a formgram payload")]
    Foreign,
    /// Payload uses an unsupported codec version.
    #[error("unsupported payload version: {0}")]
    UnsupportedVersion(String),
    /// Payload belongs to another form.
    #[error("payload belongs to form {actual}, expected {expected}")]
    FormMismatch {
        /// Form handled by the codec.
        expected: FormId,
        /// Form named by the payload.
        actual: String,
    },
    /// Payload was produced for another layout of the form.
    #[error("payload fingerprint does not match the form layout")]
    StaleLayout,
    /// Payload structure is malformed.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Payload decodes but is not in canonical form.
    #[error("payload is not canonically encoded")]
    NonCanonical,
}

// ============================================================================
// SECTION: Payload Codec
// ============================================================================

/// Payload codec bound to one form layout.
///
/// # Invariants
/// - `form_id` and every embedded token satisfy [`validate_payload_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadCodec {
    /// Form identifier embedded in every payload.
    form_id: FormId,
    /// Layout fingerprint appended to every payload.
    fingerprint: String,
    /// Maximum encoded length in bytes.
    max_bytes: usize,
}

impl PayloadCodec {
    /// Creates a codec for a form layout.
    #[must_use]
    pub fn new(form_id: FormId, fingerprint: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            form_id,
            fingerprint: fingerprint.into(),
            max_bytes,
        }
    }

    /// Returns the form identifier.
    #[must_use]
    pub const fn form_id(&self) -> &FormId {
        &self.form_id
    }

    /// Returns the layout fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Returns the payload ceiling in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Encodes an action into a payload string.
    ///
    /// Callers validate layouts with [`PayloadCodec::fits`] up front; this
    /// method does not truncate.
    #[must_use]
    pub fn encode(&self, action: &ButtonAction) -> String {
        let mut segments: Vec<String> = vec![
            PAYLOAD_VERSION.to_string(),
            self.form_id.to_string(),
            action.op_code().to_string(),
        ];
        match action {
            ButtonAction::StartEdit {
                field,
            } => segments.push(field.to_string()),
            ButtonAction::CancelEdit {
                field,
                editor,
            } => {
                segments.push(field.to_string());
                segments.push(editor.to_string());
            }
            ButtonAction::SubmitValue {
                field,
                cursor,
            } => {
                segments.push(field.to_string());
                if let Some(cursor) = cursor {
                    segments.push(cursor.to_string());
                }
            }
            ButtonAction::Increment {
                field,
                cursor,
            }
            | ButtonAction::Decrement {
                field,
                cursor,
            } => {
                segments.push(field.to_string());
                segments.push(cursor.to_string());
            }
            ButtonAction::Ok | ButtonAction::Cancel => {}
            ButtonAction::Custom {
                action,
            } => segments.push(action.to_string()),
        }
        segments.push(self.fingerprint.clone());
        segments.join("/")
    }

    /// Returns true when the encoded action fits within the payload ceiling.
    #[must_use]
    pub fn fits(&self, action: &ButtonAction) -> bool {
        self.encode(action).len() <= self.max_bytes
    }

    /// Decodes a payload string produced by this codec.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the payload is foreign, stale, malformed,
    /// or not canonical.
    pub fn decode(&self, raw: &str) -> Result<ButtonAction, DecodeError> {
        if raw.len() > self.max_bytes {
            return Err(DecodeError::Malformed("payload exceeds size ceiling".to_string()));
        }
        let segments: Vec<&str> = raw.split(DELIMITER).collect();
        let [version, form, op, rest @ ..] = segments.as_slice() else {
            return Err(DecodeError::Foreign);
        };
        if *version != PAYLOAD_VERSION {
            if version.starts_with("fg") {
                return Err(DecodeError::UnsupportedVersion((*version).to_string()));
            }
            return Err(DecodeError::Foreign);
        }
        if *form != self.form_id.as_str() {
            return Err(DecodeError::FormMismatch {
                expected: self.form_id.clone(),
                actual: (*form).to_string(),
            });
        }
        let Some((fingerprint, args)) = rest.split_last() else {
            return Err(DecodeError::Malformed("missing fingerprint".to_string()));
        };
        if *fingerprint != self.fingerprint {
            return Err(DecodeError::StaleLayout);
        }
        let action = decode_action(op, args)?;
        if self.encode(&action) != raw {
            return Err(DecodeError::NonCanonical);
        }
        Ok(action)
    }
}

/// Returns the form identifier named by a formgram payload, if any.
///
/// Routing uses this to select a form before full decoding.
#[must_use]
pub fn peek_form_id(raw: &str) -> Option<FormId> {
    let mut segments = raw.split(DELIMITER);
    if segments.next()? != PAYLOAD_VERSION {
        return None;
    }
    let form = segments.next()?;
    validate_payload_token(form).then(|| FormId::new(form))
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes the op segment and its arguments.
fn decode_action(op: &str, args: &[&str]) -> Result<ButtonAction, DecodeError> {
    let action = match (op, args) {
        ("e", [field]) => ButtonAction::StartEdit {
            field: decode_field(field)?,
        },
        ("v", [field]) => ButtonAction::SubmitValue {
            field: decode_field(field)?,
            cursor: None,
        },
        ("v", [field, cursor]) => ButtonAction::SubmitValue {
            field: decode_field(field)?,
            cursor: Some(decode_cursor(cursor)?),
        },
        ("x", [field, editor]) => {
            if !is_editor_tag(editor) {
                return Err(DecodeError::Malformed("invalid editor tag".to_string()));
            }
            ButtonAction::CancelEdit {
                field: decode_field(field)?,
                editor: EditorTag::new(*editor),
            }
        }
        ("i", [field, cursor]) => ButtonAction::Increment {
            field: decode_field(field)?,
            cursor: decode_cursor(cursor)?,
        },
        ("d", [field, cursor]) => ButtonAction::Decrement {
            field: decode_field(field)?,
            cursor: decode_cursor(cursor)?,
        },
        ("ok", []) => ButtonAction::Ok,
        ("c", []) => ButtonAction::Cancel,
        ("a", [action]) => {
            if !validate_payload_token(action) {
                return Err(DecodeError::Malformed("invalid action token".to_string()));
            }
            ButtonAction::Custom {
                action: ActionId::new(*action),
            }
        }
        _ => return Err(DecodeError::Malformed(format!("unknown op or arity: {op}"))),
    };
    Ok(action)
}

/// Decodes a field name token.
fn decode_field(token: &str) -> Result<FieldName, DecodeError> {
    if validate_payload_token(token) {
        Ok(FieldName::new(token))
    } else {
        Err(DecodeError::Malformed("invalid field token".to_string()))
    }
}

/// Decodes a decimal cursor token.
fn decode_cursor(token: &str) -> Result<u16, DecodeError> {
    token.parse::<u16>().map_err(|_| DecodeError::Malformed("invalid cursor".to_string()))
}
