// crates/formgram-core/src/core/identifiers.rs
// ============================================================================
// Module: Formgram Identifiers
// Description: Canonical opaque identifiers for forms, fields, chats, and messages.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! This module defines the string-based identifiers used throughout Formgram.
//! Identifiers are opaque and serialize as strings. Identifiers that end up
//! inside button payloads ([`FormId`], [`FieldName`], [`ActionId`],
//! [`EditorTag`]) are
//! validated by [`validate_payload_token`] when a form definition is built,
//! not within these wrappers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum length of an identifier embedded in a button payload.
pub const MAX_PAYLOAD_TOKEN_LENGTH: usize = 32;

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

/// Declares a transparent string identifier with the shared helper impls.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

string_identifier!(
    /// Form identifier; scopes every button payload a form emits.
    FormId
);

string_identifier!(
    /// Field name, unique within a form definition.
    FieldName
);

string_identifier!(
    /// Custom action identifier, unique within a form definition.
    ActionId
);

string_identifier!(
    /// Chat identifier assigned by the messaging platform.
    ChatId
);

string_identifier!(
    /// User identifier assigned by the messaging platform.
    UserRef
);

string_identifier!(
    /// Short digest of the user editing a free-text field.
    EditorTag
);

/// Reference to a single message inside a chat.
///
/// # Invariants
/// - `message_id` is opaque and only meaningful within `chat_id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Chat containing the message.
    pub chat_id: ChatId,
    /// Platform message identifier.
    pub message_id: String,
}

impl MessageRef {
    /// Creates a new message reference.
    #[must_use]
    pub fn new(chat_id: impl Into<ChatId>, message_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id: message_id.into(),
        }
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.message_id)
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Returns true when `value` may be embedded in a button payload.
///
/// Accepted tokens are 1 to [`MAX_PAYLOAD_TOKEN_LENGTH`] ASCII characters from
/// `[A-Za-z0-9_-]`, which keeps the payload delimiter unambiguous.
#[must_use]
pub fn validate_payload_token(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_PAYLOAD_TOKEN_LENGTH
        && value.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}
