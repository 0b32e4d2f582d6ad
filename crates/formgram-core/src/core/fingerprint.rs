// crates/formgram-core/src/core/fingerprint.rs
// ============================================================================
// Module: Formgram Layout Fingerprints
// Description: Short digests of a form's field and action layout.
// Purpose: Tag button payloads with their layout and the editing user.
// Dependencies: base64, sha2
// ============================================================================

//! ## Overview
//! A layout fingerprint is the first [`FINGERPRINT_BYTES`] bytes of a SHA-256
//! digest over the form identifier, field names, and custom action
//! identifiers, encoded as unpadded base64url. Base64url never produces the
//! payload delimiter `/`. Editor tags use the same encoding over a digest of
//! the user identifier, so raw user ids never appear in payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::Digest;
use sha2::Sha256;

use crate::core::identifiers::ActionId;
use crate::core::identifiers::EditorTag;
use crate::core::identifiers::FieldName;
use crate::core::identifiers::FormId;
use crate::core::identifiers::UserRef;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digest bytes kept in a fingerprint.
pub const FINGERPRINT_BYTES: usize = 6;
/// Encoded fingerprint length in characters.
pub const FINGERPRINT_LENGTH: usize = 8;
/// Number of digest bytes kept in an editor tag.
pub const EDITOR_TAG_BYTES: usize = 3;
/// Encoded editor tag length in characters.
pub const EDITOR_TAG_LENGTH: usize = 4;

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Computes the layout fingerprint for a form.
#[must_use]
pub fn layout_fingerprint<'a, F, A>(form_id: &FormId, fields: F, actions: A) -> String
where
    F: IntoIterator<Item = &'a FieldName>,
    A: IntoIterator<Item = &'a ActionId>,
{
    let mut hasher = Sha256::new();
    hasher.update(b"form\0");
    hasher.update(form_id.as_str().as_bytes());
    for field in fields {
        hasher.update(b"\0field\0");
        hasher.update(field.as_str().as_bytes());
    }
    for action in actions {
        hasher.update(b"\0action\0");
        hasher.update(action.as_str().as_bytes());
    }
    let digest = hasher.finalize();
    URL_SAFE_NO_PAD.encode(&digest[.. FINGERPRINT_BYTES])
}

/// Computes the editor tag for a user.
#[must_use]
pub fn editor_tag(user: &UserRef) -> EditorTag {
    let mut hasher = Sha256::new();
    hasher.update(b"editor\0");
    hasher.update(user.as_str().as_bytes());
    let digest = hasher.finalize();
    EditorTag::new(URL_SAFE_NO_PAD.encode(&digest[.. EDITOR_TAG_BYTES]))
}

/// Returns true when `token` has the shape of an editor tag.
#[must_use]
pub fn is_editor_tag(token: &str) -> bool {
    token.len() == EDITOR_TAG_LENGTH
        && token.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-')
}
