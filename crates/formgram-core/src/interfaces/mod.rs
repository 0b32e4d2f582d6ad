// crates/formgram-core/src/interfaces/mod.rs
// ============================================================================
// Module: Formgram Interfaces
// Description: Messaging transport contract used by the form runtime.
// Purpose: Keep the engine independent of any chat client library.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! The engine only ever sends a message, edits a message in place, or removes
//! a message keyboard. Implementations wrap a real chat client, a queue, or
//! an in-memory fake. Retries belong to the implementation; the engine issues
//! each call once and treats an identical edit as a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ChatId;
use crate::core::identifiers::MessageRef;
use crate::core::keyboard::Keyboard;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Errors reported by messaging transports.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Transport rejected or failed the call.
    #[error("transport error: {0}")]
    Failed(String),
    /// Referenced message does not exist.
    #[error("message not found: {0}")]
    MessageNotFound(MessageRef),
    /// Transport is closed.
    #[error("transport closed")]
    Closed,
}

// ============================================================================
// SECTION: Transport Commands
// ============================================================================

/// Serializable transport call, used by queue and log bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TransportCommand {
    /// Send a new message.
    Send {
        /// Target chat.
        chat_id: ChatId,
        /// Reference assigned to the new message.
        message: MessageRef,
        /// Message text.
        text: String,
        /// Optional inline keyboard.
        keyboard: Option<Keyboard>,
    },
    /// Edit a message in place.
    Edit {
        /// Message to edit.
        message: MessageRef,
        /// Replacement text.
        text: String,
        /// Replacement keyboard; `None` removes it.
        keyboard: Option<Keyboard>,
    },
    /// Remove the keyboard of a message.
    RemoveKeyboard {
        /// Message to update.
        message: MessageRef,
    },
}

impl TransportCommand {
    /// Returns a stable label for the command kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Send {
                ..
            } => "send",
            Self::Edit {
                ..
            } => "edit",
            Self::RemoveKeyboard {
                ..
            } => "remove_keyboard",
        }
    }

    /// Returns the message the command targets.
    #[must_use]
    pub const fn message(&self) -> &MessageRef {
        match self {
            Self::Send {
                message,
                ..
            }
            | Self::Edit {
                message,
                ..
            }
            | Self::RemoveKeyboard {
                message,
            } => message,
        }
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Outbound messaging primitives used by the form runtime.
pub trait Transport {
    /// Sends a new message and returns its reference.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the message cannot be sent.
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError>;

    /// Replaces the text and keyboard of an existing message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the edit fails.
    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Removes the keyboard of an existing message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the update fails.
    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        (**self).send_message(chat_id, text, keyboard)
    }

    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        (**self).edit_message(message, text, keyboard)
    }

    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError> {
        (**self).remove_keyboard(message)
    }
}
