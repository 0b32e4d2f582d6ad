// crates/formgram-transport/src/ids.rs
// ============================================================================
// Module: Formgram Message Ids
// Description: Deterministic message references and command construction.
// Purpose: Assign message ids before the platform acknowledges a send.
// Dependencies: formgram-core, std
// ============================================================================

//! ## Overview
//! [`MessageIdFactory`] hands out `<prefix>-<seq>` message ids with a
//! monotonic counter shared across threads. The command helpers build the
//! [`TransportCommand`] for each transport call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use formgram_core::ChatId;
use formgram_core::Keyboard;
use formgram_core::MessageRef;
use formgram_core::TransportCommand;

// ============================================================================
// SECTION: Message Id Factory
// ============================================================================

/// Monotonic message id source.
///
/// # Invariants
/// - Ids are unique per factory and strictly increasing in sequence.
#[derive(Debug)]
pub struct MessageIdFactory {
    /// Prefix embedded in every id.
    prefix: String,
    /// Monotonic counter used for deterministic ids.
    counter: AtomicU64,
}

impl MessageIdFactory {
    /// Creates a factory with the provided id prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the id prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the next message reference in `chat_id`.
    pub fn next(&self, chat_id: &ChatId) -> MessageRef {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        MessageRef::new(chat_id.clone(), format!("{}-{}", self.prefix, seq))
    }
}

// ============================================================================
// SECTION: Command Helpers
// ============================================================================

/// Builds the command for a `send_message` call.
pub(crate) fn send_command(
    ids: &MessageIdFactory,
    chat_id: &ChatId,
    text: &str,
    keyboard: Option<&Keyboard>,
) -> TransportCommand {
    TransportCommand::Send {
        chat_id: chat_id.clone(),
        message: ids.next(chat_id),
        text: text.to_string(),
        keyboard: keyboard.cloned(),
    }
}

/// Builds the command for an `edit_message` call.
pub(crate) fn edit_command(
    message: &MessageRef,
    text: &str,
    keyboard: Option<&Keyboard>,
) -> TransportCommand {
    TransportCommand::Edit {
        message: message.clone(),
        text: text.to_string(),
        keyboard: keyboard.cloned(),
    }
}

/// Builds the command for a `remove_keyboard` call.
pub(crate) fn remove_keyboard_command(message: &MessageRef) -> TransportCommand {
    TransportCommand::RemoveKeyboard {
        message: message.clone(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
