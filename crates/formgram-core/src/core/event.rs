// crates/formgram-core/src/core/event.rs
// ============================================================================
// Module: Formgram Inbound Events
// Description: Button-press and text events delivered by the messaging transport.
// Purpose: Carry everything the engine needs to rehydrate a form statelessly.
// Dependencies: crate::core::{identifiers, keyboard}, serde
// ============================================================================

//! ## Overview
//! Inbound events carry a [`MessageSnapshot`] of the form message: its text
//! and the payloads of the buttons attached to it. Together with a button
//! payload this is the whole session; nothing else is looked up.
//! Text events reference the form message they reply to; text that does not
//! reply to a form awaiting input is ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ChatId;
use crate::core::identifiers::FormId;
use crate::core::identifiers::MessageRef;
use crate::core::identifiers::UserRef;
use crate::core::keyboard::Keyboard;

// ============================================================================
// SECTION: Message Snapshot
// ============================================================================

/// Content of a form message as seen by the platform when the event fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    /// Message reference.
    pub message: MessageRef,
    /// Message text.
    pub text: String,
    /// Payloads of the buttons attached to the message, row-major.
    pub payloads: Vec<String>,
}

impl MessageSnapshot {
    /// Creates a snapshot from message text and its optional keyboard.
    #[must_use]
    pub fn new(message: MessageRef, text: impl Into<String>, keyboard: Option<&Keyboard>) -> Self {
        Self {
            message,
            text: text.into(),
            payloads: keyboard
                .map(|keyboard| keyboard.payloads().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

// ============================================================================
// SECTION: Inbound Events
// ============================================================================

/// Button-press event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackEvent {
    /// Platform callback identifier.
    pub callback_id: String,
    /// User who pressed the button.
    pub user: UserRef,
    /// Message the button belongs to.
    pub message: MessageSnapshot,
    /// Opaque payload of the pressed button.
    pub payload: String,
}

/// Plain text message event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEvent {
    /// Chat the text was sent in.
    pub chat_id: ChatId,
    /// User who sent the text.
    pub user: UserRef,
    /// Message text.
    pub text: String,
    /// Form message the text replies to.
    pub reply_to: Option<MessageSnapshot>,
}

/// Event delivered by the host's inbound-event callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Button press.
    Callback(CallbackEvent),
    /// Plain text message.
    Text(TextEvent),
}

impl InboundEvent {
    /// Returns the chat the event belongs to.
    #[must_use]
    pub const fn chat_id(&self) -> &ChatId {
        match self {
            Self::Callback(event) => &event.message.message.chat_id,
            Self::Text(event) => &event.chat_id,
        }
    }

    /// Returns the form message referenced by the event, if any.
    #[must_use]
    pub const fn form_message(&self) -> Option<&MessageSnapshot> {
        match self {
            Self::Callback(event) => Some(&event.message),
            Self::Text(event) => event.reply_to.as_ref(),
        }
    }

    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Callback(_) => "callback",
            Self::Text(_) => "text",
        }
    }
}

// ============================================================================
// SECTION: Event Context
// ============================================================================

/// Context passed to submit, cancel, and custom handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    /// Form identifier.
    pub form_id: FormId,
    /// Form message.
    pub message: MessageRef,
    /// User who triggered the event.
    pub user: UserRef,
    /// Platform callback identifier for button presses.
    pub callback_id: Option<String>,
}
