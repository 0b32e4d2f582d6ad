// crates/formgram-core/src/runtime/transport.rs
// ============================================================================
// Module: Formgram In-Memory Transport
// Description: Simple in-memory messaging transport for tests and demos.
// Purpose: Provide a deterministic chat fake without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryTransport`] stores every message it sends, applies edits in
//! place, and logs each call as a [`TransportCommand`]. Helpers turn a stored
//! message into the events a chat platform would deliver, so whole
//! conversations can be replayed without a network. It is not intended for
//! production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::event::CallbackEvent;
use crate::core::event::InboundEvent;
use crate::core::event::MessageSnapshot;
use crate::core::event::TextEvent;
use crate::core::identifiers::ChatId;
use crate::core::identifiers::MessageRef;
use crate::core::identifiers::UserRef;
use crate::core::keyboard::Keyboard;
use crate::interfaces::Transport;
use crate::interfaces::TransportCommand;
use crate::interfaces::TransportError;

// ============================================================================
// SECTION: Stored Messages
// ============================================================================

/// Message as currently displayed by the fake chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Message reference.
    pub message: MessageRef,
    /// Current text.
    pub text: String,
    /// Current keyboard, if any.
    pub keyboard: Option<Keyboard>,
}

impl StoredMessage {
    /// Returns the snapshot a platform would attach to an event.
    #[must_use]
    pub fn snapshot(&self) -> MessageSnapshot {
        MessageSnapshot::new(self.message.clone(), self.text.clone(), self.keyboard.as_ref())
    }
}

/// Mutable transport state guarded by one mutex.
#[derive(Debug, Default)]
struct Inner {
    /// Messages keyed by `chat:message`.
    messages: BTreeMap<String, StoredMessage>,
    /// Call log in arrival order.
    commands: Vec<TransportCommand>,
    /// Last assigned message number.
    last_id: u64,
    /// Failure injected into the next call.
    fail_next: Option<String>,
}

impl Inner {
    /// Consumes an injected failure.
    fn take_failure(&mut self) -> Result<(), TransportError> {
        self.fail_next.take().map_or(Ok(()), |reason| Err(TransportError::Failed(reason)))
    }
}

// ============================================================================
// SECTION: In-Memory Transport
// ============================================================================

/// In-memory messaging transport for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTransport {
    /// Shared state protected by a mutex.
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTransport {
    /// Creates an empty in-memory transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transport call fail with `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transport mutex is poisoned.
    pub fn fail_next(&self, reason: impl Into<String>) -> Result<(), TransportError> {
        self.lock()?.fail_next = Some(reason.into());
        Ok(())
    }

    /// Returns the stored message, if any.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transport mutex is poisoned.
    pub fn message(&self, message: &MessageRef) -> Result<Option<StoredMessage>, TransportError> {
        Ok(self.lock()?.messages.get(&message.to_string()).cloned())
    }

    /// Returns the logged calls in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the transport mutex is poisoned.
    pub fn commands(&self) -> Result<Vec<TransportCommand>, TransportError> {
        Ok(self.lock()?.commands.clone())
    }

    /// Builds the event delivered when a user presses the button labelled `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the message or button does not exist.
    pub fn press(
        &self,
        message: &MessageRef,
        user: &UserRef,
        text: &str,
    ) -> Result<InboundEvent, TransportError> {
        let stored = self.stored(message)?;
        let payload = stored
            .keyboard
            .as_ref()
            .and_then(|keyboard| keyboard.buttons().find(|button| button.text == text))
            .map(|button| button.payload.clone())
            .ok_or_else(|| TransportError::Failed(format!("no button labelled {text:?}")))?;
        let callback_id = format!("cb-{}-{}", message, self.lock()?.commands.len());
        Ok(InboundEvent::Callback(CallbackEvent {
            callback_id,
            user: user.clone(),
            message: stored.snapshot(),
            payload,
        }))
    }

    /// Builds the event delivered when a user replies to a message with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the message does not exist.
    pub fn reply(
        &self,
        message: &MessageRef,
        user: &UserRef,
        text: &str,
    ) -> Result<InboundEvent, TransportError> {
        let stored = self.stored(message)?;
        Ok(InboundEvent::Text(TextEvent {
            chat_id: message.chat_id.clone(),
            user: user.clone(),
            text: text.to_string(),
            reply_to: Some(stored.snapshot()),
        }))
    }

    /// Returns the stored message or a not-found error.
    fn stored(&self, message: &MessageRef) -> Result<StoredMessage, TransportError> {
        self.message(message)?.ok_or_else(|| TransportError::MessageNotFound(message.clone()))
    }

    /// Locks the shared state.
    fn lock(&self) -> Result<MutexGuard<'_, Inner>, TransportError> {
        self.inner
            .lock()
            .map_err(|_| TransportError::Failed("in-memory transport mutex poisoned".to_string()))
    }
}

impl Transport for InMemoryTransport {
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let mut inner = self.lock()?;
        inner.take_failure()?;
        inner.last_id = inner.last_id.saturating_add(1);
        let message = MessageRef::new(chat_id.clone(), inner.last_id.to_string());
        inner.messages.insert(
            message.to_string(),
            StoredMessage {
                message: message.clone(),
                text: text.to_string(),
                keyboard: keyboard.cloned(),
            },
        );
        inner.commands.push(TransportCommand::Send {
            chat_id: chat_id.clone(),
            message: message.clone(),
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(message)
    }

    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let mut inner = self.lock()?;
        inner.take_failure()?;
        let stored = inner
            .messages
            .get_mut(&message.to_string())
            .ok_or_else(|| TransportError::MessageNotFound(message.clone()))?;
        stored.text = text.to_string();
        stored.keyboard = keyboard.cloned();
        inner.commands.push(TransportCommand::Edit {
            message: message.clone(),
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError> {
        let mut inner = self.lock()?;
        inner.take_failure()?;
        let stored = inner
            .messages
            .get_mut(&message.to_string())
            .ok_or_else(|| TransportError::MessageNotFound(message.clone()))?;
        stored.keyboard = None;
        inner.commands.push(TransportCommand::RemoveKeyboard {
            message: message.clone(),
        });
        Ok(())
    }
}
