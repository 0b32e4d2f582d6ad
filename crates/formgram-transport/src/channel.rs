// crates/formgram-transport/src/channel.rs
// ============================================================================
// Module: Formgram Channel Transport
// Description: Channel-based transport for asynchronous delivery.
// Purpose: Queue transport commands through a Tokio mpsc channel.
// Dependencies: formgram-core, tokio
// ============================================================================

//! ## Overview
//! [`ChannelTransport`] enqueues each transport call as a
//! [`TransportCommand`] on a bounded `tokio::sync::mpsc` channel. The engine
//! stays synchronous: enqueueing uses `try_send` and never waits.
//! Invariants:
//! - Successful calls enqueue exactly one command.
//! - A full channel fails the call; a dropped receiver reports
//!   [`TransportError::Closed`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use formgram_core::ChatId;
use formgram_core::Keyboard;
use formgram_core::MessageRef;
use formgram_core::Transport;
use formgram_core::TransportCommand;
use formgram_core::TransportError;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;

use crate::ids::MessageIdFactory;
use crate::ids::edit_command;
use crate::ids::remove_keyboard_command;
use crate::ids::send_command;

// ============================================================================
// SECTION: Channel Transport
// ============================================================================

/// Channel-based transport.
#[derive(Debug)]
pub struct ChannelTransport {
    /// Sender used to queue commands.
    sender: Sender<TransportCommand>,
    /// Message id source for sends.
    ids: MessageIdFactory,
}

impl ChannelTransport {
    /// Creates a channel transport with the default id prefix.
    #[must_use]
    pub fn new(sender: Sender<TransportCommand>) -> Self {
        Self::with_ids(sender, MessageIdFactory::new("channel"))
    }

    /// Creates a channel transport with a custom id factory.
    #[must_use]
    pub const fn with_ids(sender: Sender<TransportCommand>, ids: MessageIdFactory) -> Self {
        Self {
            sender,
            ids,
        }
    }

    /// Queues one command without waiting.
    fn enqueue(&self, command: TransportCommand) -> Result<(), TransportError> {
        self.sender.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => TransportError::Failed("command channel full".to_string()),
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

impl Transport for ChannelTransport {
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let command = send_command(&self.ids, chat_id, text, keyboard);
        let message = command.message().clone();
        self.enqueue(command)?;
        Ok(message)
    }

    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.enqueue(edit_command(message, text, keyboard))
    }

    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.enqueue(remove_keyboard_command(message))
    }
}
