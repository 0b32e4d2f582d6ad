// crates/formgram-transport/src/callback.rs
// ============================================================================
// Module: Formgram Callback Transport
// Description: Callback-based transport for synchronous delivery.
// Purpose: Invoke a user-provided function with each transport command.
// Dependencies: formgram-core, std
// ============================================================================

//! ## Overview
//! [`CallbackTransport`] executes transport calls by invoking a host function
//! with the equivalent [`TransportCommand`]. A handler error fails the call
//! and aborts the dispatch that issued it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use formgram_core::ChatId;
use formgram_core::Keyboard;
use formgram_core::MessageRef;
use formgram_core::Transport;
use formgram_core::TransportCommand;
use formgram_core::TransportError;

use crate::ids::MessageIdFactory;
use crate::ids::edit_command;
use crate::ids::remove_keyboard_command;
use crate::ids::send_command;

// ============================================================================
// SECTION: Callback Transport
// ============================================================================

/// Callback handler signature used by the transport.
type CommandHandler = dyn Fn(&TransportCommand) -> Result<(), TransportError> + Send + Sync;

/// Callback-based transport.
#[derive(Clone)]
pub struct CallbackTransport {
    /// Handler invoked with each command.
    handler: Arc<CommandHandler>,
    /// Message id source for sends.
    ids: Arc<MessageIdFactory>,
}

impl CallbackTransport {
    /// Creates a callback transport with the default id prefix.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&TransportCommand) -> Result<(), TransportError> + Send + Sync + 'static,
    {
        Self::with_ids(handler, MessageIdFactory::new("callback"))
    }

    /// Creates a callback transport with a custom id factory.
    pub fn with_ids<F>(handler: F, ids: MessageIdFactory) -> Self
    where
        F: Fn(&TransportCommand) -> Result<(), TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            ids: Arc::new(ids),
        }
    }
}

impl Transport for CallbackTransport {
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let command = send_command(&self.ids, chat_id, text, keyboard);
        (self.handler)(&command)?;
        Ok(command.message().clone())
    }

    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        (self.handler)(&edit_command(message, text, keyboard))
    }

    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError> {
        (self.handler)(&remove_keyboard_command(message))
    }
}
