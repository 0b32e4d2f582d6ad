// crates/formgram-transport/src/log.rs
// ============================================================================
// Module: Formgram Log Transport
// Description: Log-only transport that records commands as JSON lines.
// Purpose: Dry-run forms and replay command streams without a platform.
// Dependencies: formgram-core, serde_json, std
// ============================================================================

//! ## Overview
//! `LogTransport` writes one JSON record per transport call and performs no
//! delivery. Records carry the serialized [`TransportCommand`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

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
// SECTION: Log Transport
// ============================================================================

/// Log-only transport.
pub struct LogTransport<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
    /// Message id source for sends.
    ids: MessageIdFactory,
}

impl<W: Write + Send> LogTransport<W> {
    /// Creates a log transport with the default id prefix.
    pub fn new(writer: W) -> Self {
        Self::with_ids(writer, MessageIdFactory::new("log"))
    }

    /// Creates a log transport with a custom id factory.
    pub const fn with_ids(writer: W, ids: MessageIdFactory) -> Self {
        Self {
            writer: Mutex::new(writer),
            ids,
        }
    }

    /// Consumes the transport and returns the writer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Failed`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, TransportError> {
        self.writer
            .into_inner()
            .map_err(|_| TransportError::Failed("log writer mutex poisoned".to_string()))
    }

    /// Writes one command record.
    fn write(&self, command: &TransportCommand) -> Result<(), TransportError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| TransportError::Failed("log writer mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, command)
            .map_err(|err| TransportError::Failed(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| TransportError::Failed(err.to_string()))?;
        guard.flush().map_err(|err| TransportError::Failed(err.to_string()))?;
        drop(guard);
        Ok(())
    }
}

impl<W: Write + Send> Transport for LogTransport<W> {
    fn send_message(
        &self,
        chat_id: &ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let command = send_command(&self.ids, chat_id, text, keyboard);
        self.write(&command)?;
        Ok(command.message().clone())
    }

    fn edit_message(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        self.write(&edit_command(message, text, keyboard))
    }

    fn remove_keyboard(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.write(&remove_keyboard_command(message))
    }
}
