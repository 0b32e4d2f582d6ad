// crates/formgram-transport/src/lib.rs
// ============================================================================
// Module: Formgram Transport Library
// Description: Reference Transport bindings for hosting the form engine.
// Purpose: Turn transport calls into commands a host can execute or record.
// Dependencies: formgram-core, serde_json, tokio
// ============================================================================

//! ## Overview
//! The form engine never talks to a messaging platform directly; it calls a
//! [`formgram_core::Transport`]. This crate provides bindings that translate
//! each call into a [`formgram_core::TransportCommand`] and hand it to host
//! code: a callback, a tokio channel, or a JSON-lines log.
//!
//! Invariants:
//! - `send_message` assigns the message reference before delivery, using a
//!   monotonic [`MessageIdFactory`]. Hosts map it to the platform id.
//! - Every successful call delivers exactly one command.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod callback;
pub mod channel;
pub mod ids;
pub mod log;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use callback::CallbackTransport;
pub use channel::ChannelTransport;
pub use ids::MessageIdFactory;
pub use log::LogTransport;
