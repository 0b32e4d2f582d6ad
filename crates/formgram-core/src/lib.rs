// crates/formgram-core/src/lib.rs
// ============================================================================
// Module: Formgram Core Library
// Description: Public API surface for the stateless chat form engine.
// Purpose: Expose form types, the transport interface, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Formgram renders a multi-field form into a single chat message and lets
//! users edit it through inline buttons and text replies, without storing
//! any session. The displayed message text holds the values; the button
//! payloads hold the editing intent. Every event rebuilds the form from the
//! message it references and edits that message in place.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::Transport;
pub use interfaces::TransportCommand;
pub use interfaces::TransportError;
pub use runtime::ControllerError;
pub use runtime::DispatchEngine;
pub use runtime::DispatchError;
pub use runtime::DispatchOutcome;
pub use runtime::DispatchReport;
pub use runtime::EVENT_FORM_DISPATCH;
pub use runtime::EVENT_FORM_SENT;
pub use runtime::EVENT_RENDER_CONSISTENCY;
pub use runtime::FileAuditSink;
pub use runtime::FormAuditEvent;
pub use runtime::FormAuditEventParams;
pub use runtime::FormAuditSink;
pub use runtime::FormController;
pub use runtime::FormEventHandler;
pub use runtime::FormRouter;
pub use runtime::IgnoreReason;
pub use runtime::InMemoryAuditSink;
pub use runtime::InMemoryTransport;
pub use runtime::NoopAuditSink;
pub use runtime::RouterError;
pub use runtime::StderrAuditSink;
pub use runtime::StoredMessage;
