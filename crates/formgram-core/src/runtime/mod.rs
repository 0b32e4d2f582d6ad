// crates/formgram-core/src/runtime/mod.rs
// ============================================================================
// Module: Formgram Runtime
// Description: Dispatch engine, form controller, router, and audit sinks.
// Purpose: Drive forms from inbound events through an explicit transport.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules turn inbound events into transport calls. All entry
//! points share the same dispatch engine so button presses and text replies
//! follow one state machine.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod audit;
pub mod controller;
pub mod dispatch;
pub mod router;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::EVENT_FORM_DISPATCH;
pub use audit::EVENT_FORM_SENT;
pub use audit::EVENT_RENDER_CONSISTENCY;
pub use audit::FileAuditSink;
pub use audit::FormAuditEvent;
pub use audit::FormAuditEventParams;
pub use audit::FormAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use controller::ControllerError;
pub use controller::FormController;
pub use controller::FormEventHandler;
pub use dispatch::DispatchEngine;
pub use dispatch::DispatchError;
pub use dispatch::DispatchOutcome;
pub use dispatch::DispatchReport;
pub use dispatch::IgnoreReason;
pub use router::FormRouter;
pub use router::RouterError;
pub use transport::InMemoryTransport;
pub use transport::StoredMessage;
