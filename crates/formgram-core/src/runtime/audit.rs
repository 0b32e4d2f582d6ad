// crates/formgram-core/src/runtime/audit.rs
// ============================================================================
// Module: Formgram Audit Logging
// Description: Structured audit events for form dispatches.
// Purpose: Emit JSON-line logs of every form transition without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every dispatch records exactly one [`FormAuditEvent`]; each recoverable
//! rehydration mismatch records one more. Events carry identifiers and stable
//! labels only, never field values, so sinks can forward them anywhere.
//! Sinks never fail the dispatch: write errors are dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Event label for a form being sent.
pub const EVENT_FORM_SENT: &str = "form_sent";
/// Event label for a dispatched inbound event.
pub const EVENT_FORM_DISPATCH: &str = "form_dispatch";
/// Event label for a rehydration mismatch.
pub const EVENT_RENDER_CONSISTENCY: &str = "form_render_consistency";

/// Form audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Form identifier.
    pub form_id: String,
    /// Chat identifier when known.
    pub chat_id: Option<String>,
    /// Message identifier when known.
    pub message_id: Option<String>,
    /// Trigger label (`send`, `callback`, `text`).
    pub trigger: &'static str,
    /// Outcome label.
    pub outcome: &'static str,
    /// Affected field when applicable.
    pub field: Option<String>,
    /// Additional detail (error text or reason).
    pub detail: Option<String>,
}

/// Inputs required to construct a form audit event.
pub struct FormAuditEventParams {
    /// Event identifier.
    pub event: &'static str,
    /// Form identifier.
    pub form_id: String,
    /// Chat identifier when known.
    pub chat_id: Option<String>,
    /// Message identifier when known.
    pub message_id: Option<String>,
    /// Trigger label.
    pub trigger: &'static str,
    /// Outcome label.
    pub outcome: &'static str,
    /// Affected field when applicable.
    pub field: Option<String>,
    /// Additional detail.
    pub detail: Option<String>,
}

impl FormAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: FormAuditEventParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: params.event,
            timestamp_ms,
            form_id: params.form_id,
            chat_id: params.chat_id,
            message_id: params.message_id,
            trigger: params.trigger,
            outcome: params.outcome,
            field: params.field,
            detail: params.detail,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for form events.
pub trait FormAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &FormAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl FormAuditSink for StderrAuditSink {
    fn record(&self, event: &FormAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FormAuditSink for FileAuditSink {
    fn record(&self, event: &FormAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl FormAuditSink for NoopAuditSink {
    fn record(&self, _event: &FormAuditEvent) {}
}

/// Audit sink that keeps events in memory for inspection.
#[derive(Default)]
pub struct InMemoryAuditSink {
    /// Recorded events in arrival order.
    events: Mutex<Vec<FormAuditEvent>>,
}

impl InMemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<FormAuditEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

impl FormAuditSink for InMemoryAuditSink {
    fn record(&self, event: &FormAuditEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
