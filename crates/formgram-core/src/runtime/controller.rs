// crates/formgram-core/src/runtime/controller.rs
// ============================================================================
// Module: Formgram Form Controller
// Description: Public entry points for sending forms and handling events.
// Purpose: Bind a form definition to a transport and an audit sink.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`FormController`] owns one [`FormDefinition`] and an explicit transport
//! handle. `send_form` posts a fresh form message; `handle_event` is the
//! single callback a host wires into its event loop. The controller keeps no
//! per-message state: every event is resolved from the message it carries.
//! Invariants:
//! - Every handled event records exactly one audit event, plus one per
//!   rehydration mismatch.
//! - Forms sent with prefilled values only contain values of the field kinds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::definition::FormDefinition;
use crate::core::event::InboundEvent;
use crate::core::field::FieldError;
use crate::core::identifiers::ChatId;
use crate::core::identifiers::FieldName;
use crate::core::identifiers::FormId;
use crate::core::identifiers::MessageRef;
use crate::core::keyboard::build_keyboard;
use crate::core::message::render_body;
use crate::core::state::FormPhase;
use crate::core::state::FormState;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;
use crate::runtime::audit::EVENT_FORM_DISPATCH;
use crate::runtime::audit::EVENT_FORM_SENT;
use crate::runtime::audit::EVENT_RENDER_CONSISTENCY;
use crate::runtime::audit::FormAuditEvent;
use crate::runtime::audit::FormAuditEventParams;
use crate::runtime::audit::FormAuditSink;
use crate::runtime::audit::NoopAuditSink;
use crate::runtime::dispatch::DispatchEngine;
use crate::runtime::dispatch::DispatchError;
use crate::runtime::dispatch::DispatchOutcome;
use crate::runtime::dispatch::DispatchReport;
use crate::runtime::dispatch::IgnoreReason;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Form controller errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Transport call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Dispatch failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    /// Prefilled value does not belong to the field kind.
    #[error("invalid value for field {field}: {source}")]
    InvalidValue {
        /// Field name.
        field: FieldName,
        /// Underlying field error.
        source: FieldError,
    },
    /// Prefilled state leaves a non-noneable field empty.
    #[error("field {0} is not noneable but has no value")]
    MissingValue(FieldName),
}

// ============================================================================
// SECTION: Form Controller
// ============================================================================

/// Stateless form controller bound to a transport.
pub struct FormController<T> {
    /// Form definition.
    definition: FormDefinition,
    /// Outbound transport.
    transport: T,
    /// Audit sink.
    audit: Arc<dyn FormAuditSink>,
}

impl<T> FormController<T>
where
    T: Transport,
{
    /// Creates a controller with a no-op audit sink.
    #[must_use]
    pub fn new(definition: FormDefinition, transport: T) -> Self {
        Self {
            definition,
            transport,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn FormAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the form definition.
    #[must_use]
    pub const fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a fresh form built from the initial values.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when the transport fails.
    pub fn send_form(&self, chat_id: &ChatId) -> Result<MessageRef, ControllerError> {
        let state = self.definition.initial_state();
        self.post(chat_id, &state)
    }

    /// Sends a form prefilled from `values`.
    ///
    /// Fields absent from `values` keep their initial values; the phase is
    /// always idle.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a value does not fit its field or
    /// the transport fails.
    pub fn send_form_with(
        &self,
        chat_id: &ChatId,
        values: &FormState,
    ) -> Result<MessageRef, ControllerError> {
        let settings = self.definition.settings();
        let mut state = self.definition.initial_state();
        for field in self.definition.fields() {
            let name = field.name.as_str();
            if !values.contains(name) {
                continue;
            }
            let value = field
                .normalize(values.get(name).cloned(), &settings.missing_value)
                .map_err(|source| ControllerError::InvalidValue {
                    field: field.name.clone(),
                    source,
                })?;
            if value.is_none() && !field.noneable {
                return Err(ControllerError::MissingValue(field.name.clone()));
            }
            state.set(name, value);
        }
        state.set_phase(FormPhase::Idle);
        self.post(chat_id, &state)
    }

    /// Handles one inbound event.
    ///
    /// Events for other forms or unrelated messages are reported as ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a transport call fails mid-dispatch.
    pub fn handle_event(&self, event: &InboundEvent) -> Result<DispatchReport, ControllerError> {
        let engine = DispatchEngine::new(&self.definition, &self.transport);
        let trigger = event.kind_label();
        let report = match engine.dispatch(event) {
            Ok(report) => report,
            Err(err) => {
                self.record(FormAuditEventParams {
                    event: EVENT_FORM_DISPATCH,
                    form_id: self.definition.form_id().to_string(),
                    chat_id: Some(event.chat_id().to_string()),
                    message_id: event.form_message().map(|snapshot| snapshot.message.message_id.clone()),
                    trigger,
                    outcome: "error",
                    field: None,
                    detail: Some(err.to_string()),
                });
                return Err(err.into());
            }
        };
        let message_id = report.message.as_ref().map(|message| message.message_id.clone());
        for issue in &report.issues {
            self.record(FormAuditEventParams {
                event: EVENT_RENDER_CONSISTENCY,
                form_id: self.definition.form_id().to_string(),
                chat_id: Some(event.chat_id().to_string()),
                message_id: message_id.clone(),
                trigger,
                outcome: "reverted",
                field: issue.field().map(ToString::to_string),
                detail: Some(issue.to_string()),
            });
        }
        self.record(FormAuditEventParams {
            event: EVENT_FORM_DISPATCH,
            form_id: self.definition.form_id().to_string(),
            chat_id: Some(event.chat_id().to_string()),
            message_id,
            trigger,
            outcome: report.outcome.label(),
            field: report.outcome.field().map(ToString::to_string),
            detail: outcome_detail(&report.outcome),
        });
        Ok(report)
    }

    /// Renders and sends a form message for `state`.
    fn post(&self, chat_id: &ChatId, state: &FormState) -> Result<MessageRef, ControllerError> {
        let text = render_body(&self.definition, state);
        let keyboard = build_keyboard(&self.definition, state);
        let message = self.transport.send_message(chat_id, &text, Some(&keyboard))?;
        self.record(FormAuditEventParams {
            event: EVENT_FORM_SENT,
            form_id: self.definition.form_id().to_string(),
            chat_id: Some(chat_id.to_string()),
            message_id: Some(message.message_id.clone()),
            trigger: "send",
            outcome: "sent",
            field: None,
            detail: None,
        });
        Ok(message)
    }

    /// Records an audit event.
    fn record(&self, params: FormAuditEventParams) {
        self.audit.record(&FormAuditEvent::new(params));
    }
}

/// Returns the audit detail for an outcome.
fn outcome_detail(outcome: &DispatchOutcome) -> Option<String> {
    match outcome {
        DispatchOutcome::Ignored(IgnoreReason::Undecodable(err)) => {
            Some(format!("undecodable_payload: {err}"))
        }
        DispatchOutcome::Ignored(IgnoreReason::UnknownAction(action)) => {
            Some(format!("unknown_action: {action}"))
        }
        DispatchOutcome::Ignored(reason) => Some(reason.label().to_string()),
        DispatchOutcome::InputRejected {
            error,
            ..
        } => Some(error.to_string()),
        DispatchOutcome::SubmissionBlocked {
            missing,
        } => Some(format!(
            "missing required fields: {}",
            missing.iter().map(FieldName::as_str).collect::<Vec<_>>().join(", ")
        )),
        DispatchOutcome::CustomHandled {
            action,
            ..
        } => Some(action.to_string()),
        DispatchOutcome::Rendered {
            ..
        }
        | DispatchOutcome::AwaitingInput {
            ..
        }
        | DispatchOutcome::Submitted
        | DispatchOutcome::Cancelled => None,
    }
}

// ============================================================================
// SECTION: Event Handler Seam
// ============================================================================

/// Object-safe view of a controller, used by the form router.
pub trait FormEventHandler: Send + Sync {
    /// Returns the form handled by this controller.
    fn form_id(&self) -> &FormId;

    /// Handles one inbound event.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when a transport call fails mid-dispatch.
    fn handle_event(&self, event: &InboundEvent) -> Result<DispatchReport, ControllerError>;
}

impl<T> FormEventHandler for FormController<T>
where
    T: Transport + Send + Sync,
{
    fn form_id(&self) -> &FormId {
        self.definition.form_id()
    }

    fn handle_event(&self, event: &InboundEvent) -> Result<DispatchReport, ControllerError> {
        Self::handle_event(self, event)
    }
}
