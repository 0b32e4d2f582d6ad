// crates/formgram-core/src/runtime/dispatch.rs
// ============================================================================
// Module: Formgram Dispatch Engine
// Description: Stateless state machine applying one inbound event to a form.
// Purpose: Rehydrate, transition, and re-render a form message per event.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! Each dispatch rebuilds a [`FormState`] from the message snapshot carried
//! by the event, applies the decoded action, and edits the message in place.
//! Phases:
//! - `Idle`: field buttons, custom buttons, OK and optional Cancel.
//! - `AwaitingInput(F)`: the next text reply to the form message from the
//!   user who started the edit is parsed as the value of `F`.
//! - `Terminal`: submit or cancel fired and the keyboard is gone.
//!
//! Invariants:
//! - Undecodable payloads and events that do not fit the phase are ignored
//!   without transport calls.
//! - A blocked submission never invokes the submit handler and issues no
//!   transport call.
//! - A re-render identical to the displayed message issues no edit.
//! - Only transport failures surface as errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::definition::ActionResponse;
use crate::core::definition::FormDefinition;
use crate::core::event::CallbackEvent;
use crate::core::event::EventContext;
use crate::core::event::InboundEvent;
use crate::core::event::MessageSnapshot;
use crate::core::event::TextEvent;
use crate::core::field::EditMode;
use crate::core::field::FieldError;
use crate::core::field::FieldSpec;
use crate::core::field::FieldValue;
use crate::core::fingerprint::editor_tag;
use crate::core::identifiers::ActionId;
use crate::core::identifiers::FieldName;
use crate::core::identifiers::MessageRef;
use crate::core::identifiers::UserRef;
use crate::core::keyboard::build_keyboard;
use crate::core::message::RenderConsistencyError;
use crate::core::message::rehydrate;
use crate::core::message::render_body;
use crate::core::payload::ButtonAction;
use crate::core::payload::DecodeError;
use crate::core::state::FormPhase;
use crate::core::state::FormState;
use crate::core::state::PendingAction;
use crate::core::state::TerminalOutcome;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;

// ============================================================================
// SECTION: Outcomes
// ============================================================================

/// Reason an event was ignored.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Payload could not be decoded for this form.
    Undecodable(DecodeError),
    /// Form already reached a terminal outcome.
    FormClosed,
    /// Text event does not reply to a form message.
    NotReply,
    /// Text event arrived while no field awaits input.
    NotAwaitingInput,
    /// Text event came from a user other than the one editing.
    OtherEditor,
    /// Payload does not belong to the current phase.
    StalePhase,
    /// Payload names a field the form does not declare.
    UnknownField(FieldName),
    /// Payload targets a read-only field.
    ReadOnlyField(FieldName),
    /// Payload cursor is out of range for the field.
    InvalidCursor(FieldName),
    /// Payload names an undeclared custom action.
    UnknownAction(ActionId),
    /// Cancel pressed on a form without a cancel handler.
    NoCancelHandler,
}

impl IgnoreReason {
    /// Returns a stable label for the reason.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Undecodable(_) => "undecodable_payload",
            Self::FormClosed => "form_closed",
            Self::NotReply => "not_a_reply",
            Self::NotAwaitingInput => "not_awaiting_input",
            Self::OtherEditor => "other_editor",
            Self::StalePhase => "stale_phase",
            Self::UnknownField(_) => "unknown_field",
            Self::ReadOnlyField(_) => "read_only_field",
            Self::InvalidCursor(_) => "invalid_cursor",
            Self::UnknownAction(_) => "unknown_action",
            Self::NoCancelHandler => "no_cancel_handler",
        }
    }
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A value changed or an edit was left; the form is idle.
    Rendered {
        /// Field whose value or phase changed.
        field: FieldName,
        /// False when the re-render matched the displayed message.
        edited: bool,
    },
    /// A field now awaits a text reply.
    AwaitingInput {
        /// Focused field.
        field: FieldName,
    },
    /// Text input failed to parse; the field keeps awaiting input.
    InputRejected {
        /// Focused field.
        field: FieldName,
        /// Parse failure reported to the user.
        error: FieldError,
    },
    /// Submit pressed while required fields are missing.
    SubmissionBlocked {
        /// Required fields without a value, in declaration order.
        missing: Vec<FieldName>,
    },
    /// Submit handler ran and the keyboard was removed.
    Submitted,
    /// Cancel handler ran and the keyboard was removed.
    Cancelled,
    /// Custom handler ran.
    CustomHandled {
        /// Custom action identifier.
        action: ActionId,
        /// True when the message was edited.
        edited: bool,
        /// Fields whose handler-assigned values were invalid and reverted.
        reverted: Vec<FieldName>,
    },
    /// Event was ignored.
    Ignored(IgnoreReason),
}

impl DispatchOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Rendered {
                ..
            } => "rendered",
            Self::AwaitingInput {
                ..
            } => "awaiting_input",
            Self::InputRejected {
                ..
            } => "input_rejected",
            Self::SubmissionBlocked {
                ..
            } => "submission_blocked",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
            Self::CustomHandled {
                ..
            } => "custom_handled",
            Self::Ignored(_) => "ignored",
        }
    }

    /// Returns the field the outcome concerns, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&FieldName> {
        match self {
            Self::Rendered {
                field,
                ..
            }
            | Self::AwaitingInput {
                field,
            }
            | Self::InputRejected {
                field,
                ..
            }
            | Self::Ignored(
                IgnoreReason::UnknownField(field)
                | IgnoreReason::ReadOnlyField(field)
                | IgnoreReason::InvalidCursor(field),
            ) => Some(field),
            _ => None,
        }
    }

    /// Returns true when the event was ignored.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

/// Full result of a dispatch, including the rehydrated state.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    /// Dispatch outcome.
    pub outcome: DispatchOutcome,
    /// Form message the event referenced, when any.
    pub message: Option<MessageRef>,
    /// State after the transition; `None` when rehydration never ran.
    pub state: Option<FormState>,
    /// Rehydration mismatches; affected fields hold their initial values.
    pub issues: Vec<RenderConsistencyError>,
}

impl DispatchReport {
    /// Builds a report for an event ignored before rehydration.
    fn ignored(reason: IgnoreReason, message: Option<MessageRef>) -> Self {
        Self {
            outcome: DispatchOutcome::Ignored(reason),
            message,
            state: None,
            issues: Vec::new(),
        }
    }
}

/// Dispatch errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Transport call failed mid-dispatch.
    #[error("transport failed during dispatch: {0}")]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Dispatch Engine
// ============================================================================

/// Applies inbound events to one form definition through a transport.
pub struct DispatchEngine<'a, T: ?Sized> {
    /// Form definition.
    definition: &'a FormDefinition,
    /// Outbound transport.
    transport: &'a T,
}

impl<'a, T> DispatchEngine<'a, T>
where
    T: Transport + ?Sized,
{
    /// Creates a dispatch engine.
    #[must_use]
    pub const fn new(definition: &'a FormDefinition, transport: &'a T) -> Self {
        Self {
            definition,
            transport,
        }
    }

    /// Dispatches any inbound event.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when a transport call fails.
    pub fn dispatch(&self, event: &InboundEvent) -> Result<DispatchReport, DispatchError> {
        match event {
            InboundEvent::Callback(event) => self.dispatch_callback(event),
            InboundEvent::Text(event) => self.dispatch_text(event),
        }
    }

    /// Dispatches a button press.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when a transport call fails.
    pub fn dispatch_callback(&self, event: &CallbackEvent) -> Result<DispatchReport, DispatchError> {
        let snapshot = &event.message;
        let action = match self.definition.codec().decode(&event.payload) {
            Ok(action) => action,
            Err(err) => {
                return Ok(DispatchReport::ignored(
                    IgnoreReason::Undecodable(err),
                    Some(snapshot.message.clone()),
                ));
            }
        };
        let rehydration = rehydrate(self.definition, snapshot);
        let mut state = rehydration.state;
        let ctx = EventContext {
            form_id: self.definition.form_id().clone(),
            message: snapshot.message.clone(),
            user: event.user.clone(),
            callback_id: Some(event.callback_id.clone()),
        };
        let outcome = match state.phase().clone() {
            FormPhase::Terminal {
                ..
            } => DispatchOutcome::Ignored(IgnoreReason::FormClosed),
            FormPhase::AwaitingInput {
                field,
                ..
            } => self.apply_while_editing(snapshot, &mut state, &field, action)?,
            FormPhase::Idle => self.apply_idle(snapshot, &mut state, &ctx, action)?,
        };
        Ok(DispatchReport {
            outcome,
            message: Some(snapshot.message.clone()),
            state: Some(state),
            issues: rehydration.issues,
        })
    }

    /// Dispatches a plain text reply.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when a transport call fails.
    pub fn dispatch_text(&self, event: &TextEvent) -> Result<DispatchReport, DispatchError> {
        let Some(snapshot) = &event.reply_to else {
            return Ok(DispatchReport::ignored(IgnoreReason::NotReply, None));
        };
        let rehydration = rehydrate(self.definition, snapshot);
        let mut state = rehydration.state;
        let outcome = match state.phase().clone() {
            FormPhase::Terminal {
                ..
            } => DispatchOutcome::Ignored(IgnoreReason::FormClosed),
            FormPhase::Idle => DispatchOutcome::Ignored(IgnoreReason::NotAwaitingInput),
            FormPhase::AwaitingInput {
                editor,
                ..
            } if editor != editor_tag(&event.user) => {
                DispatchOutcome::Ignored(IgnoreReason::OtherEditor)
            }
            FormPhase::AwaitingInput {
                field,
                ..
            } => self.apply_text(snapshot, &mut state, &field, &event.text)?,
        };
        Ok(DispatchReport {
            outcome,
            message: Some(snapshot.message.clone()),
            state: Some(state),
            issues: rehydration.issues,
        })
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Applies a button action while the form is idle.
    fn apply_idle(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        ctx: &EventContext,
        action: ButtonAction,
    ) -> Result<DispatchOutcome, DispatchError> {
        match action {
            ButtonAction::StartEdit {
                field,
            } => self.start_edit(snapshot, state, field, &ctx.user),
            ButtonAction::SubmitValue {
                field,
                cursor: Some(cursor),
            }
            | ButtonAction::Increment {
                field,
                cursor,
            }
            | ButtonAction::Decrement {
                field,
                cursor,
            } => self.set_from_cursor(snapshot, state, field, cursor),
            ButtonAction::SubmitValue {
                cursor: None,
                ..
            }
            | ButtonAction::CancelEdit {
                ..
            } => Ok(DispatchOutcome::Ignored(IgnoreReason::StalePhase)),
            ButtonAction::Ok => self.submit(snapshot, state, ctx),
            ButtonAction::Cancel => self.cancel(snapshot, state, ctx),
            ButtonAction::Custom {
                action,
            } => self.custom(snapshot, state, ctx, action),
        }
    }

    /// Applies a button action while `focused` awaits input.
    fn apply_while_editing(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        focused: &FieldName,
        action: ButtonAction,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(field) = self.definition.field(focused.as_str()) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownField(focused.clone())));
        };
        match action {
            ButtonAction::CancelEdit {
                field: target,
                ..
            } if &target == focused => {}
            ButtonAction::SubmitValue {
                field: target,
                cursor: None,
            } if &target == focused => {
                let previous = state.get(focused.as_str()).cloned();
                state.set(focused.as_str(), field.accept(None, previous));
            }
            _ => return Ok(DispatchOutcome::Ignored(IgnoreReason::StalePhase)),
        }
        state.set_phase(FormPhase::Idle);
        let edited = self.render(snapshot, state)?;
        Ok(DispatchOutcome::Rendered {
            field: focused.clone(),
            edited,
        })
    }

    /// Applies a text reply to the focused field.
    fn apply_text(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        focused: &FieldName,
        text: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(field) = self.definition.field(focused.as_str()) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownField(focused.clone())));
        };
        let settings = self.definition.settings();
        match field.parse(text, &settings.missing_value) {
            Ok(candidate) => {
                let previous = state.get(focused.as_str()).cloned();
                state.set(focused.as_str(), field.accept(candidate, previous));
                state.set_phase(FormPhase::Idle);
                let edited = self.render(snapshot, state)?;
                Ok(DispatchOutcome::Rendered {
                    field: focused.clone(),
                    edited,
                })
            }
            Err(error) => {
                let notice =
                    format!("{} {}: {error}", settings.invalid_value_message, field.label);
                self.transport.send_message(&snapshot.message.chat_id, &notice, None)?;
                Ok(DispatchOutcome::InputRejected {
                    field: focused.clone(),
                    error,
                })
            }
        }
    }

    /// Starts editing a field for `user`, or mutates it in place for
    /// button-driven kinds.
    fn start_edit(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        name: FieldName,
        user: &UserRef,
    ) -> Result<DispatchOutcome, DispatchError> {
        let field = match self.editable_field(&name) {
            Ok(field) => field,
            Err(reason) => return Ok(DispatchOutcome::Ignored(reason)),
        };
        let value = state.get(name.as_str());
        let next = match field.edit_mode() {
            EditMode::FreeText => {
                state.set_phase(FormPhase::AwaitingInput {
                    field: name.clone(),
                    editor: editor_tag(user),
                });
                self.render(snapshot, state)?;
                return Ok(DispatchOutcome::AwaitingInput {
                    field: name,
                });
            }
            EditMode::Toggle => {
                Some(FieldValue::Boolean(!matches!(value, Some(FieldValue::Boolean(true)))))
            }
            EditMode::Cycle => {
                let count = field.kind.option_count();
                let next = field.kind.option_index(value).map_or(0, |index| (index + 1) % count);
                u16::try_from(next).ok().and_then(|cursor| field.kind.value_at(cursor))
            }
        };
        state.set(name.as_str(), next);
        let edited = self.render(snapshot, state)?;
        Ok(DispatchOutcome::Rendered {
            field: name,
            edited,
        })
    }

    /// Sets a button-driven field to the value at `cursor`.
    fn set_from_cursor(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        name: FieldName,
        cursor: u16,
    ) -> Result<DispatchOutcome, DispatchError> {
        let field = match self.editable_field(&name) {
            Ok(field) => field,
            Err(reason) => return Ok(DispatchOutcome::Ignored(reason)),
        };
        let Some(value) = field.kind.value_at(cursor) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::InvalidCursor(name)));
        };
        state.set(name.as_str(), Some(value));
        let edited = self.render(snapshot, state)?;
        Ok(DispatchOutcome::Rendered {
            field: name,
            edited,
        })
    }

    /// Submits the form unless required fields are missing.
    fn submit(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        ctx: &EventContext,
    ) -> Result<DispatchOutcome, DispatchError> {
        let missing = self.definition.missing_required(state);
        if !missing.is_empty() {
            return Ok(DispatchOutcome::SubmissionBlocked {
                missing,
            });
        }
        state.set_pending_action(Some(PendingAction::Submit));
        self.definition.submit(state, ctx);
        state.set_pending_action(None);
        state.set_phase(FormPhase::Terminal {
            outcome: TerminalOutcome::Submitted,
        });
        self.transport.remove_keyboard(&snapshot.message)?;
        Ok(DispatchOutcome::Submitted)
    }

    /// Cancels the form when a cancel handler exists.
    fn cancel(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        ctx: &EventContext,
    ) -> Result<DispatchOutcome, DispatchError> {
        if !self.definition.has_cancel() {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::NoCancelHandler));
        }
        state.set_pending_action(Some(PendingAction::Cancel));
        self.definition.cancel(state, ctx);
        state.set_pending_action(None);
        state.set_phase(FormPhase::Terminal {
            outcome: TerminalOutcome::Cancelled,
        });
        self.transport.remove_keyboard(&snapshot.message)?;
        Ok(DispatchOutcome::Cancelled)
    }

    /// Runs a custom handler and re-renders when it asks to.
    fn custom(
        &self,
        snapshot: &MessageSnapshot,
        state: &mut FormState,
        ctx: &EventContext,
        action_id: ActionId,
    ) -> Result<DispatchOutcome, DispatchError> {
        let Some(action) = self.definition.action(action_id.as_str()) else {
            return Ok(DispatchOutcome::Ignored(IgnoreReason::UnknownAction(action_id)));
        };
        let previous = state.clone();
        state.set_pending_action(Some(PendingAction::Custom {
            action: action_id.clone(),
        }));
        let response = action.invoke(state, ctx);
        state.set_pending_action(None);
        state.set_phase(FormPhase::Idle);
        let reverted = self.definition.normalize_state(state, &previous);
        let edited = match response {
            ActionResponse::Rerender => self.render(snapshot, state)?,
            ActionResponse::Unchanged => false,
        };
        Ok(DispatchOutcome::CustomHandled {
            action: action_id,
            edited,
            reverted,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Resolves a field that buttons may change.
    fn editable_field(&self, name: &FieldName) -> Result<&'a FieldSpec, IgnoreReason> {
        let field = self
            .definition
            .field(name.as_str())
            .ok_or_else(|| IgnoreReason::UnknownField(name.clone()))?;
        if field.read_only {
            return Err(IgnoreReason::ReadOnlyField(name.clone()));
        }
        Ok(field)
    }

    /// Edits the form message to reflect `state`; returns false when unchanged.
    fn render(&self, snapshot: &MessageSnapshot, state: &FormState) -> Result<bool, TransportError> {
        let text = render_body(self.definition, state);
        let keyboard = build_keyboard(self.definition, state);
        let same_text = text.trim_end() == snapshot.text.trim_end();
        let same_keyboard = keyboard.payloads().eq(snapshot.payloads.iter().map(String::as_str));
        if same_text && same_keyboard {
            return Ok(false);
        }
        self.transport.edit_message(&snapshot.message, &text, Some(&keyboard))?;
        Ok(true)
    }
}
