// crates/formgram-core/src/core/definition.rs
// ============================================================================
// Module: Formgram Form Definitions
// Description: Ordered field registry, handlers, and construction-time validation.
// Purpose: Declare forms explicitly and fail fast on invalid layouts.
// Dependencies: crate::core::{event, field, fingerprint, identifiers, payload, settings, state}
// ============================================================================

//! ## Overview
//! A [`FormDefinition`] is built once through [`FormBuilder`] and shared by
//! every event the form receives. Fields are registered explicitly and keep
//! declaration order, which drives both body lines and keyboard rows.
//! Handlers are injected functions taking the rehydrated [`FormState`] and
//! an [`EventContext`].
//! Invariants:
//! - At least one field; field names, labels, and action ids are unique.
//! - `!noneable` fields carry an initial value.
//! - Every payload the form can emit fits within the payload ceiling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::event::EventContext;
use crate::core::field::EditMode;
use crate::core::field::FieldError;
use crate::core::field::FieldKind;
use crate::core::field::FieldSpec;
use crate::core::field::FieldValue;
use crate::core::fingerprint::EDITOR_TAG_LENGTH;
use crate::core::fingerprint::layout_fingerprint;
use crate::core::identifiers::ActionId;
use crate::core::identifiers::EditorTag;
use crate::core::identifiers::FieldName;
use crate::core::identifiers::FormId;
use crate::core::identifiers::validate_payload_token;
use crate::core::payload::ButtonAction;
use crate::core::payload::PayloadCodec;
use crate::core::settings::FormSettings;
use crate::core::settings::has_line_break;
use crate::core::state::FieldSlot;
use crate::core::state::FormState;

// ============================================================================
// SECTION: Definition Errors
// ============================================================================

/// Construction-time errors for form definitions.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - These errors stop form creation and never reach end users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Form declares no fields.
    #[error("form {0} declares no fields")]
    NoFields(FormId),
    /// Identifier cannot be embedded in a payload.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Identifier kind label.
        kind: &'static str,
        /// Offending identifier.
        value: String,
    },
    /// Two fields share a name.
    #[error("duplicate field name: {0}")]
    DuplicateField(FieldName),
    /// Two fields share a label.
    #[error("duplicate field label: {0:?}")]
    DuplicateLabel(String),
    /// Two custom actions share an identifier.
    #[error("duplicate custom action: {0}")]
    DuplicateAction(ActionId),
    /// Label is empty or breaks the message layout.
    #[error("invalid label for field {field}: {reason}")]
    InvalidLabel {
        /// Field name.
        field: FieldName,
        /// Violated rule.
        reason: String,
    },
    /// Field kind declaration is invalid.
    #[error("invalid kind for field {field}: {reason}")]
    InvalidKind {
        /// Field name.
        field: FieldName,
        /// Violated rule.
        reason: String,
    },
    /// Non-noneable field lacks an initial value.
    #[error("field {0} is not noneable but has no initial value")]
    MissingInitialValue(FieldName),
    /// Initial value does not belong to the field kind.
    #[error("invalid initial value for field {field}: {source}")]
    InvalidInitialValue {
        /// Field name.
        field: FieldName,
        /// Underlying field error.
        source: FieldError,
    },
    /// Form settings violate an invariant.
    #[error("invalid form settings: {0}")]
    InvalidSettings(String),
    /// Form declares no submit handler.
    #[error("form {0} has no submit handler")]
    MissingSubmitHandler(FormId),
    /// An emitted payload would exceed the ceiling.
    #[error("payload {payload:?} is {actual_bytes} bytes (max {max_bytes})")]
    PayloadTooLarge {
        /// Offending payload.
        payload: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Handler invoked when the form is submitted or cancelled.
pub type OutcomeHandler = dyn Fn(&FormState, &EventContext) + Send + Sync;

/// Handler invoked when a custom action button is pressed.
pub type CustomHandler = dyn Fn(&mut FormState, &EventContext) -> ActionResponse + Send + Sync;

/// Custom handler decision on re-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionResponse {
    /// Leave the message untouched.
    Unchanged,
    /// Re-render the message with the mutated state.
    Rerender,
}

/// Custom action button declared by a form.
#[derive(Clone)]
pub struct CustomAction {
    /// Action identifier embedded in the payload.
    pub id: ActionId,
    /// Button label.
    pub label: String,
    /// Handler invoked on press.
    handler: Arc<CustomHandler>,
}

impl CustomAction {
    /// Invokes the handler.
    pub fn invoke(&self, state: &mut FormState, ctx: &EventContext) -> ActionResponse {
        (self.handler)(state, ctx)
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction").field("id", &self.id).field("label", &self.label).finish()
    }
}

// ============================================================================
// SECTION: Form Builder
// ============================================================================

/// Builder for [`FormDefinition`] values.
///
/// # Invariants
/// - `build` validates the whole layout; no partial definitions escape.
pub struct FormBuilder {
    /// Form identifier.
    form_id: FormId,
    /// Registered fields in declaration order.
    fields: Vec<FieldSpec>,
    /// Registered custom actions in declaration order.
    actions: Vec<CustomAction>,
    /// Presentation settings.
    settings: FormSettings,
    /// Submit handler.
    on_submit: Option<Arc<OutcomeHandler>>,
    /// Optional cancel handler.
    on_cancel: Option<Arc<OutcomeHandler>>,
}

impl FormBuilder {
    /// Registers a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Registers a custom action button.
    #[must_use]
    pub fn action<F>(mut self, id: impl Into<ActionId>, label: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut FormState, &EventContext) -> ActionResponse + Send + Sync + 'static,
    {
        self.actions.push(CustomAction {
            id: id.into(),
            label: label.into(),
            handler: Arc::new(handler),
        });
        self
    }

    /// Replaces the presentation settings.
    #[must_use]
    pub fn settings(mut self, settings: FormSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the submit handler.
    #[must_use]
    pub fn on_submit<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FormState, &EventContext) + Send + Sync + 'static,
    {
        self.on_submit = Some(Arc::new(handler));
        self
    }

    /// Sets the cancel handler; the cancel button is shown only when set.
    #[must_use]
    pub fn on_cancel<F>(mut self, handler: F) -> Self
    where
        F: Fn(&FormState, &EventContext) + Send + Sync + 'static,
    {
        self.on_cancel = Some(Arc::new(handler));
        self
    }

    /// Validates and builds the form definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when any layout invariant is violated.
    pub fn build(self) -> Result<FormDefinition, DefinitionError> {
        if let Some(reason) = self.settings.violation() {
            return Err(DefinitionError::InvalidSettings(reason));
        }
        ensure_token("form", self.form_id.as_str())?;
        if self.fields.is_empty() {
            return Err(DefinitionError::NoFields(self.form_id));
        }
        let on_submit =
            self.on_submit.ok_or_else(|| DefinitionError::MissingSubmitHandler(self.form_id.clone()))?;

        let mut names = BTreeSet::new();
        let mut labels = BTreeSet::new();
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            ensure_token("field", field.name.as_str())?;
            if !names.insert(field.name.clone()) {
                return Err(DefinitionError::DuplicateField(field.name));
            }
            ensure_label(&field, &self.settings)?;
            if !labels.insert(field.label.clone()) {
                return Err(DefinitionError::DuplicateLabel(field.label));
            }
            ensure_kind(&field, &self.settings)?;
            fields.push(normalize_initial(field, &self.settings.missing_value)?);
        }

        let mut action_ids = BTreeSet::new();
        for action in &self.actions {
            ensure_token("action", action.id.as_str())?;
            if !action_ids.insert(action.id.clone()) {
                return Err(DefinitionError::DuplicateAction(action.id.clone()));
            }
        }

        let fingerprint = layout_fingerprint(
            &self.form_id,
            fields.iter().map(|field| &field.name),
            self.actions.iter().map(|action| &action.id),
        );
        let codec =
            PayloadCodec::new(self.form_id.clone(), fingerprint, self.settings.payload_max_bytes);
        let definition = FormDefinition {
            form_id: self.form_id,
            fields,
            actions: self.actions,
            settings: self.settings,
            codec,
            on_submit,
            on_cancel: self.on_cancel,
        };
        definition.ensure_payloads_fit()?;
        Ok(definition)
    }
}

// ============================================================================
// SECTION: Form Definition
// ============================================================================

/// Validated, immutable form declaration.
///
/// # Invariants
/// - Established by [`FormBuilder::build`]; see the module overview.
pub struct FormDefinition {
    /// Form identifier.
    form_id: FormId,
    /// Fields in declaration order.
    fields: Vec<FieldSpec>,
    /// Custom actions in declaration order.
    actions: Vec<CustomAction>,
    /// Presentation settings.
    settings: FormSettings,
    /// Payload codec bound to this layout.
    codec: PayloadCodec,
    /// Submit handler.
    on_submit: Arc<OutcomeHandler>,
    /// Optional cancel handler.
    on_cancel: Option<Arc<OutcomeHandler>>,
}

impl FormDefinition {
    /// Starts a builder for a form.
    #[must_use]
    pub fn builder(form_id: impl Into<FormId>) -> FormBuilder {
        FormBuilder {
            form_id: form_id.into(),
            fields: Vec::new(),
            actions: Vec::new(),
            settings: FormSettings::default(),
            on_submit: None,
            on_cancel: None,
        }
    }

    /// Returns the form identifier.
    #[must_use]
    pub const fn form_id(&self) -> &FormId {
        &self.form_id
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name.as_str() == name)
    }

    /// Returns a field by label.
    #[must_use]
    pub fn field_by_label(&self, label: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.label == label)
    }

    /// Returns the fields paired with their current values, in order.
    pub fn entries<'a>(
        &'a self,
        state: &'a FormState,
    ) -> impl Iterator<Item = (&'a FieldSpec, Option<&'a FieldValue>)> + 'a {
        self.fields.iter().map(move |field| (field, state.get(field.name.as_str())))
    }

    /// Returns the custom actions in declaration order.
    #[must_use]
    pub fn actions(&self) -> &[CustomAction] {
        &self.actions
    }

    /// Returns a custom action by identifier.
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&CustomAction> {
        self.actions.iter().find(|action| action.id.as_str() == id)
    }

    /// Returns the presentation settings.
    #[must_use]
    pub const fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// Returns the payload codec.
    #[must_use]
    pub const fn codec(&self) -> &PayloadCodec {
        &self.codec
    }

    /// Returns true when a cancel handler is configured.
    #[must_use]
    pub const fn has_cancel(&self) -> bool {
        self.on_cancel.is_some()
    }

    /// Returns a fresh state built from the initial values.
    #[must_use]
    pub fn initial_state(&self) -> FormState {
        FormState::new(
            self.fields
                .iter()
                .map(|field| FieldSlot {
                    name: field.name.clone(),
                    value: field.initial_value.clone(),
                })
                .collect(),
        )
    }

    /// Returns the required fields whose value is missing, in order.
    #[must_use]
    pub fn missing_required(&self, state: &FormState) -> Vec<FieldName> {
        self.entries(state)
            .filter(|(field, value)| field.needs_value(*value))
            .map(|(field, _)| field.name.clone())
            .collect()
    }

    /// Normalizes every value in `state`, reverting invalid ones to `previous`.
    ///
    /// Returns the names of the fields that were reverted.
    pub fn normalize_state(&self, state: &mut FormState, previous: &FormState) -> Vec<FieldName> {
        let mut reverted = Vec::new();
        for field in &self.fields {
            let name = field.name.as_str();
            let fallback = previous.get(name).cloned();
            let candidate = state.get(name).cloned();
            let normalized = match field.normalize(candidate, &self.settings.missing_value) {
                Ok(value) => field.accept(value, fallback.clone()),
                Err(_) => {
                    reverted.push(field.name.clone());
                    fallback
                }
            };
            state.set(name, normalized);
        }
        reverted
    }

    /// Invokes the submit handler.
    pub fn submit(&self, state: &FormState, ctx: &EventContext) {
        (self.on_submit)(state, ctx);
    }

    /// Invokes the cancel handler; returns false when none is configured.
    pub fn cancel(&self, state: &FormState, ctx: &EventContext) -> bool {
        match &self.on_cancel {
            Some(handler) => {
                handler(state, ctx);
                true
            }
            None => false,
        }
    }

    /// Ensures every payload the form can emit fits within the ceiling.
    fn ensure_payloads_fit(&self) -> Result<(), DefinitionError> {
        for action in self.emitted_actions() {
            if !self.codec.fits(&action) {
                let payload = self.codec.encode(&action);
                return Err(DefinitionError::PayloadTooLarge {
                    actual_bytes: payload.len(),
                    payload,
                    max_bytes: self.codec.max_bytes(),
                });
            }
        }
        Ok(())
    }

    /// Returns the longest variant of every action the form can emit.
    fn emitted_actions(&self) -> Vec<ButtonAction> {
        let mut actions = vec![ButtonAction::Ok];
        if self.has_cancel() {
            actions.push(ButtonAction::Cancel);
        }
        for action in &self.actions {
            actions.push(ButtonAction::Custom {
                action: action.id.clone(),
            });
        }
        for field in self.fields.iter().filter(|field| !field.read_only) {
            let name = field.name.clone();
            match field.edit_mode() {
                EditMode::FreeText => {
                    actions.push(ButtonAction::StartEdit {
                        field: name.clone(),
                    });
                    actions.push(ButtonAction::CancelEdit {
                        field: name.clone(),
                        editor: EditorTag::new("A".repeat(EDITOR_TAG_LENGTH)),
                    });
                    actions.push(ButtonAction::SubmitValue {
                        field: name,
                        cursor: None,
                    });
                }
                EditMode::Toggle => actions.push(ButtonAction::SubmitValue {
                    field: name,
                    cursor: Some(1),
                }),
                EditMode::Cycle => {
                    let last = u16::try_from(field.kind.option_count().saturating_sub(1))
                        .unwrap_or(u16::MAX);
                    actions.push(ButtonAction::Increment {
                        field: name.clone(),
                        cursor: last,
                    });
                    actions.push(ButtonAction::Decrement {
                        field: name,
                        cursor: last,
                    });
                }
            }
        }
        actions
    }
}

impl fmt::Debug for FormDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormDefinition")
            .field("form_id", &self.form_id)
            .field("fields", &self.fields)
            .field("actions", &self.actions)
            .field("settings", &self.settings)
            .field("has_cancel", &self.has_cancel())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures an identifier can be embedded in a payload.
fn ensure_token(kind: &'static str, value: &str) -> Result<(), DefinitionError> {
    if validate_payload_token(value) {
        Ok(())
    } else {
        Err(DefinitionError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// Ensures a label renders as exactly one parseable line prefix.
fn ensure_label(field: &FieldSpec, settings: &FormSettings) -> Result<(), DefinitionError> {
    let reason = if field.label.trim().is_empty() {
        Some("label must not be empty")
    } else if has_line_break(&field.label) {
        Some("label must not contain line breaks")
    } else if field.label.contains(settings.separator.as_str()) {
        Some("label must not contain the separator")
    } else if format!("{}{}", field.label, settings.separator).find(settings.separator.as_str())
        != Some(field.label.len())
    {
        Some("label must not overlap the separator")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DefinitionError::InvalidLabel {
            field: field.name.clone(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Ensures a field kind declaration renders unambiguously.
fn ensure_kind(field: &FieldSpec, settings: &FormSettings) -> Result<(), DefinitionError> {
    let invalid = |reason: &str| DefinitionError::InvalidKind {
        field: field.name.clone(),
        reason: reason.to_string(),
    };
    let missing = settings.missing_value.as_str();
    match &field.kind {
        FieldKind::Text | FieldKind::Integer | FieldKind::Float => Ok(()),
        FieldKind::Boolean {
            true_repr,
            false_repr,
        } => {
            if true_repr == false_repr {
                return Err(invalid("boolean representations must differ"));
            }
            for repr in [true_repr, false_repr] {
                if repr == missing || has_line_break(repr) || repr.trim_end() != repr {
                    return Err(invalid("boolean representation collides with the layout"));
                }
            }
            Ok(())
        }
        FieldKind::Choice {
            options,
        } => {
            if options.is_empty() {
                return Err(invalid("choice requires at least one option"));
            }
            if u16::try_from(options.len()).is_err() {
                return Err(invalid("choice has too many options"));
            }
            let mut seen = BTreeSet::new();
            for option in options {
                if option == missing || has_line_break(option) || option.trim_end() != option {
                    return Err(invalid("choice option collides with the layout"));
                }
                if !seen.insert(option.as_str()) {
                    return Err(invalid("choice options must be unique"));
                }
            }
            Ok(())
        }
    }
}

/// Normalizes the initial value and enforces the noneable rule.
fn normalize_initial(mut field: FieldSpec, missing: &str) -> Result<FieldSpec, DefinitionError> {
    let declared = field.initial_value.take();
    let initial = field.normalize(declared, missing).map_err(|source| {
        DefinitionError::InvalidInitialValue {
            field: field.name.clone(),
            source,
        }
    })?;
    if initial.is_none() && !field.noneable {
        return Err(DefinitionError::MissingInitialValue(field.name));
    }
    field.initial_value = initial;
    Ok(field)
}
