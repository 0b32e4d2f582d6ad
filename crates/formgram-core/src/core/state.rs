// crates/formgram-core/src/core/state.rs
// ============================================================================
// Module: Formgram Form State
// Description: Ephemeral per-event projection of a form definition.
// Purpose: Hold current values, the focused field, and the pending action.
// Dependencies: crate::core::{field, identifiers}, serde
// ============================================================================

//! ## Overview
//! [`FormState`] is rebuilt from the displayed message on every inbound event,
//! mutated for that single event, and discarded. It is never stored by the
//! engine; its only durable form is the rendered message plus its keyboard.
//! Invariants:
//! - Slots follow the form definition's field order.
//! - Values assigned through [`FormState::set`] are unchecked; the dispatch
//!   engine normalizes them against the field kinds before rendering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::field::FieldValue;
use crate::core::identifiers::ActionId;
use crate::core::identifiers::EditorTag;
use crate::core::identifiers::FieldName;

// ============================================================================
// SECTION: Phases
// ============================================================================

/// Terminal outcome of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalOutcome {
    /// The submit handler ran.
    Submitted,
    /// The cancel handler ran.
    Cancelled,
    /// The message no longer carries a form keyboard.
    Closed,
}

/// Dispatch phase of a form message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FormPhase {
    /// Form displayed with no field focused.
    Idle,
    /// One field awaits a text reply from one user.
    AwaitingInput {
        /// Focused field.
        field: FieldName,
        /// Tag of the user whose reply is accepted.
        editor: EditorTag,
    },
    /// Submit or cancel fired; no further transitions.
    Terminal {
        /// Which handler fired.
        outcome: TerminalOutcome,
    },
}

/// Action being processed for the current event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    /// Submit handler invocation.
    Submit,
    /// Cancel handler invocation.
    Cancel,
    /// Custom handler invocation.
    Custom {
        /// Custom action identifier.
        action: ActionId,
    },
}

// ============================================================================
// SECTION: Form State
// ============================================================================

/// Value slot for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSlot {
    /// Field name.
    pub name: FieldName,
    /// Current value; `None` when missing.
    pub value: Option<FieldValue>,
}

/// Runtime projection of a form for a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Field values in definition order.
    slots: Vec<FieldSlot>,
    /// Current dispatch phase.
    phase: FormPhase,
    /// Action being processed, when a handler is running.
    pending: Option<PendingAction>,
}

impl FormState {
    /// Creates an idle state from ordered slots.
    #[must_use]
    pub const fn new(slots: Vec<FieldSlot>) -> Self {
        Self {
            slots,
            phase: FormPhase::Idle,
            pending: None,
        }
    }

    /// Returns the current value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.slot(name).and_then(|slot| slot.value.as_ref())
    }

    /// Returns true when the form declares the field.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Assigns a field value; returns false when the field is unknown.
    pub fn set(&mut self, name: &str, value: Option<FieldValue>) -> bool {
        match self.slots.iter_mut().find(|slot| slot.name.as_str() == name) {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }

    /// Returns the field slots in definition order.
    #[must_use]
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> &FormPhase {
        &self.phase
    }

    /// Sets the current phase.
    pub fn set_phase(&mut self, phase: FormPhase) {
        self.phase = phase;
    }

    /// Returns the focused field while awaiting input.
    #[must_use]
    pub const fn focused_field(&self) -> Option<&FieldName> {
        match &self.phase {
            FormPhase::AwaitingInput {
                field,
                ..
            } => Some(field),
            FormPhase::Idle
            | FormPhase::Terminal {
                ..
            } => None,
        }
    }

    /// Returns the action being processed.
    #[must_use]
    pub const fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Sets the action being processed.
    pub fn set_pending_action(&mut self, pending: Option<PendingAction>) {
        self.pending = pending;
    }

    /// Returns the values as a JSON object keyed by field name.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for slot in &self.slots {
            let value = match &slot.value {
                None => serde_json::Value::Null,
                Some(FieldValue::Text(text) | FieldValue::Choice(text)) => {
                    serde_json::Value::String(text.clone())
                }
                Some(FieldValue::Integer(number)) => serde_json::Value::from(*number),
                Some(FieldValue::Float(number)) => serde_json::Number::from_f64(*number)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
                Some(FieldValue::Boolean(flag)) => serde_json::Value::Bool(*flag),
            };
            object.insert(slot.name.to_string(), value);
        }
        serde_json::Value::Object(object)
    }

    /// Finds the slot for a field.
    fn slot(&self, name: &str) -> Option<&FieldSlot> {
        self.slots.iter().find(|slot| slot.name.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only panic-based assertions are permitted.")]

    use serde_json::json;

    use super::*;

    fn sample() -> FormState {
        FormState::new(vec![
            FieldSlot {
                name: FieldName::new("name"),
                value: Some(FieldValue::Text("Ada".to_string())),
            },
            FieldSlot {
                name: FieldName::new("age"),
                value: None,
            },
        ])
    }

    #[test]
    fn set_rejects_unknown_fields() {
        let mut state = sample();
        assert!(state.set("age", Some(FieldValue::Integer(36))));
        assert!(!state.set("email", None));
        assert_eq!(state.get("age"), Some(&FieldValue::Integer(36)));
    }

    #[test]
    fn json_projection_uses_nulls_for_missing_values() {
        assert_eq!(sample().to_json(), json!({"name": "Ada", "age": null}));
    }

    #[test]
    fn focused_field_follows_phase() {
        let mut state = sample();
        assert_eq!(state.focused_field(), None);
        state.set_phase(FormPhase::AwaitingInput {
            field: FieldName::new("age"),
            editor: EditorTag::new("q2Xz"),
        });
        assert_eq!(state.focused_field().map(FieldName::as_str), Some("age"));
    }

    #[test]
    fn pending_custom_action_serializes_with_its_identifier() {
        let action = PendingAction::Custom {
            action: ActionId::new("reset"),
        };
        let encoded = serde_json::to_value(&action).unwrap();
        assert_eq!(encoded, json!({"kind": "custom", "action": "reset"}));
        assert_eq!(serde_json::from_value::<PendingAction>(encoded).unwrap(), action);

        let mut state = sample();
        state.set_pending_action(Some(action));
        let restored: FormState =
            serde_json::from_str(&serde_json::to_string(&state).unwrap()).unwrap();
        assert_eq!(restored, state);
    }
}
