// crates/formgram-core/src/core/keyboard.rs
// ============================================================================
// Module: Formgram Keyboards
// Description: Inline keyboard layout derived from a form definition and state.
// Purpose: Produce the button grid whose payloads encode every form action.
// Dependencies: crate::core::{definition, field, identifiers, payload, state}, serde
// ============================================================================

//! ## Overview
//! Keyboards are pure functions of the definition and the current state:
//! - Idle: one row per editable field, one row of custom actions, and a
//!   final row with OK and (when a cancel handler exists) Cancel.
//! - Awaiting input: a cancel-edit row plus a clear row for noneable fields.
//!   The cancel-edit payload records the editor tag of the awaited user.
//!
//! Toggle and cycle buttons embed the target cursor, so replaying a stale
//! tap sets the same value again instead of flipping twice.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::definition::FormDefinition;
use crate::core::field::EditMode;
use crate::core::field::FieldSpec;
use crate::core::field::FieldValue;
use crate::core::identifiers::EditorTag;
use crate::core::payload::ButtonAction;
use crate::core::payload::PayloadCodec;
use crate::core::state::FormPhase;
use crate::core::state::FormState;

// ============================================================================
// SECTION: Keyboard Types
// ============================================================================

/// Inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Visible button text.
    pub text: String,
    /// Opaque payload returned when pressed.
    pub payload: String,
}

/// Inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    /// Button rows, top to bottom.
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Returns true when the keyboard has no buttons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Iterates buttons row-major.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Iterates button payloads row-major.
    pub fn payloads(&self) -> impl Iterator<Item = &str> {
        self.buttons().map(|button| button.payload.as_str())
    }

    /// Returns the first button carrying `payload`.
    #[must_use]
    pub fn find(&self, payload: &str) -> Option<&Button> {
        self.buttons().find(|button| button.payload == payload)
    }

    /// Appends a non-empty row.
    fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds the keyboard for the current phase of `state`.
#[must_use]
pub fn build_keyboard(definition: &FormDefinition, state: &FormState) -> Keyboard {
    if let FormPhase::AwaitingInput {
        field,
        editor,
    } = state.phase()
        && let Some(field) = definition.field(field.as_str())
    {
        return build_edit_keyboard(definition, field, editor);
    }
    build_form_keyboard(definition, state)
}

/// Builds the idle keyboard with field, custom, and terminal rows.
#[must_use]
pub fn build_form_keyboard(definition: &FormDefinition, state: &FormState) -> Keyboard {
    let codec = definition.codec();
    let settings = definition.settings();
    let mut keyboard = Keyboard::default();
    for (field, value) in definition.entries(state) {
        if field.read_only {
            continue;
        }
        keyboard.push_row(field_row(definition, codec, field, value));
    }
    keyboard.push_row(
        definition
            .actions()
            .iter()
            .map(|action| {
                button(
                    codec,
                    action.label.clone(),
                    &ButtonAction::Custom {
                        action: action.id.clone(),
                    },
                )
            })
            .collect(),
    );
    let mut terminal = vec![button(codec, settings.ok_label.clone(), &ButtonAction::Ok)];
    if definition.has_cancel() {
        terminal.push(button(codec, settings.cancel_label.clone(), &ButtonAction::Cancel));
    }
    keyboard.push_row(terminal);
    keyboard
}

/// Builds the keyboard shown while `field` awaits text input from `editor`.
#[must_use]
pub fn build_edit_keyboard(
    definition: &FormDefinition,
    field: &FieldSpec,
    editor: &EditorTag,
) -> Keyboard {
    let codec = definition.codec();
    let settings = definition.settings();
    let mut keyboard = Keyboard::default();
    keyboard.push_row(vec![button(
        codec,
        settings.cancel_edit_label.clone(),
        &ButtonAction::CancelEdit {
            field: field.name.clone(),
            editor: editor.clone(),
        },
    )]);
    if field.noneable {
        keyboard.push_row(vec![button(
            codec,
            settings.clear_label.clone(),
            &ButtonAction::SubmitValue {
                field: field.name.clone(),
                cursor: None,
            },
        )]);
    }
    keyboard
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the button row for one editable field.
fn field_row(
    definition: &FormDefinition,
    codec: &PayloadCodec,
    field: &FieldSpec,
    value: Option<&FieldValue>,
) -> Vec<Button> {
    let settings = definition.settings();
    let name = field.name.clone();
    match field.edit_mode() {
        EditMode::FreeText => {
            let icon = if field.needs_value(value) {
                &settings.required_icon
            } else {
                &settings.edit_icon
            };
            vec![button(
                codec,
                format!("{icon} {}", field.label),
                &ButtonAction::StartEdit {
                    field: name,
                },
            )]
        }
        EditMode::Toggle => {
            let current = matches!(value, Some(FieldValue::Boolean(true)));
            let display = field.format(value, &settings.missing_value);
            vec![button(
                codec,
                format!("{}{}{display}", field.label, settings.separator),
                &ButtonAction::SubmitValue {
                    field: name,
                    cursor: Some(u16::from(!current)),
                },
            )]
        }
        EditMode::Cycle => {
            let count = field.kind.option_count();
            let index = field.kind.option_index(value);
            let (previous, next) = neighbours(index, count);
            vec![
                button(
                    codec,
                    format!("{} {}", settings.previous_icon, field.label),
                    &ButtonAction::Decrement {
                        field: name.clone(),
                        cursor: previous,
                    },
                ),
                button(
                    codec,
                    format!("{} {}", field.label, settings.next_icon),
                    &ButtonAction::Increment {
                        field: name,
                        cursor: next,
                    },
                ),
            ]
        }
    }
}

/// Returns the wrapped previous and next option cursors.
///
/// With no current option, next selects the first and previous the last.
fn neighbours(index: Option<usize>, count: usize) -> (u16, u16) {
    if count == 0 {
        return (0, 0);
    }
    let (previous, next) = match index {
        Some(index) => ((index + count - 1) % count, (index + 1) % count),
        None => (count - 1, 0),
    };
    (u16::try_from(previous).unwrap_or(0), u16::try_from(next).unwrap_or(0))
}

/// Builds a button with an encoded payload.
fn button(codec: &PayloadCodec, text: String, action: &ButtonAction) -> Button {
    Button {
        text,
        payload: codec.encode(action),
    }
}
