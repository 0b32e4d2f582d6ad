// crates/formgram-core/src/core/message.rs
// ============================================================================
// Module: Formgram Message Bodies
// Description: Rendering and rehydration of the form message text.
// Purpose: Use the displayed message as the only session store.
// Dependencies: crate::core::{definition, event, field, identifiers, payload, state}, thiserror
// ============================================================================

//! ## Overview
//! The body holds one line per declared field, `label + separator + display`,
//! in registry order. While a field awaits input the body is followed by one
//! blank line and a prompt line. Rehydration reads the lines before the first
//! blank line back into a [`FormState`] and derives the phase from the
//! payloads attached to the message.
//! Invariants:
//! - `rehydrate(render_body(s))` reproduces the values of `s`.
//! - A field whose line is missing or unreadable falls back to its initial
//!   value; the other fields are unaffected.
//! - Platforms that trim trailing whitespace are tolerated: a line equal to
//!   `label + separator.trim_end()` reads as an empty raw value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::definition::FormDefinition;
use crate::core::event::MessageSnapshot;
use crate::core::field::FieldError;
use crate::core::identifiers::FieldName;
use crate::core::payload::ButtonAction;
use crate::core::state::FormPhase;
use crate::core::state::FormState;
use crate::core::state::TerminalOutcome;

// ============================================================================
// SECTION: Consistency Errors
// ============================================================================

/// Recoverable mismatch between a message body and the form layout.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Each error reverts at most one field to its initial value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderConsistencyError {
    /// No line carries the field label.
    #[error("no line for field {0}")]
    MissingLine(FieldName),
    /// More than one line carries the field label.
    #[error("duplicate lines for field {0}")]
    DuplicateLine(FieldName),
    /// A line matches no field label.
    #[error("unrecognized line: {0:?}")]
    UnknownLine(String),
    /// The displayed value does not parse as the field kind.
    #[error("unreadable value for field {field}: {source}")]
    Unparseable {
        /// Field name.
        field: FieldName,
        /// Underlying field error.
        source: FieldError,
    },
    /// The displayed value is missing but the field is not noneable.
    #[error("missing value for non-noneable field {0}")]
    MissingValue(FieldName),
}

impl RenderConsistencyError {
    /// Returns the affected field, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&FieldName> {
        match self {
            Self::MissingLine(field)
            | Self::DuplicateLine(field)
            | Self::MissingValue(field)
            | Self::Unparseable {
                field,
                ..
            } => Some(field),
            Self::UnknownLine(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders the message body for `state`.
#[must_use]
pub fn render_body(definition: &FormDefinition, state: &FormState) -> String {
    let settings = definition.settings();
    let mut lines: Vec<String> = definition
        .entries(state)
        .map(|(field, value)| {
            format!(
                "{}{}{}",
                field.label,
                settings.separator,
                field.format(value, &settings.missing_value)
            )
        })
        .collect();
    if let Some(field) = state.focused_field().and_then(|name| definition.field(name.as_str())) {
        lines.push(String::new());
        lines.push(format!("{} {}:", settings.edit_prompt, field.label));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Rehydration
// ============================================================================

/// Result of rebuilding a form state from a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Rehydration {
    /// Rebuilt state, phase included.
    pub state: FormState,
    /// Consistency errors encountered; affected fields hold initial values.
    pub issues: Vec<RenderConsistencyError>,
}

/// Rebuilds the form state from a message snapshot.
#[must_use]
pub fn rehydrate(definition: &FormDefinition, snapshot: &MessageSnapshot) -> Rehydration {
    let mut rehydration = rehydrate_body(definition, &snapshot.text);
    rehydration.state.set_phase(derive_phase(definition, &snapshot.payloads));
    rehydration
}

/// Rebuilds field values from message text; the phase stays idle.
#[must_use]
pub fn rehydrate_body(definition: &FormDefinition, text: &str) -> Rehydration {
    let settings = definition.settings();
    let trimmed_separator = settings.separator.trim_end();
    let mut issues = Vec::new();
    let mut raw_values: BTreeMap<&str, &str> = BTreeMap::new();
    let mut duplicates = Vec::new();

    for line in text.lines().take_while(|line| !line.is_empty()) {
        let split = line.split_once(settings.separator.as_str()).or_else(|| {
            line.strip_suffix(trimmed_separator).map(|label| (label, ""))
        });
        let Some((label, raw)) = split else {
            issues.push(RenderConsistencyError::UnknownLine(line.to_string()));
            continue;
        };
        let Some(field) = definition.field_by_label(label) else {
            issues.push(RenderConsistencyError::UnknownLine(line.to_string()));
            continue;
        };
        if raw_values.insert(field.name.as_str(), raw).is_some() {
            duplicates.push(field.name.clone());
        }
    }

    let mut state = definition.initial_state();
    for field in definition.fields() {
        if duplicates.contains(&field.name) {
            issues.push(RenderConsistencyError::DuplicateLine(field.name.clone()));
            continue;
        }
        let Some(raw) = raw_values.get(field.name.as_str()) else {
            issues.push(RenderConsistencyError::MissingLine(field.name.clone()));
            continue;
        };
        match field.parse(raw, &settings.missing_value) {
            Ok(None) if !field.noneable => {
                issues.push(RenderConsistencyError::MissingValue(field.name.clone()));
            }
            Ok(value) => {
                state.set(field.name.as_str(), value);
            }
            Err(source) => issues.push(RenderConsistencyError::Unparseable {
                field: field.name.clone(),
                source,
            }),
        }
    }
    Rehydration {
        state,
        issues,
    }
}

/// Derives the dispatch phase from the payloads attached to a message.
///
/// A cancel-edit payload marks the focused field and its editor; a message
/// without any payload of this form is closed.
#[must_use]
pub fn derive_phase(definition: &FormDefinition, payloads: &[String]) -> FormPhase {
    let mut open = false;
    for payload in payloads {
        match definition.codec().decode(payload) {
            Ok(ButtonAction::CancelEdit {
                field,
                editor,
            }) => {
                return FormPhase::AwaitingInput {
                    field,
                    editor,
                };
            }
            Ok(_) => open = true,
            Err(_) => {}
        }
    }
    if open {
        FormPhase::Idle
    } else {
        FormPhase::Terminal {
            outcome: TerminalOutcome::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only panic-based assertions are permitted.")]

    use super::*;
    use crate::core::field::FieldSpec;
    use crate::core::field::FieldValue;
    use crate::core::identifiers::EditorTag;

    fn definition() -> FormDefinition {
        FormDefinition::builder("signup")
            .field(FieldSpec::text("name").label("Name").required())
            .field(FieldSpec::integer("age").label("Age"))
            .on_submit(|_, _| {})
            .build()
            .unwrap()
    }

    #[test]
    fn renders_one_line_per_field() {
        let definition = definition();
        let body = render_body(&definition, &definition.initial_state());
        assert_eq!(body, "Name: \nAge: ");
    }

    #[test]
    fn trimmed_trailing_separator_reads_as_missing() {
        let definition = definition();
        let rehydration = rehydrate_body(&definition, "Name: Ada\nAge:");
        assert!(rehydration.issues.is_empty());
        assert_eq!(rehydration.state.get("name"), Some(&FieldValue::Text("Ada".to_string())));
        assert_eq!(rehydration.state.get("age"), None);
    }

    #[test]
    fn prompt_lines_are_ignored() {
        let definition = definition();
        let mut state = definition.initial_state();
        state.set_phase(FormPhase::AwaitingInput {
            field: FieldName::new("age"),
            editor: EditorTag::new("q2Xz"),
        });
        let body = render_body(&definition, &state);
        assert!(body.ends_with("\n\nSend a new value for Age:"));
        assert!(rehydrate_body(&definition, &body).issues.is_empty());
    }

    #[test]
    fn unknown_and_missing_lines_are_reported() {
        let definition = definition();
        let rehydration = rehydrate_body(&definition, "Nickname: Ada");
        assert!(rehydration.issues.contains(&RenderConsistencyError::UnknownLine(
            "Nickname: Ada".to_string()
        )));
        assert!(
            rehydration.issues.contains(&RenderConsistencyError::MissingLine(FieldName::new("name")))
        );
    }
}
