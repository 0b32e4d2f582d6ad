// crates/formgram-core/src/core/field.rs
// ============================================================================
// Module: Formgram Fields
// Description: Typed field declarations, values, parsing, and display.
// Purpose: Define the editable unit of a form and its text round-trip.
// Dependencies: crate::core::identifiers, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`FieldSpec`] is an immutable declaration of one editable slot. Its
//! [`FieldKind`] owns the text round-trip: [`FieldKind::format`] renders the
//! value shown in the message body and [`FieldKind::parse`] reads it back.
//! Invariants:
//! - `parse(format(v)) == v` for every value the kind can represent.
//! - The form's missing-value string always parses to `None` and `None`
//!   always formats to it.
//! - Rendered values never contain line breaks, so one field is one line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::FieldName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default display string for a `true` boolean value.
pub const DEFAULT_TRUE_REPR: &str = "✅";
/// Default display string for a `false` boolean value.
pub const DEFAULT_FALSE_REPR: &str = "❌";

// ============================================================================
// SECTION: Field Values
// ============================================================================

/// Typed value held by a field.
///
/// # Invariants
/// - [`FieldValue::Text`] never contains `\n` or `\r` once accepted by a field.
/// - [`FieldValue::Float`] is always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// Free-text value.
    Text(String),
    /// Signed integer value.
    Integer(i64),
    /// Finite floating point value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// Selected option of a single-choice enumeration.
    Choice(String),
}

impl FieldValue {
    /// Returns a stable label for the value kind.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Choice(_) => "choice",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) | Self::Choice(value) => value.fmt(f),
            Self::Integer(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Boolean(value) => value.fmt(f),
        }
    }
}

// ============================================================================
// SECTION: Field Errors
// ============================================================================

/// Errors raised while parsing or assigning a field value.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - These errors are recoverable and never abort a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Input could not be parsed as the field kind.
    #[error("cannot parse {input:?} as {kind}")]
    Malformed {
        /// Field kind label.
        kind: &'static str,
        /// Raw input text.
        input: String,
    },
    /// Input contains a line break.
    #[error("value must not contain line breaks")]
    LineBreak,
    /// Input parsed to a non-finite float.
    #[error("float value must be finite, got {0:?}")]
    NotFinite(String),
    /// Value kind does not match the field kind.
    #[error("expected a {expected} value, got {actual}")]
    KindMismatch {
        /// Field kind label.
        expected: &'static str,
        /// Value kind label.
        actual: &'static str,
    },
}

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// How a field is edited from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// The user types a new value after tapping the edit button.
    FreeText,
    /// The value flips in place with a single button.
    Toggle,
    /// The value cycles through options with previous/next buttons.
    Cycle,
}

/// Discriminated field kind with its parsing and display rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free-text string.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Finite 64-bit float.
    Float,
    /// Boolean toggled from the keyboard.
    Boolean {
        /// Display string for `true`.
        true_repr: String,
        /// Display string for `false`.
        false_repr: String,
    },
    /// Single-choice enumeration cycled from the keyboard.
    Choice {
        /// Allowed options in cycling order.
        options: Vec<String>,
    },
}

impl FieldKind {
    /// Returns a boolean kind with the default representations.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean {
            true_repr: DEFAULT_TRUE_REPR.to_string(),
            false_repr: DEFAULT_FALSE_REPR.to_string(),
        }
    }

    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean {
                ..
            } => "boolean",
            Self::Choice {
                ..
            } => "choice",
        }
    }

    /// Returns how the kind is edited from the keyboard.
    #[must_use]
    pub const fn edit_mode(&self) -> EditMode {
        match self {
            Self::Text | Self::Integer | Self::Float => EditMode::FreeText,
            Self::Boolean {
                ..
            } => EditMode::Toggle,
            Self::Choice {
                ..
            } => EditMode::Cycle,
        }
    }

    /// Parses raw text into a value; `missing` parses to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the text is not a valid value of the kind.
    pub fn parse(&self, raw: &str, missing: &str) -> Result<Option<FieldValue>, FieldError> {
        if raw == missing {
            return Ok(None);
        }
        if raw.contains(['\n', '\r']) {
            return Err(FieldError::LineBreak);
        }
        let value = match self {
            Self::Text => {
                let text = raw.trim_end();
                if text == missing {
                    return Ok(None);
                }
                FieldValue::Text(text.to_string())
            }
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(FieldValue::Integer)
                .map_err(|_| self.malformed(raw))?,
            Self::Float => {
                let parsed = raw.trim().parse::<f64>().map_err(|_| self.malformed(raw))?;
                if !parsed.is_finite() {
                    return Err(FieldError::NotFinite(raw.to_string()));
                }
                FieldValue::Float(parsed)
            }
            Self::Boolean {
                true_repr,
                false_repr,
            } => {
                if raw == true_repr {
                    FieldValue::Boolean(true)
                } else if raw == false_repr {
                    FieldValue::Boolean(false)
                } else {
                    return Err(self.malformed(raw));
                }
            }
            Self::Choice {
                options,
            } => {
                if !options.iter().any(|option| option == raw) {
                    return Err(self.malformed(raw));
                }
                FieldValue::Choice(raw.to_string())
            }
        };
        Ok(Some(value))
    }

    /// Formats a value for display; `None` formats to `missing`.
    #[must_use]
    pub fn format(&self, value: Option<&FieldValue>, missing: &str) -> String {
        match (self, value) {
            (_, None) => missing.to_string(),
            (
                Self::Boolean {
                    true_repr,
                    false_repr,
                },
                Some(FieldValue::Boolean(flag)),
            ) => {
                if *flag {
                    true_repr.clone()
                } else {
                    false_repr.clone()
                }
            }
            (_, Some(value)) => value.to_string(),
        }
    }

    /// Checks that a value belongs to this kind.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the value kind differs, text contains a
    /// line break, a float is not finite, or a choice is not an option.
    pub fn check(&self, value: &FieldValue) -> Result<(), FieldError> {
        match (self, value) {
            (Self::Text, FieldValue::Text(text)) => {
                if text.contains(['\n', '\r']) {
                    return Err(FieldError::LineBreak);
                }
                Ok(())
            }
            (Self::Integer, FieldValue::Integer(_))
            | (
                Self::Boolean {
                    ..
                },
                FieldValue::Boolean(_),
            ) => Ok(()),
            (Self::Float, FieldValue::Float(number)) => {
                if number.is_finite() {
                    Ok(())
                } else {
                    Err(FieldError::NotFinite(number.to_string()))
                }
            }
            (
                Self::Choice {
                    options,
                },
                FieldValue::Choice(choice),
            ) => {
                if options.contains(choice) {
                    Ok(())
                } else {
                    Err(self.malformed(choice))
                }
            }
            _ => Err(FieldError::KindMismatch {
                expected: self.label(),
                actual: value.kind_label(),
            }),
        }
    }

    /// Returns the option index of a choice value.
    #[must_use]
    pub fn option_index(&self, value: Option<&FieldValue>) -> Option<usize> {
        match (self, value) {
            (
                Self::Choice {
                    options,
                },
                Some(FieldValue::Choice(choice)),
            ) => options.iter().position(|option| option == choice),
            _ => None,
        }
    }

    /// Returns the value stored at a cursor position for cursor-driven kinds.
    ///
    /// Booleans map `0`/`1` to `false`/`true`; choices map the option index.
    #[must_use]
    pub fn value_at(&self, cursor: u16) -> Option<FieldValue> {
        match self {
            Self::Boolean {
                ..
            } => match cursor {
                0 => Some(FieldValue::Boolean(false)),
                1 => Some(FieldValue::Boolean(true)),
                _ => None,
            },
            Self::Choice {
                options,
            } => options.get(usize::from(cursor)).cloned().map(FieldValue::Choice),
            Self::Text | Self::Integer | Self::Float => None,
        }
    }

    /// Returns the number of options for a choice kind.
    #[must_use]
    pub fn option_count(&self) -> usize {
        match self {
            Self::Choice {
                options,
            } => options.len(),
            _ => 0,
        }
    }

    /// Builds a malformed-input error for this kind.
    fn malformed(&self, raw: &str) -> FieldError {
        FieldError::Malformed {
            kind: self.label(),
            input: raw.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Field Specification
// ============================================================================

/// Immutable declaration of a form field.
///
/// # Invariants
/// - `!noneable` implies `initial_value.is_some()` (checked by the form builder).
/// - `label` defaults to the field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within the form.
    pub name: FieldName,
    /// Display label rendered before the separator.
    pub label: String,
    /// Field kind.
    pub kind: FieldKind,
    /// Blocks submission while the value is missing.
    pub required: bool,
    /// Allows the value to be missing.
    pub noneable: bool,
    /// Renders the value without edit buttons.
    pub read_only: bool,
    /// Value used for fresh forms and rehydration fallback.
    pub initial_value: Option<FieldValue>,
}

impl FieldSpec {
    /// Creates a noneable, optional, editable field with no initial value.
    #[must_use]
    pub fn new(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.as_str().to_string(),
            name,
            kind,
            required: false,
            noneable: true,
            read_only: false,
            initial_value: None,
        }
    }

    /// Creates a free-text field.
    #[must_use]
    pub fn text(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates an integer field.
    #[must_use]
    pub fn integer(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    /// Creates a float field.
    #[must_use]
    pub fn float(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    /// Creates a boolean field with the default representations.
    #[must_use]
    pub fn boolean(name: impl Into<FieldName>) -> Self {
        Self::new(name, FieldKind::boolean())
    }

    /// Creates a single-choice field over the provided options.
    #[must_use]
    pub fn choice<I, S>(name: impl Into<FieldName>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::Choice {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Sets the display label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Marks the field as required for submission.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Forbids a missing value; an initial value becomes mandatory.
    #[must_use]
    pub const fn not_noneable(mut self) -> Self {
        self.noneable = false;
        self
    }

    /// Renders the field without edit buttons.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn initial(mut self, value: FieldValue) -> Self {
        self.initial_value = Some(value);
        self
    }

    /// Overrides the boolean representations of a boolean field.
    #[must_use]
    pub fn representations(mut self, true_repr: impl Into<String>, false_repr: impl Into<String>) -> Self {
        if let FieldKind::Boolean {
            ..
        } = self.kind
        {
            self.kind = FieldKind::Boolean {
                true_repr: true_repr.into(),
                false_repr: false_repr.into(),
            };
        }
        self
    }

    /// Parses raw input against the field kind.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the input is malformed for the kind.
    pub fn parse(&self, raw: &str, missing: &str) -> Result<Option<FieldValue>, FieldError> {
        self.kind.parse(raw, missing)
    }

    /// Formats a value for display.
    #[must_use]
    pub fn format(&self, value: Option<&FieldValue>, missing: &str) -> String {
        self.kind.format(value, missing)
    }

    /// Returns how the field is edited from the keyboard.
    #[must_use]
    pub const fn edit_mode(&self) -> EditMode {
        self.kind.edit_mode()
    }

    /// Returns true when the field blocks submission for `value`.
    #[must_use]
    pub const fn needs_value(&self, value: Option<&FieldValue>) -> bool {
        self.required && value.is_none()
    }

    /// Applies the noneable rule to a parsed value.
    ///
    /// A non-noneable field keeps `previous` when the candidate is missing.
    #[must_use]
    pub fn accept(
        &self,
        candidate: Option<FieldValue>,
        previous: Option<FieldValue>,
    ) -> Option<FieldValue> {
        if candidate.is_none() && !self.noneable {
            return previous;
        }
        candidate
    }

    /// Normalizes an assigned value so it survives the display round-trip.
    ///
    /// Trailing whitespace is dropped from text. Values that would render as
    /// the missing string collapse to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError`] when the value does not belong to the kind.
    pub fn normalize(
        &self,
        value: Option<FieldValue>,
        missing: &str,
    ) -> Result<Option<FieldValue>, FieldError> {
        let value = match value {
            None => return Ok(None),
            Some(FieldValue::Text(text)) if text.ends_with(char::is_whitespace) => {
                FieldValue::Text(text.trim_end().to_string())
            }
            Some(value) => value,
        };
        self.kind.check(&value)?;
        if self.kind.format(Some(&value), missing) == missing {
            return Ok(None);
        }
        Ok(Some(value))
    }
}
