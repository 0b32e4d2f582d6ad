// crates/formgram-core/tests/definition_validation.rs
// ============================================================================
// Module: Form Definition Validation Tests
// Description: Construction-time failures and keyboard layout rules.
// ============================================================================
//! ## Overview
//! Validates that invalid form declarations fail fast with a stable error
//! and that valid ones produce the documented keyboard layout.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use formgram_core::ActionResponse;
use formgram_core::DefinitionError;
use formgram_core::FieldName;
use formgram_core::FieldSpec;
use formgram_core::FieldValue;
use formgram_core::FormBuilder;
use formgram_core::FormDefinition;
use formgram_core::FormSettings;
use formgram_core::build_form_keyboard;
use formgram_core::rehydrate_body;
use formgram_core::render_body;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn form(id: &str) -> FormBuilder {
    FormDefinition::builder(id).on_submit(|_, _| {})
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn zero_fields_are_rejected() {
    let err = form("empty").build().unwrap_err();
    assert!(matches!(err, DefinitionError::NoFields(_)));
}

#[test]
fn duplicate_names_and_labels_are_rejected() {
    let err = form("dup")
        .field(FieldSpec::text("name"))
        .field(FieldSpec::integer("name").label("Other"))
        .build()
        .unwrap_err();
    assert_eq!(err, DefinitionError::DuplicateField(FieldName::new("name")));

    let err = form("dup")
        .field(FieldSpec::text("first").label("Name"))
        .field(FieldSpec::text("second").label("Name"))
        .build()
        .unwrap_err();
    assert_eq!(err, DefinitionError::DuplicateLabel("Name".to_string()));
}

#[test]
fn labels_must_not_break_the_layout() {
    for label in ["", "Time: now", "two\nlines"] {
        let err = form("labels").field(FieldSpec::text("field").label(label)).build().unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidLabel { .. }), "label {label:?}: {err}");
    }
}

#[test]
fn labels_overlapping_the_separator_are_rejected() {
    let settings = FormSettings {
        separator: "::".to_string(),
        ..FormSettings::default()
    };
    let err = form("overlap")
        .settings(settings.clone())
        .field(FieldSpec::text("field").label("a:"))
        .build()
        .unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidLabel { .. }), "{err}");

    let definition = form("overlap")
        .settings(settings)
        .field(FieldSpec::text("field").label(":a").initial(FieldValue::Text("x".to_string())))
        .build()
        .unwrap();
    let body = render_body(&definition, &definition.initial_state());
    assert_eq!(body, ":a::x");
    let rehydration = rehydrate_body(&definition, &body);
    assert!(rehydration.issues.is_empty());
    assert_eq!(rehydration.state.get("field"), Some(&FieldValue::Text("x".to_string())));
}

#[test]
fn identifiers_must_be_payload_tokens() {
    let err = form("sign up").field(FieldSpec::text("name")).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidIdentifier { kind: "form", .. }));

    let err = form("signup").field(FieldSpec::text("first/name")).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidIdentifier { kind: "field", .. }));
}

#[test]
fn non_noneable_fields_require_an_initial_value() {
    let err = form("strict").field(FieldSpec::integer("count").not_noneable()).build().unwrap_err();
    assert_eq!(err, DefinitionError::MissingInitialValue(FieldName::new("count")));

    let err = form("strict")
        .field(FieldSpec::integer("count").initial(FieldValue::Text("one".to_string())))
        .build()
        .unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidInitialValue { .. }));
}

#[test]
fn choice_options_are_validated() {
    let empty: [&str; 0] = [];
    let err = form("choices").field(FieldSpec::choice("size", empty)).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidKind { .. }));

    let err = form("choices").field(FieldSpec::choice("size", ["S", "S"])).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidKind { .. }));

    let err = form("choices").field(FieldSpec::choice("size", ["S", ""])).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidKind { .. }));

    let err = form("choices").field(FieldSpec::choice("size", ["S", "M "])).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidKind { .. }));
}

#[test]
fn duplicate_custom_actions_are_rejected() {
    let err = form("actions")
        .field(FieldSpec::text("note"))
        .action("go", "Go", |_, _| ActionResponse::Unchanged)
        .action("go", "Go again", |_, _| ActionResponse::Unchanged)
        .build()
        .unwrap_err();
    assert!(matches!(err, DefinitionError::DuplicateAction(_)));
}

#[test]
fn submit_handler_is_required() {
    let err = FormDefinition::builder("orphan").field(FieldSpec::text("note")).build().unwrap_err();
    assert!(matches!(err, DefinitionError::MissingSubmitHandler(_)));
}

#[test]
fn invalid_settings_are_rejected() {
    let settings = FormSettings {
        separator: String::new(),
        ..FormSettings::default()
    };
    let err = form("settings").settings(settings).field(FieldSpec::text("note")).build().unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidSettings(_)));
}

#[test]
fn oversized_payloads_fail_construction() {
    let long_form = "f".repeat(32);
    let long_field = "x".repeat(32);
    let err = form(&long_form).field(FieldSpec::text(long_field)).build().unwrap_err();
    let DefinitionError::PayloadTooLarge {
        max_bytes,
        actual_bytes,
        ..
    } = err
    else {
        panic!("expected payload overflow, got {err}");
    };
    assert_eq!(max_bytes, 64);
    assert!(actual_bytes > max_bytes);

    let roomy = FormSettings {
        payload_max_bytes: 128,
        ..FormSettings::default()
    };
    assert!(
        form(&long_form).settings(roomy).field(FieldSpec::text("x".repeat(32))).build().is_ok()
    );
}

#[test]
fn read_only_fields_render_text_but_no_buttons() {
    let definition = form("readonly")
        .field(FieldSpec::text("id").label("Id").read_only().initial(FieldValue::Text("7".to_string())))
        .field(FieldSpec::text("note").label("Note"))
        .build()
        .unwrap();
    let state = definition.initial_state();

    assert_eq!(render_body(&definition, &state).lines().count(), 2);
    let keyboard = build_form_keyboard(&definition, &state);
    let texts: Vec<&str> = keyboard.buttons().map(|button| button.text.as_str()).collect();
    assert_eq!(texts, vec!["✏️ Note", "OK"]);
    assert_eq!(keyboard.rows.len(), 2);
}

#[test]
fn custom_buttons_share_one_row_before_terminal_row() {
    let definition = form("rows")
        .field(FieldSpec::text("note").label("Note"))
        .action("a", "Alpha", |_, _| ActionResponse::Unchanged)
        .action("b", "Beta", |_, _| ActionResponse::Unchanged)
        .on_cancel(|_, _| {})
        .build()
        .unwrap();
    let keyboard = build_form_keyboard(&definition, &definition.initial_state());
    let rows: Vec<Vec<&str>> = keyboard
        .rows
        .iter()
        .map(|row| row.iter().map(|button| button.text.as_str()).collect())
        .collect();
    assert_eq!(rows, vec![vec!["✏️ Note"], vec!["Alpha", "Beta"], vec!["OK", "Cancel"]]);
    assert!(keyboard.payloads().all(|payload| payload.len() <= 64));
}
