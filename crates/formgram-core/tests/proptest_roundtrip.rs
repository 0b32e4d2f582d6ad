// crates/formgram-core/tests/proptest_roundtrip.rs
// ============================================================================
// Module: Field and Payload Property-Based Tests
// Description: Property tests for display round-trips and payload decoding.
// Purpose: Detect lossy rendering and decoder false positives across wide inputs.
// ============================================================================

//! Property-based tests for field and payload invariants.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use formgram_core::ActionId;
use formgram_core::ActionResponse;
use formgram_core::ButtonAction;
use formgram_core::EditorTag;
use formgram_core::FieldKind;
use formgram_core::FieldName;
use formgram_core::FieldSpec;
use formgram_core::FieldValue;
use formgram_core::FormDefinition;
use formgram_core::FormId;
use formgram_core::PayloadCodec;
use formgram_core::rehydrate_body;
use formgram_core::render_body;
use proptest::prelude::*;

const MISSING: &str = "-";

fn choice_kind() -> FieldKind {
    FieldKind::Choice {
        options: vec!["red".to_string(), "green".to_string(), "blue".to_string()],
    }
}

fn kind_and_value() -> impl Strategy<Value = (FieldKind, FieldValue)> {
    prop_oneof![
        "[^\r\n]{1,40}"
            .prop_filter("displayable text", |text| text != MISSING && text.trim_end() == text)
            .prop_map(|text| (FieldKind::Text, FieldValue::Text(text))),
        any::<i64>().prop_map(|number| (FieldKind::Integer, FieldValue::Integer(number))),
        any::<f64>()
            .prop_filter("finite", |number| number.is_finite())
            .prop_map(|number| (FieldKind::Float, FieldValue::Float(number))),
        any::<bool>().prop_map(|flag| (FieldKind::boolean(), FieldValue::Boolean(flag))),
        prop::sample::select(vec!["red", "green", "blue"])
            .prop_map(|option| (choice_kind(), FieldValue::Choice(option.to_string()))),
    ]
}

fn token() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,12}"
}

fn button_action() -> impl Strategy<Value = ButtonAction> {
    prop_oneof![
        token().prop_map(|field| ButtonAction::StartEdit {
            field: FieldName::new(field)
        }),
        (token(), proptest::option::of(any::<u16>())).prop_map(|(field, cursor)| {
            ButtonAction::SubmitValue {
                field: FieldName::new(field),
                cursor,
            }
        }),
        (token(), "[A-Za-z0-9_-]{4}").prop_map(|(field, editor)| ButtonAction::CancelEdit {
            field: FieldName::new(field),
            editor: EditorTag::new(editor),
        }),
        (token(), any::<u16>()).prop_map(|(field, cursor)| ButtonAction::Increment {
            field: FieldName::new(field),
            cursor,
        }),
        (token(), any::<u16>()).prop_map(|(field, cursor)| ButtonAction::Decrement {
            field: FieldName::new(field),
            cursor,
        }),
        Just(ButtonAction::Ok),
        Just(ButtonAction::Cancel),
        token().prop_map(|action| ButtonAction::Custom {
            action: ActionId::new(action)
        }),
    ]
}

fn codec() -> PayloadCodec {
    PayloadCodec::new(FormId::new("survey"), "Zm9ybWdy", 256)
}

proptest! {
    #[test]
    fn field_values_round_trip_through_display((kind, value) in kind_and_value()) {
        let shown = kind.format(Some(&value), MISSING);
        prop_assert_eq!(kind.parse(&shown, MISSING), Ok(Some(value)));
        prop_assert_eq!(kind.parse(MISSING, MISSING), Ok(None));
        prop_assert_eq!(kind.format(None, MISSING), MISSING);
    }

    #[test]
    fn message_body_round_trips_every_field(
        values in prop::collection::vec(kind_and_value(), 1 .. 6),
    ) {
        let mut builder = FormDefinition::builder("survey").on_submit(|_, _| {});
        for (index, (kind, _)) in values.iter().enumerate() {
            builder = builder.field(FieldSpec::new(format!("f{index}"), kind.clone()).label(format!("Field {index}")));
        }
        let definition = builder.build().unwrap();
        let mut state = definition.initial_state();
        for (index, (_, value)) in values.iter().enumerate() {
            state.set(&format!("f{index}"), Some(value.clone()));
        }
        let body = render_body(&definition, &state);
        prop_assert_eq!(body.lines().count(), values.len());
        let rehydration = rehydrate_body(&definition, &body);
        prop_assert!(rehydration.issues.is_empty(), "issues: {:?}", rehydration.issues);
        prop_assert_eq!(rehydration.state, state);
    }

    #[test]
    fn payloads_round_trip(action in button_action()) {
        let codec = codec();
        let payload = codec.encode(&action);
        prop_assert_eq!(codec.decode(&payload), Ok(action));
    }

    #[test]
    fn foreign_payloads_never_decode_to_other_values(raw in ".{0,80}") {
        let codec = codec();
        if let Ok(action) = codec.decode(&raw) {
            prop_assert_eq!(codec.encode(&action), raw);
        }
    }

    #[test]
    fn mutated_payloads_are_rejected_or_canonical(
        action in button_action(),
        index in any::<prop::sample::Index>(),
        replacement in any::<char>(),
    ) {
        let codec = codec();
        let payload = codec.encode(&action);
        let mut chars: Vec<char> = payload.chars().collect();
        let position = index.index(chars.len());
        chars[position] = replacement;
        let mutated: String = chars.into_iter().collect();
        if let Ok(decoded) = codec.decode(&mutated) {
            prop_assert_eq!(codec.encode(&decoded), mutated);
        }
    }
}

#[test]
fn custom_action_ids_survive_the_codec() {
    let definition = FormDefinition::builder("survey")
        .field(FieldSpec::text("note"))
        .action("ping", "Ping", |_, _| ActionResponse::Unchanged)
        .on_submit(|_, _| {})
        .build()
        .unwrap();
    let action = ButtonAction::Custom {
        action: ActionId::new("ping"),
    };
    let payload = definition.codec().encode(&action);
    assert_eq!(definition.codec().decode(&payload), Ok(action));
}
