// crates/formgram-core/tests/common/mod.rs
// =============================================================================
// Module: Form Test Helpers
// Description: Shared form definitions and recording handlers.
// Purpose: Reduce duplication across integration tests for formgram-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::Mutex;

use formgram_core::ActionResponse;
use formgram_core::ChatId;
use formgram_core::FieldSpec;
use formgram_core::FieldValue;
use formgram_core::FormBuilder;
use formgram_core::FormController;
use formgram_core::FormDefinition;
use formgram_core::InMemoryTransport;
use formgram_core::MessageRef;
use formgram_core::UserRef;
use serde_json::Value;

/// Records the JSON projection of every state a handler receives.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Value>>>,
}

impl Recorder {
    pub fn push(&self, value: Value) {
        self.calls.lock().unwrap().push(value);
    }

    pub fn calls(&self) -> Vec<Value> {
        self.calls.lock().unwrap().clone()
    }
}

/// Returns the `name: text (required)`, `age: integer` builder.
pub fn signup_builder(submitted: &Recorder) -> FormBuilder {
    let submitted = submitted.clone();
    FormDefinition::builder("signup")
        .field(FieldSpec::text("name").label("Name").required())
        .field(FieldSpec::integer("age").label("Age"))
        .on_submit(move |state, _| submitted.push(state.to_json()))
}

/// Returns a form exercising every field kind plus a custom action.
pub fn profile_definition(submitted: &Recorder, cancelled: &Recorder) -> FormDefinition {
    let submitted = submitted.clone();
    let cancelled = cancelled.clone();
    FormDefinition::builder("profile")
        .field(FieldSpec::text("nick").label("Nick"))
        .field(FieldSpec::boolean("agree").label("Agree"))
        .field(
            FieldSpec::choice("size", ["S", "M", "L"])
                .label("Size")
                .not_noneable()
                .initial(FieldValue::Choice("M".to_string())),
        )
        .field(FieldSpec::float("ratio").label("Ratio"))
        .field(
            FieldSpec::text("id")
                .label("Id")
                .read_only()
                .initial(FieldValue::Text("u-1".to_string())),
        )
        .action("reset", "Reset", |state, _| {
            state.set("nick", None);
            ActionResponse::Rerender
        })
        .on_submit(move |state, _| submitted.push(state.to_json()))
        .on_cancel(move |state, _| cancelled.push(state.to_json()))
        .build()
        .unwrap()
}

/// Sends a form and returns the controller, transport, and message.
pub fn start(
    definition: FormDefinition,
) -> (FormController<InMemoryTransport>, InMemoryTransport, MessageRef) {
    let transport = InMemoryTransport::new();
    let controller = FormController::new(definition, transport.clone());
    let message = controller.send_form(&chat()).unwrap();
    (controller, transport, message)
}

pub fn chat() -> ChatId {
    ChatId::new("chat-1")
}

pub fn user() -> UserRef {
    UserRef::new("user-1")
}

/// Returns the visible text of every button on the message.
pub fn button_texts(transport: &InMemoryTransport, message: &MessageRef) -> Vec<String> {
    transport
        .message(message)
        .unwrap()
        .unwrap()
        .keyboard
        .map(|keyboard| keyboard.buttons().map(|button| button.text.clone()).collect())
        .unwrap_or_default()
}

/// Returns the current text of the message.
pub fn text_of(transport: &InMemoryTransport, message: &MessageRef) -> String {
    transport.message(message).unwrap().unwrap().text
}
