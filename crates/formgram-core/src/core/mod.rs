// crates/formgram-core/src/core/mod.rs
// ============================================================================
// Module: Formgram Core Types
// Description: Fields, form definitions, keyboards, payloads, and message bodies.
// Purpose: Provide the pure, transport-free building blocks of a form.
// Dependencies: base64, serde, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types describe a form and its two persisted artifacts: the rendered
//! message body and the payloads of its keyboard buttons. Everything here is
//! pure; side effects live in the runtime and behind the transport interface.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod definition;
pub mod event;
pub mod field;
pub mod fingerprint;
pub mod identifiers;
pub mod keyboard;
pub mod message;
pub mod payload;
pub mod settings;
pub mod state;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use definition::ActionResponse;
pub use definition::CustomAction;
pub use definition::CustomHandler;
pub use definition::DefinitionError;
pub use definition::FormBuilder;
pub use definition::FormDefinition;
pub use definition::OutcomeHandler;
pub use event::CallbackEvent;
pub use event::EventContext;
pub use event::InboundEvent;
pub use event::MessageSnapshot;
pub use event::TextEvent;
pub use field::DEFAULT_FALSE_REPR;
pub use field::DEFAULT_TRUE_REPR;
pub use field::EditMode;
pub use field::FieldError;
pub use field::FieldKind;
pub use field::FieldSpec;
pub use field::FieldValue;
pub use fingerprint::editor_tag;
pub use fingerprint::layout_fingerprint;
pub use identifiers::ActionId;
pub use identifiers::ChatId;
pub use identifiers::EditorTag;
pub use identifiers::FieldName;
pub use identifiers::FormId;
pub use identifiers::MAX_PAYLOAD_TOKEN_LENGTH;
pub use identifiers::MessageRef;
pub use identifiers::UserRef;
pub use identifiers::validate_payload_token;
pub use keyboard::Button;
pub use keyboard::Keyboard;
pub use keyboard::build_edit_keyboard;
pub use keyboard::build_form_keyboard;
pub use keyboard::build_keyboard;
pub use message::Rehydration;
pub use message::RenderConsistencyError;
pub use message::derive_phase;
pub use message::rehydrate;
pub use message::rehydrate_body;
pub use message::render_body;
pub use payload::ButtonAction;
pub use payload::DecodeError;
pub use payload::PAYLOAD_VERSION;
pub use payload::PayloadCodec;
pub use payload::peek_form_id;
pub use settings::DEFAULT_PAYLOAD_MAX_BYTES;
pub use settings::DEFAULT_SEPARATOR;
pub use settings::FormSettings;
pub use settings::MAX_PAYLOAD_MAX_BYTES;
pub use settings::MIN_PAYLOAD_MAX_BYTES;
pub use state::FieldSlot;
pub use state::FormPhase;
pub use state::FormState;
pub use state::PendingAction;
pub use state::TerminalOutcome;
