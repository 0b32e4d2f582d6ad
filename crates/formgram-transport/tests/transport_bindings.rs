// crates/formgram-transport/tests/transport_bindings.rs
// ============================================================================
// Module: Transport Binding Tests
// Description: Drive forms through callback, channel, and log transports.
// ============================================================================
//! ## Overview
//! Validates that each binding emits one command per transport call, assigns
//! deterministic message ids, and maps delivery failures to transport errors.

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

use std::sync::Arc;
use std::sync::Mutex;

use formgram_core::CallbackEvent;
use formgram_core::ChatId;
use formgram_core::ControllerError;
use formgram_core::DispatchError;
use formgram_core::DispatchOutcome;
use formgram_core::FieldSpec;
use formgram_core::FormController;
use formgram_core::FormDefinition;
use formgram_core::InboundEvent;
use formgram_core::Keyboard;
use formgram_core::MessageRef;
use formgram_core::MessageSnapshot;
use formgram_core::Transport;
use formgram_core::TransportCommand;
use formgram_core::TransportError;
use formgram_core::UserRef;
use formgram_transport::CallbackTransport;
use formgram_transport::ChannelTransport;
use formgram_transport::LogTransport;
use formgram_transport::MessageIdFactory;
use serde_json::Value;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn toggle_form() -> FormDefinition {
    FormDefinition::builder("prefs")
        .field(FieldSpec::boolean("mail").label("Mail"))
        .on_submit(|_, _| {})
        .build()
        .unwrap()
}

fn press(message: &MessageRef, text: &str, keyboard: &Keyboard, button: &str) -> InboundEvent {
    let payload =
        keyboard.buttons().find(|candidate| candidate.text == button).unwrap().payload.clone();
    InboundEvent::Callback(CallbackEvent {
        callback_id: "cb-1".to_string(),
        user: UserRef::new("user-1"),
        message: MessageSnapshot::new(message.clone(), text, Some(keyboard)),
        payload,
    })
}

fn sent_parts(command: &TransportCommand) -> (MessageRef, String, Keyboard) {
    let TransportCommand::Send {
        message,
        text,
        keyboard,
        ..
    } = command
    else {
        panic!("expected a send command, got {command:?}");
    };
    (message.clone(), text.clone(), keyboard.clone().unwrap())
}

// ============================================================================
// SECTION: Callback Transport
// ============================================================================

#[test]
fn callback_transport_sees_every_command() {
    let seen: Arc<Mutex<Vec<TransportCommand>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let transport = CallbackTransport::new(move |command| {
        sink.lock().unwrap().push(command.clone());
        Ok(())
    });
    let controller = FormController::new(toggle_form(), transport);

    let message = controller.send_form(&ChatId::new("9")).unwrap();
    assert_eq!(message, MessageRef::new("9", "callback-1"));

    let (message, text, keyboard) = sent_parts(&seen.lock().unwrap()[0]);
    let report = controller.handle_event(&press(&message, &text, &keyboard, "Mail: ")).unwrap();
    assert!(matches!(report.outcome, DispatchOutcome::Rendered { edited: true, .. }));

    let commands = seen.lock().unwrap().clone();
    let labels: Vec<&str> = commands.iter().map(TransportCommand::label).collect();
    assert_eq!(labels, vec!["send", "edit"]);
    let TransportCommand::Edit {
        text,
        ..
    } = &commands[1]
    else {
        panic!("expected an edit command");
    };
    assert_eq!(text, "Mail: ✅");
}

#[test]
fn callback_errors_abort_the_dispatch() {
    let transport = CallbackTransport::new(|command| match command {
        TransportCommand::Send {
            ..
        } => Ok(()),
        _ => Err(TransportError::Failed("rate limited".to_string())),
    });
    let controller = FormController::new(toggle_form(), transport);
    let message = controller.send_form(&ChatId::new("1")).unwrap();
    let keyboard = formgram_core::build_keyboard(
        controller.definition(),
        &controller.definition().initial_state(),
    );
    let event = press(&message, "Mail: ", &keyboard, "Mail: ");

    let err = controller.handle_event(&event).unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Dispatch(DispatchError::Transport(TransportError::Failed(_)))
    ));
}

#[test]
fn custom_id_factories_prefix_message_ids() {
    let transport = CallbackTransport::with_ids(|_| Ok(()), MessageIdFactory::new("bot"));
    let chat = ChatId::new("1");
    assert_eq!(transport.send_message(&chat, "a", None).unwrap().message_id, "bot-1");
    assert_eq!(transport.send_message(&chat, "b", None).unwrap().message_id, "bot-2");
}

// ============================================================================
// SECTION: Channel Transport
// ============================================================================

#[tokio::test]
async fn channel_transport_queues_commands_in_order() {
    let (tx, mut rx) = mpsc::channel(8);
    let controller = FormController::new(toggle_form(), ChannelTransport::new(tx));
    let message = controller.send_form(&ChatId::new("5")).unwrap();
    assert_eq!(message.message_id, "channel-1");

    let sent = rx.recv().await.unwrap();
    let (message, text, keyboard) = sent_parts(&sent);
    controller.handle_event(&press(&message, &text, &keyboard, "OK")).unwrap();

    let removed = rx.recv().await.unwrap();
    assert_eq!(
        removed,
        TransportCommand::RemoveKeyboard {
            message
        }
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn channel_transport_reports_full_and_closed_queues() {
    let (tx, rx) = mpsc::channel(1);
    let transport = ChannelTransport::new(tx);
    let chat = ChatId::new("5");

    transport.send_message(&chat, "first", None).unwrap();
    let err = transport.send_message(&chat, "second", None).unwrap_err();
    assert_eq!(err, TransportError::Failed("command channel full".to_string()));

    drop(rx);
    let err = transport.remove_keyboard(&MessageRef::new("5", "channel-1")).unwrap_err();
    assert_eq!(err, TransportError::Closed);
}

// ============================================================================
// SECTION: Log Transport
// ============================================================================

#[test]
fn log_transport_writes_one_json_line_per_call() {
    let transport = LogTransport::new(Vec::new());
    let chat = ChatId::new("3");
    let message = transport.send_message(&chat, "Mail: ", None).unwrap();
    transport.edit_message(&message, "Mail: ✅", None).unwrap();
    transport.remove_keyboard(&message).unwrap();

    let bytes = transport.into_inner().unwrap();
    let lines: Vec<Value> = String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["command"], "send");
    assert_eq!(lines[0]["message"]["message_id"], "log-1");
    assert_eq!(lines[1]["command"], "edit");
    assert_eq!(lines[1]["text"], "Mail: ✅");
    assert_eq!(lines[2]["command"], "remove_keyboard");

    let replayed: TransportCommand = serde_json::from_value(lines[1].clone()).unwrap();
    assert_eq!(replayed.message(), &message);
}
