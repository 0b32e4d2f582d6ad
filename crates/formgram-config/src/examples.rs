// crates/formgram-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `formgram.toml`. Every key is spelled out with its
//! default value except where noted, so the example doubles as reference.

/// Returns a canonical example `formgram.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[form]
separator = ": "
missing_value = ""
ok_label = "OK"
cancel_label = "Cancel"
edit_prompt = "Send a new value for"
invalid_value_message = "Invalid value for"
clear_label = "Clear"
cancel_edit_label = "Cancel edit"
edit_icon = "✏️"
required_icon = "💢"
previous_icon = "◀"
next_icon = "▶"
true_repr = "✅"
false_repr = "❌"

[payload]
max_bytes = 64

[audit]
sink = "file"
path = "formgram-audit.log"
"#,
    )
}
