//! Form and audit section validation tests for formgram-config.
// crates/formgram-config/tests/form_validation.rs
// =============================================================================
// Module: Form Config Validation Tests
// Description: Validate [form], [payload], and [audit] constraints.
// Purpose: Ensure configured settings always build a readable form.
// =============================================================================

use formgram_config::AuditSinkKind;
use formgram_config::FormgramConfig;
use formgram_core::FieldSpec;
use formgram_core::FieldValue;
use formgram_core::FormDefinition;
use formgram_core::render_body;

mod common;

type TestResult = Result<(), String>;

fn parse(toml_str: &str) -> Result<FormgramConfig, String> {
    common::config_from_toml(toml_str).map_err(|err| err.to_string())
}

#[test]
fn empty_separator_is_rejected() -> TestResult {
    let config = parse("[form]\nseparator = \"\"\n")?;
    common::assert_invalid(config.validate(), "separator must not be empty")
}

#[test]
fn multi_line_strings_are_rejected() -> TestResult {
    let config = parse("[form]\nok_label = \"O\\nK\"\n")?;
    common::assert_invalid(config.validate(), "form.ok_label must be a single line")
}

#[test]
fn missing_value_must_not_contain_separator() -> TestResult {
    let config = parse("[form]\nmissing_value = \"n: a\"\n")?;
    common::assert_invalid(config.validate(), "missing_value must not contain the separator")
}

#[test]
fn boolean_representations_must_be_distinct() -> TestResult {
    let config = parse("[form]\ntrue_repr = \"yes\"\nfalse_repr = \"yes\"\n")?;
    common::assert_invalid(config.validate(), "must differ")?;

    let config = parse("[form]\nmissing_value = \"-\"\nfalse_repr = \"-\"\n")?;
    common::assert_invalid(config.validate(), "form.false_repr must differ from form.missing_value")
}

#[test]
fn payload_ceiling_bounds_are_enforced() -> TestResult {
    for (value, valid) in [(15, false), (16, true), (256, true), (257, false)] {
        let config = parse(&format!("[payload]\nmax_bytes = {value}\n"))?;
        if config.validate().is_ok() != valid {
            return Err(format!("max_bytes {value} validity should be {valid}"));
        }
    }
    Ok(())
}

#[test]
fn file_sink_requires_a_path() -> TestResult {
    let config = parse("[audit]\nsink = \"file\"\n")?;
    common::assert_invalid(config.validate(), "audit.path is required for the file sink")?;
    common::assert_invalid(config.build_audit_sink(), "audit.path is required for the file sink")?;

    let config = parse("[audit]\nsink = \"file\"\npath = \"  \"\n")?;
    common::assert_invalid(config.validate(), "audit.path must be non-empty")
}

#[test]
fn path_without_file_sink_is_rejected() -> TestResult {
    let config = parse("[audit]\nsink = \"stderr\"\npath = \"audit.log\"\n")?;
    if config.audit.sink != AuditSinkKind::Stderr {
        return Err("sink should parse as stderr".to_string());
    }
    common::assert_invalid(config.validate(), "audit.path is only valid for the file sink")
}

#[test]
fn configured_settings_shape_the_rendered_form() -> TestResult {
    let config = parse(
        "[form]\nseparator = \" = \"\nmissing_value = \"-\"\ntrue_repr = \"yes\"\nfalse_repr = \
         \"no\"\n\n[payload]\nmax_bytes = 128\n",
    )?;
    config.validate().map_err(|err| err.to_string())?;
    let settings = config.form_settings();
    if settings.payload_max_bytes != 128 {
        return Err("payload ceiling should come from [payload]".to_string());
    }

    let definition = FormDefinition::builder("prefs")
        .settings(settings)
        .field(FieldSpec::text("nick").label("Nick"))
        .field(
            FieldSpec::new("mail", config.boolean_kind())
                .label("Mail")
                .initial(FieldValue::Boolean(false)),
        )
        .on_submit(|_, _| {})
        .build()
        .map_err(|err| err.to_string())?;
    let body = render_body(&definition, &definition.initial_state());
    if body != "Nick = -\nMail = no" {
        return Err(format!("unexpected body {body}"));
    }
    Ok(())
}
