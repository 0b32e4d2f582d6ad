//! Config load validation tests for formgram-config.
// crates/formgram-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding, syntax).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::path::Path;

use formgram_config::AuditSinkKind;
use formgram_config::ConfigError;
use formgram_config::FormgramConfig;
use formgram_config::config_toml_example;

mod common;

type TestResult = Result<(), String>;

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    common::assert_invalid(
        FormgramConfig::load(Some(Path::new(&long_path))),
        "config path exceeds max length",
    )
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    common::assert_invalid(
        FormgramConfig::load(Some(Path::new(&long_component))),
        "config path component too long",
    )
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    match FormgramConfig::load(Some(&path)) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(err) => Err(format!("expected io error, got {err}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = common::write_config(&vec![b'#'; 64 * 1024 + 1])?;
    common::assert_invalid(FormgramConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = common::write_config(&[0xFF, 0xFE, 0xFF])?;
    common::assert_invalid(FormgramConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_reports_syntax_errors_as_parse_errors() -> TestResult {
    let file = common::write_config(b"[form\nseparator = 1")?;
    match FormgramConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn load_rejects_unknown_sink() -> TestResult {
    let file = common::write_config(b"[audit]\nsink = \"syslog\"\n")?;
    match FormgramConfig::load(Some(file.path())) {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(err) => Err(format!("expected parse error, got {err}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn load_accepts_empty_file_with_defaults() -> TestResult {
    let file = common::write_config(b"")?;
    let config = FormgramConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.payload.max_bytes != 64 {
        return Err(format!("unexpected payload ceiling {}", config.payload.max_bytes));
    }
    if config.audit.sink != AuditSinkKind::None {
        return Err("default audit sink should be none".to_string());
    }
    Ok(())
}

#[test]
fn load_runs_validation_after_parse() -> TestResult {
    let file = common::write_config(b"[payload]\nmax_bytes = 8\n")?;
    common::assert_invalid(FormgramConfig::load(Some(file.path())), "payload.max_bytes out of range")
}

#[test]
fn example_config_loads_and_validates() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("formgram.toml");
    let example = config_toml_example().replace(
        "path = \"formgram-audit.log\"",
        &format!("path = '{}'", dir.path().join("audit.log").display()),
    );
    std::fs::write(&path, example).map_err(|err| err.to_string())?;
    let config = FormgramConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.audit.sink != AuditSinkKind::File {
        return Err("example should select the file sink".to_string());
    }
    config.build_audit_sink().map_err(|err| err.to_string())?;
    if !dir.path().join("audit.log").exists() {
        return Err("file sink should create the audit log".to_string());
    }
    Ok(())
}
