// crates/formgram-config/src/config.rs
// ============================================================================
// Module: Formgram Configuration
// Description: Configuration loading and validation for formgram hosts.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: formgram-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing sections fall back to [`FormSettings::default`]; invalid values
//! fail closed before any form is built from them.
//!
//! The `[form]` separator and missing value shape every persisted message.
//! Changing them makes forms already sent unreadable by the new process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use formgram_core::DEFAULT_FALSE_REPR;
use formgram_core::DEFAULT_PAYLOAD_MAX_BYTES;
use formgram_core::DEFAULT_TRUE_REPR;
use formgram_core::FieldKind;
use formgram_core::FileAuditSink;
use formgram_core::FormAuditSink;
use formgram_core::FormSettings;
use formgram_core::MAX_PAYLOAD_MAX_BYTES;
use formgram_core::MIN_PAYLOAD_MAX_BYTES;
use formgram_core::NoopAuditSink;
use formgram_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "formgram.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "FORMGRAM_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a configured presentation string.
pub(crate) const MAX_FORM_STRING_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Formgram host configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormgramConfig {
    /// Form presentation settings.
    #[serde(default)]
    pub form: FormConfig,
    /// Button payload limits.
    #[serde(default)]
    pub payload: PayloadConfig,
    /// Audit sink selection.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl FormgramConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then `FORMGRAM_CONFIG`, then
    /// `formgram.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.form.validate()?;
        self.payload.validate()?;
        self.audit.validate()?;
        if let Some(violation) = self.form_settings().violation() {
            return Err(ConfigError::Invalid(format!("form: {violation}")));
        }
        Ok(())
    }

    /// Returns the form settings described by this configuration.
    #[must_use]
    pub fn form_settings(&self) -> FormSettings {
        let form = &self.form;
        FormSettings {
            separator: form.separator.clone(),
            missing_value: form.missing_value.clone(),
            ok_label: form.ok_label.clone(),
            cancel_label: form.cancel_label.clone(),
            edit_prompt: form.edit_prompt.clone(),
            invalid_value_message: form.invalid_value_message.clone(),
            clear_label: form.clear_label.clone(),
            cancel_edit_label: form.cancel_edit_label.clone(),
            edit_icon: form.edit_icon.clone(),
            required_icon: form.required_icon.clone(),
            previous_icon: form.previous_icon.clone(),
            next_icon: form.next_icon.clone(),
            payload_max_bytes: self.payload.max_bytes,
        }
    }

    /// Returns the boolean field kind using the configured representations.
    #[must_use]
    pub fn boolean_kind(&self) -> FieldKind {
        FieldKind::Boolean {
            true_repr: self.form.true_repr.clone(),
            false_repr: self.form.false_repr.clone(),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened and
    /// [`ConfigError::Invalid`] when the file sink has no path.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn FormAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let Some(path) = self.audit.path.as_deref() else {
                    return Err(ConfigError::Invalid(
                        "audit.path is required for the file sink".to_string(),
                    ));
                };
                let sink = FileAuditSink::new(Path::new(path.trim()))
                    .map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

/// Form presentation configuration (`[form]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FormConfig {
    /// String inserted between a label and its value.
    pub separator: String,
    /// String rendered for a missing value.
    pub missing_value: String,
    /// Label of the submit button.
    pub ok_label: String,
    /// Label of the cancel button.
    pub cancel_label: String,
    /// Prompt prefix shown while a field awaits text input.
    pub edit_prompt: String,
    /// Prefix of the notice sent when text input fails to parse.
    pub invalid_value_message: String,
    /// Label of the clear button shown during editing.
    pub clear_label: String,
    /// Label of the cancel-edit button.
    pub cancel_edit_label: String,
    /// Icon on edit buttons.
    pub edit_icon: String,
    /// Icon on edit buttons of required fields with a missing value.
    pub required_icon: String,
    /// Icon on previous-option buttons.
    pub previous_icon: String,
    /// Icon on next-option buttons.
    pub next_icon: String,
    /// Display string for a `true` boolean value.
    pub true_repr: String,
    /// Display string for a `false` boolean value.
    pub false_repr: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        let settings = FormSettings::default();
        Self {
            separator: settings.separator,
            missing_value: settings.missing_value,
            ok_label: settings.ok_label,
            cancel_label: settings.cancel_label,
            edit_prompt: settings.edit_prompt,
            invalid_value_message: settings.invalid_value_message,
            clear_label: settings.clear_label,
            cancel_edit_label: settings.cancel_edit_label,
            edit_icon: settings.edit_icon,
            required_icon: settings.required_icon,
            previous_icon: settings.previous_icon,
            next_icon: settings.next_icon,
            true_repr: DEFAULT_TRUE_REPR.to_string(),
            false_repr: DEFAULT_FALSE_REPR.to_string(),
        }
    }
}

impl FormConfig {
    /// Validates form presentation configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        let strings = [
            ("separator", &self.separator),
            ("missing_value", &self.missing_value),
            ("ok_label", &self.ok_label),
            ("cancel_label", &self.cancel_label),
            ("edit_prompt", &self.edit_prompt),
            ("invalid_value_message", &self.invalid_value_message),
            ("clear_label", &self.clear_label),
            ("cancel_edit_label", &self.cancel_edit_label),
            ("edit_icon", &self.edit_icon),
            ("required_icon", &self.required_icon),
            ("previous_icon", &self.previous_icon),
            ("next_icon", &self.next_icon),
            ("true_repr", &self.true_repr),
            ("false_repr", &self.false_repr),
        ];
        for (name, value) in strings {
            if value.len() > MAX_FORM_STRING_LENGTH {
                return Err(ConfigError::Invalid(format!("form.{name} exceeds max length")));
            }
            if value.contains(['\n', '\r']) {
                return Err(ConfigError::Invalid(format!("form.{name} must be a single line")));
            }
        }
        for (name, repr) in [("true_repr", &self.true_repr), ("false_repr", &self.false_repr)] {
            if repr.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("form.{name} must be non-empty")));
            }
            if *repr == self.missing_value {
                return Err(ConfigError::Invalid(format!(
                    "form.{name} must differ from form.missing_value"
                )));
            }
        }
        if self.true_repr == self.false_repr {
            return Err(ConfigError::Invalid(
                "form.true_repr and form.false_repr must differ".to_string(),
            ));
        }
        Ok(())
    }
}

/// Button payload configuration (`[payload]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayloadConfig {
    /// Maximum encoded payload length in bytes.
    #[serde(default = "default_payload_max_bytes")]
    pub max_bytes: usize,
}

impl Default for PayloadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_payload_max_bytes(),
        }
    }
}

impl PayloadConfig {
    /// Validates payload configuration.
    fn validate(self) -> Result<(), ConfigError> {
        if !(MIN_PAYLOAD_MAX_BYTES ..= MAX_PAYLOAD_MAX_BYTES).contains(&self.max_bytes) {
            return Err(ConfigError::Invalid("payload.max_bytes out of range".to_string()));
        }
        Ok(())
    }
}

/// Audit sink configuration (`[audit]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// File path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }
}

/// Supported audit sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default payload ceiling.
const fn default_payload_max_bytes() -> usize {
    DEFAULT_PAYLOAD_MAX_BYTES
}

// ============================================================================
// SECTION: Tests
// ============================================================================
