// crates/formgram-config/src/lib.rs
// ============================================================================
// Module: Formgram Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for formgram.toml semantics.
// Dependencies: formgram-core, serde, toml
// ============================================================================

//! ## Overview
//! `formgram-config` defines the configuration model for hosts embedding the
//! formgram engine: form presentation strings, the payload ceiling, and the
//! audit sink. Loading is strict and fails closed; every section has in-code
//! defaults so an empty file is a valid configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
