// crates/formgram-core/src/runtime/router.rs
// ============================================================================
// Module: Formgram Form Router
// Description: Routes inbound events to the controller of the matching form.
// Purpose: Let a host wire many forms into a single event callback.
// Dependencies: crate::{core, runtime}, thiserror
// ============================================================================

//! ## Overview
//! The router keys controllers by [`FormId`]. Button presses are routed by
//! the form id embedded in the pressed payload; text replies by the form id
//! of the payloads attached to the replied-to message. Events no registered
//! form claims are returned as `None` and never reach a controller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::event::InboundEvent;
use crate::core::identifiers::FormId;
use crate::core::payload::peek_form_id;
use crate::runtime::controller::ControllerError;
use crate::runtime::controller::FormEventHandler;
use crate::runtime::dispatch::DispatchReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Form router registration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// A controller for the form is already registered.
    #[error("form already registered: {0}")]
    DuplicateForm(FormId),
}

// ============================================================================
// SECTION: Form Router
// ============================================================================

/// Registry of form controllers keyed by form id.
#[derive(Default)]
pub struct FormRouter {
    /// Registered controllers.
    handlers: BTreeMap<FormId, Box<dyn FormEventHandler>>,
}

impl FormRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateForm`] when the form is already registered.
    pub fn register<H>(&mut self, handler: H) -> Result<(), RouterError>
    where
        H: FormEventHandler + 'static,
    {
        let form_id = handler.form_id().clone();
        if self.handlers.contains_key(&form_id) {
            return Err(RouterError::DuplicateForm(form_id));
        }
        self.handlers.insert(form_id, Box::new(handler));
        Ok(())
    }

    /// Returns the registered form ids in order.
    pub fn form_ids(&self) -> impl Iterator<Item = &FormId> {
        self.handlers.keys()
    }

    /// Returns the form an event belongs to, if any is recognizable.
    #[must_use]
    pub fn route(event: &InboundEvent) -> Option<FormId> {
        match event {
            InboundEvent::Callback(event) => peek_form_id(&event.payload),
            InboundEvent::Text(event) => event
                .reply_to
                .as_ref()
                .and_then(|snapshot| snapshot.payloads.iter().find_map(|payload| peek_form_id(payload))),
        }
    }

    /// Dispatches an event to the controller of its form.
    ///
    /// Returns `Ok(None)` when no registered form claims the event.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] when the controller fails.
    pub fn handle_event(
        &self,
        event: &InboundEvent,
    ) -> Result<Option<DispatchReport>, ControllerError> {
        let Some(handler) = Self::route(event).and_then(|form_id| self.handlers.get(&form_id)) else {
            return Ok(None);
        };
        handler.handle_event(event).map(Some)
    }
}
