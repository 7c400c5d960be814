//! Per-document runtime reacting to form events.
//!
//! Lifecycle: [`FormController::initialize`] scans every donation form and applies all known
//! conditions; only then are events handled. Events arrive either directly through
//! [`FormController::handle`] or from the event bus queue via [`FormListener::run`], and are
//! processed one at a time, each to completion.
use crate::engine::{FieldVisibility, apply_dependents, apply_form};
use crate::error::{VisibilityError, VisibilityErrorExt};
use crate::model::{Document, DonationForm, FormRow, InputKind};
use crate::state::VisibilityState;
use dhub_domain::config::VisibilityConfig;
use dhub_event_bus::{EventBus, EventReceiverExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// How a field's value changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldChange {
    /// New value of a text-like input or select.
    Value(String),
    /// Radio selection: the radio with this value becomes checked, its siblings unchecked.
    Select(String),
    /// Checkbox with this value toggled.
    Toggle { value: String, checked: bool },
}

/// Events a donation page emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormEvent {
    /// A field changed inside the form whose `id` attribute is `form`.
    #[serde(rename_all = "camelCase")]
    FieldChanged { form: String, field: String, change: FieldChange },
    /// The donor switched gateways and the gateway's fields were re-rendered.
    #[serde(rename_all = "camelCase")]
    GatewayLoaded {
        form_id_attribute: String,
        #[serde(default)]
        rows: Vec<FormRow>,
    },
}

/// Owns a document and keeps its conditional fields in sync.
#[derive(Debug)]
pub struct FormController {
    document: Document,
    state: VisibilityState,
    config: VisibilityConfig,
    live: bool,
}

impl FormController {
    #[must_use]
    pub fn new(document: Document, config: VisibilityConfig) -> Self {
        Self { document, state: VisibilityState::new(), config, live: false }
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.document
    }

    #[must_use]
    pub const fn state(&self) -> &VisibilityState {
        &self.state
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    /// Scans all donation forms, then applies every known form, then goes live.
    ///
    /// A form whose scan fails is logged and left out; the others proceed.
    pub fn initialize(&mut self) -> Vec<FieldVisibility> {
        let form_class = self.config.form_class.as_str();
        for form in self.document.forms.iter().filter(|f| f.has_class(form_class)) {
            if let Err(err) = self.state.rebuild(form) {
                warn!(
                    form = ?form.unique_id(),
                    error = %err,
                    "Skipping form with malformed conditions"
                );
            }
        }

        let mut applied = Vec::new();
        for unique_id in self.state.form_ids() {
            let Some(watched) = self.state.get(unique_id) else { continue };
            if let Some(form) = self.document.form_by_unique_id_mut(unique_id, form_class) {
                applied.extend(apply_form(form, watched, &self.config));
            }
        }

        self.live = true;
        info!(forms = self.state.len(), fields = applied.len(), "Form visibility initialized");
        applied
    }

    /// Handles one event and returns the fields it touched.
    ///
    /// Events before [`initialize`](Self::initialize) are ignored.
    ///
    /// # Errors
    /// [`VisibilityError::FormNotFound`] when a gateway-loaded event names an unknown form, or
    /// the scan error of the reloaded form. Field-level failures are logged, not returned.
    pub fn handle(&mut self, event: &FormEvent) -> Result<Vec<FieldVisibility>, VisibilityError> {
        if !self.live {
            trace!(?event, "Controller not initialized; event ignored");
            return Ok(Vec::new());
        }

        match event {
            FormEvent::FieldChanged { form, field, change } => {
                Ok(self.apply_change(form, field, change))
            },
            FormEvent::GatewayLoaded { form_id_attribute, rows } => {
                self.gateway_loaded(form_id_attribute, rows.clone())
            },
        }
    }

    /// Records `change` on the form and re-evaluates the fields `field` controls.
    ///
    /// Changes outside a donation form, and changes to fields nothing depends on, only update
    /// the input values.
    pub fn apply_change(
        &mut self,
        form_element_id: &str,
        field: &str,
        change: &FieldChange,
    ) -> Vec<FieldVisibility> {
        let form_class = self.config.form_class.as_str();
        let Some(form) = self
            .document
            .form_by_element_id_mut(form_element_id)
            .filter(|form| form.has_class(form_class))
        else {
            debug!(form = form_element_id, field, "Change outside a donation form");
            return Vec::new();
        };

        record_change(form, field, change);

        let dependents = form
            .unique_id()
            .and_then(|unique_id| self.state.get(unique_id))
            .and_then(|watched| watched.dependents_of(field));
        let Some(dependents) = dependents else {
            trace!(form = form_element_id, field, "Field controls nothing");
            return Vec::new();
        };

        apply_dependents(form, dependents, &self.config)
    }

    fn gateway_loaded(
        &mut self,
        form_id_attribute: &str,
        rows: Vec<FormRow>,
    ) -> Result<Vec<FieldVisibility>, VisibilityError> {
        let form = self.document.form_by_element_id_mut(form_id_attribute).ok_or_else(|| {
            VisibilityError::FormNotFound {
                message: format!("no form with id {form_id_attribute}").into(),
                context: Some("gateway loaded".into()),
            }
        })?;

        form.replace_gateway_rows(rows);
        self.state.rebuild(form)?;

        let Some(watched) = form.unique_id().and_then(|unique_id| self.state.get(unique_id))
        else {
            return Ok(Vec::new());
        };

        debug!(form = form_id_attribute, "Gateway fields reloaded");
        Ok(apply_form(form, watched, &self.config))
    }

    /// Initializes the controller and takes the [`FormEvent`] queue of `bus`.
    ///
    /// The initial visibility pass is not broadcast; the listener keeps it for
    /// [`FormListener::initial_changes`].
    ///
    /// # Errors
    /// [`VisibilityError::EventBus`] if the queue cannot be taken (e.g. another listener owns
    /// it).
    pub fn listen(mut self, bus: &EventBus) -> Result<FormListener, VisibilityError> {
        let receiver = bus
            .subscribe_queue::<FormEvent>(self.config.event_capacity)
            .context("form events")?;
        let initial = self.initialize();
        Ok(FormListener { controller: self, initial, receiver, bus: bus.clone() })
    }
}

fn record_change(form: &mut DonationForm, field: &str, change: &FieldChange) {
    for input in form.inputs_named_mut(field) {
        match (change, input.kind) {
            (FieldChange::Select(value), InputKind::Radio) => input.checked = input.value == *value,
            (FieldChange::Toggle { value, checked }, InputKind::Checkbox) => {
                if input.value == *value {
                    input.checked = *checked;
                }
            },
            (FieldChange::Value(value) | FieldChange::Select(value), kind)
                if !kind.is_checkable() =>
            {
                input.value.clone_from(value);
            },
            _ => {},
        }
    }
}

/// A live controller bound to the event bus queue.
#[derive(Debug)]
pub struct FormListener {
    controller: FormController,
    initial: Vec<FieldVisibility>,
    receiver: mpsc::Receiver<Arc<FormEvent>>,
    bus: EventBus,
}

impl FormListener {
    #[must_use]
    pub const fn controller(&self) -> &FormController {
        &self.controller
    }

    /// Fields applied by the initialization pass that ran when the listener was created.
    #[must_use]
    pub fn initial_changes(&self) -> &[FieldVisibility] {
        &self.initial
    }

    /// Handles queued events until the queue closes, then hands the controller back.
    ///
    /// Every change caused by a queued event is broadcast on the bus. Slow subscribers lag
    /// behind the broadcast capacity; use [`run_with`](Self::run_with) to observe every change.
    pub async fn run(self) -> FormController {
        let bus = self.bus.clone();
        self.run_with(|change| {
            if let Err(err) = bus.publish(change) {
                warn!(error = %err, "Visibility change not published");
            }
        })
        .await
    }

    /// Handles queued events until the queue closes, handing each resulting change to
    /// `on_change` in order. Event failures are logged.
    pub async fn run_with<F>(mut self, mut on_change: F) -> FormController
    where
        F: FnMut(FieldVisibility),
    {
        while let Some(event) = self.receiver.next_event().await {
            match self.controller.handle(&event) {
                Ok(changes) => changes.into_iter().for_each(&mut on_change),
                Err(err) => warn!(error = %err, "Form event failed"),
            }
        }

        debug!("Form event queue closed");
        self.controller
    }
}
