use anyhow::{Context, Result};
use dhub::Platform;
use dhub::domain::gateway::GatewayId;
use dhub::gateways::legacy::LegacyGatewayLabels;
use dhub::visibility::model::Document;
use dhub::visibility::{FieldVisibility, FormEvent};
use serde::Serialize;
use tracing::debug;

/// One row of the `gateways` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEntry {
    pub id: GatewayId,
    pub name: &'static str,
    pub payment_method_label: &'static str,
    /// Absent when the legacy bridge never accepted the gateway.
    pub legacy: Option<LegacyGatewayLabels>,
}

#[must_use]
pub fn gateway_list(platform: &Platform) -> Vec<GatewayEntry> {
    let mut legacy = platform.legacy.gateways();

    platform
        .registry
        .get_all()
        .into_iter()
        .map(|(id, class)| GatewayEntry {
            legacy: legacy.remove(&id),
            name: class.name(),
            payment_method_label: class.payment_method_label(),
            id,
        })
        .collect()
}

/// Result of the `forms` command.
#[derive(Debug, Clone, Serialize)]
pub struct FormsReport {
    /// Visibility changes caused by the replayed events, in order.
    pub changes: Vec<FieldVisibility>,
    /// The document after initialization and every event.
    pub document: Document,
}

/// Initializes a form runtime over `document` and feeds it `events` through the event bus.
///
/// Events are queued before the runtime starts, so at most the bus's queue capacity fit.
/// Every change the events cause is reported, however many there are. The platform's event
/// bus is shut down afterwards.
///
/// # Errors
/// A full event queue, or a listener that cannot be attached.
pub async fn replay_forms(
    platform: &Platform,
    document: Document,
    events: Vec<FormEvent>,
) -> Result<FormsReport> {
    let bus = &platform.events;
    let total = events.len();
    for event in events {
        bus.publish_queue(event).with_context(|| format!("Queueing {total} form events"))?;
    }

    let listener = platform.form_controller(document).listen(bus)?;

    // Closing the queue lets the listener stop once the queued events are drained.
    let _ = bus.shutdown();

    let mut changes = Vec::new();
    let controller = listener.run_with(|change| changes.push(change)).await;

    debug!(events = total, changes = changes.len(), "Form events replayed");
    Ok(FormsReport { changes, document: controller.into_document() })
}
