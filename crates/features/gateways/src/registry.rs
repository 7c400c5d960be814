use crate::contract::{GatewayClass, PaymentGateway};
use crate::error::{GatewayError, GatewayErrorExt};
use crate::legacy::LegacyGatewayBridge;
use dhub_domain::gateway::GatewayId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Directory of registered gateway classes, keyed by gateway id.
///
/// Owned by application startup and passed around by reference. Every successful
/// registration is forwarded to the legacy bridge.
pub struct GatewayRegistry {
    gateways: BTreeMap<GatewayId, GatewayClass>,
    bridge: Arc<dyn LegacyGatewayBridge>,
}

impl GatewayRegistry {
    #[must_use]
    pub fn new(bridge: Arc<dyn LegacyGatewayBridge>) -> Self {
        Self { gateways: BTreeMap::new(), bridge }
    }

    /// Registers a gateway class and connects it to the legacy bridge.
    ///
    /// The registry is not transactional: when the bridge fails, the error is returned but the
    /// gateway stays registered.
    ///
    /// # Errors
    /// * [`GatewayError::InvalidArgument`] if the class reports a malformed id.
    /// * [`GatewayError::Overflow`] if the id is already registered.
    /// * [`GatewayError::Bridge`] if the legacy bridge rejects the gateway.
    pub fn register(&mut self, class: GatewayClass) -> Result<GatewayId, GatewayError> {
        class.validate()?;

        let id = class.id().clone();
        if self.gateways.contains_key(&id) {
            return Err(GatewayError::Overflow {
                message: format!("Cannot register a gateway with an id that already exists: {id}")
                    .into(),
                context: None,
            });
        }

        self.gateways.insert(id.clone(), class.clone());
        info!(gateway_id = %id, gateway = class.type_name(), "Payment gateway registered");

        if let Err(err) = self.bridge.connect(&class).context(format!("gateway {id}")) {
            warn!(gateway_id = %id, error = %err, "Legacy bridge rejected registered gateway");
            return Err(err);
        }

        Ok(id)
    }

    /// Typed shorthand for [`register`](Self::register).
    ///
    /// # Errors
    /// See [`register`](Self::register).
    pub fn register_gateway<G: PaymentGateway>(&mut self) -> Result<GatewayId, GatewayError> {
        self.register(GatewayClass::of::<G>())
    }

    /// Removes the gateway if present. The legacy list is left as is.
    pub fn unregister(&mut self, id: &str) {
        if self.gateways.remove(id).is_some() {
            debug!(gateway_id = id, "Payment gateway unregistered");
        }
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.gateways.contains_key(id)
    }

    /// # Errors
    /// [`GatewayError::Lookup`] if no gateway is registered under `id`.
    pub fn get(&self, id: &str) -> Result<&GatewayClass, GatewayError> {
        self.gateways.get(id).ok_or_else(|| GatewayError::not_found(id))
    }

    /// Snapshot of all registrations. Changing it never affects the registry.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<GatewayId, GatewayClass> {
        self.gateways.clone()
    }

    /// Registered ids in sorted order.
    #[must_use]
    pub fn ids(&self) -> Vec<GatewayId> {
        self.gateways.keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}

impl fmt::Debug for GatewayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayRegistry")
            .field("gateways", &self.gateways.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
