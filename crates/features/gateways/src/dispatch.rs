use crate::contract::PaymentGateway;
use crate::error::{GatewayError, GatewayErrorExt};
use crate::registry::GatewayRegistry;
use dhub_domain::donation::{DonationFormData, DonationId, SubscriptionId};
use dhub_domain::gateway::{GatewayId, GatewayOutcome};
use dhub_kernel::container::Container;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A donation ready to be handed to its gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub donation_id: DonationId,
    /// Required when `form_data` carries a subscription plan.
    #[serde(default)]
    pub subscription_id: Option<SubscriptionId>,
    pub form_data: DonationFormData,
}

/// Routes payment requests to registered gateways.
///
/// Gateway instances are built on first use and reused for the dispatcher's lifetime.
#[derive(Debug)]
pub struct PaymentDispatcher<'a> {
    registry: &'a GatewayRegistry,
    container: Container,
    instances: FxHashMap<GatewayId, Arc<dyn PaymentGateway>>,
}

impl<'a> PaymentDispatcher<'a> {
    #[must_use]
    pub fn new(registry: &'a GatewayRegistry, container: Container) -> Self {
        Self { registry, container, instances: FxHashMap::default() }
    }

    /// Returns the cached instance for `id`, building it on first use.
    ///
    /// # Errors
    /// [`GatewayError::Lookup`] for unregistered ids, or the gateway's build error.
    pub fn gateway(&mut self, id: &str) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        if let Some(gateway) = self.instances.get(id) {
            return Ok(Arc::clone(gateway));
        }

        let class = self.registry.get(id)?;
        let gateway = class.instantiate(&self.container).context(format!("building {id}"))?;
        debug!(gateway_id = id, "Gateway instantiated");

        self.instances.insert(class.id().clone(), Arc::clone(&gateway));
        Ok(gateway)
    }

    /// Runs the donation through the gateway.
    ///
    /// One-time donations go to [`PaymentGateway::create_payment`]. Recurring donations go to
    /// the subscription module only, which takes the first charge as part of setting up the
    /// subscription. The gateway must have a module mounted and the request must carry a
    /// subscription id; both are checked before any money moves.
    ///
    /// # Errors
    /// * [`GatewayError::Lookup`] for unregistered ids.
    /// * [`GatewayError::SubscriptionUnsupported`] for recurring donations on gateways without
    ///   a subscription module.
    /// * [`GatewayError::InvalidArgument`] for recurring donations without subscription id.
    /// * Anything the gateway or its module reports.
    #[instrument(skip_all, fields(gateway_id = id, donation_id = %request.donation_id))]
    pub fn dispatch(
        &mut self,
        id: &str,
        request: &PaymentRequest,
    ) -> Result<GatewayOutcome, GatewayError> {
        let gateway = self.gateway(id)?;
        let form_data = &request.form_data;

        let outcome = if form_data.is_recurring() {
            if !gateway.has_subscription_module() {
                return Err(GatewayError::SubscriptionUnsupported {
                    message: format!("gateway {id} cannot process recurring donations").into(),
                    context: None,
                });
            }
            let subscription_id =
                request.subscription_id.ok_or_else(|| GatewayError::InvalidArgument {
                    message: "recurring donation without subscription id".into(),
                    context: None,
                })?;
            gateway.handle_subscription_request(request.donation_id, subscription_id, form_data)?
        } else {
            gateway.create_payment(request.donation_id, form_data)?
        };

        info!(complete = outcome.is_complete(), "Donation dispatched");
        Ok(outcome)
    }
}
