//! Gateways shipped with the platform.
use crate::contract::{
    GatewayClass, ModuleRef, PaymentGateway, SubscriptionModule, SubscriptionSlot,
};
use crate::error::GatewayError;
use dhub_domain::config::GatewaysConfig;
use dhub_domain::constants::{MANUAL_GATEWAY, OFFLINE_GATEWAY};
use dhub_domain::donation::{DonationFormData, DonationId, SubscriptionId};
use dhub_domain::gateway::{GatewayId, GatewayOutcome};
use dhub_kernel::container::{Container, ServiceRef};
use dhub_kernel::safe_nanoid;
use std::sync::Arc;
use tracing::debug;

/// Reference to the gateway settings bound by [`bind_services`].
#[must_use]
pub fn gateways_config_ref() -> ServiceRef<GatewaysConfig> {
    ServiceRef::of::<GatewaysConfig>()
}

/// Binds the services the built-in gateways resolve at build time.
pub fn bind_services(container: &Container, config: &GatewaysConfig) {
    container.instance::<GatewaysConfig, GatewaysConfig>(Arc::new(config.clone()));
    container.instance::<dyn SubscriptionModule, ManualSubscriptionModule>(Arc::new(
        ManualSubscriptionModule,
    ));
}

/// Class of a built-in gateway by id.
#[must_use]
pub fn builtin_class(id: &str) -> Option<GatewayClass> {
    match id {
        MANUAL_GATEWAY => Some(GatewayClass::of::<ManualGateway>()),
        OFFLINE_GATEWAY => Some(GatewayClass::of::<OfflineGateway>()),
        _ => None,
    }
}

fn require_positive_amount(form_data: &DonationFormData) -> Result<(), GatewayError> {
    if form_data.amount > 0 {
        return Ok(());
    }
    Err(GatewayError::Payment {
        message: format!("donation amount must be positive, got {}", form_data.amount).into(),
        context: None,
    })
}

/// Test gateway: every donation completes immediately.
#[derive(Debug)]
pub struct ManualGateway {
    subscriptions: SubscriptionSlot,
}

impl PaymentGateway for ManualGateway {
    fn id() -> GatewayId {
        GatewayId::from_static(MANUAL_GATEWAY)
    }

    fn name() -> &'static str {
        "Test Donation"
    }

    fn payment_method_label() -> &'static str {
        "Test Donation"
    }

    fn build(container: &Container) -> Result<Self, GatewayError> {
        let mut gateway = Self { subscriptions: SubscriptionSlot::new(container) };
        gateway.mount_subscription_module(ModuleRef::of::<ManualSubscriptionModule>());
        Ok(gateway)
    }

    fn create_payment(
        &self,
        donation_id: DonationId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError> {
        require_positive_amount(form_data)?;
        debug!(%donation_id, amount = form_data.amount, "Manual payment completed");
        Ok(GatewayOutcome::PaymentComplete { transaction_id: safe_nanoid!(20) })
    }

    fn subscription_slot(&self) -> &SubscriptionSlot {
        &self.subscriptions
    }

    fn subscription_slot_mut(&mut self) -> &mut SubscriptionSlot {
        &mut self.subscriptions
    }
}

/// Completes manual-gateway subscriptions without talking to a processor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualSubscriptionModule;

impl SubscriptionModule for ManualSubscriptionModule {
    fn handle_subscription_request(
        &self,
        donation_id: DonationId,
        subscription_id: SubscriptionId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError> {
        require_positive_amount(form_data)?;
        debug!(%donation_id, %subscription_id, "Manual subscription completed");
        Ok(GatewayOutcome::SubscriptionComplete {
            transaction_id: safe_nanoid!(20),
            subscription_reference: format!("{MANUAL_GATEWAY}-{subscription_id}"),
        })
    }
}

/// Check or bank transfer: the donation waits for the money to arrive.
#[derive(Debug)]
pub struct OfflineGateway {
    instructions: String,
    subscriptions: SubscriptionSlot,
}

impl PaymentGateway for OfflineGateway {
    fn id() -> GatewayId {
        GatewayId::from_static(OFFLINE_GATEWAY)
    }

    fn name() -> &'static str {
        "Offline Donation"
    }

    fn payment_method_label() -> &'static str {
        "Offline Donation"
    }

    fn build(container: &Container) -> Result<Self, GatewayError> {
        let config = container.resolve(&gateways_config_ref())?;
        Ok(Self {
            instructions: config.offline_instructions.clone(),
            subscriptions: SubscriptionSlot::new(container),
        })
    }

    fn create_payment(
        &self,
        donation_id: DonationId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError> {
        require_positive_amount(form_data)?;
        debug!(%donation_id, "Offline donation awaiting payment");
        Ok(GatewayOutcome::PaymentProcessing { instructions: Some(self.instructions.clone()) })
    }

    fn subscription_slot(&self) -> &SubscriptionSlot {
        &self.subscriptions
    }

    fn subscription_slot_mut(&mut self) -> &mut SubscriptionSlot {
        &mut self.subscriptions
    }

    fn legacy_form_field_markup(&self, form_id: u64) -> Option<String> {
        Some(format!(
            "<div id=\"give_offline_payment_info-{form_id}\" class=\"give-offline-payment-info\">\
             <legend>Offline Donation Instructions</legend>{}</div>",
            self.instructions
        ))
    }
}
