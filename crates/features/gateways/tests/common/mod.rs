#![allow(dead_code, unreachable_pub)]

use dhub_domain::config::GatewaysConfig;
use dhub_domain::donation::{
    DonationFormData, DonationId, Donor, SubscriptionPeriod, SubscriptionPlan,
};
use dhub_domain::gateway::{GatewayId, GatewayOutcome};
use dhub_gateways::builtin::{ManualSubscriptionModule, bind_services};
use dhub_gateways::contract::{ModuleRef, SubscriptionSlot};
use dhub_gateways::legacy::LegacyGatewayBridge;
use dhub_gateways::{GatewayClass, GatewayError, PaymentGateway};
use dhub_kernel::container::{Container, ServiceRef};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bridge double recording connected ids, optionally failing every call.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub connected: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingBridge {
    pub fn failing() -> Self {
        Self { connected: Mutex::default(), fail: true }
    }

    pub fn connected(&self) -> Vec<String> {
        self.connected.lock().clone()
    }
}

impl LegacyGatewayBridge for RecordingBridge {
    fn connect(&self, class: &GatewayClass) -> Result<(), GatewayError> {
        if self.fail {
            return Err(GatewayError::Bridge {
                message: "legacy list is read-only".into(),
                context: None,
            });
        }
        self.connected.lock().push(class.id().to_string());
        Ok(())
    }
}

macro_rules! test_gateway {
    ($name:ident, $id:literal) => {
        #[derive(Debug)]
        pub struct $name {
            slot: SubscriptionSlot,
        }

        impl PaymentGateway for $name {
            fn id() -> GatewayId {
                GatewayId::from_static($id)
            }

            fn name() -> &'static str {
                stringify!($name)
            }

            fn payment_method_label() -> &'static str {
                $id
            }

            fn build(container: &Container) -> Result<Self, GatewayError> {
                Ok(Self { slot: SubscriptionSlot::new(container) })
            }

            fn create_payment(
                &self,
                donation_id: DonationId,
                _form_data: &DonationFormData,
            ) -> Result<GatewayOutcome, GatewayError> {
                Ok(GatewayOutcome::PaymentComplete {
                    transaction_id: format!("{}-{donation_id}", $id),
                })
            }

            fn subscription_slot(&self) -> &SubscriptionSlot {
                &self.slot
            }

            fn subscription_slot_mut(&mut self) -> &mut SubscriptionSlot {
                &mut self.slot
            }
        }
    };
}

test_gateway!(StripeGateway, "stripe");
test_gateway!(PaypalGateway, "paypal");
test_gateway!(ImpostorStripeGateway, "stripe");
test_gateway!(MalformedGateway, "pay pal");

/// One-time charges made by [`CountingGateway`], shared through the container.
#[derive(Debug, Default)]
pub struct ChargeCounter(AtomicUsize);

impl ChargeCounter {
    pub fn charges(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Gateway with the manual subscription module mounted that counts its one-time charges.
#[derive(Debug)]
pub struct CountingGateway {
    counter: Arc<ChargeCounter>,
    slot: SubscriptionSlot,
}

impl PaymentGateway for CountingGateway {
    fn id() -> GatewayId {
        GatewayId::from_static("counting")
    }

    fn name() -> &'static str {
        "Counting"
    }

    fn payment_method_label() -> &'static str {
        "counting"
    }

    fn build(container: &Container) -> Result<Self, GatewayError> {
        let counter = container.resolve(&ServiceRef::<ChargeCounter>::of::<ChargeCounter>())?;
        let mut gateway = Self { counter, slot: SubscriptionSlot::new(container) };
        gateway.mount_subscription_module(ModuleRef::of::<ManualSubscriptionModule>());
        Ok(gateway)
    }

    fn create_payment(
        &self,
        _donation_id: DonationId,
        _form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.counter.0.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOutcome::PaymentComplete { transaction_id: "one-time-charge".to_owned() })
    }

    fn subscription_slot(&self) -> &SubscriptionSlot {
        &self.slot
    }

    fn subscription_slot_mut(&mut self) -> &mut SubscriptionSlot {
        &mut self.slot
    }
}

/// Test container that also carries a fresh [`ChargeCounter`].
pub fn counting_container() -> (Container, Arc<ChargeCounter>) {
    let container = container();
    let counter = Arc::new(ChargeCounter::default());
    container.instance::<ChargeCounter, ChargeCounter>(Arc::clone(&counter));
    (container, counter)
}

pub fn container() -> Container {
    let container = Container::new();
    bind_services(&container, &GatewaysConfig::default());
    container
}

pub fn form_data(gateway: &'static str) -> DonationFormData {
    DonationFormData {
        form_id: 42,
        form_title: "Clean Water".to_owned(),
        price_id: None,
        amount: 2500,
        currency: "USD".to_owned(),
        donor: Donor {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.org".to_owned(),
        },
        purchase_key: "pk-1".to_owned(),
        gateway_id: GatewayId::from_static(gateway),
        subscription: None,
    }
}

pub fn recurring(mut data: DonationFormData) -> DonationFormData {
    data.subscription =
        Some(SubscriptionPlan { period: SubscriptionPeriod::Month, frequency: 1, times: 0 });
    data
}

pub fn bridge() -> Arc<RecordingBridge> {
    Arc::new(RecordingBridge::default())
}
