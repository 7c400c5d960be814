mod common;

use common::*;
use dhub_domain::donation::{DonationId, SubscriptionId, SubscriptionPeriod};
use dhub_domain::gateway::GatewayOutcome;
use dhub_gateways::builtin::{ManualGateway, OfflineGateway};
use dhub_gateways::legacy::{
    LegacyGatewayBridge, LegacyGatewayRegister, LegacyPurchase, LegacySubscription, LegacyUserInfo,
};
use dhub_gateways::{GatewayClass, GatewayError, GatewayRegistry};
use std::sync::Arc;

fn purchase(gateway: &str) -> LegacyPurchase {
    LegacyPurchase {
        donation_id: DonationId::new(5).unwrap(),
        price: "25.00".to_owned(),
        currency: "USD".to_owned(),
        give_form_id: 42,
        give_form_title: "Clean Water".to_owned(),
        give_price_id: None,
        purchase_key: "pk-5".to_owned(),
        user_info: LegacyUserInfo {
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.org".to_owned(),
        },
        gateway: gateway.to_owned(),
        subscription: None,
    }
}

fn setup() -> (Arc<LegacyGatewayRegister>, GatewayRegistry) {
    let legacy = Arc::new(LegacyGatewayRegister::new(container()));
    let mut registry = GatewayRegistry::new(legacy.clone());
    registry.register_gateway::<ManualGateway>().unwrap();
    registry.register_gateway::<OfflineGateway>().unwrap();
    (legacy, registry)
}

#[test]
fn registration_populates_the_legacy_list() {
    let (legacy, _registry) = setup();

    let list = legacy.gateways();
    assert_eq!(list.len(), 2);
    assert_eq!(list["offline"].admin_label, "Offline Donation");
    assert_eq!(list["manual"].checkout_label, "Test Donation");
}

#[test]
fn legacy_dispatch_reaches_the_typed_gateway() {
    let (legacy, _registry) = setup();

    let outcome = legacy.dispatch("manual", &purchase("manual")).unwrap();
    assert!(matches!(outcome, GatewayOutcome::PaymentComplete { .. }));
}

#[test]
fn legacy_recurring_purchase_uses_the_subscription_module() {
    let (legacy, _registry) = setup();

    let mut recurring = purchase("manual");
    recurring.subscription = Some(LegacySubscription {
        subscription_id: SubscriptionId::new(9).unwrap(),
        period: SubscriptionPeriod::Year,
        frequency: 1,
        times: 3,
    });

    let outcome = legacy.dispatch("manual", &recurring).unwrap();
    assert!(matches!(outcome, GatewayOutcome::SubscriptionComplete { .. }));
}

#[test]
fn legacy_recurring_purchase_skips_the_one_time_charge() {
    let (container, counter) = counting_container();
    let legacy = Arc::new(LegacyGatewayRegister::new(container));
    let mut registry = GatewayRegistry::new(legacy.clone());
    registry.register_gateway::<CountingGateway>().unwrap();

    let mut recurring = purchase("counting");
    recurring.subscription = Some(LegacySubscription {
        subscription_id: SubscriptionId::new(4).unwrap(),
        period: SubscriptionPeriod::Month,
        frequency: 1,
        times: 0,
    });

    let outcome = legacy.dispatch("counting", &recurring).unwrap();
    assert_eq!(counter.charges(), 0);
    assert!(matches!(outcome, GatewayOutcome::SubscriptionComplete { .. }));

    legacy.dispatch("counting", &purchase("counting")).unwrap();
    assert_eq!(counter.charges(), 1);
}

#[test]
fn legacy_purchase_maps_price_and_donor() {
    let data = purchase("offline").to_form_data(&"offline".into()).unwrap();

    assert_eq!(data.amount, 2500);
    assert_eq!(data.form_id, 42);
    assert_eq!(data.donor.email, "ada@example.org");
    assert_eq!(data.gateway_id.as_str(), "offline");
}

#[test]
fn malformed_legacy_price_is_rejected() {
    let (legacy, _registry) = setup();

    let mut bad = purchase("manual");
    bad.price = "twenty".to_owned();
    let err = legacy.dispatch("manual", &bad).unwrap_err();
    assert!(matches!(err, GatewayError::InvalidArgument { .. }));
}

#[test]
fn offline_gateway_contributes_legacy_markup() {
    let (legacy, _registry) = setup();

    let markup = legacy.adapter("offline").unwrap().form_field_markup(42).unwrap().unwrap();
    assert!(markup.contains("give_offline_payment_info-42"));
    assert!(legacy.adapter("manual").unwrap().form_field_markup(42).unwrap().is_none());
}

#[test]
fn unknown_legacy_gateway_is_a_lookup_error() {
    let (legacy, _registry) = setup();

    let err = legacy.dispatch("square", &purchase("square")).unwrap_err();
    assert!(matches!(err, GatewayError::Lookup { .. }));
}

#[test]
fn connecting_twice_is_a_bridge_error() {
    let legacy = LegacyGatewayRegister::new(container());
    legacy.connect(&GatewayClass::of::<ManualGateway>()).unwrap();

    let err = legacy.connect(&GatewayClass::of::<ManualGateway>()).unwrap_err();
    assert!(matches!(err, GatewayError::Bridge { .. }));
}

#[test]
fn unregister_keeps_the_legacy_entry() {
    let (legacy, mut registry) = setup();

    registry.unregister("manual");
    assert!(!registry.has("manual"));
    assert!(legacy.is_connected("manual"));
}

#[test]
fn legacy_purchase_reads_snake_case_json() {
    let raw = r#"{
        "donation_id": 3,
        "price": "10",
        "currency": "USD",
        "give_form_id": 8,
        "give_form_title": "General Fund",
        "purchase_key": "abc",
        "user_info": { "first_name": "A", "last_name": "B", "email": "a@b.c" },
        "gateway": "manual",
        "subscription": { "subscription_id": 4, "period": "month" }
    }"#;

    let purchase: LegacyPurchase = serde_json::from_str(raw).unwrap();
    let sub = purchase.subscription.unwrap();
    assert_eq!(sub.frequency, 1);
    assert_eq!(sub.times, 0);
    assert!(purchase.give_price_id.is_none());
}
