use dhub::domain::config::PlatformConfig;
use dhub::domain::donation::{DonationFormData, DonationId, Donor};
use dhub::domain::gateway::{GatewayId, GatewayOutcome};
use dhub::gateways::legacy::{LegacyPurchase, LegacyUserInfo};
use dhub::gateways::{GatewayError, PaymentRequest};
use dhub::{bootstrap, is_enabled};

fn donation(gateway: &'static str) -> PaymentRequest {
    PaymentRequest {
        donation_id: DonationId::new(11).unwrap(),
        subscription_id: None,
        form_data: DonationFormData {
            form_id: 5,
            form_title: "Library Fund".to_owned(),
            price_id: None,
            amount: 1000,
            currency: "EUR".to_owned(),
            donor: Donor::default(),
            purchase_key: "pk-11".to_owned(),
            gateway_id: GatewayId::from_static(gateway),
            subscription: None,
        },
    }
}

#[test]
fn default_config_registers_builtin_gateways() {
    let platform = bootstrap(&PlatformConfig::default()).unwrap();

    let ids: Vec<_> = platform.registry.ids().into_iter().map(|id| id.to_string()).collect();
    assert_eq!(ids, ["manual", "offline"]);

    let legacy = platform.legacy.gateways();
    assert_eq!(legacy.len(), 2);
    assert_eq!(legacy["offline"].admin_label, "Offline Donation");
}

#[test]
fn dispatcher_reaches_registered_gateways() {
    let platform = bootstrap(&PlatformConfig::default()).unwrap();
    let mut dispatcher = platform.dispatcher();

    let outcome = dispatcher.dispatch("manual", &donation("manual")).unwrap();
    assert!(outcome.is_complete());

    let err = dispatcher.dispatch("stripe", &donation("stripe")).unwrap_err();
    assert!(matches!(err, GatewayError::Lookup { .. }));
}

#[test]
fn legacy_dispatch_uses_the_same_container() {
    let mut config = PlatformConfig::default();
    config.gateways.offline_instructions = "Wire to IBAN XX00".to_owned();
    let platform = bootstrap(&config).unwrap();

    let purchase = LegacyPurchase {
        donation_id: DonationId::new(12).unwrap(),
        price: "15.00".to_owned(),
        currency: "EUR".to_owned(),
        give_form_id: 5,
        give_form_title: "Library Fund".to_owned(),
        give_price_id: None,
        purchase_key: "pk-12".to_owned(),
        user_info: LegacyUserInfo::default(),
        gateway: "offline".to_owned(),
        subscription: None,
    };

    let outcome = platform.legacy.dispatch("offline", &purchase).unwrap();
    assert_eq!(outcome, GatewayOutcome::PaymentProcessing {
        instructions: Some("Wire to IBAN XX00".to_owned()),
    });
}

#[test]
fn unknown_enabled_gateway_fails_startup() {
    let mut config = PlatformConfig::default();
    config.gateways.enabled.push("bitcoin".to_owned());

    let err = bootstrap(&config).unwrap_err();
    assert!(matches!(err, GatewayError::Lookup { .. }));
    assert!(err.to_string().contains("bitcoin"));
}

#[cfg(feature = "visibility")]
#[test]
fn form_controller_uses_platform_classes() {
    let mut config = PlatformConfig::default();
    config.visibility.hidden_class = "is-hidden".to_owned();
    let platform = bootstrap(&config).unwrap();

    let document = serde_json::from_value(serde_json::json!({
        "forms": [{
            "id": "give-form-1",
            "dataId": "1-1",
            "classes": ["give-form"],
            "rows": [
                { "classes": ["form-row"], "inputs": [{ "name": "country", "value": "CA" }] },
                { "classes": ["form-row"], "inputs": [{
                    "name": "state",
                    "visibilityConditions": "[{\"field\":\"country\",\"operator\":\"=\",\"value\":\"US\"}]"
                }] }
            ]
        }]
    }))
    .unwrap();

    let mut controller = platform.form_controller(document);
    controller.initialize();
    assert!(controller.document().forms[0].rows[1].has_class("is-hidden"));
    assert!(is_enabled("visibility"));
}
