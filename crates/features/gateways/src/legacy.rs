//! Bridge between typed gateways and the legacy, id-keyed gateway list.
//!
//! The legacy checkout knows gateways only by id and talks to them with loosely shaped
//! purchase arrays. Each registered gateway gets a [`LegacyGatewayAdapter`] that maps that
//! convention onto the [`PaymentGateway`](crate::contract::PaymentGateway) contract.
use crate::contract::GatewayClass;
use crate::error::GatewayError;
use dhub_domain::donation::{
    DonationFormData, DonationId, Donor, SubscriptionId, SubscriptionPeriod, SubscriptionPlan,
};
use dhub_domain::gateway::{GatewayId, GatewayOutcome};
use dhub_kernel::container::Container;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Receives every gateway the registry accepts.
pub trait LegacyGatewayBridge: Send + Sync {
    /// # Errors
    /// [`GatewayError::Bridge`] when the gateway cannot be added to the legacy list.
    fn connect(&self, class: &GatewayClass) -> Result<(), GatewayError>;
}

/// Labels the legacy gateway list displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyGatewayLabels {
    pub admin_label: String,
    pub checkout_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyUserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Recurring part of a legacy purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySubscription {
    pub subscription_id: SubscriptionId,
    pub period: SubscriptionPeriod,
    #[serde(default = "default_frequency")]
    pub frequency: u32,
    #[serde(default)]
    pub times: u32,
}

const fn default_frequency() -> u32 {
    1
}

/// Purchase payload in the shape the legacy checkout submits it.
///
/// `price` is a decimal string in major units (e.g. `"25.00"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPurchase {
    pub donation_id: DonationId,
    pub price: String,
    pub currency: String,
    pub give_form_id: u64,
    pub give_form_title: String,
    #[serde(default)]
    pub give_price_id: Option<String>,
    pub purchase_key: String,
    pub user_info: LegacyUserInfo,
    pub gateway: String,
    #[serde(default)]
    pub subscription: Option<LegacySubscription>,
}

impl LegacyPurchase {
    /// Maps the legacy payload onto the typed form data for `gateway_id`.
    ///
    /// # Errors
    /// [`GatewayError::InvalidArgument`] when `price` is not a valid amount.
    pub fn to_form_data(&self, gateway_id: &GatewayId) -> Result<DonationFormData, GatewayError> {
        Ok(DonationFormData {
            form_id: self.give_form_id,
            form_title: self.give_form_title.clone(),
            price_id: self.give_price_id.clone(),
            amount: parse_minor_units(&self.price)?,
            currency: self.currency.clone(),
            donor: Donor {
                first_name: self.user_info.first_name.clone(),
                last_name: self.user_info.last_name.clone(),
                email: self.user_info.email.clone(),
            },
            purchase_key: self.purchase_key.clone(),
            gateway_id: gateway_id.clone(),
            subscription: self.subscription.map(|sub| SubscriptionPlan {
                period: sub.period,
                frequency: sub.frequency,
                times: sub.times,
            }),
        })
    }
}

/// Parses a decimal major-unit amount (`"25"`, `"25.5"`, `"1,250.00"`) into minor units.
///
/// # Errors
/// [`GatewayError::InvalidArgument`] for anything else, or more than two decimals.
pub fn parse_minor_units(price: &str) -> Result<i64, GatewayError> {
    let invalid = || GatewayError::InvalidArgument {
        message: format!("invalid price {price:?}").into(),
        context: None,
    };

    let cleaned: String = price.trim().chars().filter(|c| *c != ',').collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty()
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let cents: i64 = format!("{fraction:0<2}").parse().map_err(|_| invalid())?;
    let amount = whole.checked_mul(100).and_then(|v| v.checked_add(cents)).ok_or_else(invalid)?;

    Ok(if negative { -amount } else { amount })
}

/// Projects one typed gateway onto the legacy call convention.
#[derive(Debug, Clone)]
pub struct LegacyGatewayAdapter {
    class: GatewayClass,
    container: Container,
}

impl LegacyGatewayAdapter {
    #[must_use]
    pub fn new(class: GatewayClass, container: Container) -> Self {
        Self { class, container }
    }

    #[must_use]
    pub const fn class(&self) -> &GatewayClass {
        &self.class
    }

    /// Runs a legacy purchase through the typed gateway.
    ///
    /// Recurring purchases go to the subscription module alone when the gateway has one
    /// mounted. Everything else, including recurring purchases on gateways without a module,
    /// is a one-time payment.
    ///
    /// # Errors
    /// Gateway construction, payload mapping or payment failures.
    pub fn handle_legacy_purchase(
        &self,
        purchase: &LegacyPurchase,
    ) -> Result<GatewayOutcome, GatewayError> {
        let gateway = self.class.instantiate(&self.container)?;
        let form_data = purchase.to_form_data(self.class.id())?;

        match purchase.subscription {
            Some(sub) if gateway.has_subscription_module() => gateway.handle_subscription_request(
                purchase.donation_id,
                sub.subscription_id,
                &form_data,
            ),
            Some(sub) => {
                warn!(
                    gateway_id = %self.class.id(),
                    subscription_id = %sub.subscription_id,
                    "Recurring legacy purchase on a gateway without subscription module"
                );
                gateway.create_payment(purchase.donation_id, &form_data)
            },
            None => gateway.create_payment(purchase.donation_id, &form_data),
        }
    }

    /// # Errors
    /// Gateway construction failures.
    pub fn form_field_markup(&self, form_id: u64) -> Result<Option<String>, GatewayError> {
        Ok(self.class.instantiate(&self.container)?.legacy_form_field_markup(form_id))
    }
}

#[derive(Debug, Clone)]
struct LegacyGateway {
    labels: LegacyGatewayLabels,
    adapter: Arc<LegacyGatewayAdapter>,
}

/// The legacy gateway list: id, labels and the adapter created when the gateway connected.
pub struct LegacyGatewayRegister {
    container: Container,
    gateways: RwLock<BTreeMap<GatewayId, LegacyGateway>>,
}

impl LegacyGatewayRegister {
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self { container, gateways: RwLock::new(BTreeMap::new()) }
    }

    /// Legacy `{id => labels}` list.
    #[must_use]
    pub fn gateways(&self) -> BTreeMap<GatewayId, LegacyGatewayLabels> {
        self.gateways.read().iter().map(|(id, g)| (id.clone(), g.labels.clone())).collect()
    }

    #[must_use]
    pub fn is_connected(&self, id: &str) -> bool {
        self.gateways.read().contains_key(id)
    }

    /// # Errors
    /// [`GatewayError::Lookup`] for an id that never connected.
    pub fn adapter(&self, id: &str) -> Result<Arc<LegacyGatewayAdapter>, GatewayError> {
        self.gateways
            .read()
            .get(id)
            .map(|g| Arc::clone(&g.adapter))
            .ok_or_else(|| GatewayError::not_found(id))
    }

    /// Dispatches a legacy purchase to the adapter connected under `id`.
    ///
    /// # Errors
    /// [`GatewayError::Lookup`] for unknown ids, otherwise see
    /// [`LegacyGatewayAdapter::handle_legacy_purchase`].
    pub fn dispatch(
        &self,
        id: &str,
        purchase: &LegacyPurchase,
    ) -> Result<GatewayOutcome, GatewayError> {
        let adapter = self.adapter(id)?;
        debug!(gateway_id = id, donation_id = %purchase.donation_id, "Legacy purchase dispatched");
        adapter.handle_legacy_purchase(purchase)
    }
}

impl LegacyGatewayBridge for LegacyGatewayRegister {
    fn connect(&self, class: &GatewayClass) -> Result<(), GatewayError> {
        let mut gateways = self.gateways.write();
        if gateways.contains_key(class.id()) {
            return Err(GatewayError::Bridge {
                message: format!("{} is already in the legacy gateway list", class.id()).into(),
                context: None,
            });
        }

        let adapter = LegacyGatewayAdapter::new(class.clone(), self.container.clone());
        let labels = LegacyGatewayLabels {
            admin_label: class.name().to_owned(),
            checkout_label: class.payment_method_label().to_owned(),
        };
        gateways.insert(class.id().clone(), LegacyGateway { labels, adapter: Arc::new(adapter) });

        debug!(gateway_id = %class.id(), "Gateway connected to legacy list");
        Ok(())
    }
}

impl fmt::Debug for LegacyGatewayRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyGatewayRegister")
            .field("gateways", &self.gateways.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_major_unit_prices() {
        assert_eq!(parse_minor_units("25").unwrap(), 2500);
        assert_eq!(parse_minor_units("25.5").unwrap(), 2550);
        assert_eq!(parse_minor_units(" 1,250.07 ").unwrap(), 125_007);
        assert_eq!(parse_minor_units("-3.10").unwrap(), -310);
        assert_eq!(parse_minor_units("0.99").unwrap(), 99);
    }

    #[test]
    fn rejects_malformed_prices() {
        for price in ["", ".50", "12.345", "ten", "1e3", "--1", "12.-5"] {
            let err = parse_minor_units(price).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidArgument { .. }), "{price}");
        }
    }
}
