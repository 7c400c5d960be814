use crate::gateway::GatewayId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{NonZeroU64, TryFromIntError};

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// `None` for zero.
            #[must_use]
            pub const fn new(id: u64) -> Option<Self> {
                match NonZeroU64::new(id) {
                    Some(id) => Some(Self(id)),
                    None => None,
                }
            }

            #[must_use]
            pub const fn get(self) -> u64 {
                self.0.get()
            }
        }

        impl TryFrom<u64> for $name {
            type Error = TryFromIntError;

            fn try_from(id: u64) -> Result<Self, Self::Error> {
                NonZeroU64::try_from(id).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(
    /// Identity of a donation record. Never zero.
    DonationId
);
positive_id!(
    /// Identity of a recurring subscription record. Never zero.
    SubscriptionId
);

/// Donor details captured by the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donor {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPeriod {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Recurring schedule requested by the donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub period: SubscriptionPeriod,
    /// Bill every `frequency` periods.
    pub frequency: u32,
    /// Number of payments, `0` means until cancelled.
    pub times: u32,
}

/// Gateway-facing payload of a submitted donation form.
///
/// Amounts are in minor units of `currency`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationFormData {
    pub form_id: u64,
    pub form_title: String,
    pub price_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub donor: Donor,
    pub purchase_key: String,
    pub gateway_id: GatewayId,
    #[serde(default)]
    pub subscription: Option<SubscriptionPlan>,
}

impl DonationFormData {
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.subscription.is_some()
    }
}

/// Change request sent by the donor dashboard when editing a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub id: SubscriptionId,
    pub amount: i64,
    pub payment_method: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_zero() {
        assert!(DonationId::new(0).is_none());
        assert!(SubscriptionId::try_from(0_u64).is_err());
        assert_eq!(DonationId::new(7).map(DonationId::get), Some(7));

        assert!(serde_json::from_str::<DonationId>("0").is_err());
        let id: SubscriptionId = serde_json::from_str("9").unwrap();
        assert_eq!(id.to_string(), "9");
    }
}
