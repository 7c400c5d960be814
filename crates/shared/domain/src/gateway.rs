use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

/// Stable identity of a payment gateway implementation (e.g. `"manual"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GatewayId(Cow<'static, str>);

impl GatewayId {
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty and made of ASCII alphanumerics, `-` and `_` only.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty()
            && self.0.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }
}

impl fmt::Display for GatewayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for GatewayId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GatewayId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for GatewayId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for GatewayId {
    fn from(id: String) -> Self {
        Self(Cow::Owned(id))
    }
}

/// What a gateway reports back after handling a payment or subscription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GatewayOutcome {
    /// Funds captured; the donation can be marked complete.
    #[serde(rename_all = "camelCase")]
    PaymentComplete { transaction_id: String },
    /// Awaiting an out-of-band payment (check, bank transfer...).
    #[serde(rename_all = "camelCase")]
    PaymentProcessing { instructions: Option<String> },
    /// The donor has to finish on the gateway's hosted page.
    RedirectOffsite { url: String },
    /// The first payment and the recurring profile are both in place.
    #[serde(rename_all = "camelCase")]
    SubscriptionComplete { transaction_id: String, subscription_reference: String },
}

impl GatewayOutcome {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::PaymentComplete { .. } | Self::SubscriptionComplete { .. })
    }
}
