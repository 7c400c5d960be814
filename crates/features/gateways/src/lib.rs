//! # Payment gateways
//!
//! Registration and dispatch of pluggable payment gateways.
//!
//! * [`contract`]: the [`PaymentGateway`] trait, subscription modules and gateway classes.
//! * [`registry`]: the id-keyed [`GatewayRegistry`] with uniqueness checks.
//! * [`legacy`]: the bridge keeping the legacy gateway list in sync with registrations.
//! * [`dispatch`]: [`PaymentDispatcher`], routing donations to gateway instances.
//! * [`builtin`]: the `manual` and `offline` gateways.
//!
//! ## Example
//! ```rust
//! use dhub_domain::config::GatewaysConfig;
//! use dhub_gateways::builtin::{ManualGateway, bind_services};
//! use dhub_gateways::legacy::LegacyGatewayRegister;
//! use dhub_gateways::GatewayRegistry;
//! use dhub_kernel::container::Container;
//! use std::sync::Arc;
//!
//! let container = Container::new();
//! bind_services(&container, &GatewaysConfig::default());
//!
//! let legacy = Arc::new(LegacyGatewayRegister::new(container.clone()));
//! let mut registry = GatewayRegistry::new(legacy.clone());
//! registry.register_gateway::<ManualGateway>().unwrap();
//!
//! assert!(registry.has("manual"));
//! assert_eq!(legacy.gateways()["manual"].checkout_label, "Test Donation");
//! ```

pub mod builtin;
pub mod contract;
pub mod dispatch;
mod error;
pub mod legacy;
pub mod registry;

pub use crate::contract::{GatewayClass, ModuleRef, PaymentGateway, SubscriptionModule};
pub use crate::dispatch::{PaymentDispatcher, PaymentRequest};
pub use crate::error::{GatewayError, GatewayErrorExt};
pub use crate::registry::GatewayRegistry;
use dhub_domain::gateway::GatewayId;

/// Registers the built-in gateways named in `enabled`, in order.
///
/// # Errors
/// [`GatewayError::Lookup`] for a name that is not a built-in gateway, or any registration
/// error.
pub fn register_builtin(
    registry: &mut GatewayRegistry,
    enabled: &[String],
) -> Result<Vec<GatewayId>, GatewayError> {
    enabled
        .iter()
        .map(|id| {
            let class = builtin::builtin_class(id)
                .ok_or_else(|| GatewayError::not_found(id))
                .context("enabled gateways")?;
            registry.register(class)
        })
        .collect()
}
