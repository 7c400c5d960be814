//! Facade crate for `DonationHub` features and shared modules.
//! Re-exports domain/kernel primitives and wires the platform together at startup.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Load a [`PlatformConfig`](domain::config::PlatformConfig).
//! - Call [`bootstrap`] once; pass the returned [`Platform`] to whatever needs gateways or
//!   events.

pub use dhub_domain as domain;
pub use dhub_event_bus as events;
pub use dhub_gateways as gateways;
pub use dhub_kernel as kernel;
#[cfg(feature = "visibility")]
pub use dhub_visibility as visibility;

use dhub_domain::config::PlatformConfig;
use dhub_event_bus::EventBus;
use dhub_gateways::builtin::bind_services;
use dhub_gateways::legacy::LegacyGatewayRegister;
use dhub_gateways::{GatewayError, GatewayRegistry, PaymentDispatcher, register_builtin};
use dhub_kernel::container::Container;
use std::sync::Arc;
use tracing::info;

/// Build-time enabled features (by Cargo feature).
pub const FEATURES: &[&str] = &[
    "gateways",
    #[cfg(feature = "visibility")]
    "visibility",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    FEATURES.contains(&name)
}

/// Everything the platform owns after startup.
#[derive(Debug)]
pub struct Platform {
    pub config: PlatformConfig,
    pub container: Container,
    pub registry: GatewayRegistry,
    pub legacy: Arc<LegacyGatewayRegister>,
    pub events: EventBus,
}

impl Platform {
    /// A dispatcher over the registered gateways. Gateway instances live as long as it does.
    #[must_use]
    pub fn dispatcher(&self) -> PaymentDispatcher<'_> {
        PaymentDispatcher::new(&self.registry, self.container.clone())
    }

    /// A form runtime configured from `visibility` settings.
    #[cfg(feature = "visibility")]
    #[must_use]
    pub fn form_controller(
        &self,
        document: dhub_visibility::model::Document,
    ) -> dhub_visibility::FormController {
        dhub_visibility::FormController::new(document, self.config.visibility.clone())
    }
}

/// Binds shared services and registers the enabled built-in gateways.
///
/// # Errors
/// Any [`GatewayError`] from registering `config.gateways.enabled`.
pub fn bootstrap(config: &PlatformConfig) -> Result<Platform, GatewayError> {
    let container = Container::new();
    bind_services(&container, &config.gateways);

    let legacy = Arc::new(LegacyGatewayRegister::new(container.clone()));
    let mut registry = GatewayRegistry::new(legacy.clone());
    let registered = register_builtin(&mut registry, &config.gateways.enabled)?;

    info!(gateways = ?registered, features = ?FEATURES, "Platform ready");

    Ok(Platform {
        config: config.clone(),
        container,
        registry,
        legacy,
        events: EventBus::new(),
    })
}
