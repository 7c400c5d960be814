//! The capability surface every payment gateway implements.
//!
//! A gateway is a plain type implementing [`PaymentGateway`]. Registration works with its
//! [`GatewayClass`], a cheap description that can construct instances on demand, so nothing is
//! instantiated until a payment actually needs the gateway.
use crate::error::GatewayError;
use dhub_domain::donation::{DonationFormData, DonationId, SubscriptionId};
use dhub_domain::gateway::{GatewayId, GatewayOutcome};
use dhub_kernel::container::{Container, ContainerError, ServiceRef};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

/// Handles recurring-payment requests on behalf of one gateway.
pub trait SubscriptionModule: Send + Sync {
    /// # Errors
    /// Implementation specific, usually [`GatewayError::Payment`].
    fn handle_subscription_request(
        &self,
        donation_id: DonationId,
        subscription_id: SubscriptionId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError>;
}

/// Reference to a [`SubscriptionModule`] binding in the container.
pub type ModuleRef = ServiceRef<dyn SubscriptionModule>;

/// Subscription module binding embedded in every gateway.
///
/// Holds the container handed to the gateway at build time, so the module is resolved lazily
/// from the mounted reference.
#[derive(Debug, Clone)]
pub struct SubscriptionSlot {
    container: Container,
    module: Option<ModuleRef>,
}

impl SubscriptionSlot {
    #[must_use]
    pub fn new(container: &Container) -> Self {
        Self { container: container.clone(), module: None }
    }

    /// Stores the reference. It is neither validated nor resolved here.
    pub fn mount(&mut self, module: ModuleRef) {
        self.module = Some(module);
    }

    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.module.is_some()
    }

    #[must_use]
    pub const fn module_ref(&self) -> Option<ModuleRef> {
        self.module
    }

    /// # Errors
    /// [`GatewayError::Resolution`] when nothing is mounted or the container has no binding for
    /// the mounted reference.
    pub fn resolve(&self) -> Result<Arc<dyn SubscriptionModule>, GatewayError> {
        let module = self.module.ok_or_else(|| ContainerError::Unbound {
            message: "no subscription module mounted".into(),
            context: None,
        })?;

        Ok(self.container.resolve(&module)?)
    }
}

/// Contract of a payment gateway.
///
/// Associated functions bounded by `Self: Sized` describe the gateway class and are captured by
/// [`GatewayClass::of`]; the remaining methods are callable on `dyn PaymentGateway`.
pub trait PaymentGateway: Send + Sync + 'static {
    /// Stable, unique identity. Must be well formed (see [`GatewayId::is_well_formed`]).
    fn id() -> GatewayId
    where
        Self: Sized;

    /// Name shown in the admin gateway list.
    fn name() -> &'static str
    where
        Self: Sized;

    /// Label shown to donors at checkout.
    fn payment_method_label() -> &'static str
    where
        Self: Sized;

    /// Constructs the gateway with access to the dependency container.
    ///
    /// # Errors
    /// Any dependency the gateway fails to resolve.
    fn build(container: &Container) -> Result<Self, GatewayError>
    where
        Self: Sized;

    /// Processes a one-time payment.
    ///
    /// # Errors
    /// [`GatewayError::Payment`] when the gateway declines the donation.
    fn create_payment(
        &self,
        donation_id: DonationId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError>;

    fn subscription_slot(&self) -> &SubscriptionSlot;

    fn subscription_slot_mut(&mut self) -> &mut SubscriptionSlot;

    fn mount_subscription_module(&mut self, module: ModuleRef) {
        self.subscription_slot_mut().mount(module);
    }

    fn has_subscription_module(&self) -> bool {
        self.subscription_slot().is_mounted()
    }

    /// # Errors
    /// See [`SubscriptionSlot::resolve`].
    fn get_subscription_module(&self) -> Result<Arc<dyn SubscriptionModule>, GatewayError> {
        self.subscription_slot().resolve()
    }

    /// Forwards to the mounted module.
    ///
    /// Does not check [`has_subscription_module`](Self::has_subscription_module) first; without
    /// a mounted module this fails with [`GatewayError::Resolution`].
    ///
    /// # Errors
    /// Resolution failures or whatever the module returns.
    fn handle_subscription_request(
        &self,
        donation_id: DonationId,
        subscription_id: SubscriptionId,
        form_data: &DonationFormData,
    ) -> Result<GatewayOutcome, GatewayError> {
        self.get_subscription_module()?.handle_subscription_request(
            donation_id,
            subscription_id,
            form_data,
        )
    }

    /// Extra markup the legacy checkout renders for this gateway.
    fn legacy_form_field_markup(&self, _form_id: u64) -> Option<String> {
        None
    }
}

type Constructor = fn(&Container) -> Result<Arc<dyn PaymentGateway>, GatewayError>;

fn construct<G: PaymentGateway>(
    container: &Container,
) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    Ok(Arc::new(G::build(container)?))
}

/// Class reference of a gateway: identity, labels and constructor. Cloning never instantiates.
#[derive(Clone)]
pub struct GatewayClass {
    id: GatewayId,
    name: &'static str,
    payment_method_label: &'static str,
    type_name: &'static str,
    constructor: Constructor,
}

impl GatewayClass {
    #[must_use]
    pub fn of<G: PaymentGateway>() -> Self {
        Self {
            id: G::id(),
            name: G::name(),
            payment_method_label: G::payment_method_label(),
            type_name: type_name::<G>(),
            constructor: construct::<G>,
        }
    }

    #[must_use]
    pub const fn id(&self) -> &GatewayId {
        &self.id
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub const fn payment_method_label(&self) -> &'static str {
        self.payment_method_label
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Checks what the type system cannot: the reported id must be well formed.
    ///
    /// # Errors
    /// [`GatewayError::InvalidArgument`] for an empty or malformed id.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.id.is_well_formed() {
            return Ok(());
        }
        Err(GatewayError::InvalidArgument {
            message: format!(
                "{} must report a well-formed gateway id, got {:?}",
                self.type_name,
                self.id.as_str()
            )
            .into(),
            context: None,
        })
    }

    /// Builds a fresh gateway instance.
    ///
    /// # Errors
    /// Whatever the gateway's `build` returns.
    pub fn instantiate(
        &self,
        container: &Container,
    ) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
        (self.constructor)(container)
    }
}

impl fmt::Debug for GatewayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for dyn PaymentGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentGateway")
            .field("subscription_module", &self.subscription_slot().module_ref())
            .finish_non_exhaustive()
    }
}
