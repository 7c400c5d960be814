use dhub_kernel::container::ContainerError;
use std::borrow::Cow;

/// Errors raised by gateway registration, lookup and dispatch.
#[dhub_derive::dhub_error]
pub enum GatewayError {
    /// The gateway does not conform to the contract, or a request payload is malformed.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Gateway lookup failed{}: {message}", format_context(.context))]
    Lookup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A gateway with the same id is already registered.
    #[error("Gateway overflow{}: {message}", format_context(.context))]
    Overflow { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A dependency (e.g. the subscription module) could not be resolved.
    #[error("Dependency resolution failed{}: {source}", format_context(.context))]
    Resolution { source: ContainerError, context: Option<Cow<'static, str>> },

    /// The legacy gateway list rejected the registration.
    #[error("Legacy bridge error{}: {message}", format_context(.context))]
    Bridge { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Subscriptions not supported{}: {message}", format_context(.context))]
    SubscriptionUnsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The gateway declined or failed to process the payment.
    #[error("Payment failed{}: {message}", format_context(.context))]
    Payment { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal gateway error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl GatewayError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::Lookup {
            message: format!("No gateway exists with the ID {id}").into(),
            context: None,
        }
    }
}
