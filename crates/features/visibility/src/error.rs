use dhub_event_bus::EventBusError;
use std::borrow::Cow;

/// Errors of the visibility engine. Each one is local to a field, a form or an event.
#[dhub_derive::dhub_error]
pub enum VisibilityError {
    /// A `data-field-visibility-conditions` attribute is not a valid condition list.
    #[error("Malformed visibility conditions{}: {source}", format_context(.context))]
    Condition { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Empty visibility conditions{}: {message}", format_context(.context))]
    EmptyConditions { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The dependent field named by the watch state is not in the form.
    #[error("Missing field{}: {message}", format_context(.context))]
    MissingField { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The dependent field is not wrapped in a form row.
    #[error("Missing field wrapper{}: {message}", format_context(.context))]
    MissingWrapper { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Form not found{}: {message}", format_context(.context))]
    FormNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Event bus error{}: {source}", format_context(.context))]
    EventBus { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal visibility error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
