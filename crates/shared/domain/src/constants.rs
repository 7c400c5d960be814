//! Markup and identity constants shared by the gateways and the form runtime.

/// Gateway id of the built-in test gateway.
pub const MANUAL_GATEWAY: &str = "manual";
/// Gateway id of the built-in offline donation gateway.
pub const OFFLINE_GATEWAY: &str = "offline";

/// Class that marks a `<form>` as a donation form.
pub const DONATION_FORM_CLASS: &str = "give-form";
/// Class of the wrapper element around a single form field.
pub const FORM_ROW_CLASS: &str = "form-row";
/// Class toggled on a field wrapper to hide it.
pub const HIDDEN_CLASS: &str = "give-hidden";

