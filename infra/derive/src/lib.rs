#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `DonationHub` infrastructure and feature crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! dhub-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining domain-specific error enums.
///
/// Turns a plain enum into an error type wired into the platform conventions.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to `Result<T, ErrorName>` and to `Result<T, SourceError>` for every source variant.
/// * **Standard Conversions**: Implements `From<SourceError>` for variants holding a
///   `source` field (or a field marked `#[source]`/`#[from]`), so `?` just works.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * **Formatting helper**: Emits a module-private `format_context` function for use in
///   `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants only.
/// 2. A `context` field, when present, must be `Option<Cow<'static, str>>`.
/// 3. Variants wrapping an upstream error must also carry a `context` field.
///
/// # Example
///
/// ```rust,ignore
/// use dhub_derive::dhub_error;
/// use std::borrow::Cow;
///
/// #[dhub_error]
/// pub enum RegistryError {
///     #[error("Lookup failed{}: {message}", format_context(.context))]
///     Lookup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Decode failed{}: {source}", format_context(.context))]
///     Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn parse(raw: &str) -> Result<serde_json::Value, RegistryError> {
///     serde_json::from_str(raw).context("Parsing gateway manifest")
/// }
/// ```
#[proc_macro_attribute]
pub fn dhub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}
