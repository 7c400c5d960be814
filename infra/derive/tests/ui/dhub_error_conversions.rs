use dhub_derive::dhub_error;
use std::borrow::Cow;

#[dhub_error]
pub enum GatewayLookupError {
    #[error("Gateway lookup failed{}: {message}", format_context(.context))]
    Lookup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Manifest decode failed{}: {source}", format_context(.context))]
    Decode { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse_priority(raw: &str) -> Result<u32, GatewayLookupError> {
    raw.parse::<u32>().context("gateway priority")
}

fn lookup(id: &str) -> Result<(), GatewayLookupError> {
    Err(GatewayLookupError::Lookup { message: id.to_owned().into(), context: None })
        .context("registry")
}

fn main() {
    let err = parse_priority("high").unwrap_err();
    assert!(err.to_string().starts_with("Manifest decode failed (gateway priority)"));

    let err = lookup("stripe").unwrap_err();
    assert_eq!(err.to_string(), "Gateway lookup failed (registry): stripe");

    let err: GatewayLookupError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");

    let err: GatewayLookupError = "7x".parse::<u32>().unwrap_err().into();
    assert!(matches!(err, GatewayLookupError::Decode { context: None, .. }));
}
