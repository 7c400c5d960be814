//! Comparison of a controller's current value with a condition literal.
//!
//! The controller value is always a string (that is what form inputs hold). The rules follow
//! the browser's comparison operators:
//!
//! | operator | semantics |
//! |---|---|
//! | `=` | strict equality: only a string literal equal to the value matches |
//! | `!=` | loose inequality: numbers and booleans compare numerically, `null` never equals |
//! | `>` `>=` `<` `<=` | two strings compare by UTF-16 code units, anything else numerically |
//!
//! Numeric conversion of strings trims surrounding whitespace, treats the empty string as `0`,
//! accepts decimal, exponent, `0x`/`0o`/`0b` and `Infinity` forms and yields `NaN` otherwise.
//! `NaN` never satisfies a relational operator.
use crate::condition::{ConditionValue, Operator};
use std::cmp::Ordering;

/// Evaluates `input <operator> value`. Unknown operators never match.
#[must_use]
pub fn compare_with_operator(operator: &Operator, input: &str, value: &ConditionValue) -> bool {
    match operator {
        Operator::Eq => strict_eq(input, value),
        Operator::NotEq => !loose_eq(input, value),
        Operator::Gt => relational(input, value).is_some_and(Ordering::is_gt),
        Operator::GtEq => relational(input, value).is_some_and(Ordering::is_ge),
        Operator::Lt => relational(input, value).is_some_and(Ordering::is_lt),
        Operator::LtEq => relational(input, value).is_some_and(Ordering::is_le),
        Operator::Unknown(_) => false,
    }
}

fn strict_eq(input: &str, value: &ConditionValue) -> bool {
    matches!(value, ConditionValue::String(s) if s == input)
}

#[allow(clippy::float_cmp)]
fn loose_eq(input: &str, value: &ConditionValue) -> bool {
    match value {
        ConditionValue::String(s) => s == input,
        ConditionValue::Number(n) => to_number(input) == *n,
        ConditionValue::Bool(b) => to_number(input) == f64::from(u8::from(*b)),
        ConditionValue::Null => false,
    }
}

/// `None` when the operands are unordered (a `NaN` is involved).
fn relational(input: &str, value: &ConditionValue) -> Option<Ordering> {
    if let ConditionValue::String(s) = value {
        return Some(input.encode_utf16().cmp(s.encode_utf16()));
    }
    let rhs = match value {
        ConditionValue::Null => 0.0,
        ConditionValue::Bool(b) => f64::from(u8::from(*b)),
        ConditionValue::Number(n) => *n,
        ConditionValue::String(_) => return None,
    };
    to_number(input).partial_cmp(&rhs)
}

/// Whitespace stripped by browsers before numeric conversion.
const fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// Converts a string to a number the way form values are coerced in the browser.
#[must_use]
pub fn to_number(raw: &str) -> f64 {
    let s = raw.trim_matches(is_js_whitespace);
    if s.is_empty() {
        return 0.0;
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }

    let (sign, unsigned) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    if unsigned == "Infinity" {
        return sign * f64::INFINITY;
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    unsigned.parse::<f64>().map_or(f64::NAN, |n| sign * n)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc.mul_add(f64::from(radix), f64::from(d)))
        })
        .unwrap_or(f64::NAN)
}

/// `digits [. digits] [e [sign] digits]` or `. digits [exponent]`, at least one mantissa digit.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut mantissa_digits = 0;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exponent_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exponent_start {
            return false;
        }
    }

    i == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(op: &str, input: &str, value: impl Into<ConditionValue>) -> bool {
        compare_with_operator(&Operator::from(op), input, &value.into())
    }

    #[test]
    fn equality_is_strict() {
        assert!(cmp("=", "US", "US"));
        assert!(!cmp("=", "US", "us"));
        assert!(!cmp("=", "5", 5.0));
        assert!(!cmp("=", "true", true));
        assert!(!cmp("=", "", ConditionValue::Null));
    }

    #[test]
    fn inequality_is_loose() {
        assert!(cmp("!=", "CA", "US"));
        assert!(!cmp("!=", "US", "US"));
        assert!(!cmp("!=", "5", 5.0));
        assert!(!cmp("!=", " 5.0 ", 5.0));
        assert!(!cmp("!=", "1", true));
        assert!(!cmp("!=", "", false));
        assert!(cmp("!=", "yes", true));
        assert!(cmp("!=", "", ConditionValue::Null));
        assert!(cmp("!=", "abc", f64::NAN));
    }

    #[test]
    fn relational_strings_compare_lexicographically() {
        assert!(cmp(">", "b", "a"));
        assert!(cmp("<", "10", "9"));
        assert!(cmp(">=", "abc", "abc"));
        assert!(cmp("<=", "", "a"));
        assert!(!cmp("<", "Z", "A"));
    }

    #[test]
    fn relational_otherwise_numeric() {
        assert!(cmp(">", "10", 9.0));
        assert!(cmp(">=", "0x10", 16.0));
        assert!(cmp("<", "", 1.0));
        assert!(cmp(">", "2", true));
        assert!(cmp(">=", "0", ConditionValue::Null));
        assert!(!cmp(">", "abc", 0.0));
        assert!(!cmp("<=", "abc", 0.0));
        assert!(cmp("<", "-Infinity", -1e308));
    }

    #[test]
    fn unknown_operator_never_matches() {
        assert!(!cmp("==", "US", "US"));
        assert!(!cmp("contains", "USA", "US"));
    }

    #[test]
    fn string_to_number_conversion() {
        assert!((to_number("  42 ") - 42.0).abs() < f64::EPSILON);
        assert!((to_number("1e3") - 1000.0).abs() < f64::EPSILON);
        assert!((to_number(".5") - 0.5).abs() < f64::EPSILON);
        assert!((to_number("5.") - 5.0).abs() < f64::EPSILON);
        assert!(to_number("-0b101").is_nan());
        assert!((to_number("0o17") - 15.0).abs() < f64::EPSILON);
        assert!(to_number("\u{FEFF}\n") == 0.0);
        assert!(to_number("inf").is_nan());
        assert!(to_number("NaN").is_nan());
        assert!(to_number("1_000").is_nan());
        assert!(to_number("12px").is_nan());
        assert!(to_number("e5").is_nan());
        assert!(to_number("0x").is_nan());
        assert!(to_number("+Infinity").is_infinite());
    }

    #[test]
    fn utf16_order_differs_from_code_point_order() {
        // By code point U+1F600 is the greater one; as UTF-16 its lead surrogate is smaller.
        assert!(cmp("<", "\u{1F600}", "\u{FF5E}"));
    }
}
