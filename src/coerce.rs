//! Turning attribute and text strings into typed scalars.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use num_bigint::BigInt;

use crate::decimal::Decimal;
use crate::value::{Number, Value};

/// Converts element text into a value, selected through a type-hint
/// attribute (see [`ParserConfiguration::with_type_converter`](crate::ParserConfiguration::with_type_converter)).
#[derive(Clone)]
pub struct TypeConverter(Arc<dyn Fn(&str) -> Value + Send + Sync>);

impl TypeConverter {
    pub fn new(convert: impl Fn(&str) -> Value + Send + Sync + 'static) -> Self {
        TypeConverter(Arc::new(convert))
    }

    pub fn convert(&self, s: &str) -> Value {
        (self.0)(s)
    }
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeConverter")
    }
}

/// Coerce a string with a converter when one is given, otherwise with
/// [`string_to_value`].
pub fn string_to_value_with(s: &str, converter: Option<&TypeConverter>) -> Value {
    match converter {
        Some(converter) => converter.convert(s),
        None => string_to_value(s),
    }
}

/// Coerce a string to the scalar it most plausibly denotes.
///
/// `true`, `false` and `null` are recognized in any case. Text that
/// starts with a digit or `-` is read as a number when it follows JSON
/// number rules. Decimal notation the exact decimal cannot read falls back
/// to a float, which also takes a `d`/`f` suffix and hexadecimal forms like
/// `0x1.8p1`. Anything else, including numbers with leading zeros, comes
/// back as the original string.
pub fn string_to_value(s: &str) -> Value {
    if s.is_empty() {
        return Value::String(String::new());
    }
    if s.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if s.eq_ignore_ascii_case("null") {
        return Value::Null;
    }
    match s.as_bytes()[0] {
        b'0'..=b'9' | b'-' => match string_to_number(s) {
            Some(number) => Value::Number(number),
            None => Value::String(s.to_string()),
        },
        _ => Value::String(s.to_string()),
    }
}

fn is_decimal_notation(s: &str) -> bool {
    s.contains(['.', 'e', 'E']) || s == "-0"
}

fn string_to_number(s: &str) -> Option<Number> {
    let bytes = s.as_bytes();
    let negative = bytes[0] == b'-';
    if is_decimal_notation(s) {
        return match Decimal::from_str(s) {
            // decimals have no negative zero
            Ok(d) if negative && d.is_zero() => Some(Number::Float(-0.0)),
            Ok(d) => Some(Number::Decimal(d)),
            Err(_) => parse_float(s).map(Number::Float),
        };
    }

    let digits = if negative { &bytes[1..] } else { bytes };
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if digits.len() > 1 && digits[0] == b'0' {
        return None;
    }
    let n = BigInt::from_str(s).ok()?;
    if let Ok(n) = i32::try_from(&n) {
        Some(Number::Int(n))
    } else if let Ok(n) = i64::try_from(&n) {
        Some(Number::Long(n))
    } else {
        Some(Number::BigInt(n))
    }
}

/// Read the floating point forms a decimal cannot hold: a `d`/`f` type
/// suffix and hexadecimal significands with a binary exponent (`0x1.8p1`).
/// Infinite results are refused.
fn parse_float(s: &str) -> Option<f64> {
    let s = s.strip_suffix(['d', 'D', 'f', 'F']).unwrap_or(s);
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let f = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => parse_hex_float(hex)?,
        None => {
            if !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
                return None;
            }
            unsigned.parse::<f64>().ok()?
        }
    };
    let f = if negative { -f } else { f };
    f.is_finite().then_some(f)
}

fn parse_hex_float(s: &str) -> Option<f64> {
    let (significand, exponent) = s.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;
    let (int, frac) = significand.split_once('.').unwrap_or((significand, ""));
    if int.is_empty() && frac.is_empty() {
        return None;
    }
    let mut value = 0f64;
    for c in int.chars().chain(frac.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let scale = i32::try_from(frac.len()).ok()?.checked_mul(4)?;
    Some(value * 2f64.powi(exponent.checked_sub(scale)?))
}
