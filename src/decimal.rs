//! Arbitrary precision decimals that keep their textual scale.
//!
//! A [`Decimal`] is an unscaled integer together with a scale, so that
//! `1.50` and `1.5` are distinct values. Rendering follows the usual
//! scientific-notation rules for very large and very small exponents.

use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, Sign};

/// A decimal number: `unscaled * 10^-scale`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

/// The text could not be read as a decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError;

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid decimal literal")
    }
}

impl std::error::Error for ParseDecimalError {}

impl Decimal {
    /// Create a decimal from its unscaled value and scale.
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Decimal { unscaled, scale }
    }

    /// The unscaled integer value.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// The number of digits to the right of the decimal point. Negative
    /// scales multiply by a power of ten.
    pub fn scale(&self) -> i32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }

    /// Closest `f64`. Precision beyond what a double holds is lost.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (significand, exponent) = match rest.find(['e', 'E']) {
            Some(i) => (&rest[..i], Some(&rest[i + 1..])),
            None => (rest, None),
        };
        let (int_part, frac_part) = match significand.find('.') {
            Some(i) => (&significand[..i], &significand[i + 1..]),
            None => (significand, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseDecimalError);
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseDecimalError);
        }
        let exponent: i64 = match exponent {
            Some(e) => parse_exponent(e)?,
            None => 0,
        };
        let scale = frac_part.len() as i64 - exponent;
        let scale = i32::try_from(scale).map_err(|_| ParseDecimalError)?;

        let mut digits = String::with_capacity(int_part.len() + frac_part.len() + 1);
        if negative {
            digits.push('-');
        }
        digits.push_str(int_part);
        digits.push_str(frac_part);
        let unscaled = BigInt::from_str(&digits).map_err(|_| ParseDecimalError)?;
        Ok(Decimal { unscaled, scale })
    }
}

fn parse_exponent(e: &str) -> Result<i64, ParseDecimalError> {
    let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseDecimalError);
    }
    e.parse().map_err(|_| ParseDecimalError)
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coefficient = self.unscaled.magnitude().to_string();
        if self.is_negative() {
            f.write_str("-")?;
        }
        let len = coefficient.len() as i64;
        let scale = self.scale as i64;
        let adjusted = -scale + (len - 1);

        if scale >= 0 && adjusted >= -6 {
            if scale == 0 {
                return f.write_str(&coefficient);
            }
            let scale = scale as usize;
            if coefficient.len() > scale {
                let (int_part, frac_part) = coefficient.split_at(coefficient.len() - scale);
                write!(f, "{}.{}", int_part, frac_part)
            } else {
                write!(
                    f,
                    "0.{}{}",
                    "0".repeat(scale - coefficient.len()),
                    coefficient
                )
            }
        } else {
            let (first, rest) = coefficient.split_at(1);
            f.write_str(first)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest)?;
            }
            if adjusted > 0 {
                write!(f, "E+{}", adjusted)
            } else {
                write!(f, "E{}", adjusted)
            }
        }
    }
}
