// THEORY:
// Numeric inputs arrive as text: form fields, query strings, JSON values, file
// contents. This module is the single place where that text becomes a number.
//
// Two representations cover every engine:
// - `NumericInput` keeps the caller's original text and converts it on demand to
//   an unbounded `BigUint` (factorial argument, primality candidate, sieve bound)
//   or to a fixed-width integer where the operation can never need more.
// - `Scalar` is a single matrix or list element. Integers stay exact (`i64`),
//   anything written with a fraction or exponent is a finite `f64`. Engines that
//   mix the two promote everything to `f64`. An integer too wide for `i64` is
//   read as a `Decimal`, so it promotes its whole list or matrix and keeps only
//   `f64` precision.
//
// Parsing never guesses: a negative, fractional or non-numeric value is an
// `InvalidInput` with a message naming the offending text.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use std::fmt;

/// A non-negative integer supplied as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericInput(String);

impl NumericInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the text as an unbounded natural number.
    pub fn to_natural(&self) -> ComputeResult<BigUint> {
        parse_natural(&self.0)
    }

    pub fn to_u64(&self) -> ComputeResult<u64> {
        let value = self.to_natural()?;
        value.to_u64().ok_or_else(|| {
            ComputeError::InvalidInput(format!("{} is too large (maximum {})", value, u64::MAX))
        })
    }

    pub fn to_usize(&self) -> ComputeResult<usize> {
        let value = self.to_natural()?;
        value.to_usize().ok_or_else(|| {
            ComputeError::InvalidInput(format!("{} is too large (maximum {})", value, usize::MAX))
        })
    }
}

impl fmt::Display for NumericInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NumericInput {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for NumericInput {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<u64> for NumericInput {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

/// A syntactically valid decimal numeral, split but not yet evaluated.
struct Numeral<'a> {
    negative: bool,
    whole: &'a str,
    fraction: &'a str,
}

impl<'a> Numeral<'a> {
    fn split(trimmed: &'a str) -> Option<Self> {
        let (negative, unsigned) = match trimmed.as_bytes().first()? {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
            return None;
        }
        Some(Numeral { negative, whole, fraction })
    }

    fn significant(&self) -> &'a str {
        self.whole.trim_start_matches('0')
    }

    fn has_fraction(&self) -> bool {
        self.fraction.bytes().any(|b| b != b'0')
    }

    /// Negative zero (`-0`, `-0.00`) is still zero.
    fn is_negative(&self) -> bool {
        self.negative && (!self.significant().is_empty() || self.has_fraction())
    }
}

impl NumericInput {
    /// Decimal digits of the value, counted from the text without building it.
    /// `None` when the text is not a natural number.
    pub fn significant_digits(&self) -> Option<usize> {
        let numeral = Numeral::split(self.0.trim())?;
        if numeral.is_negative() || numeral.has_fraction() {
            return None;
        }
        Some(numeral.significant().len().max(1))
    }
}

fn parse_natural(text: &str) -> ComputeResult<BigUint> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ComputeError::InvalidInput("missing numeric value".to_string()));
    }

    let numeral = Numeral::split(trimmed)
        .ok_or_else(|| ComputeError::InvalidInput(format!("'{}' is not a number", trimmed)))?;
    if numeral.is_negative() {
        return Err(ComputeError::InvalidInput(format!("{} is negative", trimmed)));
    }
    if numeral.has_fraction() {
        return Err(ComputeError::InvalidInput(format!("{} is not an integer", trimmed)));
    }

    let digits = numeral.significant();
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| ComputeError::InvalidInput(format!("'{}' is not a number", trimmed)))
}

/// One element of a matrix or numeric list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Integer(i64),
    Decimal(f64),
}

impl Scalar {
    /// Parses a single token. Integers that fit `i64` stay exact; everything else
    /// must be a finite decimal.
    pub fn parse(token: &str) -> Option<Scalar> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Ok(integer) = token.parse::<i64>() {
            return Some(Scalar::Integer(integer));
        }
        // Rust's float grammar also accepts "inf" and "nan".
        if !token.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        token
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Scalar::Decimal)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Scalar::Integer(value) => value as f64,
            Scalar::Decimal(value) => value,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Scalar::Integer(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{}", value),
            Scalar::Decimal(value) => write!(f, "{}", value),
        }
    }
}

/// Splits a delimited blob on commas and whitespace runs, dropping empty pieces.
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::{NumericInput, Scalar};
    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use serde::ser::{Serialize, Serializer};
    use std::fmt;

    impl Serialize for NumericInput {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.0)
        }
    }

    struct NumericInputVisitor;

    impl<'de> Visitor<'de> for NumericInputVisitor {
        type Value = NumericInput;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a string containing a number")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(NumericInput::new(value))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(NumericInput(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(NumericInput(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(NumericInput(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            // Keep the decimal point so "5.0" stays distinguishable from "5".
            let mut text = value.to_string();
            if value.is_finite() && !text.contains('.') {
                text.push_str(".0");
            }
            Ok(NumericInput(text))
        }
    }

    impl<'de> Deserialize<'de> for NumericInput {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(NumericInputVisitor)
        }
    }

    impl Serialize for Scalar {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match *self {
                Scalar::Integer(value) => serializer.serialize_i64(value),
                Scalar::Decimal(value) => serializer.serialize_f64(value),
            }
        }
    }

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = Scalar;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a finite number")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Scalar::Integer(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            i64::try_from(value)
                .map(Scalar::Integer)
                .map_err(|_| E::custom(format!("integer {} is out of range", value)))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if value.is_finite() {
                Ok(Scalar::Decimal(value))
            } else {
                Err(E::custom("number must be finite"))
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Scalar::parse(value).ok_or_else(|| E::custom(format!("'{}' is not a number", value)))
        }
    }

    impl<'de> Deserialize<'de> for Scalar {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(ScalarVisitor)
        }
    }
}

/// Serializes big integers as decimal strings so no JSON reader truncates them.
#[cfg(feature = "serde")]
pub(crate) mod decimal_text {
    use num_bigint::BigUint;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn serialize_seq<S: Serializer>(
        values: &[BigUint],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|value| value.to_string()))
    }
}
