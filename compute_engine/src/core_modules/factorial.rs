// THEORY:
// n! outgrows every native integer almost immediately (21! > u64::MAX), so the
// accumulator is an unbounded `BigUint` from the start. The algorithm is the plain
// iterative product 2 * 3 * ... * n; each step multiplies the accumulator by a
// machine word, which `num-bigint` does in a single linear pass.
//
// Large n is slow, not wrong. Bounding it is the caller's decision (see
// `crate::limits`), never this engine's.

use crate::core_modules::errors::ComputeResult;
use crate::core_modules::numeric::NumericInput;
use num_bigint::BigUint;
use num_traits::One;

/// The exact value of n! with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FactorialResult {
    pub n: u64,
    /// Decimal representation of n!.
    pub value: String,
    /// Number of decimal digits in `value`.
    pub digits: usize,
}

/// Computes n! by iterative accumulation.
pub fn factorial(n: u64) -> BigUint {
    let mut accumulator = BigUint::one();
    for factor in 2..=n {
        accumulator *= factor;
    }
    accumulator
}

/// Parses `input` and computes its factorial as a decimal string.
pub fn factorial_of(input: &NumericInput) -> ComputeResult<FactorialResult> {
    let n = input.to_u64()?;
    let value = factorial(n).to_string();
    Ok(FactorialResult {
        n,
        digits: value.len(),
        value,
    })
}
