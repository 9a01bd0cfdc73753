// THEORY:
// The series uses the F1 = 0, F2 = 1 convention, so position n is the n-th term
// of 0, 1, 1, 2, 3, 5, ... Terms are produced by a single forward pass that keeps
// only the last two values; every term is computed exactly once. Positions in the
// thousands produce numbers hundreds of digits long, so terms are `BigUint`.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use crate::core_modules::numeric::NumericInput;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// The first `n` Fibonacci numbers and the value at position `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FibonacciSeries {
    #[cfg_attr(
        feature = "serde",
        serde(serialize_with = "crate::core_modules::numeric::decimal_text::serialize_seq")
    )]
    pub terms: Vec<BigUint>,
    #[cfg_attr(
        feature = "serde",
        serde(serialize_with = "crate::core_modules::numeric::decimal_text::serialize")
    )]
    pub nth: BigUint,
}

impl FibonacciSeries {
    /// The requested position (equal to the number of terms).
    pub fn position(&self) -> usize {
        self.terms.len()
    }
}

/// Generates F1..=Fn.
pub fn fibonacci_series(n: usize) -> ComputeResult<FibonacciSeries> {
    if n < 1 {
        return Err(ComputeError::InvalidInput(
            "Fibonacci position must be at least 1".to_string(),
        ));
    }

    let mut terms = Vec::new();
    terms.try_reserve_exact(n).map_err(|_| {
        ComputeError::InvalidInput(format!("Fibonacci position {} is too large to hold in memory", n))
    })?;
    let mut previous = BigUint::zero();
    let mut current = BigUint::one();
    for _ in 0..n {
        let next = &previous + &current;
        terms.push(std::mem::replace(&mut previous, std::mem::replace(&mut current, next)));
    }

    let nth = terms.last().cloned().unwrap_or_default();
    Ok(FibonacciSeries { terms, nth })
}

/// Parses `input` as a position and generates the series.
pub fn fibonacci_of(input: &NumericInput) -> ComputeResult<FibonacciSeries> {
    fibonacci_series(input.to_usize()?)
}
