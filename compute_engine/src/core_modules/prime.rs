// THEORY:
// Two independent operations live here.
//
// 1. Primality (`is_prime`) is trial division on the 6k ± 1 wheel: after ruling
//    out 2 and 3, every prime is adjacent to a multiple of six, so only divisors
//    5, 7, 11, 13, 17, 19, ... up to ⌊√n⌋ are tried. Candidates that fit a `u64`
//    run on native integers (with `u128` for the i*i bound); anything larger runs
//    the same wheel on `BigUint`.
//
// 2. Enumeration (`primes_up_to`) is the sieve of Eratosthenes over a boolean
//    marker array of `limit + 1` entries. Memory is O(limit) by construction;
//    choosing a safe `limit` is the caller's job.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use crate::core_modules::numeric::NumericInput;
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

/// The verdict for a single candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrimeCheck {
    /// The candidate in canonical decimal form.
    pub n: String,
    pub is_prime: bool,
}

/// All primes up to and including `limit`, ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PrimeListing {
    pub limit: u64,
    pub primes: Vec<u64>,
    pub count: usize,
}

/// Trial-division primality test for arbitrarily large `n`.
pub fn is_prime(n: &BigUint) -> bool {
    match n.to_u64() {
        Some(small) => is_prime_u64(small),
        None => is_prime_big(n),
    }
}

/// Native 6k ± 1 wheel.
pub fn is_prime_u64(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let n_wide = n as u128;
    let mut i: u64 = 5;
    while (i as u128) * (i as u128) <= n_wide {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// The same wheel on big integers. Correct for every `n`, used for values
/// beyond `u64`.
pub fn is_prime_big(n: &BigUint) -> bool {
    let three = BigUint::from(3u32);
    if *n <= BigUint::from(1u32) {
        return false;
    }
    if *n <= three {
        return true;
    }
    if (n % 2u32).is_zero() || (n % 3u32).is_zero() {
        return false;
    }
    let bound = n.sqrt();
    let mut divisor = BigUint::from(5u32);
    while divisor <= bound {
        if (n % &divisor).is_zero() || (n % (&divisor + 2u32)).is_zero() {
            return false;
        }
        divisor += 6u32;
    }
    true
}

/// Sieve of Eratosthenes. Returns an empty list when `limit < 2`.
pub fn primes_up_to(limit: usize) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }

    let mut marker = vec![true; limit + 1];
    marker[0] = false;
    marker[1] = false;

    let mut i = 2usize;
    while i * i <= limit {
        if marker[i] {
            let mut multiple = i * i;
            while multiple <= limit {
                marker[multiple] = false;
                multiple += i;
            }
        }
        i += 1;
    }

    marker
        .iter()
        .enumerate()
        .filter(|(_, is_candidate)| **is_candidate)
        .map(|(index, _)| index as u64)
        .collect()
}

/// Parses `input` and tests it for primality.
pub fn check_primality(input: &NumericInput) -> ComputeResult<PrimeCheck> {
    let n = input.to_natural()?;
    Ok(PrimeCheck {
        is_prime: is_prime(&n),
        n: n.to_string(),
    })
}

/// Parses `input` as a sieve bound and lists the primes up to it.
pub fn primes_of(input: &NumericInput) -> ComputeResult<PrimeListing> {
    let limit = input.to_u64()?;
    // The marker array needs limit + 1 addressable entries.
    let addressable = usize::try_from(limit)
        .ok()
        .filter(|&value| value < isize::MAX as usize)
        .ok_or_else(|| {
            ComputeError::InvalidInput(format!("sieve limit {} exceeds addressable memory", limit))
        })?;
    let primes = primes_up_to(addressable);
    Ok(PrimeListing {
        limit,
        count: primes.len(),
        primes,
    })
}
