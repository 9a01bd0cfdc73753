// THEORY:
// The engines never refuse work for being large; a factorial of ten million is
// slow, not wrong. Boundaries that serve untrusted callers still need to say no
// up front, so `Limits` is a caller-side admission check run before `execute`.
//
// `admit` looks only at the cheap-to-measure size of an operation (a digit
// count, a cell count, a byte length) and costs time linear in the request. It
// never parses more than it needs, and an argument that does not parse at all
// is admitted: the engine will reject it with the proper `ComputeError` kind.

use crate::core_modules::numeric::NumericInput;
use crate::engine::Operation;
use thiserror::Error;

/// Decimal digits in `u64::MAX`.
const U64_DIGITS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitError {
    #[error("{operation} request too large: {detail}")]
    Exceeded {
        operation: &'static str,
        detail: String,
    },
}

/// Upper bounds applied before an operation is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_factorial_n: u64,
    pub max_fibonacci_n: u64,
    pub max_prime_limit: u64,
    /// Decimal digits of a primality candidate. Trial division is O(√n), so
    /// this bounds the running time.
    pub max_prime_check_digits: usize,
    /// Cells per matrix operand.
    pub max_matrix_cells: usize,
    pub max_sort_len: usize,
    pub max_text_bytes: usize,
    /// width × height of a pixel buffer.
    pub max_pixels: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_factorial_n: 100_000,
            max_fibonacci_n: 100_000,
            max_prime_limit: 50_000_000,
            max_prime_check_digits: 20,
            max_matrix_cells: 1_000_000,
            max_sort_len: 5_000_000,
            max_text_bytes: 32 * 1024 * 1024,
            max_pixels: 50_000_000,
        }
    }
}

impl Limits {
    /// Admits everything.
    pub fn unbounded() -> Self {
        Self {
            max_factorial_n: u64::MAX,
            max_fibonacci_n: u64::MAX,
            max_prime_limit: u64::MAX,
            max_prime_check_digits: usize::MAX,
            max_matrix_cells: usize::MAX,
            max_sort_len: usize::MAX,
            max_text_bytes: usize::MAX,
            max_pixels: u64::MAX,
        }
    }

    pub fn admit(&self, operation: &Operation) -> Result<(), LimitError> {
        let name = operation.name();
        let exceeded = |detail: String| -> Result<(), LimitError> {
            Err(LimitError::Exceeded { operation: name, detail })
        };

        match operation {
            Operation::Factorial { n } => match magnitude(n) {
                Some(value) if value > self.max_factorial_n => {
                    exceeded(format!("n = {} exceeds {}", value, self.max_factorial_n))
                }
                _ => Ok(()),
            },
            Operation::Fibonacci { n } => match magnitude(n) {
                Some(value) if value > self.max_fibonacci_n => {
                    exceeded(format!("n = {} exceeds {}", value, self.max_fibonacci_n))
                }
                _ => Ok(()),
            },
            Operation::IsPrime { n } => match n.significant_digits() {
                Some(digits) if digits > self.max_prime_check_digits => exceeded(format!(
                    "candidate has {} digits, maximum is {}",
                    digits, self.max_prime_check_digits
                )),
                _ => Ok(()),
            },
            Operation::PrimesUpTo { limit } => match magnitude(limit) {
                Some(value) if value > self.max_prime_limit => {
                    exceeded(format!("limit = {} exceeds {}", value, self.max_prime_limit))
                }
                _ => Ok(()),
            },
            Operation::MatrixMultiply { matrix_a, matrix_b } => {
                for (label, rows) in [("A", matrix_a), ("B", matrix_b)] {
                    let cells: usize = rows.iter().map(Vec::len).sum();
                    if cells > self.max_matrix_cells {
                        return exceeded(format!(
                            "matrix {} has {} cells, maximum is {}",
                            label, cells, self.max_matrix_cells
                        ));
                    }
                }
                Ok(())
            }
            Operation::WordFrequency { text } => {
                if text.len() > self.max_text_bytes {
                    exceeded(format!(
                        "text is {} bytes, maximum is {}",
                        text.len(),
                        self.max_text_bytes
                    ))
                } else {
                    Ok(())
                }
            }
            Operation::Sort { numbers } => {
                let count = numbers.token_count();
                if count > self.max_sort_len {
                    exceeded(format!("{} values, maximum is {}", count, self.max_sort_len))
                } else {
                    Ok(())
                }
            }
            Operation::Grayscale { width, height, .. } => {
                let pixels = *width as u64 * *height as u64;
                if pixels > self.max_pixels {
                    exceeded(format!(
                        "{}x{} is {} pixels, maximum is {}",
                        width, height, pixels, self.max_pixels
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// The argument as a `u64`, saturating for larger naturals; `None` if it does
/// not parse. Arguments wider than `u64` are never materialized.
fn magnitude(input: &NumericInput) -> Option<u64> {
    if input.significant_digits()? > U64_DIGITS {
        return Some(u64::MAX);
    }
    input
        .to_natural()
        .ok()
        .map(|value| u64::try_from(value).unwrap_or(u64::MAX))
}
