// THEORY:
// This file is the entry point for the `compute_engine` library crate. It exposes
// seven independent, stateless engines (factorial, Fibonacci, primes, matrix
// multiplication, word frequency, sorting and grayscale conversion) plus the thin
// `engine` dispatch layer that routes a named `Operation` to the matching engine.
//
// Every operation is a pure function of its inputs: it allocates its own working
// memory, returns a value or exactly one `ComputeError`, and keeps nothing alive
// afterwards. That makes the whole crate safe to call from any number of threads
// without locking; scheduling, timeouts and size limits belong to the caller
// (see `compute_server`, and `limits` for the optional admission guard).

pub mod core_modules;
pub mod engine;
pub mod limits;

pub use core_modules::errors::{ComputeError, ComputeResult, ErrorKind};
pub use core_modules::numeric::{NumericInput, Scalar};
pub use engine::{Operation, Outcome, execute};
pub use limits::{LimitError, Limits};
