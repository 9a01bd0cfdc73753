// THEORY:
// The `engine` module is the top-level API of the library. It wraps the seven
// engines behind one uniform contract:
//
//     execute(Operation) -> Result<Outcome, ComputeError>
//
// `Operation` names an engine and carries its parameters; `Outcome` is the
// matching result. Every boundary (HTTP handlers, batch requests, the CLI)
// routes through `execute`, so parameter decoding and error classification
// happen in exactly one place. The dispatch is a plain `match`; engines never
// call each other.
//
// With the `serde` feature an `Operation` deserializes from the wire shape
// `{"operation": "<name>", ...params}` and an `Outcome` serializes as the bare
// result object.

use crate::core_modules::errors::ComputeResult;
use crate::core_modules::numeric::{NumericInput, Scalar};
use crate::core_modules::{factorial, fibonacci, grayscale, matrix, prime, sort, word_frequency};

// Re-export the result types for the public API.
pub use crate::core_modules::factorial::FactorialResult;
pub use crate::core_modules::fibonacci::FibonacciSeries;
pub use crate::core_modules::grayscale::{GrayscaleMethod, PixelBuffer};
pub use crate::core_modules::matrix::MatrixProduct;
pub use crate::core_modules::prime::{PrimeCheck, PrimeListing};
pub use crate::core_modules::sort::SortedNumbers;
pub use crate::core_modules::word_frequency::WordFrequencyTable;

/// A numeric list as it arrives: one delimited blob or individual tokens.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum NumberListInput {
    Text(String),
    Tokens(Vec<NumericToken>),
}

/// One element of a token list, kept as text until the sort engine parses it.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericToken(pub String);

impl NumberListInput {
    /// Number of tokens, without parsing them.
    pub fn token_count(&self) -> usize {
        match self {
            NumberListInput::Text(text) => crate::core_modules::numeric::split_tokens(text).count(),
            NumberListInput::Tokens(tokens) => tokens.len(),
        }
    }

    fn parse(&self) -> ComputeResult<Vec<Scalar>> {
        match self {
            NumberListInput::Text(text) => sort::parse_numeric_list(text),
            NumberListInput::Tokens(tokens) => {
                sort::parse_numeric_tokens(tokens.iter().map(|token| token.0.as_str()))
            }
        }
    }
}

/// A named computation with its parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "operation", rename_all = "snake_case"))]
pub enum Operation {
    Factorial {
        n: NumericInput,
    },
    Fibonacci {
        n: NumericInput,
    },
    IsPrime {
        n: NumericInput,
    },
    PrimesUpTo {
        limit: NumericInput,
    },
    MatrixMultiply {
        #[cfg_attr(feature = "serde", serde(rename = "matrixA"))]
        matrix_a: Vec<Vec<Scalar>>,
        #[cfg_attr(feature = "serde", serde(rename = "matrixB"))]
        matrix_b: Vec<Vec<Scalar>>,
    },
    WordFrequency {
        text: String,
    },
    Sort {
        numbers: NumberListInput,
    },
    Grayscale {
        #[cfg_attr(feature = "serde", serde(rename = "pixelBuffer"))]
        pixel_buffer: Vec<u8>,
        width: u32,
        height: u32,
        channels: u32,
        #[cfg_attr(feature = "serde", serde(default))]
        method: GrayscaleMethod,
    },
}

impl Operation {
    /// The stable wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Factorial { .. } => "factorial",
            Operation::Fibonacci { .. } => "fibonacci",
            Operation::IsPrime { .. } => "is_prime",
            Operation::PrimesUpTo { .. } => "primes_up_to",
            Operation::MatrixMultiply { .. } => "matrix_multiply",
            Operation::WordFrequency { .. } => "word_frequency",
            Operation::Sort { .. } => "sort",
            Operation::Grayscale { .. } => "grayscale",
        }
    }
}

/// The result of one `Operation`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Outcome {
    Factorial(FactorialResult),
    Fibonacci(FibonacciSeries),
    PrimeCheck(PrimeCheck),
    Primes(PrimeListing),
    Matrix(MatrixProduct),
    WordFrequency(WordFrequencyTable),
    Sorted(SortedNumbers),
    Grayscale(PixelBuffer),
}

/// Runs `operation` to completion on the calling thread.
pub fn execute(operation: Operation) -> ComputeResult<Outcome> {
    match operation {
        Operation::Factorial { n } => factorial::factorial_of(&n).map(Outcome::Factorial),
        Operation::Fibonacci { n } => fibonacci::fibonacci_of(&n).map(Outcome::Fibonacci),
        Operation::IsPrime { n } => prime::check_primality(&n).map(Outcome::PrimeCheck),
        Operation::PrimesUpTo { limit } => prime::primes_of(&limit).map(Outcome::Primes),
        Operation::MatrixMultiply { matrix_a, matrix_b } => {
            matrix::multiply_matrices(matrix_a, matrix_b).map(Outcome::Matrix)
        }
        Operation::WordFrequency { text } => {
            word_frequency::count_words(&text).map(Outcome::WordFrequency)
        }
        Operation::Sort { numbers } => {
            let values = numbers.parse()?;
            Ok(Outcome::Sorted(sort::sort_numbers(values)))
        }
        Operation::Grayscale {
            pixel_buffer,
            width,
            height,
            channels,
            method,
        } => grayscale::grayscale_of(pixel_buffer, width, height, channels, method)
            .map(Outcome::Grayscale),
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    use super::NumericToken;
    use serde::de::{self, Deserialize, Deserializer, Visitor};
    use std::fmt;

    struct NumericTokenVisitor;

    impl<'de> Visitor<'de> for NumericTokenVisitor {
        type Value = NumericToken;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a JSON value")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(NumericToken(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(NumericToken(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(NumericToken(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            // Whole floats keep their decimal point so they sort as decimals.
            let mut text = value.to_string();
            if value.is_finite() && !text.contains('.') {
                text.push_str(".0");
            }
            Ok(NumericToken(text))
        }

        // Non-numeric JSON values become tokens the sort engine rejects, so the
        // caller sees `MalformedNumericList` instead of a decoding failure.
        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(NumericToken(value.to_string()))
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(NumericToken("null".to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            self.visit_unit()
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(NumericToken("[array]".to_string()))
        }

        fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(NumericToken("{object}".to_string()))
        }
    }

    impl<'de> Deserialize<'de> for NumericToken {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(NumericTokenVisitor)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn dispatches_every_operation() {
        let cases = vec![
            Operation::Factorial { n: "5".into() },
            Operation::Fibonacci { n: "5".into() },
            Operation::IsPrime { n: "13".into() },
            Operation::PrimesUpTo { limit: "13".into() },
            Operation::MatrixMultiply {
                matrix_a: vec![vec![Scalar::Integer(2)]],
                matrix_b: vec![vec![Scalar::Integer(3)]],
            },
            Operation::WordFrequency { text: "a b a".into() },
            Operation::Sort { numbers: NumberListInput::Text("3 1 2".into()) },
            Operation::Grayscale {
                pixel_buffer: vec![30, 60, 90],
                width: 1,
                height: 1,
                channels: 3,
                method: GrayscaleMethod::Average,
            },
        ];

        let outcomes: Vec<Outcome> = cases.into_iter().map(|op| execute(op).unwrap()).collect();
        match &outcomes[0] {
            Outcome::Factorial(result) => assert_eq!(result.value, "120"),
            other => panic!("unexpected outcome {:?}", other),
        }
        match &outcomes[1] {
            Outcome::Fibonacci(series) => assert_eq!(series.nth.to_string(), "3"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(&outcomes[2], Outcome::PrimeCheck(check) if check.is_prime));
        assert!(matches!(&outcomes[3], Outcome::Primes(listing) if listing.count == 6));
        assert!(matches!(&outcomes[4], Outcome::Matrix(product) if product.matrix == vec![vec![Scalar::Integer(6)]]));
        assert!(matches!(&outcomes[5], Outcome::WordFrequency(table) if table.get("a") == 2));
        assert!(matches!(&outcomes[6], Outcome::Sorted(sorted) if sorted.len() == 3));
        assert!(matches!(&outcomes[7], Outcome::Grayscale(gray) if gray.as_bytes() == [60, 60, 60]));
    }

    #[test]
    fn errors_pass_through_unchanged() {
        let error = execute(Operation::Sort {
            numbers: NumberListInput::Tokens(vec![NumericToken("1".into()), NumericToken("x".into())]),
        })
        .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MalformedNumericList);

        let error = execute(Operation::Factorial { n: "-1".into() }).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(Operation::PrimesUpTo { limit: "1".into() }.name(), "primes_up_to");
        assert_eq!(Operation::WordFrequency { text: String::new() }.name(), "word_frequency");
    }

    #[test]
    fn token_count_does_not_parse() {
        assert_eq!(NumberListInput::Text("1, x,,3".into()).token_count(), 3);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_wire_operations() {
        let op: Operation =
            serde_json::from_str(r#"{"operation":"factorial","n":"20"}"#).unwrap();
        assert_eq!(op, Operation::Factorial { n: "20".into() });

        let op: Operation = serde_json::from_str(
            r#"{"operation":"matrix_multiply","matrixA":[[1,2]],"matrixB":[[3],[4.5]]}"#,
        )
        .unwrap();
        assert!(matches!(op, Operation::MatrixMultiply { .. }));

        let op: Operation =
            serde_json::from_str(r#"{"operation":"sort","numbers":[3, "1", 2.0]}"#).unwrap();
        match execute(op).unwrap() {
            Outcome::Sorted(sorted) => assert_eq!(sorted.ascending[0], Scalar::Decimal(1.0)),
            other => panic!("unexpected outcome {:?}", other),
        }

        for numbers in ["[1, null, 3]", "[1, true]", "[1, [2]]", r#"[{"n": 1}]"#] {
            let op: Operation =
                serde_json::from_str(&format!(r#"{{"operation":"sort","numbers":{}}}"#, numbers))
                    .unwrap();
            let error = execute(op).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::MalformedNumericList, "numbers {}", numbers);
        }

        let op: Operation = serde_json::from_str(
            r#"{"operation":"grayscale","pixelBuffer":[0,255,0],"width":1,"height":1,"channels":3,"method":"luma"}"#,
        )
        .unwrap();
        assert!(matches!(op, Operation::Grayscale { method: GrayscaleMethod::Luma, .. }));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn outcomes_serialize_as_bare_results() {
        let outcome = execute(Operation::Fibonacci { n: "4".into() }).unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"terms": ["0", "1", "1", "2"], "nth": "2"})
        );

        let outcome = execute(Operation::Grayscale {
            pixel_buffer: vec![30, 60, 90],
            width: 1,
            height: 1,
            channels: 3,
            method: GrayscaleMethod::Average,
        })
        .unwrap();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"width": 1, "height": 1, "channels": 3, "pixelBuffer": [60, 60, 60]})
        );
    }
}
