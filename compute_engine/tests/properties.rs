//! Property-based tests for the engines' algebraic guarantees.

use proptest::prelude::*;

use compute_engine::core_modules::factorial::factorial;
use compute_engine::core_modules::fibonacci::fibonacci_series;
use compute_engine::core_modules::grayscale::{GrayscaleMethod, grayscale_of};
use compute_engine::core_modules::matrix::{Matrix, multiply_matrices};
use compute_engine::core_modules::prime::{is_prime_big, is_prime_u64, primes_up_to};
use compute_engine::core_modules::sort::{sort_numbers, sort_text};
use compute_engine::core_modules::word_frequency::count_words;
use compute_engine::{ErrorKind, Scalar};
use num_bigint::BigUint;

fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(-1000i64..1000, cols), rows)
}

fn scalars(rows: &[Vec<i64>]) -> Vec<Vec<Scalar>> {
    rows.iter()
        .map(|row| row.iter().map(|&v| Scalar::Integer(v)).collect())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn factorial_recurrence(n in 1u64..300) {
        prop_assert_eq!(factorial(n), factorial(n - 1) * n);
    }

    #[test]
    fn fibonacci_recurrence(n in 3usize..400) {
        let series = fibonacci_series(n).unwrap();
        prop_assert_eq!(series.terms.len(), n);
        for i in 2..n {
            prop_assert_eq!(&series.terms[i], &(&series.terms[i - 1] + &series.terms[i - 2]));
        }
    }

    #[test]
    fn big_and_native_primality_agree(n in 0u64..200_000) {
        prop_assert_eq!(is_prime_big(&BigUint::from(n)), is_prime_u64(n));
    }

    #[test]
    fn sieve_matches_trial_division(limit in 0usize..3000) {
        let expected: Vec<u64> = (0..=limit as u64).filter(|&n| is_prime_u64(n)).collect();
        prop_assert_eq!(primes_up_to(limit), expected);
    }

    #[test]
    fn product_shape_and_cells(
        (a, b) in (1usize..6, 1usize..6, 1usize..6)
            .prop_flat_map(|(m, k, n)| (matrix_strategy(m, k), matrix_strategy(k, n)))
    ) {
        let product = multiply_matrices(scalars(&a), scalars(&b)).unwrap();
        prop_assert_eq!(product.rows, a.len());
        prop_assert_eq!(product.cols, b[0].len());
        for i in 0..product.rows {
            for j in 0..product.cols {
                let dot: i64 = (0..b.len()).map(|k| a[i][k] * b[k][j]).sum();
                prop_assert_eq!(product.matrix[i][j], Scalar::Integer(dot));
            }
        }
    }

    #[test]
    fn mismatched_inner_dimensions_always_fail(
        a in matrix_strategy(2, 3),
        b_rows in (1usize..6).prop_filter("inner dimension must differ", |rows| *rows != 3),
    ) {
        let b = vec![vec![1i64; 2]; b_rows];
        let error = multiply_matrices(scalars(&a), scalars(&b)).unwrap_err();
        prop_assert_eq!(error.kind(), ErrorKind::DimensionMismatch);
    }

    #[test]
    fn identity_is_neutral(rows in matrix_strategy(4, 4)) {
        let matrix = Matrix::from_rows(rows).unwrap();
        let identity = Matrix::<i64>::identity(4).unwrap();
        prop_assert_eq!(matrix.multiply(&identity).unwrap(), matrix.clone());
        prop_assert_eq!(identity.multiply(&matrix).unwrap(), matrix);
    }

    #[test]
    fn sort_preserves_length_and_is_idempotent(values in prop::collection::vec(any::<i64>(), 0..200)) {
        let text = values.iter().map(i64::to_string).collect::<Vec<_>>().join(", ");
        let sorted = sort_text(&text).unwrap();
        prop_assert_eq!(sorted.len(), values.len());
        prop_assert!(sorted.ascending.windows(2).all(|w| w[0].as_f64() <= w[1].as_f64()));

        let again = sort_numbers(sorted.ascending.clone());
        prop_assert_eq!(&again.ascending, &sorted.ascending);

        let mut reversed = sorted.descending.clone();
        reversed.reverse();
        prop_assert_eq!(reversed, sorted.ascending);
    }

    #[test]
    fn word_counts_sum_to_total(words in prop::collection::vec("[a-zA-Z]{1,8}", 1..50)) {
        let table = count_words(&words.join(" ")).unwrap();
        prop_assert_eq!(table.total_tokens(), words.len());
        let summed: usize = table.iter().map(|(_, count)| count).sum();
        prop_assert_eq!(summed, words.len());
    }

    #[test]
    fn grayscale_preserves_alpha_and_equalises_channels(
        pixels in prop::collection::vec(any::<[u8; 4]>(), 1..64)
    ) {
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        let width = pixels.len() as u32;
        let gray = grayscale_of(data, width, 1, 4, GrayscaleMethod::Average).unwrap();
        for (out, original) in gray.as_bytes().chunks_exact(4).zip(&pixels) {
            let expected = ((original[0] as u16 + original[1] as u16 + original[2] as u16) / 3) as u8;
            prop_assert_eq!(out, &[expected, expected, expected, original[3]][..]);
        }
    }
}
