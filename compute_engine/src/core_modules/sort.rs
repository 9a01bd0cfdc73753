// THEORY:
// Sorts a numeric list both ways. Input is usually a delimited blob ("5, 3,5 1"),
// sometimes an already-split token list; both funnel through `Scalar::parse`, and
// one bad token rejects the whole list.
//
// If every value is an integer the sort runs over `i64` and is exact. Otherwise
// every value is promoted to `f64` and ordered by `f64::total_cmp`; `nan` and
// `inf` never get this far because `Scalar::parse` refuses them.
//
// Descending is the ascending result reversed, so both outputs always hold the
// same multiset.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use crate::core_modules::numeric::{Scalar, split_tokens};

/// The same values in both orders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SortedNumbers {
    pub ascending: Vec<Scalar>,
    pub descending: Vec<Scalar>,
}

impl SortedNumbers {
    pub fn len(&self) -> usize {
        self.ascending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ascending.is_empty()
    }
}

/// Parses a comma and/or whitespace delimited blob.
pub fn parse_numeric_list(text: &str) -> ComputeResult<Vec<Scalar>> {
    parse_numeric_tokens(split_tokens(text))
}

/// Parses individual tokens, failing on the first one that is not a number.
pub fn parse_numeric_tokens<'a>(
    tokens: impl IntoIterator<Item = &'a str>,
) -> ComputeResult<Vec<Scalar>> {
    tokens
        .into_iter()
        .enumerate()
        .map(|(index, token)| {
            Scalar::parse(token).ok_or_else(|| {
                ComputeError::MalformedNumericList(format!(
                    "token {} ('{}') is not a number",
                    index,
                    token.trim()
                ))
            })
        })
        .collect()
}

/// Sorts ascending and descending. An empty list yields two empty lists.
pub fn sort_numbers(values: Vec<Scalar>) -> SortedNumbers {
    let ascending: Vec<Scalar> = if values.iter().all(|value| value.is_integer()) {
        let mut integers: Vec<i64> = values
            .into_iter()
            .filter_map(|value| match value {
                Scalar::Integer(integer) => Some(integer),
                Scalar::Decimal(_) => None,
            })
            .collect();
        integers.sort_unstable();
        integers.into_iter().map(Scalar::Integer).collect()
    } else {
        let mut decimals: Vec<f64> = values.into_iter().map(Scalar::as_f64).collect();
        decimals.sort_unstable_by(f64::total_cmp);
        decimals.into_iter().map(Scalar::Decimal).collect()
    };

    let descending = ascending.iter().rev().copied().collect();
    SortedNumbers { ascending, descending }
}

/// Parses a blob and sorts it.
pub fn sort_text(text: &str) -> ComputeResult<SortedNumbers> {
    Ok(sort_numbers(parse_numeric_list(text)?))
}
