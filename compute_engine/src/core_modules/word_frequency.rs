// THEORY:
// Term frequency over already-extracted document text. Extraction (PDF, DOCX,
// plain files) is the caller's job; this engine sees a string.
//
// Normalization is a single pass per character:
//   - letters are lowercased (Unicode-aware, so 'É' becomes 'é'),
//   - of the lowercased output, letters, digits and whitespace are kept,
//   - everything else is deleted outright, which joins contractions ("don't"
//     counts as "dont").
// The normalized text is split on whitespace runs and every token is counted.

use crate::core_modules::errors::{ComputeError, ComputeResult};
use std::collections::HashMap;

/// Token → occurrence count. Keys are unique; iteration order is unspecified,
/// use `ranked()` for a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordFrequencyTable {
    counts: HashMap<String, usize>,
    total: usize,
}

impl WordFrequencyTable {
    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    pub fn total_tokens(&self) -> usize {
        self.total
    }

    pub fn distinct_tokens(&self) -> usize {
        self.counts.len()
    }

    /// Entries by descending count, ties by ascending token.
    pub fn ranked(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(token, &count)| (token.as_str(), count))
            .collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(token, &count)| (token.as_str(), count))
    }

}

/// Lowercases and strips everything that is not a letter, digit or whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

/// Counts normalized tokens. Fails with `EmptyInput` when nothing remains.
pub fn count_words(text: &str) -> ComputeResult<WordFrequencyTable> {
    let normalized = normalize(text);
    let mut table = WordFrequencyTable::default();
    for token in normalized.split_whitespace() {
        *table.counts.entry(token.to_string()).or_insert(0) += 1;
        table.total += 1;
    }

    if table.total == 0 {
        return Err(ComputeError::EmptyInput(
            "text contains no words after normalization".to_string(),
        ));
    }
    Ok(table)
}

#[cfg(feature = "serde")]
impl serde::Serialize for WordFrequencyTable {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::{SerializeMap, SerializeStruct};

        struct Ranked<'a>(&'a WordFrequencyTable);

        impl serde::Serialize for Ranked<'_> {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let ranked = self.0.ranked();
                let mut map = serializer.serialize_map(Some(ranked.len()))?;
                for (token, count) in ranked {
                    map.serialize_entry(token, &count)?;
                }
                map.end()
            }
        }

        let mut state = serializer.serialize_struct("WordFrequencyTable", 3)?;
        state.serialize_field("frequencies", &Ranked(self))?;
        state.serialize_field("total_tokens", &self.total)?;
        state.serialize_field("distinct_tokens", &self.counts.len())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn counts_case_insensitively_and_ignores_punctuation() {
        let table = count_words("The cat sat. The CAT ran!").unwrap();
        assert_eq!(table.get("the"), 2);
        assert_eq!(table.get("cat"), 2);
        assert_eq!(table.get("sat"), 1);
        assert_eq!(table.get("ran"), 1);
        assert_eq!(table.distinct_tokens(), 4);
        assert_eq!(table.total_tokens(), 6);
    }

    #[test]
    fn stripping_joins_contractions() {
        assert_eq!(normalize("Don't stop"), "dont stop");
        let table = count_words("don't DON'T dont").unwrap();
        assert_eq!(table.get("dont"), 3);
    }

    #[test]
    fn keeps_digits_and_unicode_letters() {
        let table = count_words("Café 2024 café, Straße\n2024").unwrap();
        assert_eq!(table.get("café"), 2);
        assert_eq!(table.get("2024"), 2);
        assert_eq!(table.get("straße"), 1);
    }

    #[test]
    fn lowercasing_never_leaves_combining_marks() {
        // 'İ' lowercases to 'i' followed by U+0307, which is not alphanumeric.
        let table = count_words("İstanbul istanbul").unwrap();
        assert_eq!(table.get("istanbul"), 2);
        assert_eq!(table.distinct_tokens(), 1);
        for (token, _) in table.iter() {
            assert!(token.chars().all(char::is_alphanumeric), "token {:?}", token);
        }
    }

    #[test]
    fn ranked_orders_by_count_then_token() {
        let table = count_words("b a c b a b").unwrap();
        assert_eq!(table.ranked(), vec![("b", 3), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn punctuation_only_is_empty_input() {
        for text in ["", "   \n\t", "!!! ... ---"] {
            assert_eq!(count_words(text).unwrap_err().kind(), ErrorKind::EmptyInput);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_in_ranked_order() {
        let table = count_words("b a b").unwrap();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"frequencies":{"b":2,"a":1},"total_tokens":3,"distinct_tokens":2}"#);
    }
}
