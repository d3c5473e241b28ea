//! Name key normalization.
//!
//! The same folding is applied to corpus names at build time and to every
//! prefix a caller passes in, so "Ann", " ann" and "ANN" all address the
//! same node and no two nodes differ only by case. Keys are kept in NFC so a
//! precomposed "é" and "e" plus U+0301 fold to the same key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::BuildError;
use crate::types::NameRecord;

/// Punctuation allowed inside a name besides letters and single spaces.
const NAME_PUNCTUATION: [char; 4] = ['\'', '\u{2019}', '-', '.'];

/// Folds a raw name or query into index key form: NFC, trimmed, whitespace
/// runs collapsed to one space, lowercased.
pub fn normalize_key(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !folded.is_empty() {
            folded.push(' ');
        }
        folded.extend(word.nfc().flat_map(char::to_lowercase));
    }
    // Lowercasing can split a letter into base plus mark ("İ" -> "i\u{307}").
    folded.nfc().collect()
}

/// Checks a normalized key against the name policy.
///
/// Combining marks are accepted when they follow a letter or another mark.
/// Returns the key length in characters, or the reason it was rejected.
pub fn validate_key(key: &str, max_length: usize) -> Result<usize, String> {
    if key.is_empty() {
        return Err("name is empty".to_string());
    }
    let mut length = 0;
    let mut after_letter = false;
    for c in key.chars() {
        if is_combining_mark(c) {
            if !after_letter {
                return Err(format!("combining mark {c:?} without a base letter"));
            }
        } else if c.is_alphabetic() {
            after_letter = true;
        } else if c == ' ' || NAME_PUNCTUATION.contains(&c) {
            after_letter = false;
        } else {
            return Err(format!("disallowed character {c:?}"));
        }
        length += 1;
    }
    if length > max_length {
        return Err(format!("name is {length} characters, limit is {max_length}"));
    }
    Ok(length)
}

/// A corpus record with its validated index key.
#[derive(Debug, Clone)]
pub(crate) struct NormalizedRecord {
    pub key: String,
    pub length: usize,
    pub record: NameRecord,
}

/// Normalizes and validates one corpus record.
pub(crate) fn normalize_record(
    record: NameRecord,
    max_length: usize,
) -> Result<NormalizedRecord, BuildError> {
    if !record.popularity.is_finite() {
        return Err(BuildError::InvalidPopularity {
            id: record.id,
            value: record.popularity,
        });
    }
    let key = normalize_key(&record.name);
    let length = validate_key(&key, max_length).map_err(|reason| BuildError::InvalidName {
        id: record.id,
        name: record.name.clone(),
        reason,
    })?;
    Ok(NormalizedRecord {
        key,
        length,
        record: NameRecord {
            origin_country: normalize_origin(record.origin_country.as_deref()),
            ..record
        },
    })
}

/// Trims an origin country and drops blank values.
pub fn normalize_origin(origin: Option<&str>) -> Option<String> {
    origin
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;

    #[test]
    fn folds_case_and_whitespace() {
        assert_eq!(normalize_key("  Mary   Jane "), "mary jane");
        assert_eq!(normalize_key("ÉLODIE"), "élodie");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn folds_decomposed_accents_to_composed_form() {
        assert_eq!(normalize_key("Jose\u{301}"), "jos\u{e9}");
        assert_eq!(normalize_key("JOS\u{c9}"), "jos\u{e9}");
        assert_eq!(normalize_key("\u{130}lker"), "i\u{307}lker");
    }

    #[test]
    fn accepts_combining_marks_after_letters_only() {
        assert_eq!(validate_key("i\u{307}lker", 50), Ok(6));
        assert_eq!(validate_key("a\u{301}\u{308}", 50), Ok(3));
        assert!(validate_key("\u{301}a", 50).is_err());
        assert!(validate_key("ann-\u{301}", 50).is_err());
    }

    #[test]
    fn accepts_letters_and_name_punctuation() {
        assert_eq!(validate_key("o'brien", 50), Ok(7));
        assert_eq!(validate_key("anne-marie", 50), Ok(10));
        assert_eq!(validate_key("zoë", 50), Ok(3));
    }

    #[test]
    fn rejects_digits_symbols_and_overlong_names() {
        assert!(validate_key("", 50).is_err());
        assert!(validate_key("ann3", 50).is_err());
        assert!(validate_key("a_b", 50).is_err());
        assert!(validate_key("abcdef", 5).is_err());
    }

    #[test]
    fn normalize_record_reports_offending_record() {
        let record = NameRecord::new(9, "R2D2", Gender::Neutral, 0.1);
        match normalize_record(record, 50) {
            Err(BuildError::InvalidName { id, name, .. }) => {
                assert_eq!(id.0, 9);
                assert_eq!(name, "R2D2");
            }
            other => panic!("expected InvalidName, got {other:?}"),
        }
    }

    #[test]
    fn normalize_record_rejects_non_finite_popularity() {
        let record = NameRecord::new(4, "Ava", Gender::Female, f64::NAN);
        assert!(matches!(
            normalize_record(record, 50),
            Err(BuildError::InvalidPopularity { .. })
        ));
    }

    #[test]
    fn blank_origins_are_dropped() {
        let record = NameRecord::new(1, "Ava", Gender::Female, 0.5).with_origin("  ");
        let normalized = normalize_record(record, 50).unwrap();
        assert_eq!(normalized.key, "ava");
        assert_eq!(normalized.record.origin_country, None);
    }
}
