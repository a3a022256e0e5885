//! Multi-key record ordering.
//!
//! Keys come from the column spec, primary key first. Each key compares one
//! field or a span of fields left to right, and the first difference decides.

use std::cmp::Ordering;

use crate::error::{PipelineError, Result};
use crate::range::{FieldRange, TypeHint};
use crate::record::Record;

/// Byte-wise order over the shared prefix, then shorter first.
pub fn compare_strings(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

/// Numeric order with a text fallback.
///
/// Both operands are trimmed and parsed as `f64`:
///
/// | `a` parses | `b` parses | result |
/// |---|---|---|
/// | no | no | [`compare_strings`] on the raw text |
/// | no | yes | `Less` |
/// | yes | no | `Greater` |
/// | yes | yes | numeric comparison |
///
/// The failing side always sorts first.
///
/// `NaN` parses as an `f64` but is treated here as a failed parse, so
/// `"NaN"` sorts before every number instead of comparing equal to all of
/// them. That keeps the order total, which `sort_unstable_by` requires.
pub fn compare_numeric(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (None, None) => compare_strings(a, b),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Trimmed `f64` parse. `NaN` is rejected.
fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Compare two field values under a type hint.
pub fn compare_fields(a: &str, b: &str, hint: TypeHint) -> Ordering {
    match hint {
        TypeHint::String => compare_strings(a, b),
        TypeHint::Numeric => compare_numeric(a, b),
    }
}

/// Orders records by an ordered list of key ranges.
///
/// With no keys, whole records are compared field by field as text, and a
/// record that is a prefix of another sorts first.
#[derive(Debug, Clone)]
pub struct RecordComparator {
    keys: Vec<FieldRange>,
    reverse: bool,
}

impl RecordComparator {
    pub fn new(keys: Vec<FieldRange>) -> Self {
        Self {
            keys,
            reverse: false,
        }
    }

    /// Invert the comparison sense. Ties stay ties.
    #[must_use]
    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn keys(&self) -> &[FieldRange] {
        &self.keys
    }

    /// Check that every key field exists in `record`.
    ///
    /// [`compare`](Self::compare) indexes fields directly, so the sort engine
    /// runs this over every record before ordering them.
    pub fn check(&self, record: &Record) -> Result<()> {
        for key in &self.keys {
            if key.last() >= record.len() {
                let index = if key.start >= record.len() {
                    key.start
                } else {
                    key.last()
                };
                return Err(PipelineError::field_index(index, record.len()));
            }
        }
        Ok(())
    }

    /// Compare two records that have passed [`check`](Self::check).
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = if self.keys.is_empty() {
            compare_whole(a, b)
        } else {
            self.compare_keys(a, b)
        };
        if self.reverse { ord.reverse() } else { ord }
    }

    fn compare_keys(&self, a: &Record, b: &Record) -> Ordering {
        let (fa, fb) = (a.fields(), b.fields());
        for key in &self.keys {
            for i in key.start..=key.last() {
                let ord = compare_fields(&fa[i], &fb[i], key.hint);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
        Ordering::Equal
    }
}

fn compare_whole(a: &Record, b: &Record) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| compare_strings(x, y))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or_else(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(fields: &[&str]) -> Record {
        Record::from_fields(fields.iter().copied())
    }

    #[test]
    fn test_string_prefix_sorts_first() {
        assert_eq!(compare_strings("ab", "abc"), Ordering::Less);
        assert_eq!(compare_strings("abc", "ab"), Ordering::Greater);
        assert_eq!(compare_strings("abc", "abc"), Ordering::Equal);
        assert_eq!(compare_strings("B", "a"), Ordering::Less);
    }

    #[test]
    fn test_numeric_order() {
        let mut values = vec!["10", "9", "2"];
        values.sort_by(|a, b| compare_numeric(a, b));
        assert_eq!(values, vec!["2", "9", "10"]);

        let mut lexical = vec!["10", "9", "2"];
        lexical.sort_by(|a, b| compare_strings(a, b));
        assert_eq!(lexical, vec!["10", "2", "9"]);
    }

    #[test]
    fn test_numeric_equal_formatting() {
        assert_eq!(compare_numeric("2.0", "2"), Ordering::Equal);
        assert_eq!(compare_numeric(" 3 ", "3"), Ordering::Equal);
        assert_eq!(compare_numeric("-0", "0"), Ordering::Equal);
    }

    #[test]
    fn test_unparsable_sorts_first() {
        assert_eq!(compare_numeric("abc", "5"), Ordering::Less);
        assert_eq!(compare_numeric("5", "abc"), Ordering::Greater);
    }

    #[test]
    fn test_both_unparsable_falls_back_to_text() {
        assert_eq!(compare_numeric("abc", "def"), Ordering::Less);
        assert_eq!(compare_numeric("def", "abc"), Ordering::Greater);
    }

    #[test]
    fn test_nan_is_unparsable() {
        assert_eq!(compare_numeric("NaN", "1"), Ordering::Less);
        assert_eq!(compare_numeric("NaN", "NaN"), Ordering::Equal);
        assert_eq!(compare_numeric("-1e9", " nan "), Ordering::Greater);
    }

    #[test]
    fn test_compare_keys_precedence() {
        let cmp = RecordComparator::new(vec![
            FieldRange::single(1).with_hint(TypeHint::Numeric),
            FieldRange::single(0),
        ]);
        let a = rec(&["b", "2"]);
        let b = rec(&["a", "2"]);
        let c = rec(&["a", "10"]);
        assert_eq!(cmp.compare(&a, &b), Ordering::Greater);
        assert_eq!(cmp.compare(&b, &c), Ordering::Less);
    }

    #[test]
    fn test_compare_span() {
        let cmp = RecordComparator::new(vec![FieldRange::span(0, 2)]);
        assert_eq!(
            cmp.compare(&rec(&["x", "y", "a"]), &rec(&["x", "y", "b"])),
            Ordering::Less
        );
        assert_eq!(
            cmp.compare(&rec(&["x", "y", "a", "z"]), &rec(&["x", "y", "a", "q"])),
            Ordering::Equal
        );
    }

    #[test]
    fn test_reversed_keeps_ties() {
        let cmp = RecordComparator::new(vec![FieldRange::single(0)]).reversed(true);
        assert_eq!(cmp.compare(&rec(&["a"]), &rec(&["b"])), Ordering::Greater);
        assert_eq!(cmp.compare(&rec(&["a", "1"]), &rec(&["a", "2"])), Ordering::Equal);
    }

    #[test]
    fn test_whole_record_order() {
        let cmp = RecordComparator::new(vec![]);
        assert_eq!(cmp.compare(&rec(&["a", "b"]), &rec(&["a", "c"])), Ordering::Less);
        assert_eq!(cmp.compare(&rec(&["a"]), &rec(&["a", "c"])), Ordering::Less);
        assert_eq!(cmp.compare(&rec(&["a", "c"]), &rec(&["a", "c"])), Ordering::Equal);
    }

    #[test]
    fn test_check_reports_missing_key() {
        let cmp = RecordComparator::new(vec![FieldRange::single(3)]);
        let err = cmp.check(&rec(&["a", "b"])).unwrap_err();
        assert_eq!(err.to_string(), "4: no such field in record of length 2");

        let cmp = RecordComparator::new(vec![FieldRange::span(0, 2)]);
        let err = cmp.check(&rec(&["a", "b"])).unwrap_err();
        assert_eq!(err.to_string(), "3: no such field in record of length 2");
        assert!(cmp.check(&rec(&["a", "b", "c"])).is_ok());
    }

    proptest! {
        #[test]
        fn test_string_order_is_reflexive(a in ".{0,12}") {
            prop_assert_eq!(compare_strings(&a, &a), Ordering::Equal);
        }

        #[test]
        fn test_string_order_is_antisymmetric(a in ".{0,12}", b in ".{0,12}") {
            prop_assert_eq!(compare_strings(&a, &b), compare_strings(&b, &a).reverse());
        }

        #[test]
        fn test_string_order_is_transitive(
            a in "[a-c]{0,4}",
            b in "[a-c]{0,4}",
            c in "[a-c]{0,4}",
        ) {
            if compare_strings(&a, &b) != Ordering::Greater
                && compare_strings(&b, &c) != Ordering::Greater
            {
                prop_assert_ne!(compare_strings(&a, &c), Ordering::Greater);
            }
        }

        #[test]
        fn test_numeric_order_is_antisymmetric(
            a in prop_oneof!["[a-z]{1,3}", "-?[0-9]{1,3}(\\.[0-9])?"],
            b in prop_oneof!["[a-z]{1,3}", "-?[0-9]{1,3}(\\.[0-9])?"],
        ) {
            prop_assert_eq!(compare_numeric(&a, &b), compare_numeric(&b, &a).reverse());
        }
    }
}
