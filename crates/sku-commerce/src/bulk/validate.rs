//! Per-entity required-field checks.
//!
//! The required/unique field sets stay configurable per call, but field
//! access is typed: each entity exposes named extractors instead of the
//! runtime reflection the configuration would otherwise need.

use std::fmt;

use super::MessageLog;

/// The value a field extractor resolved for a candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The field carries no value.
    Missing,
    /// An integer field.
    Int(i64),
    /// A monetary field, in cents.
    Money(i64),
    /// A text field.
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Missing => write!(f, "<missing>"),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::Money(cents) => write!(f, "{cents}c"),
            FieldValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// A named, typed field extractor for an entity type.
pub struct FieldSpec<T> {
    /// Field name used in skip messages.
    pub name: &'static str,
    /// Extracts the field's value from a candidate.
    pub get: fn(&T) -> FieldValue,
}

impl<T> Clone for FieldSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FieldSpec<T> {}

/// Check a candidate against the required field set.
///
/// Zero numeric/monetary values, empty or whitespace-only text, and missing
/// values all fail; the reason lands in `log`. An empty `required` list is a
/// legal configuration under which every candidate passes.
pub(crate) fn is_valid<T>(candidate: &T, required: &[FieldSpec<T>], log: &mut MessageLog) -> bool {
    for spec in required {
        match (spec.get)(candidate) {
            FieldValue::Int(0) | FieldValue::Money(0) => {
                log.line(format!("can't add entity with 0 for {}", spec.name));
                return false;
            }
            FieldValue::Text(text) if text.trim().is_empty() => {
                log.line(format!("can't add entity with empty value for {}", spec.name));
                return false;
            }
            FieldValue::Missing => {
                log.line(format!("can't add entity with no value for {}", spec.name));
                return false;
            }
            _ => {}
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sample {
        count: i64,
        price_cents: i64,
        name: String,
        note: Option<String>,
    }

    fn sample() -> Sample {
        Sample {
            count: 3,
            price_cents: 1000,
            name: "anvil".to_string(),
            note: Some("heavy".to_string()),
        }
    }

    fn specs() -> [FieldSpec<Sample>; 4] {
        [
            FieldSpec {
                name: "count",
                get: |s| FieldValue::Int(s.count),
            },
            FieldSpec {
                name: "price",
                get: |s| FieldValue::Money(s.price_cents),
            },
            FieldSpec {
                name: "name",
                get: |s| FieldValue::Text(s.name.clone()),
            },
            FieldSpec {
                name: "note",
                get: |s| {
                    s.note
                        .as_ref()
                        .map_or(FieldValue::Missing, |n| FieldValue::Text(n.clone()))
                },
            },
        ]
    }

    #[test]
    fn test_valid_candidate_passes() {
        let mut log = MessageLog::new();
        assert!(is_valid(&sample(), &specs(), &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_numeric_fails() {
        let mut candidate = sample();
        candidate.count = 0;

        let mut log = MessageLog::new();
        assert!(!is_valid(&candidate, &specs(), &mut log));
        assert!(log.join().contains("0 for count"));
    }

    #[test]
    fn test_zero_money_fails() {
        let mut candidate = sample();
        candidate.price_cents = 0;

        let mut log = MessageLog::new();
        assert!(!is_valid(&candidate, &specs(), &mut log));
        assert!(log.join().contains("0 for price"));
    }

    #[test]
    fn test_whitespace_text_fails() {
        let mut candidate = sample();
        candidate.name = "   ".to_string();

        let mut log = MessageLog::new();
        assert!(!is_valid(&candidate, &specs(), &mut log));
        assert!(log.join().contains("empty value for name"));
    }

    #[test]
    fn test_missing_value_fails() {
        let mut candidate = sample();
        candidate.note = None;

        let mut log = MessageLog::new();
        assert!(!is_valid(&candidate, &specs(), &mut log));
        assert!(log.join().contains("no value for note"));
    }

    #[test]
    fn test_empty_required_list_passes_everything() {
        let mut candidate = sample();
        candidate.count = 0;
        candidate.name = String::new();

        let mut log = MessageLog::new();
        assert!(is_valid(&candidate, &[], &mut log));
    }
}
