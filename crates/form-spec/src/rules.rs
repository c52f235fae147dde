//! Single-rule evaluation.
//!
//! Type mismatches pass: an `email` rule on a number, a `min` rule on text or
//! a `pattern` rule on an empty value never produce a message. Pair
//! specific rules with `required` to reject empty values.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::spec::rule::ValidationRule;
use crate::value::FieldValue;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Evaluates one rule. `None` stands for a missing value.
pub fn evaluate(value: Option<&FieldValue>, rule: &ValidationRule) -> Option<String> {
    let value = value.unwrap_or(&FieldValue::Null);
    let failed = match rule {
        ValidationRule::Required { .. } => value.is_blank(),
        ValidationRule::Email { .. } => value
            .as_str()
            .is_some_and(|text| !EMAIL_SHAPE.is_match(text)),
        ValidationRule::Min { threshold, .. } => {
            value.as_f64().is_some_and(|number| number < *threshold)
        }
        ValidationRule::Max { threshold, .. } => {
            value.as_f64().is_some_and(|number| number > *threshold)
        }
        ValidationRule::MinLength { threshold, .. } => value
            .as_str()
            .is_some_and(|text| text.chars().count() < *threshold),
        ValidationRule::MaxLength { threshold, .. } => value
            .as_str()
            .is_some_and(|text| text.chars().count() > *threshold),
        ValidationRule::Pattern { pattern, .. } => {
            !value.is_falsy()
                && value
                    .as_str()
                    .is_some_and(|text| !pattern.is_match(text))
        }
        ValidationRule::Custom { check, .. } => !check.call(value),
    };

    failed.then(|| rule.message().to_string())
}

/// Evaluates rules in order and returns the first failing message.
pub fn first_failure(value: Option<&FieldValue>, rules: &[ValidationRule]) -> Option<String> {
    rules.iter().find_map(|rule| evaluate(value, rule))
}
