use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::spec::SpecError;
use crate::value::FieldValue;

/// Rule kinds, mainly for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    Email,
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    Custom,
}

/// One typed validation rule. Each variant carries exactly the threshold its kind needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    Required {
        message: String,
    },
    Email {
        message: String,
    },
    Min {
        threshold: f64,
        message: String,
    },
    Max {
        threshold: f64,
        message: String,
    },
    MinLength {
        threshold: usize,
        message: String,
    },
    MaxLength {
        threshold: usize,
        message: String,
    },
    Pattern {
        #[serde(alias = "threshold")]
        pattern: Pattern,
        message: String,
    },
    Custom {
        check: Check,
        message: String,
    },
}

impl ValidationRule {
    pub fn required(message: impl Into<String>) -> Self {
        ValidationRule::Required {
            message: message.into(),
        }
    }

    pub fn email(message: impl Into<String>) -> Self {
        ValidationRule::Email {
            message: message.into(),
        }
    }

    pub fn min(threshold: f64, message: impl Into<String>) -> Self {
        ValidationRule::Min {
            threshold,
            message: message.into(),
        }
    }

    pub fn max(threshold: f64, message: impl Into<String>) -> Self {
        ValidationRule::Max {
            threshold,
            message: message.into(),
        }
    }

    pub fn min_length(threshold: usize, message: impl Into<String>) -> Self {
        ValidationRule::MinLength {
            threshold,
            message: message.into(),
        }
    }

    pub fn max_length(threshold: usize, message: impl Into<String>) -> Self {
        ValidationRule::MaxLength {
            threshold,
            message: message.into(),
        }
    }

    /// Compiles the pattern up front; an invalid source is rejected here.
    pub fn pattern(source: &str, message: impl Into<String>) -> Result<Self, SpecError> {
        Ok(ValidationRule::Pattern {
            pattern: Pattern::new(source)?,
            message: message.into(),
        })
    }

    pub fn custom(check: Check, message: impl Into<String>) -> Self {
        ValidationRule::Custom {
            check,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            ValidationRule::Required { .. } => RuleKind::Required,
            ValidationRule::Email { .. } => RuleKind::Email,
            ValidationRule::Min { .. } => RuleKind::Min,
            ValidationRule::Max { .. } => RuleKind::Max,
            ValidationRule::MinLength { .. } => RuleKind::MinLength,
            ValidationRule::MaxLength { .. } => RuleKind::MaxLength,
            ValidationRule::Pattern { .. } => RuleKind::Pattern,
            ValidationRule::Custom { .. } => RuleKind::Custom,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ValidationRule::Required { message }
            | ValidationRule::Email { message }
            | ValidationRule::Min { message, .. }
            | ValidationRule::Max { message, .. }
            | ValidationRule::MinLength { message, .. }
            | ValidationRule::MaxLength { message, .. }
            | ValidationRule::Pattern { message, .. }
            | ValidationRule::Custom { message, .. } => message,
        }
    }
}

/// A compiled regular expression that serializes as its source.
#[derive(Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, SpecError> {
        Regex::new(source)
            .map(Pattern)
            .map_err(|err| SpecError::InvalidPattern {
                pattern: source.to_string(),
                reason: err.to_string(),
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(serde::de::Error::custom)
    }
}

type CheckFn = dyn Fn(&FieldValue) -> bool + Send + Sync;

/// Predicate behind a `custom` rule. Missing values are passed as `FieldValue::Null`.
///
/// In JSON a check is referenced by name and must be one of the built-ins
/// (`is_true`, `not_blank`, `digits`, `positive`). Code can supply any closure
/// through [`Check::new`].
#[derive(Clone)]
pub struct Check {
    name: String,
    func: Arc<CheckFn>,
}

impl Check {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&FieldValue) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn builtin(name: &str) -> Result<Self, SpecError> {
        let func: fn(&FieldValue) -> bool = match name {
            "is_true" => |value| value.as_bool() == Some(true),
            "not_blank" => |value| !value.is_blank(),
            "digits" => |value| match value {
                FieldValue::Text(text) => {
                    !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit())
                }
                FieldValue::Number(number) => number.fract() == 0.0 && *number >= 0.0,
                _ => false,
            },
            "positive" => |value| value.as_f64().is_some_and(|number| number > 0.0),
            other => return Err(SpecError::UnknownCheck(other.to_string())),
        };
        Ok(Self::new(name, func))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, value: &FieldValue) -> bool {
        (self.func)(value)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Check").field(&self.name).finish()
    }
}

impl PartialEq for Check {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.func, &other.func)
    }
}

impl Serialize for Check {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Check {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Check::builtin(&name).map_err(serde::de::Error::custom)
    }
}
