pub mod field;
pub mod form;
pub mod rule;

use thiserror::Error;

pub use field::{
    CheckboxField, ChoiceField, ChoiceOption, FieldCommon, FieldConfig, FieldKind,
    FieldValidator, InputField, InputType, ParagraphField, TextareaField, Transform,
};
pub use form::{FormConfig, SectionConfig, SubmitButton};
pub use rule::{Check, Pattern, RuleKind, ValidationRule};

/// Errors raised while building or loading a form configuration.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("unknown check '{0}'")]
    UnknownCheck(String),
    #[error("unknown transform '{0}'")]
    UnknownTransform(String),
    #[error("form config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
