use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::spec::SpecError;
use crate::spec::rule::ValidationRule;
use crate::value::FieldValue;

/// Field kinds, mirroring the `type` tag of [`FieldConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Input,
    Select,
    Checkbox,
    Radio,
    Textarea,
    Paragraph,
}

/// Sub-type of an `input` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Password,
    Number,
    Tel,
    Url,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Number => "number",
            InputType::Tel => "tel",
            InputType::Url => "url",
        }
    }
}

type ValidatorFn = dyn Fn(&FieldValue) -> Option<String> + Send + Sync;

/// Free-form per-field validator returning an error message. Code-only.
#[derive(Clone)]
pub struct FieldValidator(Arc<ValidatorFn>);

impl FieldValidator {
    pub fn new(func: impl Fn(&FieldValue) -> Option<String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(func))
    }

    pub fn call(&self, value: &FieldValue) -> Option<String> {
        (self.0)(value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldValidator(..)")
    }
}

impl PartialEq for FieldValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

type FormatFn = dyn Fn(&FieldValue) -> String + Send + Sync;
type ParseFn = dyn Fn(&str) -> FieldValue + Send + Sync;

/// Format/parse pair applied by `input` fields between the stored value and the text shown.
///
/// JSON configs name one of the built-ins: `currency`, `digits`, `uppercase`.
#[derive(Clone)]
pub struct Transform {
    name: String,
    format: Arc<FormatFn>,
    parse: Arc<ParseFn>,
}

impl Transform {
    pub fn new(
        name: impl Into<String>,
        format: impl Fn(&FieldValue) -> String + Send + Sync + 'static,
        parse: impl Fn(&str) -> FieldValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            format: Arc::new(format),
            parse: Arc::new(parse),
        }
    }

    pub fn builtin(name: &str) -> Result<Self, SpecError> {
        match name {
            "currency" => Ok(Self::new(name, format_currency, parse_currency)),
            "digits" => Ok(Self::new(name, FieldValue::to_display, |raw| {
                FieldValue::Text(raw.chars().filter(char::is_ascii_digit).collect())
            })),
            "uppercase" => Ok(Self::new(name, FieldValue::to_display, |raw| {
                FieldValue::Text(raw.to_uppercase())
            })),
            other => Err(SpecError::UnknownTransform(other.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self, value: &FieldValue) -> String {
        (self.format)(value)
    }

    pub fn parse(&self, raw: &str) -> FieldValue {
        (self.parse)(raw)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

impl PartialEq for Transform {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && Arc::ptr_eq(&self.format, &other.format)
            && Arc::ptr_eq(&self.parse, &other.parse)
    }
}

impl Serialize for Transform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for Transform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Transform::builtin(&name).map_err(serde::de::Error::custom)
    }
}

fn format_currency(value: &FieldValue) -> String {
    let Some(amount) = value.as_f64() else {
        return value.to_display();
    };
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{:02}", cents % 100)
}

// Anything that does not parse becomes zero rather than an error.
fn parse_currency(raw: &str) -> FieldValue {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    FieldValue::Number(cleaned.parse::<f64>().unwrap_or(0.0))
}

fn default_true() -> bool {
    true
}

fn default_rows() -> u32 {
    4
}

/// Attributes shared by every interactive field kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCommon {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_true")]
    pub show: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation_rules: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip)]
    pub validator: Option<FieldValidator>,
}

impl FieldCommon {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            required: false,
            show: true,
            validation_rules: Vec::new(),
            default_value: None,
            placeholder: None,
            validator: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default)]
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// One entry of a select or radio group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub value: FieldValue,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
}

impl ChoiceOption {
    pub fn new(value: impl Into<FieldValue>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxField {
    #[serde(flatten)]
    pub common: FieldCommon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextareaField {
    #[serde(flatten)]
    pub common: FieldCommon,
    #[serde(default = "default_rows")]
    pub rows: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// Static text. Has no name, never holds data and is never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphField {
    pub content: String,
    #[serde(default = "default_true")]
    pub show: bool,
}

/// A single field of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConfig {
    Input(InputField),
    Select(ChoiceField),
    Checkbox(CheckboxField),
    Radio(ChoiceField),
    Textarea(TextareaField),
    Paragraph(ParagraphField),
}

impl FieldConfig {
    pub fn input(name: impl Into<String>, input_type: InputType) -> Self {
        FieldConfig::Input(InputField {
            common: FieldCommon::new(name),
            input_type,
            transform: None,
        })
    }

    pub fn select(name: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        FieldConfig::Select(ChoiceField {
            common: FieldCommon::new(name),
            options,
        })
    }

    pub fn radio(name: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        FieldConfig::Radio(ChoiceField {
            common: FieldCommon::new(name),
            options,
        })
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        FieldConfig::Checkbox(CheckboxField {
            common: FieldCommon::new(name),
        })
    }

    pub fn textarea(name: impl Into<String>, rows: u32) -> Self {
        FieldConfig::Textarea(TextareaField {
            common: FieldCommon::new(name),
            rows,
            max_length: None,
        })
    }

    pub fn paragraph(content: impl Into<String>) -> Self {
        FieldConfig::Paragraph(ParagraphField {
            content: content.into(),
            show: true,
        })
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldConfig::Input(_) => FieldKind::Input,
            FieldConfig::Select(_) => FieldKind::Select,
            FieldConfig::Checkbox(_) => FieldKind::Checkbox,
            FieldConfig::Radio(_) => FieldKind::Radio,
            FieldConfig::Textarea(_) => FieldKind::Textarea,
            FieldConfig::Paragraph(_) => FieldKind::Paragraph,
        }
    }

    pub fn common(&self) -> Option<&FieldCommon> {
        match self {
            FieldConfig::Input(field) => Some(&field.common),
            FieldConfig::Select(field) | FieldConfig::Radio(field) => Some(&field.common),
            FieldConfig::Checkbox(field) => Some(&field.common),
            FieldConfig::Textarea(field) => Some(&field.common),
            FieldConfig::Paragraph(_) => None,
        }
    }

    pub fn common_mut(&mut self) -> Option<&mut FieldCommon> {
        match self {
            FieldConfig::Input(field) => Some(&mut field.common),
            FieldConfig::Select(field) | FieldConfig::Radio(field) => Some(&mut field.common),
            FieldConfig::Checkbox(field) => Some(&mut field.common),
            FieldConfig::Textarea(field) => Some(&mut field.common),
            FieldConfig::Paragraph(_) => None,
        }
    }

    /// Data and error key. Paragraphs have none.
    pub fn name(&self) -> Option<&str> {
        self.common().map(|common| common.name.as_str())
    }

    pub fn is_visible(&self) -> bool {
        match self {
            FieldConfig::Paragraph(paragraph) => paragraph.show,
            other => other.common().is_none_or(|common| common.show),
        }
    }

    pub fn is_interactive(&self) -> bool {
        !matches!(self, FieldConfig::Paragraph(_))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        if let Some(common) = self.common_mut() {
            common.label = Some(label.into());
        }
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        if let Some(common) = self.common_mut() {
            common.required = required;
        }
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        match &mut self {
            FieldConfig::Paragraph(paragraph) => paragraph.show = show,
            other => {
                if let Some(common) = other.common_mut() {
                    common.show = show;
                }
            }
        }
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        if let Some(common) = self.common_mut() {
            common.validation_rules.push(rule);
        }
        self
    }

    pub fn validator(mut self, validator: FieldValidator) -> Self {
        if let Some(common) = self.common_mut() {
            common.validator = Some(validator);
        }
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        if let Some(common) = self.common_mut() {
            common.default_value = Some(value.into());
        }
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        if let FieldConfig::Input(input) = &mut self {
            input.transform = Some(transform);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_formats_with_grouping() {
        let transform = Transform::builtin("currency").expect("builtin");
        assert_eq!(transform.format(&FieldValue::Number(1234567.5)), "1,234,567.50");
        assert_eq!(transform.format(&FieldValue::Number(12.0)), "12.00");
        assert_eq!(transform.format(&FieldValue::Number(-999.999)), "-1,000.00");
        assert_eq!(transform.parse("$1,234.50"), FieldValue::Number(1234.5));
        assert_eq!(transform.parse("abc"), FieldValue::Number(0.0));
    }

    #[test]
    fn paragraph_ignores_name() {
        let field: FieldConfig = serde_json::from_value(json!({
            "type": "paragraph",
            "name": "ignored",
            "content": "Fill in the form below."
        }))
        .expect("paragraph");
        assert_eq!(field.name(), None);
        assert!(!field.is_interactive());
        assert!(field.is_visible());
    }

    #[test]
    fn input_defaults_to_text_and_visible() {
        let field: FieldConfig = serde_json::from_value(json!({
            "type": "input",
            "name": "company"
        }))
        .expect("input");
        let FieldConfig::Input(input) = &field else {
            panic!("expected input");
        };
        assert_eq!(input.input_type, InputType::Text);
        assert!(input.common.show);
        assert!(!input.common.required);
    }

    #[test]
    fn unknown_transform_is_rejected() {
        let parsed: Result<FieldConfig, _> = serde_json::from_value(json!({
            "type": "input",
            "name": "amount",
            "transform": "roman"
        }));
        assert!(parsed.is_err());
    }
}
