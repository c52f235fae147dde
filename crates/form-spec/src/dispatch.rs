use serde::Serialize;

use crate::rules::first_failure;
use crate::spec::field::{ChoiceField, FieldConfig, FieldKind, InputType};
use crate::value::{ErrorMap, FieldValue, FormData};

/// Which entry point is asking for a field check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Per-field check when the user leaves a field: rules, then the custom validator.
    Blur,
    /// Full-form pass: as `Blur`, plus the built-in required check for fields without rules.
    Submit,
}

/// Option entry as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedOption {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

/// Concrete control a field renders as.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    TextInput {
        input_type: InputType,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Select {
        options: Vec<RenderedOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Checkbox {
        checked: bool,
    },
    RadioGroup {
        options: Vec<RenderedOption>,
    },
    TextArea {
        rows: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
        value: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
    Paragraph {
        content: String,
    },
}

/// A visible field ready for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub control: Control,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Text shown for the stored value of a field.
pub fn display_value(field: &FieldConfig, value: Option<&FieldValue>) -> String {
    let value = value.unwrap_or(&FieldValue::Null);
    match field {
        FieldConfig::Input(input) => match &input.transform {
            Some(transform) if *value != FieldValue::Null => transform.format(value),
            _ => value.to_display(),
        },
        FieldConfig::Checkbox(_) => (value.as_bool() == Some(true)).to_string(),
        FieldConfig::Select(_) | FieldConfig::Radio(_) | FieldConfig::Textarea(_) => {
            value.to_display()
        }
        FieldConfig::Paragraph(paragraph) => paragraph.content.clone(),
    }
}

/// Turns raw user input into the value to store under the field's name.
///
/// Select and radio values follow the type of `current`: when a number is
/// stored, the raw option string is parsed to a number before it is written.
pub fn parse_input(field: &FieldConfig, raw: &str, current: Option<&FieldValue>) -> FieldValue {
    match field {
        FieldConfig::Input(input) => {
            if let Some(transform) = &input.transform {
                return transform.parse(raw);
            }
            match input.input_type {
                InputType::Number => parse_number(raw),
                _ => FieldValue::text(raw),
            }
        }
        FieldConfig::Select(choice) | FieldConfig::Radio(choice) => {
            coerce_choice(choice, raw, current)
        }
        FieldConfig::Checkbox(_) => FieldValue::Bool(matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "true" | "on" | "1" | "yes"
        )),
        FieldConfig::Textarea(textarea) => match textarea.max_length {
            Some(limit) => FieldValue::Text(raw.chars().take(limit).collect()),
            None => FieldValue::text(raw),
        },
        FieldConfig::Paragraph(_) => FieldValue::Null,
    }
}

// Empty input clears the value; anything else that is not a number reads as zero.
fn parse_number(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Null;
    }
    FieldValue::Number(trimmed.parse::<f64>().unwrap_or(0.0))
}

fn coerce_choice(choice: &ChoiceField, raw: &str, current: Option<&FieldValue>) -> FieldValue {
    match current {
        Some(FieldValue::Number(_)) => FieldValue::Number(raw.trim().parse().unwrap_or(0.0)),
        Some(FieldValue::Bool(_)) => FieldValue::Bool(raw.trim() == "true"),
        Some(FieldValue::Text(_)) => FieldValue::text(raw),
        Some(FieldValue::Null) | None => choice
            .options
            .iter()
            .find(|option| option.value.to_display() == raw)
            .map(|option| option.value.clone())
            .unwrap_or_else(|| FieldValue::text(raw)),
    }
}

/// Runs a field's checks and returns the first message.
///
/// Order: declared rules (first failure wins), then the custom validator,
/// then, in [`CheckMode::Submit`] only and only when no rules are declared,
/// the built-in required check. Checkboxes must be exactly `true` to pass it.
pub fn check_field(
    field: &FieldConfig,
    value: Option<&FieldValue>,
    mode: CheckMode,
) -> Option<String> {
    let common = field.common()?;

    if let Some(message) = first_failure(value, &common.validation_rules) {
        return Some(message);
    }

    if let Some(validator) = &common.validator
        && let Some(message) = validator.call(value.unwrap_or(&FieldValue::Null))
    {
        return Some(message);
    }

    if mode == CheckMode::Submit && common.validation_rules.is_empty() && common.required {
        let missing = match field {
            FieldConfig::Checkbox(_) => value.and_then(FieldValue::as_bool) != Some(true),
            _ => value.is_none_or(FieldValue::is_blank),
        };
        if missing {
            let label = common.label.as_deref().unwrap_or(&common.name);
            return Some(format!("{label} is required"));
        }
    }

    None
}

/// Builds the presentational form of a field, or `None` when it is hidden.
pub fn render_field(
    field: &FieldConfig,
    data: &FormData,
    errors: &ErrorMap,
) -> Option<RenderedField> {
    if !field.is_visible() {
        return None;
    }

    let Some(common) = field.common() else {
        let FieldConfig::Paragraph(paragraph) = field else {
            return None;
        };
        return Some(RenderedField {
            name: None,
            label: None,
            kind: FieldKind::Paragraph,
            required: false,
            control: Control::Paragraph {
                content: paragraph.content.clone(),
            },
            error: None,
        });
    };

    let value = data.get(&common.name);
    let control = match field {
        FieldConfig::Input(input) => Control::TextInput {
            input_type: input.input_type,
            value: display_value(field, value),
            placeholder: common.placeholder.clone(),
        },
        FieldConfig::Select(choice) => Control::Select {
            options: render_options(choice, value),
            placeholder: common.placeholder.clone(),
        },
        FieldConfig::Radio(choice) => Control::RadioGroup {
            options: render_options(choice, value),
        },
        FieldConfig::Checkbox(_) => Control::Checkbox {
            checked: value.and_then(FieldValue::as_bool) == Some(true),
        },
        FieldConfig::Textarea(textarea) => Control::TextArea {
            rows: textarea.rows,
            max_length: textarea.max_length,
            value: display_value(field, value),
            placeholder: common.placeholder.clone(),
        },
        FieldConfig::Paragraph(_) => return None,
    };

    Some(RenderedField {
        name: Some(common.name.clone()),
        label: common.label.clone(),
        kind: field.kind(),
        required: common.required,
        control,
        error: errors.get(&common.name).map(str::to_string),
    })
}

fn render_options(choice: &ChoiceField, value: Option<&FieldValue>) -> Vec<RenderedOption> {
    let selected = value
        .filter(|value| **value != FieldValue::Null)
        .map(FieldValue::to_display);
    choice
        .options
        .iter()
        .map(|option| {
            let raw = option.value.to_display();
            RenderedOption {
                selected: selected.as_deref() == Some(raw.as_str()),
                value: raw,
                label: option.label.clone(),
                disabled: option.disabled,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::ChoiceOption;

    #[test]
    fn number_input_coerces_garbage_to_zero() {
        let field = FieldConfig::input("amount", InputType::Number);
        assert_eq!(parse_input(&field, "42.5", None), FieldValue::Number(42.5));
        assert_eq!(parse_input(&field, "abc", None), FieldValue::Number(0.0));
        assert_eq!(parse_input(&field, "  ", None), FieldValue::Null);
    }

    #[test]
    fn choice_without_current_value_uses_option_type() {
        let field = FieldConfig::radio(
            "plan",
            vec![ChoiceOption::new(1i64, "Basic"), ChoiceOption::new("pro", "Pro")],
        );
        assert_eq!(parse_input(&field, "1", None), FieldValue::Number(1.0));
        assert_eq!(parse_input(&field, "pro", None), FieldValue::text("pro"));
        assert_eq!(parse_input(&field, "other", None), FieldValue::text("other"));
    }

    #[test]
    fn textarea_truncates_to_max_length() {
        let FieldConfig::Textarea(mut textarea) = FieldConfig::textarea("notes", 3) else {
            unreachable!();
        };
        textarea.max_length = Some(5);
        let field = FieldConfig::Textarea(textarea);
        assert_eq!(parse_input(&field, "abcdefgh", None), FieldValue::text("abcde"));
    }

    #[test]
    fn options_mark_the_selected_value() {
        let field = FieldConfig::select(
            "installments",
            vec![ChoiceOption::new(1i64, "1x"), ChoiceOption::new(2i64, "2x")],
        );
        let mut data = FormData::new();
        data.set("installments", 2i64);
        let rendered = render_field(&field, &data, &ErrorMap::new()).expect("visible");
        let Control::Select { options, .. } = rendered.control else {
            panic!("expected select");
        };
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].value, "2");
    }
}
