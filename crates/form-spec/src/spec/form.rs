use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::spec::SpecError;
use crate::spec::field::{FieldConfig, InputType};
use crate::spec::rule::RuleKind;
use crate::value::{FieldValue, FormData};

fn default_true() -> bool {
    true
}

/// Ordered, independently visible group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    #[serde(default = "default_true")]
    pub show: bool,
}

impl SectionConfig {
    pub fn new(title: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields,
            show: true,
        }
    }
}

/// Submit button labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitButton {
    pub label: String,
    pub loading_label: String,
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self {
            label: "Submit".into(),
            loading_label: "Submitting...".into(),
        }
    }
}

/// Top-level form definition.
///
/// Field names must be unique across the whole form, not only within a
/// section. Two fields declaring the same name read and write the same
/// [`FormData`] slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub submit: SubmitButton,
}

impl FormConfig {
    pub fn new(id: impl Into<String>, sections: Vec<SectionConfig>) -> Self {
        Self {
            id: id.into(),
            title: None,
            sections,
            submit: SubmitButton::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SpecError> {
        serde_json::from_str(raw).map_err(SpecError::Parse)
    }

    /// Every field of every section, in declared order, regardless of visibility.
    pub fn fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    /// First field declaring `name`.
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields().find(|field| field.name() == Some(name))
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut FieldConfig> {
        self.sections
            .iter_mut()
            .flat_map(|section| section.fields.iter_mut())
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldConfig> {
        self.fields_mut().find(|field| field.name() == Some(name))
    }

    /// Names declared by more than one field, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut duplicates = Vec::new();
        for name in self.fields().filter_map(FieldConfig::name) {
            if !seen.insert(name) && !duplicates.iter().any(|dup| dup == name) {
                duplicates.push(name.to_string());
            }
        }
        duplicates
    }

    /// Initial data: declared defaults, and `false` for checkboxes without one.
    pub fn defaults(&self) -> FormData {
        let mut data = FormData::new();
        for field in self.fields() {
            let Some(common) = field.common() else {
                continue;
            };
            if data.contains(&common.name) {
                continue;
            }
            match (&common.default_value, field) {
                (Some(value), _) => data.set(common.name.clone(), value.clone()),
                (None, FieldConfig::Checkbox(_)) => {
                    data.set(common.name.clone(), FieldValue::Bool(false))
                }
                (None, _) => {}
            }
        }
        data
    }

    /// Configuration smells that are legal but probably unintended.
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for name in self.duplicate_names() {
            warnings.push(format!(
                "field name '{name}' is declared more than once; the fields share one value"
            ));
        }
        for field in self.fields() {
            match field {
                FieldConfig::Select(choice) | FieldConfig::Radio(choice)
                    if choice.options.is_empty() =>
                {
                    warnings.push(format!(
                        "field '{}' has no options to choose from",
                        choice.common.name
                    ));
                }
                FieldConfig::Input(input) if input.input_type == InputType::Number => {
                    let has_text_rule = input.common.validation_rules.iter().any(|rule| {
                        matches!(
                            rule.kind(),
                            RuleKind::Email
                                | RuleKind::MinLength
                                | RuleKind::MaxLength
                                | RuleKind::Pattern
                        )
                    });
                    if has_text_rule && input.transform.is_none() {
                        warnings.push(format!(
                            "field '{}' stores numbers; its text rules will never fire",
                            input.common.name
                        ));
                    }
                }
                _ => {}
            }
        }
        warnings
    }
}
