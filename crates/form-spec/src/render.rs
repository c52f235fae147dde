use serde_json::{Map, Value, json};

use crate::dispatch::{Control, RenderedField, render_field};
use crate::spec::form::FormConfig;
use crate::value::{ErrorMap, FormData};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Accepting input, no errors shown.
    Ready,
    /// At least one field shows an error.
    Invalid,
    /// A submission is in flight.
    Submitting,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::Ready => "ready",
            RenderStatus::Invalid => "invalid",
            RenderStatus::Submitting => "submitting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<RenderedField>,
}

#[derive(Debug, Clone)]
pub struct RenderedSubmit {
    pub label: String,
    pub disabled: bool,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderedForm {
    pub form_id: String,
    pub title: Option<String>,
    pub status: RenderStatus,
    pub sections: Vec<RenderedSection>,
    pub submit: RenderedSubmit,
}

impl RenderedForm {
    /// Visible fields across all sections, in rendering order.
    pub fn fields(&self) -> impl Iterator<Item = &RenderedField> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }
}

/// Either the rendered form, or the notice that replaces it while the form is closed.
#[derive(Debug, Clone)]
pub enum LandingView {
    Closed { notice: String },
    Open(RenderedForm),
}

/// Renders sections then fields exactly in declared order, skipping hidden ones.
pub fn build_render_payload(
    config: &FormConfig,
    data: &FormData,
    errors: &ErrorMap,
    is_submitting: bool,
) -> RenderedForm {
    let sections = config
        .sections
        .iter()
        .filter(|section| section.show)
        .map(|section| RenderedSection {
            title: section.title.clone(),
            description: section.description.clone(),
            fields: section
                .fields
                .iter()
                .filter_map(|field| render_field(field, data, errors))
                .collect(),
        })
        .collect::<Vec<_>>();

    let status = if is_submitting {
        RenderStatus::Submitting
    } else if sections
        .iter()
        .flat_map(|section| section.fields.iter())
        .any(|field| field.error.is_some())
    {
        RenderStatus::Invalid
    } else {
        RenderStatus::Ready
    };

    let submit = RenderedSubmit {
        label: if is_submitting {
            config.submit.loading_label.clone()
        } else {
            config.submit.label.clone()
        },
        disabled: is_submitting,
    };

    RenderedForm {
        form_id: config.id.clone(),
        title: config.title.clone(),
        status,
        sections,
        submit,
    }
}

/// Builds the landing view, honoring the closed flag before anything is rendered.
pub fn build_landing_view(
    config: &FormConfig,
    data: &FormData,
    errors: &ErrorMap,
    is_submitting: bool,
    closed_notice: Option<&str>,
) -> LandingView {
    match closed_notice {
        Some(notice) => LandingView::Closed {
            notice: notice.to_string(),
        },
        None => LandingView::Open(build_render_payload(config, data, errors, is_submitting)),
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderedForm) -> Value {
    let sections = payload
        .sections
        .iter()
        .map(|section| {
            let fields = section
                .fields
                .iter()
                .filter_map(|field| serde_json::to_value(field).ok())
                .collect::<Vec<_>>();
            let mut map = Map::new();
            map.insert("title".into(), Value::String(section.title.clone()));
            if let Some(description) = &section.description {
                map.insert("description".into(), Value::String(description.clone()));
            }
            map.insert("fields".into(), Value::Array(fields));
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": payload.form_id,
        "title": payload.title,
        "status": payload.status.as_str(),
        "sections": sections,
        "submit": {
            "label": payload.submit.label,
            "disabled": payload.submit.disabled,
        },
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderedForm) -> String {
    let mut lines = Vec::new();
    match &payload.title {
        Some(title) => lines.push(format!("Form: {} ({})", title, payload.form_id)),
        None => lines.push(format!("Form: {}", payload.form_id)),
    }
    lines.push(format!("Status: {}", payload.status.as_str()));

    for section in &payload.sections {
        lines.push(String::new());
        lines.push(format!("## {}", section.title));
        if let Some(description) = &section.description {
            lines.push(description.clone());
        }
        for field in &section.fields {
            lines.extend(field_lines(field));
        }
    }

    lines.push(String::new());
    let disabled = if payload.submit.disabled {
        " (disabled)"
    } else {
        ""
    };
    lines.push(format!("[ {} ]{}", payload.submit.label, disabled));
    lines.join("\n")
}

fn field_lines(field: &RenderedField) -> Vec<String> {
    let caption = field
        .label
        .clone()
        .or_else(|| field.name.clone())
        .unwrap_or_default();
    let marker = if field.required { " *" } else { "" };
    let mut lines = match &field.control {
        Control::Paragraph { content } => vec![content.clone()],
        Control::TextInput { value, .. } | Control::TextArea { value, .. } => {
            vec![format!(" - {caption}{marker}: {value}")]
        }
        Control::Checkbox { checked } => {
            let mark = if *checked { "x" } else { " " };
            vec![format!(" - [{mark}] {caption}{marker}")]
        }
        Control::Select { options, .. } | Control::RadioGroup { options } => {
            let mut lines = vec![format!(" - {caption}{marker}:")];
            for option in options {
                let mark = if option.selected { "(*)" } else { "( )" };
                let disabled = if option.disabled { " [disabled]" } else { "" };
                lines.push(format!("     {mark} {}{disabled}", option.label));
            }
            lines
        }
    };
    if let Some(error) = &field.error {
        lines.push(format!("   ! {error}"));
    }
    lines
}

/// Abstraction over frontends that render the same payload into different transports.
pub trait FormFrontend {
    fn render_text_ui(&self, payload: &RenderedForm) -> String;
    fn render_json_ui(&self, payload: &RenderedForm) -> Value;
}

/// Default frontend implementation that reuses the renderer functions above.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFormFrontend;

impl FormFrontend for DefaultFormFrontend {
    fn render_text_ui(&self, payload: &RenderedForm) -> String {
        render_text(payload)
    }

    fn render_json_ui(&self, payload: &RenderedForm) -> Value {
        render_json_ui(payload)
    }
}
