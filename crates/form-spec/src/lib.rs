#![allow(missing_docs)]

pub mod dispatch;
pub mod render;
pub mod rules;
pub mod session;
pub mod spec;
pub mod validate;
pub mod value;
pub mod visibility;

pub use dispatch::{
    CheckMode, Control, RenderedField, RenderedOption, check_field, display_value, parse_input,
    render_field,
};
pub use render::{
    DefaultFormFrontend, FormFrontend, LandingView, RenderStatus, RenderedForm, RenderedSection,
    RenderedSubmit, build_landing_view, build_render_payload, render_json_ui, render_text,
};
pub use rules::{evaluate, first_failure};
pub use session::{FormSession, SessionError, SubmitGate};
pub use spec::{
    Check, ChoiceOption, FieldCommon, FieldConfig, FieldKind, FieldValidator, FormConfig,
    InputType, RuleKind, SectionConfig, SpecError, SubmitButton, Transform, ValidationRule,
};
pub use validate::validate;
pub use value::{ErrorMap, FieldValue, FormData};
pub use visibility::{VisibilityMap, resolve_visibility, visible_fields};
