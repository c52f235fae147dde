use thiserror::Error;

use crate::dispatch::{CheckMode, check_field, parse_input};
use crate::render::{RenderedForm, build_render_payload};
use crate::spec::field::FieldConfig;
use crate::spec::form::FormConfig;
use crate::validate::validate;
use crate::value::{ErrorMap, FieldValue, FormData};
use crate::visibility::{resolve_visibility, visible_fields};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("a submission is already in progress")]
    AlreadySubmitting,
    #[error("no submission is in progress")]
    NotSubmitting,
}

/// Outcome of [`FormSession::begin_submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitGate {
    /// The form is valid; the snapshot is what should be sent.
    Ready(FormData),
    /// The form is invalid; nothing should be sent.
    Rejected(ErrorMap),
}

/// Owns the data and errors of one form instance.
///
/// All writes replace a whole field value. Editing a field clears its error
/// right away; the full-form pass on submit is what decides validity.
#[derive(Debug, Clone)]
pub struct FormSession {
    config: FormConfig,
    data: FormData,
    errors: ErrorMap,
    submitting: bool,
}

impl FormSession {
    pub fn new(config: FormConfig) -> Self {
        let data = config.defaults();
        Self {
            config,
            data,
            errors: ErrorMap::new(),
            submitting: false,
        }
    }

    /// Starts from `initial` layered over the configured defaults.
    pub fn with_data(config: FormConfig, initial: &FormData) -> Self {
        let mut session = Self::new(config);
        session.data.merge(initial);
        session
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Handles raw input typed or picked by the user.
    pub fn change(&mut self, name: &str, raw: &str) -> Result<&FieldValue, SessionError> {
        let field = self.data_field(name)?;
        let parsed = parse_input(field, raw, self.data.get(name));
        self.write(name, parsed);
        self.data
            .get(name)
            .ok_or_else(|| SessionError::UnknownField(name.to_string()))
    }

    /// Programmatic write of an already typed value.
    pub fn set_value(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), SessionError> {
        self.data_field(name)?;
        self.write(name, value.into());
        Ok(())
    }

    /// Checks one field when the user leaves it and records or clears its message.
    ///
    /// Hidden fields are never checked; blurring one leaves the errors untouched.
    pub fn blur(&mut self, name: &str) -> Result<Option<&str>, SessionError> {
        self.data_field(name)?;
        let Some(field) = self.blur_target(name) else {
            return Ok(None);
        };
        match check_field(field, self.data.get(name), CheckMode::Blur) {
            Some(message) => self.errors.set(name, message),
            None => {
                self.errors.clear(name);
            }
        }
        Ok(self.errors.get(name))
    }

    /// Full-form validation; replaces every previous message.
    pub fn validate(&mut self) -> &ErrorMap {
        self.errors = validate(&self.data, &self.config);
        &self.errors
    }

    pub fn begin_submit(&mut self) -> Result<SubmitGate, SessionError> {
        if self.submitting {
            return Err(SessionError::AlreadySubmitting);
        }
        if !self.validate().is_valid() {
            return Ok(SubmitGate::Rejected(self.errors.clone()));
        }
        self.submitting = true;
        Ok(SubmitGate::Ready(self.data.clone()))
    }

    /// Ends a submission. A successful one resets the form to its defaults.
    pub fn finish_submit(&mut self, success: bool) -> Result<(), SessionError> {
        if !self.submitting {
            return Err(SessionError::NotSubmitting);
        }
        self.submitting = false;
        if success {
            self.reset();
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.data = self.config.defaults();
        self.errors = ErrorMap::new();
    }

    pub fn render(&self) -> RenderedForm {
        build_render_payload(&self.config, &self.data, &self.errors, self.submitting)
    }

    fn write(&mut self, name: &str, value: FieldValue) {
        self.data.set(name, value);
        self.errors.clear(name);
    }

    fn data_field(&self, name: &str) -> Result<&FieldConfig, SessionError> {
        self.config
            .field(name)
            .ok_or_else(|| SessionError::UnknownField(name.to_string()))
    }

    // First visible declaration of a shared name; none when every declaration is hidden.
    fn blur_target(&self, name: &str) -> Option<&FieldConfig> {
        if !resolve_visibility(&self.config).get(name).copied().unwrap_or(false) {
            return None;
        }
        visible_fields(&self.config)
            .map(|(_, field)| field)
            .find(|field| field.name() == Some(name))
    }
}
