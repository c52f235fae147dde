pub mod check;
pub mod render;
pub mod submit;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use form_spec::{FormConfig, FormData};

use crate::settings::FormSettings;

pub(crate) fn load_form(path: &Path) -> Result<FormConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read form config {}", path.display()))?;
    FormConfig::from_json_str(&raw)
        .with_context(|| format!("invalid form config {}", path.display()))
}

pub(crate) fn load_data(path: &Path) -> Result<FormData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read form data {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid form data {}", path.display()))
}

/// Loads a config with deployment settings applied, unless they are ignored.
pub(crate) fn load_configured_form(
    path: &Path,
    ignore_settings: bool,
) -> Result<(FormConfig, FormSettings)> {
    let mut config = load_form(path)?;
    let settings = if ignore_settings {
        FormSettings::default()
    } else {
        FormSettings::from_env().context("invalid form settings")?
    };
    settings.apply(&mut config);
    Ok((config, settings))
}

/// Defaults first, then whatever the data file provides.
pub(crate) fn seeded_data(config: &FormConfig, data: Option<&Path>) -> Result<FormData> {
    let mut seeded = config.defaults();
    if let Some(path) = data {
        seeded.merge(&load_data(path)?);
    }
    Ok(seeded)
}
