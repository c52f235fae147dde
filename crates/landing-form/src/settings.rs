//! Environment-driven deployment settings, resolved once at startup.

use std::collections::BTreeMap;
use std::time::Duration;

use form_relay::{
    Encoding, Enricher, HttpAddressLookup, HttpSink, Relay, ResponseMode, SystemClock,
};
use form_spec::{Check, FieldConfig, FieldValue, FormConfig, ValidationRule};
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const PRIMARY_SINK_URL: &str = "LANDING_PRIMARY_SINK_URL";
pub const PRIMARY_RESPONSE: &str = "LANDING_PRIMARY_RESPONSE";
pub const PRIMARY_ENCODING: &str = "LANDING_PRIMARY_ENCODING";
pub const SECONDARY_SINK_URL: &str = "LANDING_SECONDARY_SINK_URL";
pub const FORM_CLOSED: &str = "LANDING_FORM_CLOSED";
pub const CLOSED_NOTICE: &str = "LANDING_CLOSED_NOTICE";
pub const MIN_PREFIX: &str = "LANDING_MIN_";
pub const ENRICH_TIMESTAMP: &str = "LANDING_ENRICH_TIMESTAMP";
pub const ADDRESS_LOOKUP_URL: &str = "LANDING_ADDRESS_LOOKUP_URL";
pub const SINK_TIMEOUT_SECS: &str = "LANDING_SINK_TIMEOUT_SECS";

const DEFAULT_CLOSED_NOTICE: &str = "This form is currently closed.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: String, reason: String },
    #[error("{var} must be true or false, got `{value}`")]
    InvalidBool { var: String, value: String },
    #[error("{var} must be a number, got `{value}`")]
    InvalidNumber { var: String, value: String },
    #[error("{var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Settings that shape the form itself. Nothing here is required.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSettings {
    pub closed: bool,
    pub closed_notice: Option<String>,
    /// Field name (lower-cased) to minimum value.
    pub min_thresholds: BTreeMap<String, f64>,
}

impl FormSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_map(&collect(vars))
    }

    fn from_map(vars: &BTreeMap<String, String>) -> Result<Self, SettingsError> {
        let mut min_thresholds = BTreeMap::new();
        for (var, value) in vars {
            let Some(field) = var.strip_prefix(MIN_PREFIX) else {
                continue;
            };
            if field.is_empty() {
                continue;
            }
            min_thresholds.insert(field.to_ascii_lowercase(), parse_number(var, value)?);
        }
        Ok(Self {
            closed: optional_bool(vars, FORM_CLOSED)?.unwrap_or(false),
            closed_notice: optional(vars, CLOSED_NOTICE).map(str::to_string),
            min_thresholds,
        })
    }

    /// Notice to show instead of the form, when the form is closed.
    pub fn closed_notice(&self) -> Option<&str> {
        self.closed
            .then(|| self.closed_notice.as_deref().unwrap_or(DEFAULT_CLOSED_NOTICE))
    }

    /// Appends a `min` rule to every field named by a threshold.
    ///
    /// Declared rules replace the built-in required check, so a required field
    /// without rules gets an explicit required rule in front of the minimum.
    pub fn apply(&self, config: &mut FormConfig) {
        for (name, threshold) in &self.min_thresholds {
            let message = format!("Minimum is {}", FieldValue::Number(*threshold));
            let rule = ValidationRule::min(*threshold, message);
            let mut matched = false;
            for field in config.fields_mut() {
                let is_checkbox = matches!(field, FieldConfig::Checkbox(_));
                if let Some(common) = field.common_mut()
                    && common.name.eq_ignore_ascii_case(name)
                {
                    if common.required && common.validation_rules.is_empty() {
                        let label = common.label.as_deref().unwrap_or(&common.name);
                        let message = format!("{label} is required");
                        let required = if is_checkbox {
                            ValidationRule::custom(
                                Check::new("is_true", |value| value.as_bool() == Some(true)),
                                message,
                            )
                        } else {
                            ValidationRule::required(message)
                        };
                        common.validation_rules.push(required);
                    }
                    common.validation_rules.push(rule.clone());
                    matched = true;
                }
            }
            if !matched {
                warn!(field = %name, "minimum threshold names no field in the form");
            }
        }
    }
}

/// Where and how submissions are delivered.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub primary_sink: Url,
    pub primary_response: ResponseMode,
    pub primary_encoding: Encoding,
    /// Always JSON with an envelope answer; failures only become diagnostics.
    pub secondary_sink: Option<Url>,
    pub enrich_timestamp: bool,
    pub address_lookup: Option<Url>,
    pub sink_timeout: Option<Duration>,
}

impl RelaySettings {
    fn from_map(vars: &BTreeMap<String, String>) -> Result<Self, SettingsError> {
        let primary_sink =
            optional_url(vars, PRIMARY_SINK_URL)?.ok_or(SettingsError::Missing(PRIMARY_SINK_URL))?;
        let primary_response = parsed(vars, PRIMARY_RESPONSE)?.unwrap_or_default();
        let primary_encoding = parsed(vars, PRIMARY_ENCODING)?.unwrap_or_default();
        let sink_timeout = match optional(vars, SINK_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| SettingsError::InvalidNumber {
                    var: SINK_TIMEOUT_SECS.to_string(),
                    value: raw.to_string(),
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };
        Ok(Self {
            primary_sink,
            primary_response,
            primary_encoding,
            secondary_sink: optional_url(vars, SECONDARY_SINK_URL)?,
            enrich_timestamp: optional_bool(vars, ENRICH_TIMESTAMP)?.unwrap_or(true),
            address_lookup: optional_url(vars, ADDRESS_LOOKUP_URL)?,
            sink_timeout,
        })
    }

    pub fn relay(&self) -> Relay {
        let primary = HttpSink::new(self.primary_sink.clone())
            .labelled("primary")
            .encoding(self.primary_encoding)
            .response_mode(self.primary_response);
        let mut relay = Relay::new(primary);
        if let Some(url) = &self.secondary_sink {
            relay = relay.with_secondary(
                HttpSink::new(url.clone())
                    .labelled("secondary")
                    .encoding(Encoding::Json)
                    .response_mode(ResponseMode::Envelope),
            );
        }
        if let Some(limit) = self.sink_timeout {
            relay = relay.with_timeout(limit);
        }
        relay
    }

    pub fn enricher(&self) -> Enricher {
        let mut enricher = Enricher::new();
        if self.enrich_timestamp {
            enricher = enricher.with_clock(SystemClock);
        }
        if let Some(url) = &self.address_lookup {
            enricher = enricher.with_address_lookup(HttpAddressLookup::new(url.clone()));
        }
        enricher
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub form: FormSettings,
    pub relay: RelaySettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = collect(vars);
        Ok(Self {
            form: FormSettings::from_map(&vars)?,
            relay: RelaySettings::from_map(&vars)?,
        })
    }
}

fn collect<I, K, V>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    vars.into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

fn optional<'a>(vars: &'a BTreeMap<String, String>, var: &str) -> Option<&'a str> {
    vars.get(var).map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn parsed<T>(vars: &BTreeMap<String, String>, var: &str) -> Result<Option<T>, SettingsError>
where
    T: std::str::FromStr<Err = String>,
{
    optional(vars, var)
        .map(|raw| {
            raw.parse().map_err(|reason| SettingsError::Invalid {
                var: var.to_string(),
                reason,
            })
        })
        .transpose()
}

fn optional_bool(
    vars: &BTreeMap<String, String>,
    var: &str,
) -> Result<Option<bool>, SettingsError> {
    let Some(raw) = optional(vars, var) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(SettingsError::InvalidBool {
            var: var.to_string(),
            value: raw.to_string(),
        }),
    }
}

fn optional_url(vars: &BTreeMap<String, String>, var: &str) -> Result<Option<Url>, SettingsError> {
    optional(vars, var)
        .map(|raw| {
            Url::parse(raw).map_err(|err| SettingsError::InvalidUrl {
                var: var.to_string(),
                reason: err.to_string(),
            })
        })
        .transpose()
}

fn parse_number(var: &str, raw: &str) -> Result<f64, SettingsError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| SettingsError::InvalidNumber {
            var: var.to_string(),
            value: raw.to_string(),
        })
}
