use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::submission::Submission;

/// What a sink reported back for an accepted submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SinkAck {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("sink answered with status {0}")]
    Status(u16),
    #[error("{message}")]
    Rejected { message: String },
    #[error("unreadable response: {0}")]
    InvalidResponse(String),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
}

/// A destination for submissions.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs and reports.
    fn label(&self) -> &str;

    async fn submit(&self, submission: &Submission) -> Result<SinkAck, SinkError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
    Form,
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "form" => Ok(Self::Form),
            other => Err(format!("unknown encoding `{other}` (expected json or form)")),
        }
    }
}

/// How much of the sink's answer is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// The body is never read; reaching the sink counts as success.
    Opaque,
    /// The body must be `{"success": bool, "message": "...", "error": "..."}`.
    #[default]
    Envelope,
}

impl std::str::FromStr for ResponseMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "opaque" => Ok(Self::Opaque),
            "envelope" => Ok(Self::Envelope),
            other => Err(format!("unknown response mode `{other}` (expected opaque or envelope)")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Posts submissions to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpSink {
    label: String,
    url: Url,
    encoding: Encoding,
    response: ResponseMode,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(url: Url) -> Self {
        let label = url.host_str().unwrap_or("http").to_string();
        Self {
            label,
            url,
            encoding: Encoding::default(),
            response: ResponseMode::default(),
            client: reqwest::Client::new(),
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn response_mode(mut self, response: ResponseMode) -> Self {
        self.response = response;
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Sink for HttpSink {
    fn label(&self) -> &str {
        &self.label
    }

    async fn submit(&self, submission: &Submission) -> Result<SinkAck, SinkError> {
        let request = self.client.post(self.url.clone());
        let request = match self.encoding {
            Encoding::Json => request.json(&submission.to_json()),
            Encoding::Form => request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(submission.form_encoded()),
        };
        let response = request
            .send()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        let status = response.status();
        debug!(sink = %self.label, status = status.as_u16(), "sink responded");

        if self.response == ResponseMode::Opaque {
            return Ok(SinkAck::default());
        }

        let body = response
            .text()
            .await
            .map_err(|err| SinkError::Transport(err.to_string()))?;
        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(SinkError::Status(status.as_u16())),
            Err(err) => return Err(SinkError::InvalidResponse(err.to_string())),
        };
        if envelope.success {
            Ok(SinkAck {
                message: envelope.message,
            })
        } else {
            let message = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "submission rejected".to_string());
            Err(SinkError::Rejected { message })
        }
    }
}
