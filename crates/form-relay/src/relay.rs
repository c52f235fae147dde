use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::sink::{Sink, SinkAck, SinkError};
use crate::submission::Submission;

const NO_PRIMARY: &str = "no primary sink configured";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkRole {
    /// Decides whether the submission succeeded.
    Primary,
    /// Best effort. Failures are logged and never surfaced to the user.
    Secondary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SinkOutcome {
    pub label: String,
    pub role: SinkRole,
    pub result: Result<SinkAck, SinkError>,
}

impl SinkOutcome {
    pub fn new(
        label: impl Into<String>,
        role: SinkRole,
        result: Result<SinkAck, SinkError>,
    ) -> Self {
        Self {
            label: label.into(),
            role,
            result,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Combined verdict over every sink that received a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub success: bool,
    pub error: Option<String>,
    pub diagnostics: Vec<String>,
    pub outcomes: Vec<SinkOutcome>,
}

impl SubmissionReport {
    /// The one message shown to the submitter, if any.
    pub fn user_message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.error.as_deref().unwrap_or("Submission failed"))
        }
    }

    pub fn to_json(&self) -> Value {
        let sinks: Vec<Value> = self
            .outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(ack) => json!({
                    "label": outcome.label,
                    "role": outcome.role,
                    "ok": true,
                    "message": ack.message,
                }),
                Err(err) => json!({
                    "label": outcome.label,
                    "role": outcome.role,
                    "ok": false,
                    "error": err.to_string(),
                }),
            })
            .collect();
        json!({
            "success": self.success,
            "error": self.error,
            "diagnostics": self.diagnostics,
            "sinks": sinks,
        })
    }
}

/// Reduces per-sink outcomes to one verdict. Only the first primary counts;
/// secondary failures become diagnostics.
pub fn settle(outcomes: Vec<SinkOutcome>) -> SubmissionReport {
    let mut diagnostics = Vec::new();
    for outcome in &outcomes {
        if outcome.role == SinkRole::Secondary
            && let Err(err) = &outcome.result
        {
            warn!(sink = %outcome.label, error = %err, "secondary sink failed");
            diagnostics.push(format!("{}: {err}", outcome.label));
        }
    }

    let verdict = outcomes
        .iter()
        .find(|outcome| outcome.role == SinkRole::Primary)
        .map(|primary| primary.result.as_ref().map(|_| ()).map_err(ToString::to_string));
    let (success, error) = match verdict {
        Some(Ok(())) => (true, None),
        Some(Err(message)) => (false, Some(message)),
        None => (false, Some(NO_PRIMARY.to_string())),
    };

    SubmissionReport {
        success,
        error,
        diagnostics,
        outcomes,
    }
}

/// Sends one submission to a primary sink and any number of secondaries concurrently.
#[derive(Clone)]
pub struct Relay {
    primary: Arc<dyn Sink>,
    secondaries: Vec<Arc<dyn Sink>>,
    timeout: Option<Duration>,
}

impl Relay {
    pub fn new(primary: impl Sink + 'static) -> Self {
        Self {
            primary: Arc::new(primary),
            secondaries: Vec::new(),
            timeout: None,
        }
    }

    pub fn with_secondary(mut self, sink: impl Sink + 'static) -> Self {
        self.secondaries.push(Arc::new(sink));
        self
    }

    /// Caps every sink call. Without it a sink may take as long as it likes.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn sink_count(&self) -> usize {
        1 + self.secondaries.len()
    }

    pub async fn dispatch(&self, submission: &Submission) -> SubmissionReport {
        let calls = std::iter::once((SinkRole::Primary, &self.primary))
            .chain(self.secondaries.iter().map(|sink| (SinkRole::Secondary, sink)))
            .map(|(role, sink)| self.call(role, sink.as_ref(), submission));
        let outcomes = join_all(calls).await;
        let report = settle(outcomes);
        info!(
            success = report.success,
            sinks = report.outcomes.len(),
            diagnostics = report.diagnostics.len(),
            "submission dispatched"
        );
        report
    }

    async fn call(&self, role: SinkRole, sink: &dyn Sink, submission: &Submission) -> SinkOutcome {
        let started = Instant::now();
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, sink.submit(submission))
                .await
                .unwrap_or(Err(SinkError::Timeout(limit))),
            None => sink.submit(submission).await,
        };
        debug!(
            sink = %sink.label(),
            ?role,
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sink call finished"
        );
        SinkOutcome::new(sink.label(), role, result)
    }
}
