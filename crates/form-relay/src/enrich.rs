use std::sync::Arc;

use async_trait::async_trait;
use form_spec::FormData;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};
use url::Url;

use crate::submission::Submission;

/// Source of the submission timestamp.
pub trait Clock: Send + Sync {
    fn now_rfc3339(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_rfc3339(&self) -> String {
        match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(stamp) => stamp,
            Err(err) => {
                warn!(error = %err, "failed to format submission timestamp");
                String::new()
            }
        }
    }
}

/// Always reports the same instant. Useful for replays and tests.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now_rfc3339(&self) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("address lookup request failed: {0}")]
    Transport(String),
    #[error("address lookup returned status {0}")]
    Status(u16),
    #[error("address lookup returned an empty body")]
    Empty,
}

/// Resolves the caller's public address.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self) -> Result<String, LookupError>;
}

/// Queries an ipify-style endpoint. Accepts `{"ip": "..."}` or a plain text body.
#[derive(Debug, Clone)]
pub struct HttpAddressLookup {
    client: reqwest::Client,
    url: Url,
}

#[derive(Deserialize)]
struct AddressBody {
    ip: String,
}

impl HttpAddressLookup {
    pub fn new(url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn lookup(&self) -> Result<String, LookupError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        let address = match serde_json::from_str::<AddressBody>(&body) {
            Ok(parsed) => parsed.ip,
            Err(_) => body.trim().to_string(),
        };
        if address.is_empty() {
            return Err(LookupError::Empty);
        }
        Ok(address)
    }
}

/// Adds the optional timestamp and address metadata to a form snapshot.
///
/// A failed address lookup never blocks a submission; the field is sent empty.
#[derive(Clone, Default)]
pub struct Enricher {
    clock: Option<Arc<dyn Clock>>,
    address: Option<Arc<dyn AddressLookup>>,
}

impl Enricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_address_lookup(mut self, lookup: impl AddressLookup + 'static) -> Self {
        self.address = Some(Arc::new(lookup));
        self
    }

    pub async fn enrich(&self, fields: FormData) -> Submission {
        let mut submission = Submission::new(fields);
        submission.timestamp = self.clock.as_ref().map(|clock| clock.now_rfc3339());
        if let Some(lookup) = &self.address {
            let address = match lookup.lookup().await {
                Ok(address) => address,
                Err(err) => {
                    warn!(error = %err, "address lookup failed; submitting without it");
                    String::new()
                }
            };
            debug!(address = %address, "resolved submitter address");
            submission.ip_address = Some(address);
        }
        submission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    #[async_trait]
    impl AddressLookup for Unreachable {
        async fn lookup(&self) -> Result<String, LookupError> {
            Err(LookupError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn failed_lookup_sends_empty_address() {
        let enricher = Enricher::new()
            .with_clock(FixedClock("2024-05-01T10:00:00Z".into()))
            .with_address_lookup(Unreachable);
        let submission = enricher.enrich(FormData::new()).await;
        assert_eq!(submission.timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(submission.ip_address.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn disabled_enrichment_leaves_payload_untouched() {
        let mut fields = FormData::new();
        fields.set("name", "Ada");
        let submission = Enricher::new().enrich(fields.clone()).await;
        assert_eq!(submission.entries(), fields);
    }

    #[test]
    fn system_clock_emits_rfc3339() {
        let stamp = SystemClock.now_rfc3339();
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok(), "{stamp}");
    }
}
