use form_spec::{FieldValue, FormData};
use serde_json::Value;

pub const TIMESTAMP_KEY: &str = "timestamp";
pub const IP_ADDRESS_KEY: &str = "ip_address";

/// A validated form snapshot plus the metadata added before it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub fields: FormData,
    pub timestamp: Option<String>,
    pub ip_address: Option<String>,
}

impl Submission {
    pub fn new(fields: FormData) -> Self {
        Self {
            fields,
            timestamp: None,
            ip_address: None,
        }
    }

    /// Flat key/value view. Enrichment keys override user fields of the same name.
    pub fn entries(&self) -> FormData {
        let mut flat = self.fields.clone();
        if let Some(timestamp) = &self.timestamp {
            flat.set(TIMESTAMP_KEY, FieldValue::text(timestamp.clone()));
        }
        if let Some(ip_address) = &self.ip_address {
            flat.set(IP_ADDRESS_KEY, FieldValue::text(ip_address.clone()));
        }
        flat
    }

    pub fn to_json(&self) -> Value {
        self.entries().to_json()
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn form_encoded(&self) -> String {
        let entries = self.entries();
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in entries.iter() {
            serializer.append_pair(name, &value.to_display());
        }
        serializer.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_keys_are_flattened_into_payload() {
        let mut fields = FormData::new();
        fields.set("name", "Ada Lovelace");
        fields.set("installments", 3i64);
        fields.set("terms", true);
        let submission = Submission {
            fields,
            timestamp: Some("2024-05-01T10:00:00Z".into()),
            ip_address: Some(String::new()),
        };

        let json = submission.to_json();
        assert_eq!(json["installments"], 3);
        assert_eq!(json["terms"], true);
        assert_eq!(json["timestamp"], "2024-05-01T10:00:00Z");
        assert_eq!(json["ip_address"], "");

        let body = submission.form_encoded();
        assert!(body.contains("name=Ada+Lovelace"));
        assert!(body.contains("installments=3"));
        assert!(body.contains("terms=true"));
        assert!(body.contains("timestamp=2024-05-01T10%3A00%3A00Z"));
    }
}
