//! Records exchanged between the form, the gateway and the logging webhook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One submission of the form. Absent and `null` JSON fields decode as empty strings so they
/// are reported by validation rather than by the JSON extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub business_type: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub query: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl ConsultationRequest {
    pub fn new(
        company_name: impl Into<String>,
        business_type: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            business_type: business_type.into(),
            query: query.into(),
        }
    }

    /// JSON names of the fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("companyName", &self.company_name),
            ("businessType", &self.business_type),
            ("query", &self.query),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Successful gateway reply body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationReply {
    pub response: String,
}

/// What the UI shows once a consultation finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationResult {
    Advice(String),
    Failed(String),
}

impl ConsultationResult {
    pub fn text(&self) -> &str {
        match self {
            Self::Advice(text) | Self::Failed(text) => text,
        }
    }
}

/// Row posted to the spreadsheet webhook after a successful consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub company_name: String,
    pub business_type: String,
    pub query: String,
    pub response_text: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(request: &ConsultationRequest, response_text: &str) -> Self {
        Self {
            company_name: request.company_name.clone(),
            business_type: request.business_type.clone(),
            query: request.query.clone(),
            response_text: response_text.to_string(),
            timestamp: Utc::now(),
        }
    }
}
