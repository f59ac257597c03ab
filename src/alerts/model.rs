//! Alert objects as the backend sends them.
//!
//! Deserialization never fails on a single bad field: nulls and wrong types
//! fall back to defaults, numeric strings are read as numbers, and a record
//! that still cannot be read is dropped without losing the rest.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Which metric an alert tracks. Unknown kinds are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertType {
    ComplaintEmails,
    ConversionRate,
    RevenueDelta,
    Other(String),
}

impl AlertType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ComplaintEmails => "complaint_emails",
            Self::ConversionRate => "conversion_rate",
            Self::RevenueDelta => "revenue_delta",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for AlertType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "complaint_emails" => Self::ComplaintEmails,
            "conversion_rate" => Self::ConversionRate,
            "revenue_delta" => Self::RevenueDelta,
            _ => Self::Other(s),
        }
    }
}

impl From<AlertType> for String {
    fn from(t: AlertType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    #[default]
    #[serde(other)]
    Low,
}

/// A metric-bearing alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertType,
    #[serde(default, deserialize_with = "or_default")]
    pub severity: Severity,
    #[serde(default, deserialize_with = "or_default")]
    pub title: String,
    #[serde(default, deserialize_with = "or_default")]
    pub message: String,
    /// Occurrence count (`complaint_emails`).
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub count: Option<f64>,
    /// Current metric value (`conversion_rate`, `revenue_delta`), in percent.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<f64>,
    /// Threshold the backend reported. Informational only; activation uses
    /// fixed per-type bounds.
    #[serde(
        default,
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub threshold: Option<f64>,
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub actionable: bool,
    /// Route token the UI navigates to, e.g. `/respond`.
    #[serde(
        default,
        deserialize_with = "or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub action_url: Option<String>,
}

/// Body of `GET /alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, deserialize_with = "readable_alerts")]
    pub alerts: Vec<AlertRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// The field's value, or its default when null or of the wrong type.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Numbers as sent, numeric strings parsed, anything else absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    })
}

/// Every alert record that can be read. Unreadable records are logged and
/// skipped; a non-array yields no alerts.
fn readable_alerts<'de, D>(deserializer: D) -> Result<Vec<AlertRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match AlertRecord::deserialize(item) {
            Ok(alert) => Some(alert),
            Err(e) => {
                warn!(index, error = %e, "Skipping unreadable alert");
                None
            }
        })
        .collect())
}
