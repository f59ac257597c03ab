//! Request payloads for the Rotunda backend.
//!
//! Field names follow the backend's wire format, which mixes snake_case,
//! camelCase (`agentId`) and PascalCase (`StripeEnabled`).

use serde::Serialize;
use serde_json::Value;

use crate::config::EmailRetrievalConfig;
use crate::inbox::EmailRecord;

/// Integrations the chat agent may use for a message.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub stripe_enabled: bool,
    pub slack_enabled: bool,
    pub cal_enabled: bool,
    pub cal_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
    #[serde(rename = "StripeEnabled")]
    pub stripe_enabled: bool,
    #[serde(rename = "SlackEnabled")]
    pub slack_enabled: bool,
    #[serde(rename = "CalEnabled")]
    pub cal_enabled: bool,
    /// Sent as `null` when unset.
    #[serde(rename = "CalUrl")]
    pub cal_url: Option<&'a str>,
}

impl<'a> ChatRequest<'a> {
    pub fn new(message: &'a str, agent_id: &'a str, options: &'a ChatOptions) -> Self {
        Self {
            message,
            agent_id,
            stripe_enabled: options.stripe_enabled,
            slack_enabled: options.slack_enabled,
            cal_enabled: options.cal_enabled,
            cal_url: options.cal_url.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EnrichLeadRequest<'a> {
    pub lead_data: &'a Value,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SalesForecastRequest<'a> {
    pub query: &'a str,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct MarketingAnalysisRequest<'a> {
    pub query: &'a str,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_data: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
pub struct ProcessFileRequest<'a> {
    pub url: &'a str,
    pub filename: &'a str,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
}

/// Who an email is for or from. Serialized as `{}` when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl CustomerInfo {
    /// Sender and subject of an inbound email, as complaint resolution expects.
    pub fn from_record(record: &EmailRecord) -> Self {
        Self {
            email: Some(record.from.clone()),
            subject: Some(record.subject.clone()),
            ..Default::default()
        }
    }
}

/// Body shared by `/generate-html-email` and `/resolve-email-complaint`.
#[derive(Debug, Serialize)]
pub struct EmailContentRequest<'a> {
    pub email_content: &'a str,
    pub customer_info: &'a CustomerInfo,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
}

/// Body of `/retrieve-emails`. The password is only included for IMAP.
#[derive(Debug, Serialize)]
pub struct RetrieveEmailsRequest<'a> {
    pub email_address: &'a str,
    pub imap_server: &'a str,
    pub imap_port: u16,
    pub folder: &'a str,
    pub limit: u32,
    pub unread_only: bool,
    #[serde(rename = "agentId")]
    pub agent_id: &'a str,
    pub use_gmail_api: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail_credentials_path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail_token_path: Option<&'a str>,
}

impl<'a> RetrieveEmailsRequest<'a> {
    pub fn new(config: &'a EmailRetrievalConfig, agent_id: &'a str) -> Self {
        let password = if config.use_gmail_api {
            None
        } else {
            config.password()
        };

        Self {
            email_address: &config.email_address,
            imap_server: &config.imap_server,
            imap_port: config.imap_port,
            folder: &config.folder,
            limit: config.limit,
            unread_only: config.unread_only,
            agent_id,
            use_gmail_api: config.use_gmail_api,
            password,
            gmail_credentials_path: config.gmail_credentials_path.as_deref(),
            gmail_token_path: config.gmail_token_path.as_deref(),
        }
    }
}

/// Human-readable text of a chat reply: a bare string, then `response`,
/// then `message`, else the pretty-printed JSON.
pub fn chat_reply_text(reply: &Value) -> String {
    if let Some(text) = reply.as_str() {
        return text.to_string();
    }
    for key in ["response", "message"] {
        if let Some(Value::String(text)) = reply.get(key) {
            if !text.is_empty() {
                return text.clone();
            }
        }
    }
    serde_json::to_string_pretty(reply).unwrap_or_else(|_| reply.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_uses_backend_casing() {
        let options = ChatOptions {
            stripe_enabled: true,
            ..Default::default()
        };
        let body = serde_json::to_value(ChatRequest::new("hi", "agent-1", &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "message": "hi",
                "agentId": "agent-1",
                "StripeEnabled": true,
                "SlackEnabled": false,
                "CalEnabled": false,
                "CalUrl": null
            })
        );
    }

    #[test]
    fn forecast_omits_missing_history() {
        let body = serde_json::to_value(SalesForecastRequest {
            query: "next quarter",
            agent_id: "a",
            historical_data: None,
        })
        .unwrap();
        assert!(body.get("historical_data").is_none());
    }

    #[test]
    fn empty_customer_info_is_empty_object() {
        assert_eq!(serde_json::to_value(CustomerInfo::default()).unwrap(), json!({}));
    }

    #[test]
    fn retrieve_request_includes_password_for_imap() {
        let config = EmailRetrievalConfig {
            email_address: "me@rotunda.ai".into(),
            ..Default::default()
        }
        .with_password("app-pass");
        let body = serde_json::to_value(RetrieveEmailsRequest::new(&config, "a")).unwrap();
        assert_eq!(body["password"], "app-pass");
        assert_eq!(body["imap_server"], "imap.gmail.com");
        assert_eq!(body["imap_port"], 993);
        assert!(body.get("gmail_token_path").is_none());
    }

    #[test]
    fn retrieve_request_drops_password_for_gmail_api() {
        let config = EmailRetrievalConfig {
            email_address: "me@rotunda.ai".into(),
            use_gmail_api: true,
            gmail_token_path: Some("/secrets/token.json".into()),
            ..Default::default()
        }
        .with_password("ignored");
        let body = serde_json::to_value(RetrieveEmailsRequest::new(&config, "a")).unwrap();
        assert!(body.get("password").is_none());
        assert_eq!(body["gmail_token_path"], "/secrets/token.json");
    }

    #[test]
    fn chat_reply_text_prefers_response_field() {
        assert_eq!(chat_reply_text(&json!("plain")), "plain");
        assert_eq!(
            chat_reply_text(&json!({"response": "r", "message": "m"})),
            "r"
        );
        assert_eq!(chat_reply_text(&json!({"message": "m"})), "m");
        assert!(chat_reply_text(&json!({"forecast": {}})).contains("forecast"));
    }
}
