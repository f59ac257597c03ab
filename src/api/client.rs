//! HTTP client for the Rotunda backend.
//!
//! Every call returns the decoded JSON body on 2xx. Anything else becomes
//! [`ApiError::Status`] carrying the backend's own message: `detail`
//! (FastAPI), then `message`, then `error`, else `API Error: {status}`.
//! Bodies that are not JSON decode as `{}`.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{
    ChatOptions, ChatRequest, CustomerInfo, EmailContentRequest, EnrichLeadRequest,
    MarketingAnalysisRequest, ProcessFileRequest, RetrieveEmailsRequest, SalesForecastRequest,
};
use crate::alerts::AlertsResponse;
use crate::config::{ClientConfig, EmailRetrievalConfig};
use crate::error::ApiError;
use crate::inbox::EmailRecord;
use crate::inbox::fields::{first_present, value_text};

/// Tunnels such as ngrok interpose a browser warning page without this.
const NGROK_SKIP_WARNING: &str = "ngrok-skip-browser-warning";

/// Thin async wrapper over the backend's JSON endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    agent_id: String,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(NGROK_SKIP_WARNING),
            HeaderValue::from_static("true"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport {
                endpoint: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            agent_id: config.agent_id.clone(),
        })
    }

    // ── Endpoints ───────────────────────────────────────────────────

    /// `GET /health`: is the backend up?
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get("/health").await
    }

    /// `GET /config-check`: are the backend's API keys configured?
    pub async fn config_check(&self) -> Result<Value, ApiError> {
        self.get("/config-check").await
    }

    pub async fn chat(&self, message: &str, options: &ChatOptions) -> Result<Value, ApiError> {
        self.post("/chat", &ChatRequest::new(message, &self.agent_id, options))
            .await
    }

    pub async fn enrich_lead(&self, lead_data: &Value) -> Result<Value, ApiError> {
        let body = EnrichLeadRequest {
            lead_data,
            agent_id: &self.agent_id,
        };
        self.post("/enrich-lead", &body).await
    }

    pub async fn sales_forecast(
        &self,
        query: &str,
        historical_data: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let body = SalesForecastRequest {
            query,
            agent_id: &self.agent_id,
            historical_data,
        };
        self.post("/sales-forecast", &body).await
    }

    pub async fn marketing_analysis(
        &self,
        query: &str,
        campaign_data: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let body = MarketingAnalysisRequest {
            query,
            agent_id: &self.agent_id,
            campaign_data,
        };
        self.post("/marketing-analysis", &body).await
    }

    /// Hand a document URL to the backend for retrieval-augmented chat.
    pub async fn process_file(&self, url: &str, filename: &str) -> Result<Value, ApiError> {
        let body = ProcessFileRequest {
            url,
            filename,
            agent_id: &self.agent_id,
        };
        self.post("/process-file", &body).await
    }

    /// Generate an HTML marketing email. The response carries `html_email`
    /// and `plain_text`.
    pub async fn generate_html_email(
        &self,
        email_content: &str,
        customer_info: &CustomerInfo,
    ) -> Result<Value, ApiError> {
        let body = EmailContentRequest {
            email_content,
            customer_info,
            agent_id: &self.agent_id,
        };
        self.post("/generate-html-email", &body).await
    }

    /// Draft a reply to a complaint. The response carries `resolution`.
    pub async fn resolve_email_complaint(
        &self,
        email_content: &str,
        customer_info: &CustomerInfo,
    ) -> Result<Value, ApiError> {
        let body = EmailContentRequest {
            email_content,
            customer_info,
            agent_id: &self.agent_id,
        };
        self.post("/resolve-email-complaint", &body).await
    }

    /// Draft a reply to an inbox record. Only complaints are eligible; the
    /// preview is sent as the email content with sender and subject as
    /// customer info. Returns the `resolution` object.
    pub async fn resolve_complaint(&self, record: &EmailRecord) -> Result<Value, ApiError> {
        if !record.is_complaint() {
            return Err(ApiError::Validation(format!(
                "email {} is {}, only complaints can be resolved",
                record.id, record.tone
            )));
        }

        let customer_info = CustomerInfo::from_record(record);
        let response = self
            .resolve_email_complaint(&record.preview, &customer_info)
            .await?;
        response
            .get("resolution")
            .cloned()
            .ok_or_else(|| ApiError::InvalidResponse {
                endpoint: "/resolve-email-complaint".into(),
                reason: "missing resolution".into(),
            })
    }

    /// Fetch mail through the backend. Settings are validated first; an
    /// invalid config never reaches the network.
    pub async fn retrieve_emails(&self, config: &EmailRetrievalConfig) -> Result<Value, ApiError> {
        config.validate()?;
        self.post(
            "/retrieve-emails",
            &RetrieveEmailsRequest::new(config, &self.agent_id),
        )
        .await
    }

    pub async fn alerts(&self) -> Result<AlertsResponse, ApiError> {
        let data = self.get("/alerts").await?;
        serde_json::from_value(data).map_err(|e| ApiError::InvalidResponse {
            endpoint: "/alerts".into(),
            reason: e.to_string(),
        })
    }

    // ── Transport ───────────────────────────────────────────────────

    async fn get(&self, endpoint: &str) -> Result<Value, ApiError> {
        debug!(endpoint, "API call (GET)");
        let request = self.http.get(self.url(endpoint));
        self.send(endpoint, request).await
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value, ApiError> {
        debug!(endpoint, "API call (POST)");
        let request = self.http.post(self.url(endpoint)).json(body);
        self.send(endpoint, request).await
    }

    async fn send(
        &self,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, ApiError> {
        let transport = |e: reqwest::Error| ApiError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        };

        let response = request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "API request failed");
            transport(e)
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(transport)?;
        let data: Value =
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(Default::default()));

        if !status.is_success() {
            let message = error_message(&data, status.as_u16());
            warn!(endpoint, status = status.as_u16(), %message, "API error response");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        debug!(endpoint, status = status.as_u16(), "API response");
        Ok(data)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }
}

/// Error text of a failed response body.
pub fn error_message(data: &Value, status: u16) -> String {
    first_present(data, &["detail", "message", "error"])
        .map(value_text)
        .unwrap_or_else(|| format!("API Error: {status}"))
}
