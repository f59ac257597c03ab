//! Data-source seams used by the state containers and the alert poller.
//!
//! Both the live [`BackendClient`] and the in-process
//! [`super::fixtures::FixtureBackend`] implement these, so callers pick a
//! backend once from [`crate::config::BackendMode`] instead of checking a
//! flag at every call site.

use async_trait::async_trait;
use serde_json::Value;

use super::client::BackendClient;
use crate::alerts::AlertRecord;
use crate::config::EmailRetrievalConfig;
use crate::error::ApiError;

/// Anything that can produce the current alert set.
#[async_trait]
pub trait AlertSource: Send + Sync {
    async fn fetch_alerts(&self) -> Result<Vec<AlertRecord>, ApiError>;
}

/// Anything that can answer a retrieve-emails request.
///
/// Returns the raw response; `inbox::extract_email_list` and
/// `inbox::format_emails` turn it into records.
#[async_trait]
pub trait EmailSource: Send + Sync {
    async fn retrieve_emails(&self, config: &EmailRetrievalConfig) -> Result<Value, ApiError>;
}

#[async_trait]
impl AlertSource for BackendClient {
    async fn fetch_alerts(&self) -> Result<Vec<AlertRecord>, ApiError> {
        Ok(self.alerts().await?.alerts)
    }
}

#[async_trait]
impl EmailSource for BackendClient {
    async fn retrieve_emails(&self, config: &EmailRetrievalConfig) -> Result<Value, ApiError> {
        BackendClient::retrieve_emails(self, config).await
    }
}
