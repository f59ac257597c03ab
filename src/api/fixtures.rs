//! Canned backend responses for running without a server.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

use super::source::{AlertSource, EmailSource};
use crate::alerts::{AlertRecord, AlertsResponse};
use crate::config::{DEFAULT_AGENT_ID, EmailRetrievalConfig};
use crate::error::ApiError;

/// In-process backend serving fixed email and alert responses.
///
/// Retrieval settings are accepted but not validated or used.
#[derive(Debug, Clone, Default)]
pub struct FixtureBackend {
    /// Simulated round-trip time before each response.
    latency: Duration,
}

impl FixtureBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl EmailSource for FixtureBackend {
    async fn retrieve_emails(&self, _config: &EmailRetrievalConfig) -> Result<Value, ApiError> {
        self.simulate_latency().await;
        debug!("Serving fixture emails");
        Ok(emails_response())
    }
}

#[async_trait]
impl AlertSource for FixtureBackend {
    async fn fetch_alerts(&self) -> Result<Vec<AlertRecord>, ApiError> {
        self.simulate_latency().await;
        debug!("Serving fixture alerts");
        let response: AlertsResponse =
            serde_json::from_value(alerts_response()).map_err(|e| ApiError::InvalidResponse {
                endpoint: "fixture:/alerts".into(),
                reason: e.to_string(),
            })?;
        Ok(response.alerts)
    }
}

/// Retrieve-emails response covering every tone, an explicit label on most
/// records, and records that need keyword detection or defaults.
pub fn emails_response() -> Value {
    json!({
        "success": true,
        "agentId": DEFAULT_AGENT_ID,
        "emails": [
            {
                "id": 1,
                "message_id": "msg_001",
                "from": "john.smith@acmecorp.com",
                "sender": "John Smith <john.smith@acmecorp.com>",
                "subject": "Product not working as expected",
                "body": "I purchased your product last week and it has been malfunctioning since day one. The dashboard keeps crashing and I cannot access my data. Please refund my money or fix this issue.",
                "snippet": "I purchased your product last week and it has been malfunctioning...",
                "timestamp": "2024-11-28T14:32:15Z",
                "date": "2024-11-28 14:32:15",
                "tone": "#Complaint",
                "folder": "INBOX",
                "campaign": "Q4 Enterprise"
            },
            {
                "id": 2,
                "message_id": "msg_002",
                "from": "sarah.johnson@techstart.io",
                "subject": "Thank you for the excellent service!",
                "body": "I wanted to reach out and express my gratitude for the outstanding customer support I received yesterday. Your team resolved my issue within minutes.",
                "timestamp": "2024-11-28T14:28:42Z",
                "tone": "#Appreciation",
                "folder": "INBOX",
                "campaign": "SaaS Decision Makers"
            },
            {
                "id": 3,
                "message_id": "msg_003",
                "from": "mike.chen@startup.com",
                "subject": "Feature request for dashboard",
                "body": "I would like to suggest adding a dark mode feature to the dashboard. This would greatly improve the user experience. What do you think?",
                "timestamp": "2024-11-28T14:15:08Z",
                "tone": "feedback",
                "folder": "INBOX",
                "campaign": "Q4 Enterprise"
            },
            {
                "id": 4,
                "message_id": "msg_004",
                "from": "david.wilson@company.com",
                "subject": "Re: Meeting follow-up",
                "body": "Following up on our conversation from last week regarding the integration project. When would be a good time to schedule a follow-up call?",
                "timestamp": "2024-11-28T13:30:11Z",
                "tone": "#Generic",
                "folder": "INBOX",
                "campaign": "Startup Founders"
            },
            {
                "id": 5,
                "message_id": "msg_005",
                "sender": "Lisa Anderson <lisa.anderson@business.com>",
                "subject": "Very disappointed with recent update",
                "snippet": "The latest update has completely broken my workflow. I cannot export my reports anymore...",
                "date": "2024-11-28 13:22:45",
                "folder": "INBOX"
            },
            {
                "message_id": "msg_006",
                "email_address": "emma.davis@retail.co",
                "subject": "Loving the new reports",
                "text": "The weekly digest is exactly what our team needed.",
                "received_at": "2024-11-28T12:10:00Z",
                "sentiment": "APPRECIATION"
            },
            {
                "uid": "u-0007",
                "from_address": "raj.patel@logistics.net",
                "content": "Quick note about our contract renewal next month.",
                "sent_date": "2024-11-28T11:45:00Z"
            }
        ],
        "total": 7,
        "limit": 50,
        "unread_only": true
    })
}

/// Alerts response with one active alert of each kind.
pub fn alerts_response() -> Value {
    json!({
        "success": true,
        "agentId": DEFAULT_AGENT_ID,
        "alerts": [
            {
                "id": "alert_1",
                "type": "complaint_emails",
                "severity": "high",
                "title": "Complaint Emails Detected",
                "message": "You have 4 complaint emails that require attention",
                "count": 4,
                "threshold": 1,
                "timestamp": "2024-11-29T10:30:00Z",
                "actionable": true,
                "actionUrl": "/respond"
            },
            {
                "id": "alert_2",
                "type": "conversion_rate",
                "severity": "medium",
                "title": "Low Conversion Rate",
                "message": "Current conversion rate is 18.5%, below the 30% threshold",
                "value": 18.5,
                "threshold": 30,
                "timestamp": "2024-11-29T10:25:00Z",
                "actionable": true,
                "actionUrl": "/dashboard"
            },
            {
                "id": "alert_3",
                "type": "revenue_delta",
                "severity": "high",
                "title": "Revenue Decline Detected",
                "message": "Revenue has decreased by 25% compared to last period",
                "value": -25,
                "threshold": -20,
                "timestamp": "2024-11-29T10:20:00Z",
                "actionable": true,
                "actionUrl": "/dashboard"
            }
        ],
        "timestamp": "2024-11-29T10:30:00Z"
    })
}
