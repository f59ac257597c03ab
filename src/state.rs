//! Application state containers.
//!
//! Each container owns the latest result of one kind of fetch and is
//! shared through `Arc`. A fetch replaces the held data wholesale; nothing
//! is merged or diffed across fetches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::alerts::{ActiveAlerts, AlertRecord, evaluate};
use crate::api::EmailSource;
use crate::config::EmailRetrievalConfig;
use crate::error::ApiError;
use crate::inbox::{
    ComplaintStats, EmailId, EmailRecord, ToneFilter, extract_email_list, filter_emails,
    format_emails,
};

/// Broadcast capacity for alert board updates.
const DEFAULT_BROADCAST_CAPACITY: usize = 16;

// ── Alerts ──────────────────────────────────────────────────────────

/// What the notification badge shows after the latest fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertSnapshot {
    pub active: ActiveAlerts,
    /// Error text of the latest fetch, if it failed.
    pub last_error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AlertSnapshot {
    pub fn count(&self) -> usize {
        self.active.count
    }
}

/// Holds the active alert set and notifies subscribers on every fetch.
pub struct AlertBoard {
    snapshot: RwLock<AlertSnapshot>,
    tx: broadcast::Sender<AlertSnapshot>,
}

impl AlertBoard {
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            snapshot: RwLock::new(AlertSnapshot::default()),
            tx,
        })
    }

    /// Receive a snapshot after every applied fetch.
    pub fn subscribe(&self) -> broadcast::Receiver<AlertSnapshot> {
        self.tx.subscribe()
    }

    /// Replace the board with the outcome of a fetch.
    ///
    /// Success evaluates and stores the active subset. Failure empties the
    /// board and records the error. Returns the new count.
    pub async fn apply(&self, result: Result<Vec<AlertRecord>, ApiError>) -> usize {
        let next = match result {
            Ok(alerts) => {
                let active = evaluate(&alerts);
                debug!(
                    fetched = alerts.len(),
                    active = active.count,
                    "Alerts evaluated"
                );
                AlertSnapshot {
                    active,
                    last_error: None,
                    updated_at: Some(Utc::now()),
                }
            }
            Err(e) => {
                warn!(error = %e, "Alert fetch failed, clearing active alerts");
                AlertSnapshot {
                    active: ActiveAlerts::default(),
                    last_error: Some(e.to_string()),
                    updated_at: Some(Utc::now()),
                }
            }
        };

        let count = next.count();
        {
            let mut snapshot = self.snapshot.write().await;
            *snapshot = next.clone();
        }

        // Ok if nobody is listening
        let _ = self.tx.send(next);
        count
    }

    pub async fn snapshot(&self) -> AlertSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Badge count.
    pub async fn count(&self) -> usize {
        self.snapshot.read().await.count()
    }
}

/// Wait for the next board update. A receiver that fell behind skips to the
/// oldest update still buffered; `None` once the board is gone.
pub async fn next_snapshot(
    updates: &mut broadcast::Receiver<AlertSnapshot>,
) -> Option<AlertSnapshot> {
    loop {
        match updates.recv().await {
            Ok(snapshot) => return Some(snapshot),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "Alert subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

// ── Inbox ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct InboxSnapshot {
    pub emails: Vec<EmailRecord>,
    /// Error text of the latest retrieval, if it failed.
    pub last_error: Option<String>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Holds the formatted records from the latest email retrieval.
pub struct InboxState {
    snapshot: RwLock<InboxSnapshot>,
}

impl InboxState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshot: RwLock::new(InboxSnapshot::default()),
        })
    }

    /// Retrieve, format and store emails. On failure the previous records
    /// stay visible alongside the error.
    pub async fn refresh(
        &self,
        source: &dyn EmailSource,
        config: &EmailRetrievalConfig,
    ) -> Result<usize, ApiError> {
        match source.retrieve_emails(config).await {
            Ok(response) => {
                let emails = format_emails(extract_email_list(&response));
                let count = emails.len();
                info!(count, folder = %config.folder, "Inbox refreshed");

                let mut snapshot = self.snapshot.write().await;
                *snapshot = InboxSnapshot {
                    emails,
                    last_error: None,
                    fetched_at: Some(Utc::now()),
                };
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "Email retrieval failed");
                self.snapshot.write().await.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn snapshot(&self) -> InboxSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn emails(&self) -> Vec<EmailRecord> {
        self.snapshot.read().await.emails.clone()
    }

    pub async fn find(&self, id: &EmailId) -> Option<EmailRecord> {
        self.snapshot
            .read()
            .await
            .emails
            .iter()
            .find(|e| &e.id == id)
            .cloned()
    }

    pub async fn filtered(&self, query: &str, tone: ToneFilter) -> Vec<EmailRecord> {
        let snapshot = self.snapshot.read().await;
        filter_emails(&snapshot.emails, query, tone)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn stats(&self) -> ComplaintStats {
        ComplaintStats::from_records(&self.snapshot.read().await.emails)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FixtureBackend;
    use crate::api::fixtures::alerts_response;
    use crate::alerts::AlertsResponse;
    use crate::tone::Tone;
    use async_trait::async_trait;
    use serde_json::Value;

    fn fixture_alerts() -> Vec<AlertRecord> {
        serde_json::from_value::<AlertsResponse>(alerts_response())
            .unwrap()
            .alerts
    }

    struct FailingSource;

    #[async_trait]
    impl EmailSource for FailingSource {
        async fn retrieve_emails(&self, _config: &EmailRetrievalConfig) -> Result<Value, ApiError> {
            Err(ApiError::Status {
                status: 502,
                message: "IMAP login failed".into(),
            })
        }
    }

    #[tokio::test]
    async fn board_holds_active_alerts() {
        let board = AlertBoard::new();
        assert_eq!(board.count().await, 0);

        let count = board.apply(Ok(fixture_alerts())).await;
        assert_eq!(count, 3);

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.active.alerts.len(), 3);
        assert!(snapshot.last_error.is_none());
        assert!(snapshot.updated_at.is_some());
    }

    #[tokio::test]
    async fn failed_fetch_resets_board() {
        let board = AlertBoard::new();
        board.apply(Ok(fixture_alerts())).await;

        let count = board
            .apply(Err(ApiError::Transport {
                endpoint: "/alerts".into(),
                reason: "connection refused".into(),
            }))
            .await;

        assert_eq!(count, 0);
        let snapshot = board.snapshot().await;
        assert!(snapshot.active.alerts.is_empty());
        assert!(snapshot.last_error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn each_fetch_replaces_previous_set() {
        let board = AlertBoard::new();
        let alerts = fixture_alerts();
        board.apply(Ok(alerts.clone())).await;
        board.apply(Ok(alerts[..1].to_vec())).await;
        assert_eq!(board.count().await, 1);
        board.apply(Ok(alerts)).await;
        assert_eq!(board.count().await, 3);
    }

    #[tokio::test]
    async fn subscribers_see_updates() {
        let board = AlertBoard::new();
        let mut rx = board.subscribe();
        board.apply(Ok(fixture_alerts())).await;
        let update = rx.recv().await.unwrap();
        assert_eq!(update.count(), 3);
    }

    #[tokio::test]
    async fn lagging_subscriber_keeps_receiving() {
        let board = AlertBoard::new();
        let mut rx = board.subscribe();
        let alerts = fixture_alerts();
        for _ in 0..DEFAULT_BROADCAST_CAPACITY + 4 {
            board.apply(Ok(alerts.clone())).await;
        }
        board.apply(Ok(alerts[..1].to_vec())).await;

        let first = next_snapshot(&mut rx).await.unwrap();
        assert_eq!(first.count(), 3);

        let mut last = first;
        while let Ok(snapshot) = rx.try_recv() {
            last = snapshot;
        }
        assert_eq!(last.count(), 1);
    }

    #[tokio::test]
    async fn subscriber_ends_when_board_is_dropped() {
        let board = AlertBoard::new();
        let mut rx = board.subscribe();
        drop(board);
        assert!(next_snapshot(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn inbox_refresh_formats_records() {
        let inbox = InboxState::new();
        let count = inbox
            .refresh(&FixtureBackend::new(), &EmailRetrievalConfig::default())
            .await
            .unwrap();
        assert_eq!(count, 7);

        let stats = inbox.stats().await;
        assert_eq!(stats.complaints, 2);

        let complaints = inbox.filtered("", ToneFilter::Only(Tone::Complaint)).await;
        assert_eq!(complaints.len(), 2);

        let found = inbox.find(&EmailId::Number(2)).await.unwrap();
        assert_eq!(found.tone, Tone::Appreciation);
        assert!(inbox.find(&EmailId::Number(99)).await.is_none());
    }

    #[tokio::test]
    async fn inbox_failure_keeps_previous_records() {
        let inbox = InboxState::new();
        inbox
            .refresh(&FixtureBackend::new(), &EmailRetrievalConfig::default())
            .await
            .unwrap();

        let err = inbox
            .refresh(&FailingSource, &EmailRetrievalConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(502));

        let snapshot = inbox.snapshot().await;
        assert_eq!(snapshot.emails.len(), 7);
        assert_eq!(snapshot.last_error.as_deref(), Some("IMAP login failed"));
    }
}
