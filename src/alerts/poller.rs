//! Background alert polling.
//!
//! One task owns every fetch. It fetches immediately, then once per
//! interval, and again whenever [`AlertPoller::refresh`] is called (the
//! user opening the notification panel). A refresh that arrives while a
//! fetch is in flight drops that fetch and starts a new one, so a slow
//! response can never overwrite a newer result. Scheduled ticks never
//! interrupt a fetch; they wait for it to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::AlertSource;
use crate::state::AlertBoard;

/// Default period between alert fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Handle to a running alert poll loop.
pub struct AlertPoller {
    refresh_tx: mpsc::Sender<()>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl AlertPoller {
    /// Start polling `source` into `board`.
    pub fn spawn(
        source: Arc<dyn AlertSource>,
        board: Arc<AlertBoard>,
        interval: Duration,
    ) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(run(source, board, interval, refresh_rx, shutdown_rx));

        Self {
            refresh_tx,
            shutdown_tx,
            handle,
        }
    }

    /// Request an immediate fetch. Returns `false` if one is already queued
    /// or the poller has stopped.
    pub fn refresh(&self) -> bool {
        self.refresh_tx.try_send(()).is_ok()
    }

    /// Stop polling, cancel any in-flight fetch and wait for the task.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}

async fn run(
    source: Arc<dyn AlertSource>,
    board: Arc<AlertBoard>,
    interval: Duration,
    mut refresh_rx: mpsc::Receiver<()>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!(
        interval_secs = interval.as_secs(),
        "Alert poller started"
    );

    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    'poll: loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break 'poll,
            Some(()) = refresh_rx.recv() => debug!("Manual alert refresh"),
            _ = tick.tick() => {}
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => break 'poll,
                Some(()) = refresh_rx.recv() => {
                    debug!("Refresh superseded in-flight alert fetch");
                }
                result = source.fetch_alerts() => {
                    board.apply(result).await;
                    break;
                }
            }
        }
    }

    info!("Alert poller shutting down");
}
