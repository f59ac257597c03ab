//! Metric alerts: the wire model, threshold evaluation, and the poller
//! that keeps an [`crate::state::AlertBoard`] current.

pub mod evaluator;
pub mod model;
pub mod poller;

pub use evaluator::{ActiveAlerts, evaluate};
pub use model::{AlertRecord, AlertType, AlertsResponse, Severity};
pub use poller::{AlertPoller, DEFAULT_POLL_INTERVAL};
