//! Threshold rules deciding which alerts are active.

use serde::Serialize;

use super::model::{AlertRecord, AlertType};

/// `complaint_emails` fires at this many complaints or more.
pub const COMPLAINT_COUNT_MIN: f64 = 1.0;
/// `conversion_rate` fires strictly below this percentage.
pub const CONVERSION_RATE_FLOOR: f64 = 30.0;
/// `revenue_delta` fires strictly below this percentage change.
pub const REVENUE_DELTA_FLOOR: f64 = -20.0;

impl AlertRecord {
    /// Whether this alert's type-specific predicate holds. Missing metric
    /// fields and unknown types are never active.
    pub fn is_active(&self) -> bool {
        match self.kind {
            AlertType::ComplaintEmails => self.count.is_some_and(|c| c >= COMPLAINT_COUNT_MIN),
            AlertType::ConversionRate => self.value.is_some_and(|v| v < CONVERSION_RATE_FLOOR),
            AlertType::RevenueDelta => self.value.is_some_and(|v| v < REVENUE_DELTA_FLOOR),
            AlertType::Other(_) => false,
        }
    }
}

/// The active subset of a fetch, with its badge count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActiveAlerts {
    pub alerts: Vec<AlertRecord>,
    pub count: usize,
}

/// Keep the active alerts, in input order.
pub fn evaluate(alerts: &[AlertRecord]) -> ActiveAlerts {
    let active: Vec<AlertRecord> = alerts.iter().filter(|a| a.is_active()).cloned().collect();
    ActiveAlerts {
        count: active.len(),
        alerts: active,
    }
}
