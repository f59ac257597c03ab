//! Upstream email objects → canonical [`EmailRecord`]s.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::debug;

use super::fields::{self, FALLBACK_CAMPAIGN, FALLBACK_FROM, FALLBACK_SUBJECT, first_present};
use super::record::{EmailId, EmailRecord};
use crate::tone::{Tone, detect_tone, normalize_tone};

/// Locate the email array in a retrieve-emails response.
///
/// Checks `emails`, then `data`, then the response itself if it is an
/// array, then `messages`. The first candidate found decides; if it is not
/// an array the result is empty.
pub fn extract_email_list(response: &Value) -> &[Value] {
    let list = if let Some(list) = first_present(response, &["emails", "data"]) {
        list
    } else if response.is_array() {
        response
    } else if let Some(list) = first_present(response, &["messages"]) {
        list
    } else {
        return &[];
    };

    list.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Format upstream records, stamping missing timestamps with the current time.
pub fn format_emails(records: &[Value]) -> Vec<EmailRecord> {
    format_emails_at(records, Utc::now())
}

/// Format upstream records with an explicit "now" for missing timestamps.
///
/// Output has one record per input, in input order. Records without an id
/// get their 1-based position.
pub fn format_emails_at(records: &[Value], now: DateTime<Utc>) -> Vec<EmailRecord> {
    let now = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut detected = 0usize;

    let formatted: Vec<EmailRecord> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let (tone, was_detected) = resolve_tone(record);
            if was_detected {
                detected += 1;
            }
            EmailRecord {
                id: resolve_id(record, index),
                from: fields::FROM
                    .resolve_text(record)
                    .unwrap_or_else(|| FALLBACK_FROM.to_string()),
                subject: fields::SUBJECT
                    .resolve_text(record)
                    .unwrap_or_else(|| FALLBACK_SUBJECT.to_string()),
                preview: fields::PREVIEW.resolve_text(record).unwrap_or_default(),
                timestamp: fields::TIMESTAMP
                    .resolve_text(record)
                    .unwrap_or_else(|| now.clone()),
                tone,
                campaign: fields::CAMPAIGN
                    .resolve_text(record)
                    .unwrap_or_else(|| FALLBACK_CAMPAIGN.to_string()),
            }
        })
        .collect();

    debug!(
        count = formatted.len(),
        detected, "Formatted upstream emails"
    );

    formatted
}

fn resolve_id(record: &Value, index: usize) -> EmailId {
    match fields::ID.resolve(record) {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(n) => EmailId::Number(n),
            None => EmailId::Text(n.to_string()),
        },
        Some(other) => EmailId::Text(fields::value_text(other)),
        None => EmailId::Number(index as i64 + 1),
    }
}

/// Explicit upstream label if any, otherwise keyword detection.
/// The flag reports whether detection ran.
fn resolve_tone(record: &Value) -> (Tone, bool) {
    if let Some(label) = fields::TONE.resolve(record) {
        return (normalize_tone(Some(&fields::value_text(label))), false);
    }

    let subject = fields::SUBJECT.resolve_text(record).unwrap_or_default();
    let body = fields::DETECTION_BODY
        .resolve_text(record)
        .unwrap_or_default();
    (detect_tone(&subject, &body), true)
}
