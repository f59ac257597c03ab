//! Canonical email record shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tone::Tone;

/// Identifier of an email, as the source supplied it or positionally assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EmailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EmailId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for EmailId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// An inbound email after normalization. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: EmailId,
    /// Sender address or display string.
    pub from: String,
    pub subject: String,
    /// Body or snippet text; empty if the source had none.
    pub preview: String,
    /// Timestamp as the source sent it, or the formatting time.
    pub timestamp: String,
    pub tone: Tone,
    pub campaign: String,
}

impl EmailRecord {
    /// Only complaints are offered for AI-drafted resolution.
    pub fn is_complaint(&self) -> bool {
        self.tone == Tone::Complaint
    }

    /// Case-insensitive substring match over sender, subject and preview.
    /// `needle` must already be lower-cased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.from.to_lowercase().contains(needle)
            || self.subject.to_lowercase().contains(needle)
            || self.preview.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_id_serializes_untagged() {
        assert_eq!(serde_json::to_string(&EmailId::Number(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&EmailId::from("msg_001")).unwrap(),
            "\"msg_001\""
        );
        let parsed: EmailId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, EmailId::Number(42));
    }

    #[test]
    fn record_serializes_tone_label() {
        let record = EmailRecord {
            id: EmailId::Number(1),
            from: "a@b.com".into(),
            subject: "Hi".into(),
            preview: String::new(),
            timestamp: "2024-11-28T14:32:15Z".into(),
            tone: Tone::Feedback,
            campaign: "Inbox".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tone"], "#Feedback");
        assert_eq!(json["from"], "a@b.com");
        assert!(!record.is_complaint());
    }
}
