//! Display-side helpers over formatted records: search, tone filter and
//! complaint volume.

use std::str::FromStr;

use serde::Serialize;

use super::record::EmailRecord;
use crate::tone::Tone;

/// Tone selector for the inbox list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToneFilter {
    #[default]
    All,
    Only(Tone),
}

impl ToneFilter {
    pub fn accepts(self, tone: Tone) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == tone,
        }
    }
}

impl FromStr for ToneFilter {
    type Err = String;

    /// `all`, or a tone label with or without `#` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let bare = s.strip_prefix('#').unwrap_or(s);
        Tone::ALL
            .into_iter()
            .find(|tone| tone.label()[1..].eq_ignore_ascii_case(bare))
            .map(Self::Only)
            .ok_or_else(|| format!("unknown tone filter: {s}"))
    }
}

/// Records matching both the search text and the tone filter, in order.
/// An empty query matches everything.
pub fn filter_emails<'a>(
    records: &'a [EmailRecord],
    query: &str,
    tone: ToneFilter,
) -> Vec<&'a EmailRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| tone.accepts(r.tone) && r.matches_lowercase(&needle))
        .collect()
}

/// How loud the inbox is, by share of complaints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Under 25% complaints (including none).
    Calm,
    /// 25% up to 50%.
    Low,
    /// 50% up to 75%.
    Medium,
    /// 75% and above.
    High,
}

impl Mood {
    fn from_percentage(pct: f64) -> Self {
        if pct >= 75.0 {
            Self::High
        } else if pct >= 50.0 {
            Self::Medium
        } else if pct >= 25.0 {
            Self::Low
        } else {
            Self::Calm
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplaintStats {
    pub complaints: usize,
    pub total: usize,
    /// 0.0 for an empty inbox.
    pub percentage: f64,
    pub mood: Mood,
}

impl ComplaintStats {
    pub fn from_records(records: &[EmailRecord]) -> Self {
        let complaints = records.iter().filter(|r| r.is_complaint()).count();
        let total = records.len();
        let percentage = if total > 0 {
            complaints as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            complaints,
            total,
            percentage,
            mood: Mood::from_percentage(percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbox::record::EmailId;

    fn record(id: i64, from: &str, subject: &str, tone: Tone) -> EmailRecord {
        EmailRecord {
            id: EmailId::Number(id),
            from: from.into(),
            subject: subject.into(),
            preview: format!("Body of {subject}"),
            timestamp: "2024-11-28T10:00:00Z".into(),
            tone,
            campaign: "Inbox".into(),
        }
    }

    fn inbox() -> Vec<EmailRecord> {
        vec![
            record(1, "john@acme.com", "Refund request", Tone::Complaint),
            record(2, "sarah@techstart.io", "Thanks!", Tone::Appreciation),
            record(3, "mike@startup.com", "Dark mode idea", Tone::Feedback),
            record(4, "lisa@acme.com", "Export broken", Tone::Complaint),
        ]
    }

    #[test]
    fn parses_tone_filters() {
        assert_eq!("all".parse::<ToneFilter>().unwrap(), ToneFilter::All);
        assert_eq!(
            "#complaint".parse::<ToneFilter>().unwrap(),
            ToneFilter::Only(Tone::Complaint)
        );
        assert_eq!(
            "Feedback".parse::<ToneFilter>().unwrap(),
            ToneFilter::Only(Tone::Feedback)
        );
        assert!("angry".parse::<ToneFilter>().is_err());
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let records = inbox();
        let hits = filter_emails(&records, "ACME", ToneFilter::All);
        assert_eq!(hits.len(), 2);
        let hits = filter_emails(&records, "body of dark", ToneFilter::All);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, EmailId::Number(3));
    }

    #[test]
    fn tone_and_query_combine() {
        let records = inbox();
        let hits = filter_emails(&records, "acme", ToneFilter::Only(Tone::Complaint));
        assert_eq!(hits.len(), 2);
        let hits = filter_emails(&records, "", ToneFilter::Only(Tone::Appreciation));
        assert_eq!(hits.len(), 1);
        let hits = filter_emails(&records, "acme", ToneFilter::Only(Tone::Generic));
        assert!(hits.is_empty());
    }

    #[test]
    fn complaint_stats_tiers() {
        let records = inbox();
        let stats = ComplaintStats::from_records(&records);
        assert_eq!(stats.complaints, 2);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.percentage, 50.0);
        assert_eq!(stats.mood, Mood::Medium);

        assert_eq!(ComplaintStats::from_records(&records[..1]).mood, Mood::High);
        assert_eq!(ComplaintStats::from_records(&records[1..]).mood, Mood::Low);
        assert_eq!(ComplaintStats::from_records(&records[1..3]).mood, Mood::Calm);
    }

    #[test]
    fn empty_inbox_is_calm() {
        let stats = ComplaintStats::from_records(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.percentage, 0.0);
        assert_eq!(stats.mood, Mood::Calm);
    }
}
