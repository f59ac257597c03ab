//! Email tone labels: normalization of upstream labels and the keyword
//! fallback used when the backend sends none.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse category attached to every inbound email.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    #[serde(rename = "#Complaint")]
    Complaint,
    #[serde(rename = "#Appreciation")]
    Appreciation,
    #[serde(rename = "#Feedback")]
    Feedback,
    #[default]
    #[serde(rename = "#Generic")]
    Generic,
}

impl Tone {
    pub const ALL: [Tone; 4] = [
        Tone::Complaint,
        Tone::Appreciation,
        Tone::Feedback,
        Tone::Generic,
    ];

    /// Canonical label, including the leading `#`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Complaint => "#Complaint",
            Self::Appreciation => "#Appreciation",
            Self::Feedback => "#Feedback",
            Self::Generic => "#Generic",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map a raw upstream label onto the fixed tone set.
///
/// Accepts `Complaint`, `#complaint`, ` #COMPLAINT ` and so on. Anything
/// absent, blank or unrecognized becomes [`Tone::Generic`].
pub fn normalize_tone(raw: Option<&str>) -> Tone {
    let Some(raw) = raw else {
        return Tone::Generic;
    };
    if raw.is_empty() {
        return Tone::Generic;
    }

    let trimmed = raw.trim();
    let candidate = if trimmed.starts_with('#') {
        trimmed.to_lowercase()
    } else {
        format!("#{}", trimmed.to_lowercase())
    };

    Tone::ALL
        .into_iter()
        .find(|tone| tone.label().to_lowercase() == candidate)
        .unwrap_or(Tone::Generic)
}

const COMPLAINT_KEYWORDS: &[&str] = &[
    "not working",
    "broken",
    "issue",
    "problem",
    "error",
    "bug",
    "disappointed",
    "complaint",
    "refund",
    "cancel",
    "unhappy",
    "dissatisfied",
    "terrible",
    "worst",
    "horrible",
    "frustrated",
    "angry",
    "upset",
    "failed",
    "failure",
];

const APPRECIATION_KEYWORDS: &[&str] = &[
    "thank",
    "thanks",
    "appreciate",
    "grateful",
    "great",
    "excellent",
    "amazing",
    "love",
    "wonderful",
    "fantastic",
    "awesome",
    "perfect",
    "brilliant",
    "outstanding",
    "impressed",
    "pleased",
    "satisfied",
    "happy",
];

const FEEDBACK_KEYWORDS: &[&str] = &[
    "suggestion",
    "feedback",
    "improve",
    "improvement",
    "feature",
    "recommend",
    "recommendation",
    "idea",
    "thought",
    "opinion",
    "consider",
    "should",
    "could",
    "would be nice",
    "wish",
    "hope",
];

/// Classify an email by keyword when no explicit tone was supplied.
///
/// Matching is plain substring search over `"{subject} {body}"` in lower
/// case. Sets are checked in the order complaint, appreciation, feedback;
/// the first set with any hit decides, so "thanks, but it's broken" is a
/// complaint.
pub fn detect_tone(subject: &str, body: &str) -> Tone {
    let text = format!("{subject} {body}").to_lowercase();
    let hits = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if hits(COMPLAINT_KEYWORDS) {
        Tone::Complaint
    } else if hits(APPRECIATION_KEYWORDS) {
        Tone::Appreciation
    } else if hits(FEEDBACK_KEYWORDS) {
        Tone::Feedback
    } else {
        Tone::Generic
    }
}
