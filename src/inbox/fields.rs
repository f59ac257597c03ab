//! Ordered alias table for upstream email fields.
//!
//! Each canonical field is read from the first alias whose value is
//! present. A value is present unless it is `null`, `false`, numeric zero
//! or the empty string; those fall through to the next alias.

use serde_json::Value;

/// A canonical field and the upstream names it may arrive under, in order.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

pub const ID: FieldAliases = FieldAliases {
    field: "id",
    aliases: &["id", "message_id", "uid"],
};

pub const FROM: FieldAliases = FieldAliases {
    field: "from",
    aliases: &["from", "sender", "email_address", "from_address"],
};

pub const SUBJECT: FieldAliases = FieldAliases {
    field: "subject",
    aliases: &["subject"],
};

pub const PREVIEW: FieldAliases = FieldAliases {
    field: "preview",
    aliases: &["body", "snippet", "preview", "text", "content"],
};

pub const TIMESTAMP: FieldAliases = FieldAliases {
    field: "timestamp",
    aliases: &["timestamp", "date", "received_at", "sent_date"],
};

pub const CAMPAIGN: FieldAliases = FieldAliases {
    field: "campaign",
    aliases: &["campaign", "folder"],
};

/// Explicit tone labels supplied by the backend.
pub const TONE: FieldAliases = FieldAliases {
    field: "tone",
    aliases: &["tone", "tone_category", "sentiment"],
};

/// Body text fed to keyword detection. Narrower than [`PREVIEW`].
pub const DETECTION_BODY: FieldAliases = FieldAliases {
    field: "detection_body",
    aliases: &["body", "snippet"],
};

pub const FALLBACK_FROM: &str = "unknown@example.com";
pub const FALLBACK_SUBJECT: &str = "(No Subject)";
pub const FALLBACK_CAMPAIGN: &str = "Inbox";

/// Whether a JSON value counts as supplied.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl FieldAliases {
    /// First present value among this field's aliases. Non-object records
    /// have no fields.
    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        first_present(record, self.aliases)
    }

    /// Resolve as text, stringifying non-string values.
    pub fn resolve_text(&self, record: &Value) -> Option<String> {
        self.resolve(record).map(value_text)
    }
}

/// First present value under any of `aliases`, in order.
pub fn first_present<'a>(record: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    let object = record.as_object()?;
    aliases
        .iter()
        .filter_map(|alias| object.get(*alias))
        .find(|value| is_present(value))
}

/// Render a JSON value as plain text. Strings are returned without quotes.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn falsy_values_are_absent() {
        assert!(!is_present(&json!(null)));
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0)));
        assert!(!is_present(&json!(0.0)));
        assert!(!is_present(&json!("")));
    }

    #[test]
    fn other_values_are_present() {
        assert!(is_present(&json!(true)));
        assert!(is_present(&json!(-1)));
        assert!(is_present(&json!(" ")));
        assert!(is_present(&json!([])));
        assert!(is_present(&json!({})));
    }

    #[test]
    fn first_alias_wins() {
        let record = json!({"sender": "Bob <bob@x.com>", "from": "bob@x.com"});
        assert_eq!(FROM.resolve_text(&record).as_deref(), Some("bob@x.com"));
    }

    #[test]
    fn empty_alias_falls_through() {
        let record = json!({"from": "", "sender": null, "email_address": "c@x.com"});
        assert_eq!(FROM.resolve_text(&record).as_deref(), Some("c@x.com"));
    }

    #[test]
    fn nothing_present_resolves_none() {
        let record = json!({"unrelated": "value"});
        assert!(FROM.resolve(&record).is_none());
        assert!(FROM.resolve(&json!("not an object")).is_none());
    }

    #[test]
    fn numbers_are_stringified() {
        let record = json!({"subject": 404});
        assert_eq!(SUBJECT.resolve_text(&record).as_deref(), Some("404"));
    }
}
