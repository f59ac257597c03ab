//! Inbound email handling.
//!
//! Upstream retrieval responses are loosely shaped: the same attribute can
//! arrive under several names, or not at all. Everything here turns those
//! into canonical [`EmailRecord`]s without ever failing:
//! 1. `format::extract_email_list()` finds the email array in a response
//! 2. `format::format_emails()` resolves each field through `fields`
//! 3. `view` filters records and summarizes complaint volume for display

pub mod fields;
pub mod format;
pub mod record;
pub mod view;

pub use format::{extract_email_list, format_emails, format_emails_at};
pub use record::{EmailId, EmailRecord};
pub use view::{ComplaintStats, Mood, ToneFilter, filter_emails};
