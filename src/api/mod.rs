//! Backend access: the HTTP client, its request payloads, and the source
//! traits that let callers swap in canned data.

pub mod client;
pub mod fixtures;
pub mod source;
pub mod types;

pub use client::BackendClient;
pub use fixtures::FixtureBackend;
pub use source::{AlertSource, EmailSource};
pub use types::{ChatOptions, CustomerInfo, chat_reply_text};
