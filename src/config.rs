//! Configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ConfigError};

/// Agent id sent with every backend call unless overridden.
pub const DEFAULT_AGENT_ID: &str = "rotunda-frontend-agent";

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the client gets its data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    /// Real HTTP backend at `base_url`.
    Live,
    /// Canned in-process responses; no network.
    Fixture,
}

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, without trailing slash.
    pub base_url: String,
    pub agent_id: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Period between alert fetches.
    pub alert_poll_interval: Duration,
    pub mode: BackendMode,
    /// Saved email retrieval settings.
    pub settings_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            agent_id: DEFAULT_AGENT_ID.to_string(),
            request_timeout: Duration::from_secs(60),
            alert_poll_interval: Duration::from_secs(30),
            mode: BackendMode::Live,
            settings_path: default_settings_path(),
        }
    }
}

impl ClientConfig {
    /// Build config from `ROTUNDA_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("ROTUNDA_API_URL")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);

        let agent_id = lookup("ROTUNDA_AGENT_ID")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.agent_id);

        let request_timeout = lookup("ROTUNDA_HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let alert_poll_interval = lookup("ROTUNDA_ALERT_POLL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.alert_poll_interval);

        let mode = match lookup("ROTUNDA_USE_FIXTURES").as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("yes") => BackendMode::Fixture,
            _ => BackendMode::Live,
        };

        let settings_path = lookup("ROTUNDA_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.settings_path);

        Self {
            base_url,
            agent_id,
            request_timeout,
            alert_poll_interval,
            mode,
            settings_path,
        }
    }

    /// Fail unless calls go to the real backend. Fixtures only cover email
    /// retrieval and alerts.
    pub fn require_live(&self, operation: &str) -> Result<(), ConfigError> {
        match self.mode {
            BackendMode::Live => Ok(()),
            BackendMode::Fixture => Err(ConfigError::InvalidValue {
                key: "mode".into(),
                message: format!("{operation} needs a live backend, not fixtures"),
            }),
        }
    }
}

fn default_settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".rotunda/email-settings.json")
}

/// Mailbox settings for `POST /retrieve-emails`.
///
/// Persisted as JSON without the password, which is supplied per session
/// (see [`EmailRetrievalConfig::with_password`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRetrievalConfig {
    pub email_address: String,
    #[serde(skip)]
    pub password: Option<SecretString>,
    pub imap_server: String,
    pub imap_port: u16,
    pub folder: String,
    pub limit: u32,
    pub unread_only: bool,
    pub use_gmail_api: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail_credentials_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gmail_token_path: Option<String>,
}

impl Default for EmailRetrievalConfig {
    fn default() -> Self {
        Self {
            email_address: String::new(),
            password: None,
            imap_server: "imap.gmail.com".to_string(),
            imap_port: 993,
            folder: "INBOX".to_string(),
            limit: 50,
            unread_only: true,
            use_gmail_api: false,
            gmail_credentials_path: None,
            gmail_token_path: None,
        }
    }
}

impl EmailRetrievalConfig {
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Password text, if one was supplied and is non-empty.
    pub fn password(&self) -> Option<&str> {
        self.password
            .as_ref()
            .map(|p| p.expose_secret())
            .filter(|p| !p.is_empty())
    }

    /// Check the fields the backend requires before any request is made.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email_address.trim().is_empty() {
            return Err(ApiError::Validation("email_address is required".into()));
        }
        if self.password().is_none() && !self.use_gmail_api {
            return Err(ApiError::Validation(
                "password is required when not using Gmail API".into(),
            ));
        }
        Ok(())
    }

    /// Load saved settings, merged over defaults. A missing file yields
    /// defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved email settings, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save settings (minus the password), creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "Saved email settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_env_empty() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.agent_id, DEFAULT_AGENT_ID);
        assert_eq!(config.alert_poll_interval, Duration::from_secs(30));
        assert_eq!(config.mode, BackendMode::Live);
    }

    #[test]
    fn env_overrides_apply() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ROTUNDA_API_URL", "http://64.227.128.101:8000/"),
            ("ROTUNDA_AGENT_ID", "sales-team"),
            ("ROTUNDA_ALERT_POLL_SECS", "5"),
            ("ROTUNDA_USE_FIXTURES", "true"),
            ("ROTUNDA_SETTINGS_PATH", "/tmp/rotunda.json"),
        ]));
        assert_eq!(config.base_url, "http://64.227.128.101:8000");
        assert_eq!(config.agent_id, "sales-team");
        assert_eq!(config.alert_poll_interval, Duration::from_secs(5));
        assert_eq!(config.mode, BackendMode::Fixture);
        assert_eq!(config.settings_path, PathBuf::from("/tmp/rotunda.json"));
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ROTUNDA_ALERT_POLL_SECS", "soon"),
            ("ROTUNDA_HTTP_TIMEOUT_SECS", "-3"),
            ("ROTUNDA_API_URL", "   "),
        ]));
        assert_eq!(config.alert_poll_interval, Duration::from_secs(30));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.base_url, DEFAULT_API_URL);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = ClientConfig::from_lookup(lookup(&[("ROTUNDA_ALERT_POLL_SECS", "0")]));
        assert_eq!(config.alert_poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn validation_requires_address_and_password() {
        let config = EmailRetrievalConfig::default();
        assert!(matches!(config.validate(), Err(ApiError::Validation(_))));

        let config = EmailRetrievalConfig {
            email_address: "me@rotunda.ai".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "password is required when not using Gmail API"
        );

        assert!(config.clone().with_password("app-pass").validate().is_ok());

        let gmail = EmailRetrievalConfig {
            use_gmail_api: true,
            ..config
        };
        assert!(gmail.validate().is_ok());
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let config = EmailRetrievalConfig {
            email_address: "me@rotunda.ai".into(),
            ..Default::default()
        }
        .with_password("");
        assert!(config.password().is_none());
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "password is required when not using Gmail API"
        );
    }

    #[test]
    fn fixture_mode_rejects_live_only_operations() {
        let live = ClientConfig::default();
        assert!(live.require_live("health").is_ok());

        let fixture = ClientConfig {
            mode: BackendMode::Fixture,
            ..Default::default()
        };
        let err = fixture.require_live("health").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "mode"));
        assert!(err.to_string().contains("health needs a live backend"));
    }

    #[test]
    fn save_and_load_roundtrip_without_password() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");

        let config = EmailRetrievalConfig {
            email_address: "me@rotunda.ai".into(),
            folder: "Support".into(),
            limit: 10,
            ..Default::default()
        }
        .with_password("hunter2");
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("hunter2"));

        let loaded = EmailRetrievalConfig::load(&path).unwrap();
        assert_eq!(loaded.email_address, "me@rotunda.ai");
        assert_eq!(loaded.folder, "Support");
        assert_eq!(loaded.limit, 10);
        assert!(loaded.password.is_none());
    }

    #[test]
    fn partial_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"email_address": "me@rotunda.ai", "imap_port": 143}"#).unwrap();

        let loaded = EmailRetrievalConfig::load(&path).unwrap();
        assert_eq!(loaded.imap_port, 143);
        assert_eq!(loaded.imap_server, "imap.gmail.com");
        assert_eq!(loaded.folder, "INBOX");
        assert!(loaded.unread_only);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EmailRetrievalConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.limit, 50);
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            EmailRetrievalConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
