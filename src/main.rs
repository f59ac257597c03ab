use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use rotunda_inbox::alerts::{AlertPoller, evaluate};
use rotunda_inbox::api::{
    AlertSource, BackendClient, ChatOptions, CustomerInfo, EmailSource, FixtureBackend,
    chat_reply_text,
};
use rotunda_inbox::config::{BackendMode, ClientConfig, EmailRetrievalConfig};
use rotunda_inbox::inbox::{EmailId, EmailRecord, ToneFilter};
use rotunda_inbox::state::{AlertBoard, InboxState, next_snapshot};

#[derive(Parser)]
#[command(name = "rotunda", version, about = "Rotunda AI inbox and alert client")]
struct Cli {
    /// Backend base URL (overrides ROTUNDA_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Serve canned data instead of calling the backend.
    #[arg(long, global = true)]
    fixtures: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the backend is reachable and configured.
    Health,
    /// Retrieve, classify and list inbound emails.
    Emails {
        #[command(flatten)]
        mailbox: MailboxArgs,
        /// Only show emails containing this text.
        #[arg(long, default_value = "")]
        query: String,
        /// all, complaint, appreciation, feedback or generic.
        #[arg(long, default_value = "all")]
        tone: ToneFilter,
        /// Persist the mailbox settings for next time.
        #[arg(long)]
        save: bool,
    },
    /// Draft a response to a complaint email.
    Resolve {
        /// Id of the email, as listed by `emails`.
        id: String,
        #[command(flatten)]
        mailbox: MailboxArgs,
    },
    /// Fetch alerts once and show the active ones.
    Alerts,
    /// Poll alerts until interrupted, printing every update.
    Watch {
        /// Seconds between polls (overrides ROTUNDA_ALERT_POLL_SECS).
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Send a message to the sales agent.
    Chat {
        message: String,
        #[arg(long)]
        stripe: bool,
        #[arg(long)]
        slack: bool,
        /// Booking link; enables calendar scheduling.
        #[arg(long)]
        cal_url: Option<String>,
    },
    /// Enrich a lead given as a JSON object.
    Enrich { lead_json: String },
    /// Ask for a sales forecast.
    Forecast { query: String },
    /// Ask for a marketing campaign analysis.
    Analyze { query: String },
    /// Generate an HTML marketing email from a prompt.
    GenerateEmail { prompt: String },
    /// Index a document by URL so chat can draw on it.
    ProcessFile {
        url: String,
        /// Defaults to the last segment of the URL.
        #[arg(long)]
        filename: Option<String>,
    },
}

#[derive(clap::Args)]
struct MailboxArgs {
    #[arg(long)]
    address: Option<String>,
    #[arg(long, env = "ROTUNDA_EMAIL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long)]
    imap_server: Option<String>,
    #[arg(long)]
    folder: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    /// Include already-read emails.
    #[arg(long)]
    all: bool,
    /// Use the Gmail API instead of IMAP.
    #[arg(long)]
    gmail: bool,
}

impl MailboxArgs {
    fn apply(self, mut config: EmailRetrievalConfig) -> EmailRetrievalConfig {
        if let Some(address) = self.address {
            config.email_address = address;
        }
        if let Some(server) = self.imap_server {
            config.imap_server = server;
        }
        if let Some(folder) = self.folder {
            config.folder = folder;
        }
        if let Some(limit) = self.limit {
            config.limit = limit;
        }
        if self.all {
            config.unread_only = false;
        }
        if self.gmail {
            config.use_gmail_api = true;
        }
        match self.password {
            Some(password) => config.with_password(password),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    if cli.fixtures {
        config.mode = BackendMode::Fixture;
    }

    let client = BackendClient::new(&config)?;
    let (emails, alerts): (Arc<dyn EmailSource>, Arc<dyn AlertSource>) = match config.mode {
        BackendMode::Live => (Arc::new(client.clone()), Arc::new(client.clone())),
        BackendMode::Fixture => {
            let fixtures = FixtureBackend::with_latency(Duration::from_millis(300));
            (Arc::new(fixtures.clone()), Arc::new(fixtures))
        }
    };

    match cli.command {
        Command::Health => {
            config.require_live("health check")?;
            let health = client.health().await?;
            println!("{}", serde_json::to_string_pretty(&health)?);
            let check = client.config_check().await?;
            println!("{}", serde_json::to_string_pretty(&check)?);
        }

        Command::Emails {
            mailbox,
            query,
            tone,
            save,
        } => {
            let inbox = load_inbox(emails.as_ref(), mailbox, &config.settings_path, save).await?;

            for email in inbox.filtered(&query, tone).await {
                print_email(&email);
            }
            let stats = inbox.stats().await;
            println!(
                "\n{} emails, {} complaints ({:.0}%, {:?})",
                stats.total, stats.complaints, stats.percentage, stats.mood
            );
        }

        Command::Resolve { id, mailbox } => {
            config.require_live("complaint resolution")?;
            let inbox = load_inbox(emails.as_ref(), mailbox, &config.settings_path, false).await?;

            let id = match id.parse::<i64>() {
                Ok(n) => EmailId::Number(n),
                Err(_) => EmailId::Text(id),
            };
            let record = inbox
                .find(&id)
                .await
                .with_context(|| format!("no email with id {id}"))?;

            let resolution = client.resolve_complaint(&record).await?;
            match resolution.get("response").and_then(Value::as_str) {
                Some(text) => println!("{text}"),
                None => println!("{}", serde_json::to_string_pretty(&resolution)?),
            }
        }

        Command::Alerts => {
            let fetched = alerts.fetch_alerts().await?;
            let active = evaluate(&fetched);
            for alert in &active.alerts {
                println!(
                    "[{:?}] {}: {} ({})",
                    alert.severity,
                    alert.title,
                    alert.message,
                    alert.action_url.as_deref().unwrap_or("-")
                );
            }
            println!("{} active of {} alerts", active.count, fetched.len());
        }

        Command::Watch { interval } => {
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(config.alert_poll_interval);

            let board = AlertBoard::new();
            let mut updates = board.subscribe();
            let poller = AlertPoller::spawn(alerts, Arc::clone(&board), interval);

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    update = next_snapshot(&mut updates) => match update {
                        Some(snapshot) => match snapshot.last_error {
                            Some(error) => println!("alerts unavailable: {error}"),
                            None => println!(
                                "{} active alerts: {}",
                                snapshot.count(),
                                snapshot
                                    .active
                                    .alerts
                                    .iter()
                                    .map(|a| a.title.as_str())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        },
                        None => break,
                    },
                }
            }

            poller.shutdown().await;
        }

        Command::Chat {
            message,
            stripe,
            slack,
            cal_url,
        } => {
            config.require_live("chat")?;
            let options = ChatOptions {
                stripe_enabled: stripe,
                slack_enabled: slack,
                cal_enabled: cal_url.is_some(),
                cal_url,
            };
            let reply = client.chat(&message, &options).await?;
            println!("{}", chat_reply_text(&reply));
        }

        Command::Enrich { lead_json } => {
            config.require_live("lead enrichment")?;
            let lead: Value =
                serde_json::from_str(&lead_json).context("lead must be a JSON object")?;
            let result = client.enrich_lead(&lead).await?;
            print_json_field(&result, "enriched_lead")?;
        }

        Command::Forecast { query } => {
            config.require_live("sales forecast")?;
            let result = client.sales_forecast(&query, None).await?;
            print_json_field(&result, "forecast")?;
        }

        Command::Analyze { query } => {
            config.require_live("marketing analysis")?;
            let result = client.marketing_analysis(&query, None).await?;
            print_json_field(&result, "analysis")?;
        }

        Command::GenerateEmail { prompt } => {
            config.require_live("email generation")?;
            let result = client
                .generate_html_email(&prompt, &CustomerInfo::default())
                .await?;
            match result.get("html_email").and_then(Value::as_str) {
                Some(html) => println!("{html}"),
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }

        Command::ProcessFile { url, filename } => {
            config.require_live("file processing")?;
            let filename = filename.unwrap_or_else(|| filename_from_url(&url));
            let result = client.process_file(&url, &filename).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

/// Saved settings with mailbox flags applied, optionally persisted, then
/// retrieved into a fresh inbox.
async fn load_inbox(
    source: &dyn EmailSource,
    mailbox: MailboxArgs,
    settings_path: &Path,
    save: bool,
) -> rotunda_inbox::error::Result<Arc<InboxState>> {
    let settings = mailbox.apply(EmailRetrievalConfig::load(settings_path)?);
    if save {
        settings.save(settings_path)?;
        eprintln!("Saved settings to {}", settings_path.display());
    }

    let inbox = InboxState::new();
    inbox.refresh(source, &settings).await?;
    Ok(inbox)
}

fn filename_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("document")
        .to_string()
}

fn print_email(email: &EmailRecord) {
    println!(
        "{:>8}  {:<14} {:<40} {}",
        email.id.to_string(),
        email.tone.label(),
        email.from,
        email.subject
    );
}

/// Print `value[key]` if present, else the whole response.
fn print_json_field(value: &Value, key: &str) -> anyhow::Result<()> {
    let shown = value.get(key).unwrap_or(value);
    println!("{}", serde_json::to_string_pretty(shown)?);
    Ok(())
}
