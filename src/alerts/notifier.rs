//! Alert notification system
//!
//! Provides notification channels for fired alerts: terminal output and email.

use super::types::{AlertEvent, AlertKind};
use crate::config::EmailConfig;
use crate::error::NotifyError;

use chrono::{DateTime, Local};
use std::io::{self, Write};

/// Notification channel trait
pub trait Notifier: Send + Sync {
    /// Send a notification for an alert
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Terminal/console notifier
///
/// Writes alerts to stderr, keeping stdout for command output
pub struct TerminalNotifier {
    /// Use colors (ANSI escape codes)
    use_colors: bool,
}

impl TerminalNotifier {
    pub fn new() -> Self {
        Self {
            use_colors: Self::supports_color(),
        }
    }

    fn supports_color() -> bool {
        std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM")
                .map(|term| term != "dumb")
                .unwrap_or(false)
    }

    fn format_event(&self, event: &AlertEvent) -> String {
        let fired_at: DateTime<Local> = event.fired_at.into();
        format!(
            "[{}] {} {}",
            fired_at.format("%m/%d/%Y %H:%M:%S"),
            self.format_kind(event.kind),
            event.subject
        )
    }

    fn format_kind(&self, kind: AlertKind) -> String {
        let label = format!("{} ALERT", kind.as_str().to_uppercase());
        if !self.use_colors {
            return label;
        }

        let color_code = match kind {
            AlertKind::Game => "\x1b[31m\x1b[1m", // Bold red
            AlertKind::Voip => "\x1b[33m",        // Yellow
            AlertKind::Memory => "\x1b[35m",      // Magenta
        };
        format!("{}{}\x1b[0m", color_code, label)
    }
}

impl Default for TerminalNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        let line = self.format_event(event);
        let mut handle = io::stderr().lock();
        writeln!(handle, "{}", line)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// One parsed alert email recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecipient {
    pub name: String,
    pub address: String,
}

impl EmailRecipient {
    /// Parse a `"Name address@host"` entry
    ///
    /// Quotes are ignored. Entries that are not exactly two words, lack an
    /// `@`, or still carry the `example` placeholder are rejected.
    pub fn parse(entry: &str) -> Option<Self> {
        let cleaned = entry.replace('\'', "");
        let mut words = cleaned.split_whitespace();
        let (name, address) = (words.next()?, words.next()?);
        if words.next().is_some() || !address.contains('@') {
            return None;
        }
        if name.contains("example") || address.contains("example") {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            address: address.to_string(),
        })
    }
}

/// A rendered alert email
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub sender_name: String,
    pub sender_address: String,
    pub reply_to: String,
    pub recipients: Vec<EmailRecipient>,
    pub subject: String,
    pub body: String,
}

/// Mail transport
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Transport that writes the message to the log instead of a mail server
pub struct LogMailer {
    server: String,
}

impl LogMailer {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            server: format!(
                "{}:{}{}",
                config.smtp_host,
                config.smtp_port,
                if config.smtp_ssl { " (ssl)" } else { "" }
            ),
        }
    }
}

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let to: Vec<&str> = message.recipients.iter().map(|r| r.address.as_str()).collect();
        log::info!(
            "Email via {} from {} <{}> to [{}]: {}",
            self.server,
            message.sender_name,
            message.sender_address,
            to.join(", "),
            message.subject
        );
        log::debug!("Email body:\n{}", message.body);
        Ok(())
    }
}

/// Email notifier
///
/// Only events with `send_email` set are mailed.
pub struct EmailNotifier {
    config: EmailConfig,
    recipients: Vec<EmailRecipient>,
    mailer: Box<dyn Mailer>,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig, mailer: Box<dyn Mailer>) -> Self {
        let recipients = config
            .recipients
            .iter()
            .filter_map(|entry| {
                let parsed = EmailRecipient::parse(entry);
                if parsed.is_none() {
                    log::warn!("Ignoring email recipient '{}'", entry);
                }
                parsed
            })
            .collect();

        Self {
            config: config.clone(),
            recipients,
            mailer,
        }
    }

    pub fn recipients(&self) -> &[EmailRecipient] {
        &self.recipients
    }

    fn render(&self, event: &AlertEvent) -> EmailMessage {
        let fired_at: DateTime<Local> = event.fired_at.into();
        EmailMessage {
            sender_name: self.config.sender_name.clone(),
            sender_address: self.config.sender_address.clone(),
            reply_to: self.config.reply_to.clone(),
            recipients: self.recipients.clone(),
            subject: event.subject.clone(),
            body: format!(
                "{}\n\nAlert time: {}\nPlayers online before the alert: {}",
                event.message,
                fired_at.format("%m/%d/%Y %H:%M:%S"),
                event.former_player_count
            ),
        }
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        if !event.send_email {
            return Ok(());
        }
        if self.recipients.is_empty() {
            return Err(NotifyError::NoRecipients);
        }

        self.mailer.send(&self.render(event))?;
        let names: Vec<&str> = self.recipients.iter().map(|r| r.name.as_str()).collect();
        log::info!("Alert email sent to {}", names.join(", "));
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Notification manager
///
/// Manages multiple notification channels and dispatches alerts to them
pub struct NotificationManager {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Terminal output plus email through `mailer`
    pub fn with_email(config: &EmailConfig, mailer: Box<dyn Mailer>) -> Self {
        let mut manager = Self::default();
        manager.add_notifier(Box::new(EmailNotifier::new(config, mailer)));
        manager
    }

    /// Send an alert to every channel; returns how many channels failed
    ///
    /// A failing channel is logged and does not stop the others.
    pub fn notify_all(&self, event: &AlertEvent) -> usize {
        let mut failures = 0;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(event) {
                log::error!("Failed to notify via {}: {}", notifier.name(), e);
                failures += 1;
            }
        }
        failures
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        let mut manager = Self::new();
        manager.add_notifier(Box::new(TerminalNotifier::new()));
        manager
    }
}
