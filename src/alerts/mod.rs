//! Alert and notification system
//!
//! Rules decide whether a condition may fire, cooldown windows suppress
//! repeats, and the alert scheduler ties both to the notifiers.

mod cooldown;
mod manager;
mod notifier;
mod rules;
mod types;

pub use cooldown::{CooldownPhase, CooldownTask, CooldownWindow, Cooldowns, RECHECK};
pub use manager::{AlertScheduler, ALERTS_TASK};
pub use notifier::{
    EmailMessage, EmailNotifier, EmailRecipient, LogMailer, Mailer, NotificationManager, Notifier,
    TerminalNotifier,
};
pub use rules::AlertRule;
pub use types::{AlertEvent, AlertKind, AlertPolicy, PRIORITY};
