//! Output formatting utilities
//!
//! Provides table, JSON and compact output for CLI commands.

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::services::StatusReport;
use serde::Serialize;
use std::io::{self, Write};

/// Format and print output based on the selected format
pub fn print_output<T: Serialize + TableDisplay>(data: &T, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Table => {
            writeln!(handle, "{}", data.to_table())?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());
            writeln!(handle, "{}", json)?;
        }
        OutputFormat::Compact => {
            writeln!(handle, "{}", data.to_compact())?;
        }
    }

    Ok(())
}

/// Trait for types that can be displayed as a table
pub trait TableDisplay {
    /// Format as a table string
    fn to_table(&self) -> String;

    /// Format as a compact single line
    fn to_compact(&self) -> String {
        self.to_table().replace('\n', " | ")
    }
}

fn online(flag: bool) -> &'static str {
    if flag {
        "online"
    } else {
        "OFFLINE"
    }
}

impl TableDisplay for StatusReport {
    fn to_table(&self) -> String {
        let mut output = format!("Server status at {}\n\n", self.generated_at);

        output.push_str(&format!(
            "  Memory:        {:.0} / {:.0} MB used ({:.0}%)\n",
            self.memory.current.used_mb,
            self.memory.current.total_mb,
            self.memory.current.used_percent()
        ));
        output.push_str(&format!(
            "  Memory limits: {}, {}\n",
            if self.memory_below_max {
                "below alert threshold"
            } else {
                "ABOVE alert threshold"
            },
            if self.memory_below_kill {
                "below kill threshold"
            } else {
                "ABOVE kill threshold"
            }
        ));
        output.push_str(&format!(
            "  {:<14} {}\n",
            format!("{}:", self.game_server),
            online(self.game_online)
        ));
        output.push_str(&format!(
            "  {:<14} {}\n",
            format!("{}:", self.voip_server),
            online(self.voip_online)
        ));
        output.push_str(&format!(
            "  Players:       {} (previously {})\n",
            self.player_count.current, self.player_count.former
        ));
        output.push_str(&format!("  Theater:       {}\n", self.theater_name));

        if !self.players.is_empty() {
            output.push_str(&format!("  Online:        {}\n", self.players.join(", ")));
        }

        if !self.tasks.is_empty() {
            output.push_str("\nTasks:\n");
            output.push_str(&format!(
                "  {:<16} {:<12} {:>8}  {}\n",
                "NAME", "KIND", "INTERVAL", "STATE"
            ));
            for task in &self.tasks {
                output.push_str(&format!(
                    "  {:<16} {:<12} {:>8}  {}\n",
                    task.name,
                    task.kind.to_string(),
                    task.interval.to_string(),
                    if task.running { "running" } else { "stopped" }
                ));
            }
        }

        if !self.cooldowns.is_empty() {
            output.push_str("\nCooldowns:\n");
            for cooldown in &self.cooldowns {
                output.push_str(&format!("  {:<8} {}", cooldown.kind.to_string(), cooldown.phase));
                if let Some(armed) = &cooldown.armed_at {
                    output.push_str(&format!(" since {}", armed));
                }
                output.push('\n');
            }
        }

        output
    }

    fn to_compact(&self) -> String {
        format!(
            "mem={:.0}/{:.0}MB {}={} {}={} players={}",
            self.memory.current.used_mb,
            self.memory.current.total_mb,
            self.game_server,
            if self.game_online { "up" } else { "down" },
            self.voip_server,
            if self.voip_online { "up" } else { "down" },
            self.player_count.current
        )
    }
}

impl TableDisplay for Config {
    fn to_table(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|e| format!("<unprintable config: {}>", e))
    }

    fn to_compact(&self) -> String {
        format!(
            "interval={}m min_time={}m max_mem={}MB kill_mem={}MB auto_kill={} alerts={} policy={} logging={}",
            self.monitor.interval,
            self.monitor.min_time,
            self.memory.max_mem,
            self.memory.kill_mem,
            self.memory.auto_kill,
            self.alerts.all,
            self.alerts.policy,
            self.logging.enabled
        )
    }
}

/// Simple message output
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
    pub success: bool,
}

impl Message {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn to_table(&self) -> String {
        if self.success {
            format!("✓ {}", self.message)
        } else {
            format!("✗ {}", self.message)
        }
    }
}
