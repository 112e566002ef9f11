//! System memory domain types
//!
//! Memory readings are expressed in megabytes to match the configured
//! thresholds (`max_mem`, `kill_mem`). The detailed counter snapshot keeps raw
//! byte counts because it is only ever written to the CSV log.

use serde::{Deserialize, Serialize};
use std::fmt;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Available, total and used system memory in megabytes
///
/// # Examples
///
/// ```
/// use servmon::domain::MemoryInfo;
///
/// let info = MemoryInfo::from_bytes(4 * 1024 * 1024 * 1024, 16 * 1024 * 1024 * 1024);
/// assert_eq!(info.total_mb, 16384.0);
/// assert_eq!(info.used_mb, 12288.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryInfo {
    /// Physical memory currently available
    pub available_mb: f64,
    /// Installed physical memory
    pub total_mb: f64,
    /// `total_mb - available_mb`
    pub used_mb: f64,
}

impl MemoryInfo {
    /// Build from available and total byte counts
    pub fn from_bytes(available_bytes: u64, total_bytes: u64) -> Self {
        let available_mb = (available_bytes as f64 / BYTES_PER_MB).floor();
        let total_mb = (total_bytes as f64 / BYTES_PER_MB).floor();
        Self {
            available_mb,
            total_mb,
            used_mb: (total_mb - available_mb).max(0.0),
        }
    }

    /// Percentage of physical memory in use
    pub fn used_percent(&self) -> f64 {
        if self.total_mb <= 0.0 {
            return 0.0;
        }
        self.used_mb / self.total_mb * 100.0
    }
}

impl fmt::Display for MemoryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0} MB used / {:.0} MB total ({:.0} MB available)",
            self.used_mb, self.total_mb, self.available_mb
        )
    }
}

/// Detailed memory and system counter snapshot, one CSV row per sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryDetail {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    pub process_count: u64,
}

impl MemoryDetail {
    /// Column headings, in the order produced by [`MemoryDetail::csv_fields`]
    pub const CSV_HEADINGS: [&'static str; 7] = [
        "Physical Total Bytes",
        "Physical Available Bytes",
        "Physical Used Bytes",
        "Physical Free Bytes",
        "Swap Total Bytes",
        "Swap Used Bytes",
        "Process Count",
    ];

    pub fn csv_fields(&self) -> [String; 7] {
        [
            self.total_bytes.to_string(),
            self.available_bytes.to_string(),
            self.used_bytes.to_string(),
            self.free_bytes.to_string(),
            self.swap_total_bytes.to_string(),
            self.swap_used_bytes.to_string(),
            self.process_count.to_string(),
        ]
    }
}

/// Result of comparing a memory reading against the configured limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdCheck {
    /// Used memory is below the alert threshold
    pub below_max: bool,
    /// Used memory is below the auto-kill threshold
    pub below_kill: bool,
}

/// Memory alert and auto-kill thresholds in megabytes
///
/// A threshold that is not a positive finite number is treated as absent:
/// the reading is always reported as below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryThresholds {
    max_mb: Option<f64>,
    kill_mb: Option<f64>,
}

impl MemoryThresholds {
    pub fn new(max_mb: f64, kill_mb: f64) -> Self {
        Self {
            max_mb: Self::valid(max_mb),
            kill_mb: Self::valid(kill_mb),
        }
    }

    fn valid(value: f64) -> Option<f64> {
        (value.is_finite() && value > 0.0).then_some(value)
    }

    /// Alert threshold, if usable
    pub fn max_mb(&self) -> Option<f64> {
        self.max_mb
    }

    /// Auto-kill threshold, if usable
    pub fn kill_mb(&self) -> Option<f64> {
        self.kill_mb
    }

    pub fn check(&self, info: &MemoryInfo) -> ThresholdCheck {
        ThresholdCheck {
            below_max: self.max_mb.map_or(true, |max| info.used_mb < max),
            below_kill: self.kill_mb.map_or(true, |kill| info.used_mb < kill),
        }
    }
}
