//! CSV memory logging
//!
//! The `logging` task appends one row per tick with the player count and the
//! detailed memory counters. Files are rotated by size and a session can be
//! bounded to a number of hours.

use crate::config::{Config, LoggingConfig};
use crate::domain::{MemoryDetail, StateHandle};
use crate::error::TaskError;
use crate::scheduler::{Period, ScheduledTask, StartMode, TaskKind, TickOutcome};

use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const LOGGING_TASK: &str = "logging";

/// File used when no usable path is configured
pub const DEFAULT_LOG_FILE: &str = "memory_monitor.csv";

const BYTES_PER_MB: u64 = 1000 * 1000;

/// Appends memory samples to a CSV file
#[derive(Debug, Clone)]
pub struct CsvLogger {
    path: PathBuf,
    max_bytes: u64,
}

impl CsvLogger {
    pub fn new(config: &LoggingConfig) -> Self {
        Self {
            path: Self::resolve_path(&config.file_path),
            max_bytes: config.max_size_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    /// Configured path, or [`DEFAULT_LOG_FILE`] for empty or placeholder paths
    pub fn resolve_path(raw: &str) -> PathBuf {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.to_lowercase().contains("example") {
            return PathBuf::from(DEFAULT_LOG_FILE);
        }
        PathBuf::from(trimmed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header() -> String {
        let mut columns = vec!["Timestamp", "Players"];
        columns.extend_from_slice(&MemoryDetail::CSV_HEADINGS);
        columns.join(",")
    }

    /// Append one sample, rotating the file first if it grew too large
    pub fn append(
        &self,
        now: DateTime<Local>,
        players: u32,
        detail: &MemoryDetail,
    ) -> io::Result<()> {
        self.rotate_if_needed(now)?;

        let is_new = !self.path.exists();
        if is_new {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if is_new {
            writeln!(file, "{}", Self::header())?;
            log::info!("Created memory log {}", self.path.display());
        }

        let mut row = vec![now.format("%m/%d/%Y %H:%M:%S").to_string(), players.to_string()];
        row.extend(detail.csv_fields());
        writeln!(file, "{}", row.join(","))
    }

    /// Rename an oversized file to `<stem>_<MMddyyyyHHmmss>.csv`
    pub fn rotate_if_needed(&self, now: DateTime<Local>) -> io::Result<Option<PathBuf>> {
        let size = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        if size <= self.max_bytes {
            return Ok(None);
        }

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "memory_monitor".to_string());
        let rotated = self
            .path
            .with_file_name(format!("{}_{}.csv", stem, now.format("%m%d%Y%H%M%S")));

        fs::rename(&self.path, &rotated)?;
        log::info!("Rotated memory log to {}", rotated.display());
        Ok(Some(rotated))
    }
}

/// The periodic CSV logging task
///
/// Gated on the logging switch. With a non-zero session duration (hours) the
/// task stops itself once that much scheduled time has been logged.
pub struct LogScheduler {
    config: Arc<Config>,
    state: StateHandle,
    logger: CsvLogger,
    ticks: AtomicU64,
}

impl LogScheduler {
    pub fn new(config: Arc<Config>, state: StateHandle) -> Self {
        let logger = CsvLogger::new(&config.logging);
        Self {
            config,
            state,
            logger,
            ticks: AtomicU64::new(0),
        }
    }

    fn session_over(&self, ticks: u64) -> bool {
        let hours = u64::from(self.config.logging.duration);
        hours > 0 && ticks * u64::from(self.config.logging.frequency.max(1)) >= hours * 60
    }
}

impl ScheduledTask for LogScheduler {
    fn name(&self) -> &str {
        LOGGING_TASK
    }

    fn kind(&self) -> TaskKind {
        TaskKind::SystemTask
    }

    fn default_interval(&self) -> Period {
        Period::minutes(self.config.logging.frequency)
    }

    fn can_start(&self, _mode: StartMode) -> bool {
        if !self.config.logging.enabled {
            return false;
        }
        self.ticks.store(0, Ordering::SeqCst);
        true
    }

    fn run(&self) -> Result<TickOutcome, TaskError> {
        let (players, detail) = self
            .state
            .read(|s| (s.player_count.current, s.memory_detail.current));
        self.logger.append(Local::now(), players, &detail)?;

        let ticks = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        if self.session_over(ticks) {
            log::info!(
                "Memory logging session of {} hour(s) complete",
                self.config.logging.duration
            );
            return Ok(TickOutcome::Stop);
        }
        Ok(TickOutcome::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn logging_config(dir: &Path, max_size_mb: u64) -> LoggingConfig {
        LoggingConfig {
            enabled: true,
            file_path: dir.join("mem.csv").display().to_string(),
            max_size_mb,
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(CsvLogger::resolve_path(""), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(
            CsvLogger::resolve_path("C:\\example\\log.csv"),
            PathBuf::from(DEFAULT_LOG_FILE)
        );
        assert_eq!(
            CsvLogger::resolve_path("/var/log/servmon.csv"),
            PathBuf::from("/var/log/servmon.csv")
        );
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let logger = CsvLogger::new(&logging_config(dir.path(), 1024));
        let detail = MemoryDetail {
            total_bytes: 100,
            process_count: 3,
            ..MemoryDetail::default()
        };

        logger.append(Local::now(), 4, &detail).unwrap();
        logger.append(Local::now(), 5, &detail).unwrap();

        let contents = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CsvLogger::header());
        assert!(lines[1].contains(",4,100,"));
        assert!(lines[2].ends_with(",3"));
    }

    #[test]
    fn test_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let logger = CsvLogger::new(&logging_config(dir.path(), 1));
        fs::write(logger.path(), vec![b'x'; 1_000_001]).unwrap();

        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let rotated = logger.rotate_if_needed(now).unwrap().unwrap();
        assert_eq!(
            rotated.file_name().unwrap().to_string_lossy(),
            "mem_03092024140507.csv"
        );
        assert!(!logger.path().exists());

        logger.append(now, 0, &MemoryDetail::default()).unwrap();
        let contents = fs::read_to_string(logger.path()).unwrap();
        assert!(contents.starts_with("Timestamp,Players,"));
    }

    #[test]
    fn test_small_file_not_rotated() {
        let dir = tempfile::tempdir().unwrap();
        let logger = CsvLogger::new(&logging_config(dir.path(), 1));
        fs::write(logger.path(), "Timestamp\n").unwrap();
        assert!(logger.rotate_if_needed(Local::now()).unwrap().is_none());
    }

    #[test]
    fn test_gate_and_session_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.logging = logging_config(dir.path(), 1024);
        config.logging.frequency = 30;
        config.logging.duration = 1;
        let task = LogScheduler::new(Arc::new(config), StateHandle::new());

        assert!(task.can_start(StartMode::Normal));
        assert_eq!(task.run().unwrap(), TickOutcome::Continue);
        assert_eq!(task.run().unwrap(), TickOutcome::Stop);

        // A restart begins a new session
        assert!(task.can_start(StartMode::Normal));
        assert_eq!(task.run().unwrap(), TickOutcome::Continue);
    }

    #[test]
    fn test_disabled_logging_declines() {
        let task = LogScheduler::new(Arc::new(Config::default()), StateHandle::new());
        assert!(!task.can_start(StartMode::Normal));
    }
}
