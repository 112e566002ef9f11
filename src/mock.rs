//! Mock implementations for testing
//!
//! In-memory stand-ins for the data sources, the process terminator and a
//! notifier, so tasks can be exercised without a real host or game server.

use crate::alerts::{AlertEvent, Notifier};
use crate::domain::{MemoryDetail, MemoryInfo};
use crate::error::{CollectError, NotifyError};
use crate::services::Sources;
use crate::sources::{GameInfoSource, MemorySource, ProcessLookup, ProcessTerminator};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

const MB: f64 = 1024.0 * 1024.0;

fn unavailable(what: &str) -> CollectError {
    CollectError::Unavailable(format!("mock {} failure", what))
}

/// Mock memory counters, in megabytes
#[derive(Debug)]
pub struct MockMemory {
    total_mb: f64,
    available_mb: RwLock<f64>,
    failing: AtomicBool,
}

impl MockMemory {
    pub fn new(total_mb: f64, available_mb: f64) -> Self {
        Self {
            total_mb,
            available_mb: RwLock::new(available_mb),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_available(&self, available_mb: f64) {
        *self.available_mb.write().unwrap() = available_mb;
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl MemorySource for MockMemory {
    fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("memory"));
        }
        let available_mb = *self.available_mb.read().unwrap();
        Ok(MemoryInfo {
            available_mb,
            total_mb: self.total_mb,
            used_mb: self.total_mb - available_mb,
        })
    }

    fn memory_detail(&self) -> Result<MemoryDetail, CollectError> {
        let info = self.memory_info()?;
        Ok(MemoryDetail {
            total_bytes: (info.total_mb * MB) as u64,
            available_bytes: (info.available_mb * MB) as u64,
            used_bytes: (info.used_mb * MB) as u64,
            free_bytes: (info.available_mb * MB) as u64,
            swap_total_bytes: 0,
            swap_used_bytes: 0,
            process_count: 42,
        })
    }
}

/// Mock process table
#[derive(Debug, Default)]
pub struct MockProcesses {
    running: Mutex<HashSet<String>>,
    failing: AtomicBool,
}

impl MockProcesses {
    pub fn set_running(&self, name: &str, running: bool) {
        let mut table = self.running.lock().unwrap();
        if running {
            table.insert(name.to_string());
        } else {
            table.remove(name);
        }
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl ProcessLookup for MockProcesses {
    fn is_running(&self, name: &str) -> Result<bool, CollectError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("process table"));
        }
        Ok(self.running.lock().unwrap().contains(name))
    }
}

/// Records termination requests
#[derive(Debug, Default)]
pub struct MockTerminator {
    killed: Mutex<Vec<String>>,
}

impl MockTerminator {
    pub fn killed(&self) -> Vec<String> {
        self.killed.lock().unwrap().clone()
    }
}

impl ProcessTerminator for MockTerminator {
    fn terminate(&self, name: &str) -> Result<usize, CollectError> {
        self.killed.lock().unwrap().push(name.to_string());
        Ok(1)
    }
}

/// Mock game server data
#[derive(Debug, Default)]
pub struct MockGameInfo {
    players: RwLock<Vec<String>>,
    theater: RwLock<String>,
    failing: AtomicBool,
}

impl MockGameInfo {
    /// Set `count` numbered pilots in `theater`
    pub fn set(&self, count: u32, theater: &str) {
        *self.players.write().unwrap() = (1..=count).map(|i| format!("Pilot {}", i)).collect();
        *self.theater.write().unwrap() = theater.to_string();
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), CollectError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable("game data"));
        }
        Ok(())
    }
}

impl GameInfoSource for MockGameInfo {
    fn theater_name(&self) -> Result<String, CollectError> {
        self.check()?;
        Ok(self.theater.read().unwrap().clone())
    }

    fn pilot_count(&self) -> Result<u32, CollectError> {
        self.check()?;
        Ok(self.players.read().unwrap().len() as u32)
    }

    fn pilot_data(&self) -> Result<Vec<String>, CollectError> {
        self.check()?;
        Ok(self.players.read().unwrap().clone())
    }
}

/// Notifier that keeps every event it receives
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<AlertEvent>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Make the next delivery fail (the event is still recorded)
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: &AlertEvent) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(event.clone());
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NotifyError::Transport("mock transport down".to_string()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Mock sources with 16 GB total, 12 GB free, no processes running
pub fn mock_sources() -> (Sources, Arc<MockProcesses>) {
    let processes = Arc::new(MockProcesses::default());
    let sources = Sources {
        memory: Arc::new(MockMemory::new(16384.0, 12288.0)),
        processes: processes.clone(),
        terminator: Arc::new(MockTerminator::default()),
        game: Arc::new(MockGameInfo::default()),
    };
    (sources, processes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_memory() {
        let memory = MockMemory::new(16000.0, 4000.0);
        assert_eq!(memory.memory_info().unwrap().used_mb, 12000.0);
        memory.fail(true);
        assert!(memory.memory_detail().is_err());
    }

    #[test]
    fn test_mock_processes() {
        let processes = MockProcesses::default();
        processes.set_running("IVC Server", true);
        assert!(processes.is_running("IVC Server").unwrap());
        processes.set_running("IVC Server", false);
        assert!(!processes.is_running("IVC Server").unwrap());
    }
}
