//! `sysinfo`-backed system access

use super::traits::{MemorySource, ProcessLookup, ProcessTerminator};
use crate::domain::{MemoryDetail, MemoryInfo};
use crate::error::CollectError;

use std::sync::{Mutex, MutexGuard, PoisonError};
use sysinfo::{MemoryRefreshKind, ProcessRefreshKind, ProcessesToUpdate, System};

/// Memory and process access for the local host
///
/// One `sysinfo::System` is shared by all callers; each query refreshes only
/// the counters it needs.
pub struct SystemSource {
    system: Mutex<System>,
}

impl SystemSource {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, System> {
        self.system.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn refresh_memory(system: &mut System) -> Result<(), CollectError> {
        system.refresh_memory_specifics(MemoryRefreshKind::everything());
        if system.total_memory() == 0 {
            return Err(CollectError::Unavailable("memory counters".to_string()));
        }
        Ok(())
    }

    fn refresh_processes(system: &mut System) {
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive process name match, ignoring a trailing `.exe`
pub fn process_name_matches(actual: &str, wanted: &str) -> bool {
    fn normalize(name: &str) -> String {
        let lower = name.trim().to_lowercase();
        match lower.strip_suffix(".exe") {
            Some(stem) => stem.to_string(),
            None => lower,
        }
    }
    normalize(actual) == normalize(wanted)
}

impl MemorySource for SystemSource {
    fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
        let mut system = self.lock();
        Self::refresh_memory(&mut system)?;
        Ok(MemoryInfo::from_bytes(
            system.available_memory(),
            system.total_memory(),
        ))
    }

    fn memory_detail(&self) -> Result<MemoryDetail, CollectError> {
        let mut system = self.lock();
        Self::refresh_memory(&mut system)?;
        Self::refresh_processes(&mut system);

        Ok(MemoryDetail {
            total_bytes: system.total_memory(),
            available_bytes: system.available_memory(),
            used_bytes: system.used_memory(),
            free_bytes: system.free_memory(),
            swap_total_bytes: system.total_swap(),
            swap_used_bytes: system.used_swap(),
            process_count: system.processes().len() as u64,
        })
    }
}

impl ProcessLookup for SystemSource {
    fn is_running(&self, name: &str) -> Result<bool, CollectError> {
        let mut system = self.lock();
        Self::refresh_processes(&mut system);
        Ok(system
            .processes()
            .values()
            .any(|process| process_name_matches(&process.name().to_string_lossy(), name)))
    }
}

impl ProcessTerminator for SystemSource {
    fn terminate(&self, name: &str) -> Result<usize, CollectError> {
        let mut system = self.lock();
        Self::refresh_processes(&mut system);

        let killed = system
            .processes()
            .values()
            .filter(|process| process_name_matches(&process.name().to_string_lossy(), name))
            .filter(|process| process.kill())
            .count();

        if killed == 0 {
            return Err(CollectError::ProcessNotFound(name.to_string()));
        }
        log::warn!("Terminated {} '{}' process(es)", killed, name);
        Ok(killed)
    }
}
