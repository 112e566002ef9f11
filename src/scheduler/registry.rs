//! Named task registry
//!
//! Owns one [`PeriodicTimer`] per registered task and guarantees that a task
//! name maps to at most one running timer. Starts are serialized so that the
//! "already running?" check, the task's start gate and the timer start happen
//! as one step.

use super::task::{Period, ScheduledTask, StartMode, TaskKind, TaskStatus, TickOutcome, TimeScale};
use super::timer::{FinishFn, PeriodicTimer, TickFn};
use crate::error::SchedulerError;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Bulk stop order: alert ticks first so none can arm a cooldown that was
/// just stopped.
const STOP_ORDER: [TaskKind; 3] = [TaskKind::SystemTask, TaskKind::Service, TaskKind::Cooldown];

struct Entry {
    task: Arc<dyn ScheduledTask>,
    timer: PeriodicTimer,
}

/// Registry of named periodic tasks
pub struct TaskRegistry {
    entries: RwLock<BTreeMap<String, Arc<Entry>>>,
    ops: Mutex<()>,
    scale: TimeScale,
}

impl TaskRegistry {
    pub fn new(scale: TimeScale) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            ops: Mutex::new(()),
            scale,
        }
    }

    /// Add a task; names must be unique
    pub fn register(&self, task: Arc<dyn ScheduledTask>) -> Result<(), SchedulerError> {
        let name = task.name().to_string();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&name) {
            return Err(SchedulerError::DuplicateTask(name));
        }

        log::debug!("Registered task '{}' ({})", name, task.kind());
        let timer = PeriodicTimer::new(name.clone(), self.scale);
        entries.insert(name, Arc::new(Entry { task, timer }));
        Ok(())
    }

    fn entry(&self, name: &str) -> Result<Arc<Entry>, SchedulerError> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))
    }

    fn names_of_kind(&self, kind: TaskKind) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| entry.task.kind() == kind)
            .map(|entry| entry.task.name().to_string())
            .collect()
    }

    /// Start a task's timer with the given interval
    ///
    /// Returns `Ok(false)` without side effects when the task is already
    /// running or its start gate declines. A task that stops itself gets
    /// [`ScheduledTask::on_stopped`] once its timer is no longer running.
    pub fn start_task(
        &self,
        name: &str,
        period: Period,
        mode: StartMode,
    ) -> Result<bool, SchedulerError> {
        let entry = self.entry(name)?;
        let _ops = self.ops.lock().unwrap_or_else(PoisonError::into_inner);

        if entry.timer.is_running() {
            log::debug!("Task '{}' already running", name);
            return Ok(false);
        }
        if !entry.task.can_start(mode) {
            log::debug!("Task '{}' declined to start", name);
            return Ok(false);
        }

        match entry
            .timer
            .start(period, tick_fn(&entry.task), finish_fn(&entry.task))
        {
            Ok(started) => {
                if started {
                    log::info!(
                        "Started task '{}' every {}",
                        name,
                        period.at_least_one_second()
                    );
                }
                Ok(started)
            }
            Err(e) => {
                entry.task.on_stopped();
                Err(e)
            }
        }
    }

    /// Start every task of a kind with its default interval
    pub fn start_all_of_kind(&self, kind: TaskKind) -> usize {
        let mut started = 0;
        for name in self.names_of_kind(kind) {
            let Ok(entry) = self.entry(&name) else {
                continue;
            };
            match self.start_task(&name, entry.task.default_interval(), StartMode::Normal) {
                Ok(true) => started += 1,
                Ok(false) => {}
                Err(e) => log::error!("{}", e),
            }
        }
        started
    }

    /// Stop a task's timer; returns whether it was running
    ///
    /// From outside the task's own tick this waits for an in-flight tick.
    pub fn stop_task(&self, name: &str) -> Result<bool, SchedulerError> {
        let entry = self.entry(name)?;
        if !entry.timer.stop() {
            return Ok(false);
        }

        let _ops = self.ops.lock().unwrap_or_else(PoisonError::into_inner);
        if !entry.timer.is_running() {
            entry.task.on_stopped();
        }
        log::info!("Stopped task '{}'", name);
        Ok(true)
    }

    /// Stop every task of a kind; returns how many were running
    pub fn stop_all_of_kind(&self, kind: TaskKind) -> usize {
        self.names_of_kind(kind)
            .iter()
            .filter(|name| matches!(self.stop_task(name), Ok(true)))
            .count()
    }

    /// Stop everything
    pub fn stop_all(&self) -> usize {
        STOP_ORDER
            .iter()
            .map(|kind| self.stop_all_of_kind(*kind))
            .sum()
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.entry(name)
            .map(|entry| entry.timer.is_running())
            .unwrap_or(false)
    }

    /// Snapshot of every registered task, ordered by name
    pub fn tasks(&self) -> Vec<TaskStatus> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|entry| {
                let running = entry.timer.is_running();
                TaskStatus {
                    name: entry.task.name().to_string(),
                    kind: entry.task.kind(),
                    interval: if running {
                        entry.timer.interval()
                    } else {
                        entry.task.default_interval()
                    },
                    running,
                }
            })
            .collect()
    }
}

fn tick_fn(task: &Arc<dyn ScheduledTask>) -> TickFn {
    let task = Arc::clone(task);
    Arc::new(move || match task.run() {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("Task '{}' failed: {}", task.name(), e);
            TickOutcome::Continue
        }
    })
}

fn finish_fn(task: &Arc<dyn ScheduledTask>) -> FinishFn {
    let task = Arc::clone(task);
    Arc::new(move || task.on_stopped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct Recorder {
        name: String,
        kind: TaskKind,
        gate_open: AtomicBool,
        runs: AtomicUsize,
        stops: AtomicUsize,
        fail: bool,
        stop_after_first: bool,
    }

    impl Recorder {
        fn build(name: &str, kind: TaskKind, fail: bool, stop_after_first: bool) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                kind,
                gate_open: AtomicBool::new(true),
                runs: AtomicUsize::new(0),
                stops: AtomicUsize::new(0),
                fail,
                stop_after_first,
            })
        }

        fn new(name: &str, kind: TaskKind) -> Arc<Self> {
            Self::build(name, kind, false, false)
        }

        fn failing(name: &str) -> Arc<Self> {
            Self::build(name, TaskKind::Service, true, false)
        }

        fn one_shot(name: &str) -> Arc<Self> {
            Self::build(name, TaskKind::Cooldown, false, true)
        }
    }

    impl ScheduledTask for Recorder {
        fn name(&self) -> &str {
            &self.name
        }
        fn kind(&self) -> TaskKind {
            self.kind
        }
        fn default_interval(&self) -> Period {
            Period::minutes(1)
        }
        fn can_start(&self, _mode: StartMode) -> bool {
            self.gate_open.load(Ordering::SeqCst)
        }
        fn on_stopped(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        fn run(&self) -> Result<TickOutcome, TaskError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TaskError::Failed("boom".to_string()));
            }
            if self.stop_after_first {
                return Ok(TickOutcome::Stop);
            }
            Ok(TickOutcome::Continue)
        }
    }

    fn registry() -> TaskRegistry {
        TaskRegistry::new(TimeScale::new(Duration::from_millis(5)))
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = registry();
        registry.register(Recorder::new("a", TaskKind::Service)).unwrap();
        let err = registry
            .register(Recorder::new("a", TaskKind::Cooldown))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::DuplicateTask(_)));
    }

    #[test]
    fn test_unknown_task() {
        let registry = registry();
        assert!(matches!(
            registry.start_task("missing", Period::minutes(1), StartMode::Normal),
            Err(SchedulerError::UnknownTask(_))
        ));
        assert!(!registry.is_running("missing"));
    }

    #[test]
    fn test_second_start_is_noop() {
        let registry = registry();
        registry.register(Recorder::new("a", TaskKind::Service)).unwrap();

        assert!(registry.start_task("a", Period::minutes(1), StartMode::Normal).unwrap());
        assert!(!registry.start_task("a", Period::minutes(5), StartMode::Normal).unwrap());

        let status = registry.tasks();
        assert_eq!(status.len(), 1);
        assert!(status[0].running);
        assert_eq!(status[0].interval, Period::minutes(1));
        registry.stop_all();
    }

    #[test]
    fn test_gate_declines_start() {
        let registry = registry();
        let recorder = Recorder::new("a", TaskKind::SystemTask);
        recorder.gate_open.store(false, Ordering::SeqCst);
        registry.register(recorder.clone()).unwrap();

        assert!(!registry.start_task("a", Period::minutes(1), StartMode::Normal).unwrap());
        assert!(!registry.is_running("a"));
    }

    #[test]
    fn test_concurrent_starts_run_one_timer() {
        let registry = Arc::new(registry());
        registry.register(Recorder::new("a", TaskKind::Cooldown)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .start_task("a", Period::minutes(1), StartMode::Normal)
                        .unwrap()
                })
            })
            .collect();
        let started = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|started| *started)
            .count();

        assert_eq!(started, 1);
        registry.stop_all();
    }

    #[test]
    fn test_stop_calls_hook() {
        let registry = registry();
        let recorder = Recorder::new("a", TaskKind::Cooldown);
        registry.register(recorder.clone()).unwrap();

        assert!(!registry.stop_task("a").unwrap());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 0);

        registry.start_task("a", Period::minutes(1), StartMode::Normal).unwrap();
        assert!(registry.stop_task("a").unwrap());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
        assert!(!registry.is_running("a"));
    }

    #[test]
    fn test_bulk_by_kind() {
        let registry = registry();
        registry.register(Recorder::new("memory", TaskKind::Service)).unwrap();
        registry.register(Recorder::new("servers", TaskKind::Service)).unwrap();
        registry.register(Recorder::new("alerts", TaskKind::SystemTask)).unwrap();

        assert_eq!(registry.start_all_of_kind(TaskKind::Service), 2);
        assert!(!registry.is_running("alerts"));

        assert_eq!(registry.stop_all_of_kind(TaskKind::Service), 2);
        assert!(!registry.is_running("memory"));
    }

    #[test]
    fn test_failing_task_keeps_running() {
        let registry = registry();
        let recorder = Recorder::failing("flaky");
        registry.register(recorder.clone()).unwrap();
        registry.start_task("flaky", Period::minutes(1), StartMode::Normal).unwrap();

        thread::sleep(Duration::from_millis(50));
        assert!(registry.is_running("flaky"));
        assert!(recorder.runs.load(Ordering::SeqCst) >= 2);
        registry.stop_all();
    }

    #[test]
    fn test_self_stop_calls_hook_once() {
        let registry = registry();
        let recorder = Recorder::one_shot("once");
        registry.register(recorder.clone()).unwrap();
        registry
            .start_task("once", Period::minutes(1), StartMode::Normal)
            .unwrap();

        thread::sleep(Duration::from_millis(50));
        assert!(!registry.is_running("once"));
        assert_eq!(recorder.runs.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);

        // Already stopped: no second hook call
        assert!(!registry.stop_task("once").unwrap());
        assert_eq!(recorder.stops.load(Ordering::SeqCst), 1);
    }
}
