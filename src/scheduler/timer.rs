//! Stoppable periodic timer
//!
//! One worker thread per running timer. The worker sleeps on a condvar so a
//! stop request wakes it immediately; a generation counter makes sure a
//! worker from an earlier start can never tick again after a restart.
//!
//! When a tick returns [`TickOutcome::Stop`] the timer is marked stopped
//! before the finish callback runs, so whatever that callback releases can
//! only be observed once the timer can be started again.

use super::task::{Period, TickOutcome, TimeScale};
use crate::error::SchedulerError;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Instant;

pub(crate) type TickFn = Arc<dyn Fn() -> TickOutcome + Send + Sync>;
pub(crate) type FinishFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Default)]
struct Control {
    running: bool,
    generation: u64,
    interval: Period,
    worker: Option<ThreadId>,
}

#[derive(Debug, Default)]
struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A named periodic timer with at most one live worker
pub struct PeriodicTimer {
    name: String,
    scale: TimeScale,
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTimer {
    pub fn new(name: impl Into<String>, scale: TimeScale) -> Self {
        Self {
            name: name.into(),
            scale,
            shared: Arc::new(Shared::default()),
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Interval of the current (or last) run
    pub fn interval(&self) -> Period {
        self.shared.lock().interval
    }

    /// Start ticking every `period`; returns `false` if already running
    ///
    /// `finish` runs on the worker after a tick stopped the timer.
    pub fn start(
        &self,
        period: Period,
        tick: TickFn,
        finish: FinishFn,
    ) -> Result<bool, SchedulerError> {
        let mut control = self.shared.lock();
        if control.running {
            return Ok(false);
        }

        control.running = true;
        control.generation += 1;
        control.interval = period.at_least_one_second();

        let generation = control.generation;
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        let scale = self.scale;

        let spawned = thread::Builder::new()
            .name(format!("task-{}", self.name))
            .spawn(move || worker_loop(&shared, &name, scale, generation, tick, finish));

        match spawned {
            Ok(handle) => {
                control.worker = Some(handle.thread().id());
                drop(control);
                // A previous worker that stopped itself is already on its way out.
                let _ = self
                    .handle
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .replace(handle);
                Ok(true)
            }
            Err(source) => {
                control.running = false;
                Err(SchedulerError::Spawn {
                    name: self.name.clone(),
                    source,
                })
            }
        }
    }

    /// Stop ticking; returns `false` if the timer was not running
    ///
    /// When called from any thread other than this timer's worker, this waits
    /// for an in-flight tick to finish, so no tick runs after it returns. When
    /// called from inside a tick, the worker exits as soon as that tick ends.
    /// The finish callback is not run for an external stop.
    pub fn stop(&self) -> bool {
        let join = {
            let mut control = self.shared.lock();
            if !control.running {
                return false;
            }
            control.running = false;
            let from_worker = control.worker == Some(thread::current().id());
            control.worker = None;
            self.shared.wake.notify_all();
            !from_worker
        };

        if join {
            let handle = self
                .handle
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    log::error!("Timer worker for '{}' terminated abnormally", self.name);
                }
            }
        }

        true
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        // Signal only; joining here could run on the worker itself.
        let mut control = self.shared.lock();
        control.running = false;
        self.shared.wake.notify_all();
    }
}

fn worker_loop(
    shared: &Shared,
    name: &str,
    scale: TimeScale,
    generation: u64,
    tick: TickFn,
    finish: FinishFn,
) {
    let mut control = shared.lock();
    loop {
        let deadline = Instant::now() + scale.duration(control.interval);
        loop {
            if !control.running || control.generation != generation {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            control = shared
                .wake
                .wait_timeout(control, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        drop(control);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tick())).unwrap_or_else(|_| {
            log::error!("Task '{}' panicked; continuing on next tick", name);
            TickOutcome::Continue
        });

        control = shared.lock();
        if !control.running || control.generation != generation {
            return;
        }
        match outcome {
            TickOutcome::Continue => {}
            TickOutcome::Reschedule(period) => {
                log::debug!("Task '{}' rescheduled to every {}", name, period);
                control.interval = period.at_least_one_second();
            }
            TickOutcome::Stop => {
                log::debug!("Task '{}' stopped itself", name);
                control.running = false;
                control.worker = None;
                drop(control);
                if panic::catch_unwind(AssertUnwindSafe(|| finish())).is_err() {
                    log::error!("Task '{}' panicked while finishing", name);
                }
                return;
            }
        }
    }
}
