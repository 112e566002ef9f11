//! Startup wait for the monitored servers
//!
//! Blocks until the process poller reports the game server online, then
//! gives the voice server a bounded grace period. Runs after the pollers are
//! started and before the alert task, so the first alert tick does not fire
//! for servers that are still starting.

use crate::config::Config;
use crate::domain::{SharedState, StateHandle};

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const SLICE: Duration = Duration::from_millis(100);

/// How the wait finished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Every awaited server is online (or nothing needed waiting for)
    Ready,
    /// The voice server did not appear within the limit
    VoipMissing,
    /// Shutdown was requested while waiting
    Interrupted,
}

/// Polling cadence of the startup wait
#[derive(Debug, Clone, Copy)]
pub struct ServerWait {
    pub game_poll: Duration,
    pub voip_poll: Duration,
    pub voip_limit: Duration,
}

impl Default for ServerWait {
    fn default() -> Self {
        Self {
            game_poll: Duration::from_secs(1),
            voip_poll: Duration::from_secs(3),
            voip_limit: Duration::from_secs(5 * 60),
        }
    }
}

impl ServerWait {
    /// Wait as configured; only waits at all when alerts are enabled
    ///
    /// The game wait is unbounded. The voice wait gives up after
    /// `voip_limit` and startup proceeds without it.
    pub fn run(&self, config: &Config, state: &StateHandle, shutdown: &AtomicBool) -> WaitOutcome {
        if !config.alerts.all {
            return WaitOutcome::Ready;
        }

        if config.alerts.game {
            log::info!(
                "Waiting for {} to start...",
                config.monitor.game_server_name
            );
            if !self.wait_until(state, shutdown, self.game_poll, None, |s| s.game_online) {
                return WaitOutcome::Interrupted;
            }
            log::info!("{} is running", config.monitor.game_server_name);
        }

        if config.alerts.voip {
            log::info!(
                "Waiting for {} to start...",
                config.monitor.voip_server_name
            );
            let deadline = Instant::now() + self.voip_limit;
            if !self.wait_until(state, shutdown, self.voip_poll, Some(deadline), |s| {
                s.voip_online
            }) {
                if shutdown.load(Ordering::SeqCst) {
                    return WaitOutcome::Interrupted;
                }
                log::warn!(
                    "Wait limit exceeded; proceeding without {} running",
                    config.monitor.voip_server_name
                );
                return WaitOutcome::VoipMissing;
            }
            log::info!("{} is running", config.monitor.voip_server_name);
        }

        WaitOutcome::Ready
    }

    /// Poll until `ready`; `false` on shutdown or deadline
    fn wait_until(
        &self,
        state: &StateHandle,
        shutdown: &AtomicBool,
        poll: Duration,
        deadline: Option<Instant>,
        ready: impl Fn(&SharedState) -> bool,
    ) -> bool {
        loop {
            if state.read(&ready) {
                return true;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }
            if !sleep_unless(shutdown, poll) {
                return false;
            }
        }
    }
}

/// Sleep in short slices; `false` as soon as shutdown is requested
fn sleep_unless(shutdown: &AtomicBool, duration: Duration) -> bool {
    let end = Instant::now() + duration;
    loop {
        if shutdown.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= end {
            return true;
        }
        thread::sleep(SLICE.min(end - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProcessUpdate;
    use std::sync::Arc;

    fn quick() -> ServerWait {
        ServerWait {
            game_poll: Duration::from_millis(5),
            voip_poll: Duration::from_millis(5),
            voip_limit: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_no_wait_when_alerts_disabled() {
        let mut config = Config::default();
        config.alerts.all = false;
        let outcome = quick().run(&config, &StateHandle::new(), &AtomicBool::new(false));
        assert_eq!(outcome, WaitOutcome::Ready);
    }

    #[test]
    fn test_ready_when_both_online() {
        let state = StateHandle::new();
        state.apply_processes(ProcessUpdate {
            game_online: true,
            voip_online: true,
        });
        let outcome = quick().run(&Config::default(), &state, &AtomicBool::new(false));
        assert_eq!(outcome, WaitOutcome::Ready);
    }

    #[test]
    fn test_voip_wait_is_bounded() {
        let state = StateHandle::new();
        state.apply_processes(ProcessUpdate {
            game_online: true,
            voip_online: false,
        });
        let outcome = quick().run(&Config::default(), &state, &AtomicBool::new(false));
        assert_eq!(outcome, WaitOutcome::VoipMissing);
    }

    #[test]
    fn test_game_wait_sees_late_start() {
        let state = StateHandle::new();
        let writer = state.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            writer.apply_processes(ProcessUpdate {
                game_online: true,
                voip_online: true,
            });
        });

        let outcome = quick().run(&Config::default(), &state, &AtomicBool::new(false));
        handle.join().unwrap();
        assert_eq!(outcome, WaitOutcome::Ready);
    }

    #[test]
    fn test_game_wait_interrupted() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            flag.store(true, Ordering::SeqCst);
        });

        let outcome = quick().run(&Config::default(), &StateHandle::new(), &shutdown);
        handle.join().unwrap();
        assert_eq!(outcome, WaitOutcome::Interrupted);
    }
}
