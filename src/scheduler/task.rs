//! Periodic task definitions
//!
//! A [`ScheduledTask`] is the unit the [`TaskRegistry`](super::TaskRegistry)
//! starts and stops. The registry owns the timing; the task owns its start
//! gate and what happens on each tick.

use crate::error::TaskError;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Task categories, used for bulk start/stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskKind {
    /// Info pollers, running for the whole process lifetime
    Service,
    /// Alert and CSV logging ticks, toggled by the operator
    SystemTask,
    /// Alert suppression rechecks
    Cooldown,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::SystemTask => write!(f, "systemTask"),
            Self::Cooldown => write!(f, "cooldown"),
        }
    }
}

/// Flag passed through `start_task` to the task's start gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    #[default]
    Normal,
    /// Start directly in the escalated (short recheck) phase
    Hastened,
}

/// What the timer should do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep the current interval
    Continue,
    /// Keep running with a new interval
    Reschedule(Period),
    /// Stop the timer; no further ticks
    Stop,
}

/// Task interval with one-second resolution
///
/// Serialized as a number of seconds.
///
/// # Examples
///
/// ```
/// use servmon::scheduler::Period;
///
/// assert_eq!(Period::minutes(2), Period::seconds(120));
/// assert_eq!(Period::minutes(2).to_string(), "2m");
/// assert_eq!(Period::seconds(5).to_string(), "5s");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Period {
    seconds: u32,
}

impl Period {
    pub const fn seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub const fn minutes(minutes: u32) -> Self {
        Self {
            seconds: minutes.saturating_mul(60),
        }
    }

    pub const fn as_seconds(self) -> u32 {
        self.seconds
    }

    /// The same period, but never shorter than one second
    pub fn at_least_one_second(self) -> Self {
        Self::seconds(self.seconds.max(1))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds % 60 == 0 {
            write!(f, "{}m", self.seconds / 60)
        } else {
            write!(f, "{}s", self.seconds)
        }
    }
}

/// Length of one configured "minute"
///
/// Production uses real minutes; tests compress time so that scheduling
/// behaviour can be observed in milliseconds. Second-based periods scale
/// along with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeScale {
    minute: Duration,
}

impl TimeScale {
    pub const fn new(minute: Duration) -> Self {
        Self { minute }
    }

    pub fn duration(&self, period: Period) -> Duration {
        self.minute * period.as_seconds() / 60
    }
}

impl Default for TimeScale {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

/// A periodic unit of work managed by the task registry
pub trait ScheduledTask: Send + Sync {
    /// Globally unique task name
    fn name(&self) -> &str;

    fn kind(&self) -> TaskKind;

    /// Interval used by bulk starts
    fn default_interval(&self) -> Period;

    /// Kind-specific start condition, evaluated only while the task is stopped
    ///
    /// May record start-time state (e.g. arm a cooldown); when it returns
    /// `true` the timer is started immediately afterwards.
    fn can_start(&self, _mode: StartMode) -> bool {
        true
    }

    /// Called after the registry stopped this task's timer
    fn on_stopped(&self) {}

    /// One tick of work
    fn run(&self) -> Result<TickOutcome, TaskError>;
}

/// Registry view of one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatus {
    pub name: String,
    pub kind: TaskKind,
    /// Current interval while running, default interval otherwise
    pub interval: Period,
    pub running: bool,
}
