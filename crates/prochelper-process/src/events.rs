//! Structured step events and the sinks that receive them.
//!
//! The helper reports every major step as a [`HelperEvent`] to an injected
//! [`HelperLog`]. Events are observability only; control flow never depends
//! on them.

use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::descriptor::LaunchMode;

/// A step taken by the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelperEvent {
    CreatingDescriptor {
        mode: LaunchMode,
        program: String,
        arguments: String,
    },
    DescriptorCreated {
        mode: LaunchMode,
        program: String,
        arguments: String,
    },
    LookupStarted {
        name: String,
    },
    MatchesFound {
        name: String,
        count: usize,
    },
    NoMatches {
        name: String,
    },
    SkippedSelf {
        name: String,
        pid: u32,
    },
    FoundRunning {
        name: String,
        pid: u32,
    },
    Killing {
        name: String,
        pid: u32,
    },
    Killed {
        name: String,
        pid: u32,
    },
    AlreadyExited {
        name: String,
        pid: u32,
    },
    KillTimedOut {
        name: String,
        pid: u32,
        timeout: Duration,
    },
}

fn mode_label(mode: &LaunchMode) -> &'static str {
    match mode {
        LaunchMode::Hidden => "hidden",
        LaunchMode::Background => "background",
    }
}

impl fmt::Display for HelperEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatingDescriptor { mode, program, arguments } => write!(
                f,
                "Creating {} process '{}' with arguments '{}'",
                mode_label(mode),
                program,
                arguments
            ),
            Self::DescriptorCreated { mode, program, arguments } => write!(
                f,
                "{} process '{}' with arguments '{}' created",
                match mode {
                    LaunchMode::Hidden => "Hidden",
                    LaunchMode::Background => "Background",
                },
                program,
                arguments
            ),
            Self::LookupStarted { name } => {
                write!(f, "Checking if any processes named '{}' exist", name)
            }
            Self::MatchesFound { name, count } => {
                write!(f, "Found {} existing process(es) named '{}'", count, name)
            }
            Self::NoMatches { name } => {
                write!(f, "No existing processes named '{}' exist", name)
            }
            Self::SkippedSelf { name, pid } => write!(
                f,
                "Ignoring existing process named '{}' which matches current process ID of: {}",
                name, pid
            ),
            Self::FoundRunning { name, pid } => {
                write!(f, "Found existing process named '{}' (PID: {})", name, pid)
            }
            Self::Killing { name, pid } => {
                write!(f, "Killing existing process named '{}' (PID: {})", name, pid)
            }
            Self::Killed { name, pid } => {
                write!(f, "Killed existing process named '{}' (PID: {})", name, pid)
            }
            Self::AlreadyExited { name, pid } => write!(
                f,
                "Process named '{}' (PID: {}) exited before it could be killed",
                name, pid
            ),
            Self::KillTimedOut { name, pid, timeout } => write!(
                f,
                "Waited {:?}, but couldn't kill process named '{}' (PID: {})",
                timeout, name, pid
            ),
        }
    }
}

/// Receiver of helper events.
pub trait HelperLog: Send + Sync {
    fn record(&self, event: HelperEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl HelperLog for TracingLog {
    fn record(&self, event: HelperEvent) {
        match &event {
            HelperEvent::KillTimedOut { .. } => warn!("{}", event),
            HelperEvent::AlreadyExited { .. } => debug!("{}", event),
            _ => info!("{}", event),
        }
    }
}

/// Keeps events in memory, in the order they were recorded.
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: Mutex<Vec<HelperEvent>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<HelperEvent> {
        self.events.lock().clone()
    }

    /// Rendered messages, in order.
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl HelperLog for MemoryLog {
    fn record(&self, event: HelperEvent) {
        self.events.lock().push(event);
    }
}
