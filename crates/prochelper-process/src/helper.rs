//! The process control helper.
//!
//! [`ProcessHelper`] ties a [`ProcessTable`] to a [`HelperLog`] and applies
//! self-exclusion: the process the helper runs in is never reported as
//! running and never signaled, even when its name matches.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use prochelper_common::ProcessResult;

use crate::config::HelperConfig;
use crate::descriptor::{LaunchMode, ProcessDescriptor};
use crate::events::{HelperEvent, HelperLog, TracingLog};
use crate::table::{ProcessTable, RunningProcess, SignalDelivery, SystemProcessTable};
use crate::validation::validate_process_name;

/// What happened to one matched process during a kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillStatus {
    /// Signaled and confirmed exited within the timeout.
    Terminated,
    /// Signaled but still alive when the timeout elapsed.
    TimedOut,
    /// The match was the current process and was left alone.
    SkippedSelf,
    /// Gone between lookup and signal.
    AlreadyExited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillOutcome {
    pub pid: u32,
    pub status: KillStatus,
}

/// Creates launch descriptors, and finds or kills processes by name.
pub struct ProcessHelper<T: ProcessTable = SystemProcessTable> {
    table: T,
    log: Arc<dyn HelperLog>,
    current_pid: u32,
    config: HelperConfig,
}

impl ProcessHelper<SystemProcessTable> {
    /// Helper over the real OS process table, logging through `tracing`.
    pub fn new() -> Self {
        Self::with_table(SystemProcessTable::new())
    }
}

impl Default for ProcessHelper<SystemProcessTable> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ProcessTable> ProcessHelper<T> {
    pub fn with_table(table: T) -> Self {
        let current_pid = table.current_pid();
        Self {
            table,
            log: Arc::new(TracingLog),
            current_pid,
            config: HelperConfig::default(),
        }
    }

    /// Send step events to `log` instead of `tracing`.
    pub fn log_to(mut self, log: Arc<dyn HelperLog>) -> Self {
        self.log = log;
        self
    }

    /// Treat `pid` as the current process identity.
    pub fn exclude_pid(mut self, pid: u32) -> Self {
        self.current_pid = pid;
        self
    }

    pub fn configure(mut self, config: HelperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn current_pid(&self) -> u32 {
        self.current_pid
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Descriptor for a windowless process with captured stdout and exit
    /// events. Not started.
    pub fn create_background_descriptor(&self, path: &str, arguments: &str) -> ProcessDescriptor {
        self.describe(LaunchMode::Background, path, arguments)
    }

    /// Descriptor for a process with a hidden window. Not started.
    pub fn create_hidden_descriptor(&self, path: &str, arguments: &str) -> ProcessDescriptor {
        self.describe(LaunchMode::Hidden, path, arguments)
    }

    fn describe(&self, mode: LaunchMode, path: &str, arguments: &str) -> ProcessDescriptor {
        self.log.record(HelperEvent::CreatingDescriptor {
            mode,
            program: path.to_string(),
            arguments: arguments.to_string(),
        });

        let descriptor = match mode {
            LaunchMode::Hidden => ProcessDescriptor::hidden(path, arguments),
            LaunchMode::Background => ProcessDescriptor::background(path, arguments),
        };

        self.log.record(HelperEvent::DescriptorCreated {
            mode,
            program: path.to_string(),
            arguments: arguments.to_string(),
        });

        descriptor
    }

    /// Every live process named `name`, the current process included.
    pub fn find_running(&self, name: &str) -> ProcessResult<Vec<RunningProcess>> {
        validate_process_name(name)?;

        self.log.record(HelperEvent::LookupStarted {
            name: name.to_string(),
        });

        let matches = self.table.find_by_name(name)?;

        if matches.is_empty() {
            self.log.record(HelperEvent::NoMatches {
                name: name.to_string(),
            });
        } else {
            self.log.record(HelperEvent::MatchesFound {
                name: name.to_string(),
                count: matches.len(),
            });
        }

        Ok(matches)
    }

    /// Whether any process other than the current one is named `name`.
    pub fn is_running(&self, name: &str) -> ProcessResult<bool> {
        for process in self.find_running(name)? {
            if self.is_self(&process) {
                self.skip_self(name);
                continue;
            }

            self.log.record(HelperEvent::FoundRunning {
                name: name.to_string(),
                pid: process.pid(),
            });
            return Ok(true);
        }

        Ok(false)
    }

    /// Kill every process named `name` except the current one, waiting up to
    /// the configured timeout for each.
    pub fn kill_all(&self, name: &str) -> ProcessResult<()> {
        self.kill_all_within(name, self.config.kill_timeout)
    }

    /// Kill every process named `name` except the current one, waiting up to
    /// `timeout` for each. A process that outlives the timeout is logged,
    /// not reported as an error.
    pub fn kill_all_within(&self, name: &str, timeout: Duration) -> ProcessResult<()> {
        self.kill_all_with_outcomes(name, timeout).map(|_| ())
    }

    /// Like [`ProcessHelper::kill_all_within`], returning one outcome per
    /// match in enumeration order.
    pub fn kill_all_with_outcomes(
        &self,
        name: &str,
        timeout: Duration,
    ) -> ProcessResult<Vec<KillOutcome>> {
        let matches = self.find_running(name)?;
        let mut outcomes = Vec::with_capacity(matches.len());

        for process in matches {
            let pid = process.pid();

            if self.is_self(&process) {
                self.skip_self(name);
                outcomes.push(KillOutcome {
                    pid,
                    status: KillStatus::SkippedSelf,
                });
                continue;
            }

            let status = self.kill_one(name, pid, timeout)?;
            outcomes.push(KillOutcome { pid, status });
        }

        Ok(outcomes)
    }

    fn kill_one(&self, name: &str, pid: u32, timeout: Duration) -> ProcessResult<KillStatus> {
        self.log.record(HelperEvent::Killing {
            name: name.to_string(),
            pid,
        });

        if self.table.terminate(pid)? == SignalDelivery::AlreadyExited {
            self.log.record(HelperEvent::AlreadyExited {
                name: name.to_string(),
                pid,
            });
            return Ok(KillStatus::AlreadyExited);
        }

        if self.wait_for_exit(pid, timeout)? {
            self.log.record(HelperEvent::Killed {
                name: name.to_string(),
                pid,
            });
            Ok(KillStatus::Terminated)
        } else {
            self.log.record(HelperEvent::KillTimedOut {
                name: name.to_string(),
                pid,
                timeout,
            });
            Ok(KillStatus::TimedOut)
        }
    }

    /// Poll until `pid` has exited or `timeout` elapses. Always checks at
    /// least once, so a zero timeout still observes an immediate exit.
    /// A timeout too large to represent as an instant never expires.
    fn wait_for_exit(&self, pid: u32, timeout: Duration) -> ProcessResult<bool> {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if self.table.has_exited(pid)? {
                return Ok(true);
            }

            let pause = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    self.config.exit_poll_interval.min(deadline - now)
                }
                None => self.config.exit_poll_interval,
            };

            thread::sleep(pause);
        }
    }

    fn is_self(&self, process: &RunningProcess) -> bool {
        process.pid() == self.current_pid
    }

    fn skip_self(&self, name: &str) {
        self.log.record(HelperEvent::SkippedSelf {
            name: name.to_string(),
            pid: self.current_pid,
        });
    }
}
