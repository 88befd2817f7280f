//! The OS process table seam.
//!
//! [`ProcessTable`] is everything the helper needs from the OS: lookup by
//! name, a termination request and an exit check. [`SystemProcessTable`] is
//! the real implementation; tests substitute their own.

use std::collections::HashSet;

use parking_lot::Mutex;
use prochelper_common::{ProcessError, ProcessResult};
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, System};

use crate::check::process_exists;
use crate::terminate::force_kill;

/// A transient view of a live OS process found by name.
///
/// Valid only while the process is alive; the PID may be reused afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningProcess {
    pid: u32,
    name: String,
}

impl RunningProcess {
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// The name as reported by the OS.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a termination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDelivery {
    /// The OS accepted the request.
    Sent,
    /// The process was gone before it could be signaled.
    AlreadyExited,
}

/// Access to the OS process table.
pub trait ProcessTable {
    /// All live processes whose reported name matches `name`.
    fn find_by_name(&self, name: &str) -> ProcessResult<Vec<RunningProcess>>;

    /// Request termination of `pid`.
    fn terminate(&self, pid: u32) -> ProcessResult<SignalDelivery>;

    /// Whether `pid` has exited. Zombies count as exited.
    fn has_exited(&self, pid: u32) -> ProcessResult<bool>;

    /// PID of the process the caller runs in.
    fn current_pid(&self) -> u32 {
        std::process::id()
    }
}

/// Compare an OS-reported process name with a lookup name.
///
/// Windows reports image names such as `notepad.exe` and compares them
/// case-insensitively, so there the `.exe` suffix is optional and case is
/// ignored. Other platforms compare exactly.
pub fn name_matches(reported: &str, wanted: &str) -> bool {
    if cfg!(windows) {
        let stem = match reported.len().checked_sub(4) {
            Some(split)
                if reported.is_char_boundary(split)
                    && reported[split..].eq_ignore_ascii_case(".exe") =>
            {
                &reported[..split]
            }
            _ => reported,
        };
        stem.eq_ignore_ascii_case(wanted) || reported.eq_ignore_ascii_case(wanted)
    } else {
        reported == wanted
    }
}

fn is_live(status: ProcessStatus) -> bool {
    !matches!(status, ProcessStatus::Zombie | ProcessStatus::Dead)
}

/// Process table backed by `sysinfo` for enumeration and by native calls for
/// signaling.
pub struct SystemProcessTable {
    system: Mutex<System>,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn find_by_name(&self, name: &str) -> ProcessResult<Vec<RunningProcess>> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(ProcessError::lookup_failed(
                name,
                "process enumeration is not supported on this platform",
            ));
        }

        let mut system = self.system.lock();
        system.refresh_processes_specifics(ProcessRefreshKind::new());

        // Linux lists threads next to their process; only thread group
        // leaders are processes we may report or signal
        let threads: HashSet<Pid> = system
            .processes()
            .values()
            .filter_map(|process| process.tasks().map(|tasks| (process.pid(), tasks)))
            .flat_map(|(owner, tasks)| tasks.iter().copied().filter(move |tid| *tid != owner))
            .collect();

        let mut matches: Vec<RunningProcess> = system
            .processes()
            .values()
            .filter(|process| !threads.contains(&process.pid()))
            .filter(|process| is_live(process.status()))
            .filter(|process| name_matches(process.name(), name))
            .map(|process| RunningProcess::new(process.pid().as_u32(), process.name()))
            .collect();

        // HashMap order is arbitrary; keep enumeration stable for callers
        matches.sort_by_key(RunningProcess::pid);
        Ok(matches)
    }

    fn terminate(&self, pid: u32) -> ProcessResult<SignalDelivery> {
        force_kill(pid)
    }

    fn has_exited(&self, pid: u32) -> ProcessResult<bool> {
        if !process_exists(pid)? {
            return Ok(true);
        }

        // The PID is still taken; it may be an unreaped zombie
        let sys_pid = Pid::from_u32(pid);
        let mut system = self.system.lock();
        if !system.refresh_process_specifics(sys_pid, ProcessRefreshKind::new()) {
            return Ok(true);
        }

        Ok(system
            .process(sys_pid)
            .map(|process| !is_live(process.status()))
            .unwrap_or(true))
    }
}
