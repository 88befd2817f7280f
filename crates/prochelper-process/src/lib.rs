//! # Process Helper
//!
//! Launch descriptors and name-based process control.
//!
//! This crate provides:
//! - Hidden and background process descriptors that are built but never
//!   started by the helper itself
//! - Lookup of running processes by name
//! - Termination of every process with a given name, with a bounded wait
//!
//! Lookup and termination always exclude the process the helper runs in.

pub mod check;
pub mod config;
pub mod descriptor;
pub mod events;
pub mod helper;
pub mod launched;
pub mod table;
pub mod terminate;
pub mod validation;

mod arguments;
#[cfg(windows)]
mod hidden_windows;

// Re-export main types
pub use check::process_exists;
pub use config::HelperConfig;
pub use descriptor::{LaunchMode, ProcessDescriptor, WatchedProcess, WindowStyle};
pub use events::{HelperEvent, HelperLog, MemoryLog, TracingLog};
pub use helper::{KillOutcome, KillStatus, ProcessHelper};
pub use launched::LaunchedProcess;
pub use table::{name_matches, ProcessTable, RunningProcess, SignalDelivery, SystemProcessTable};
pub use terminate::force_kill;
pub use validation::*;

pub use prochelper_common::{ProcessError, ProcessResult};
