//! Error types for process lookup, termination and launching.
//!
//! Only genuine OS failures are errors. A skipped self-match or a process
//! that outlives its termination deadline is reported as an outcome, never
//! through this type.

use thiserror::Error;

/// Process-specific error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The process table could not be enumerated.
    #[error("Process lookup failed: {name} - {reason}")]
    LookupFailed { name: String, reason: String },

    /// The OS refused an operation on a process.
    #[error("Access denied: PID {pid} - {operation}")]
    AccessDenied { pid: u32, operation: String },

    #[error("Process termination failed: PID {pid} - {reason}")]
    TerminateFailed { pid: u32, reason: String },

    #[error("Process spawn failed: {program} - {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Process configuration error: {id} - {reason}")]
    Configuration { id: String, reason: String },
}

impl ProcessError {
    pub fn lookup_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LookupFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn access_denied(pid: u32, operation: impl Into<String>) -> Self {
        Self::AccessDenied {
            pid,
            operation: operation.into(),
        }
    }

    pub fn terminate_failed(pid: u32, reason: impl Into<String>) -> Self {
        Self::TerminateFailed {
            pid,
            reason: reason.into(),
        }
    }

    pub fn spawn_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SpawnFailed {
            program: program.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the OS denied permission for the failed operation.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Result type for process operations.
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_construction() {
        let error = ProcessError::lookup_failed("notepad", "process table unavailable");
        assert!(matches!(error, ProcessError::LookupFailed { .. }));
        assert_eq!(
            format!("{}", error),
            "Process lookup failed: notepad - process table unavailable"
        );

        let error = ProcessError::spawn_failed("missing-app", "No such file or directory");
        assert!(matches!(error, ProcessError::SpawnFailed { .. }));
        assert!(format!("{}", error).contains("spawn failed"));
    }

    #[test]
    fn test_access_denied_classification() {
        let error = ProcessError::access_denied(42, "terminate");
        assert!(error.is_access_denied());
        assert_eq!(format!("{}", error), "Access denied: PID 42 - terminate");

        let error = ProcessError::terminate_failed(42, "EINVAL");
        assert!(!error.is_access_denied());
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = ProcessError::configuration("name", "Process name cannot be empty");

        match err {
            ProcessError::Configuration { id, reason } => {
                assert_eq!(id, "name");
                assert!(reason.contains("empty"));
            }
            _ => panic!("Wrong error type"),
        }
    }
}
