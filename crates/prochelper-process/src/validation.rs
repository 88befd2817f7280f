//! Input validation for lookups and launches.

use prochelper_common::{ProcessError, ProcessResult};

/// Validate that an executable path is usable.
pub fn validate_executable(path: &str) -> ProcessResult<()> {
    if path.trim().is_empty() {
        return Err(ProcessError::configuration(
            "validation",
            "Executable path cannot be empty",
        ));
    }

    Ok(())
}

/// Validate a process name used for lookup.
///
/// Names are matched against the OS-reported process name, never a path, so
/// a name with a path separator can never match and is rejected up front.
pub fn validate_process_name(name: &str) -> ProcessResult<()> {
    if name.trim().is_empty() {
        return Err(ProcessError::configuration(
            "validation",
            "Process name cannot be empty",
        ));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(ProcessError::configuration(
            name,
            "Process name must not contain a path separator; pass the file name only",
        ));
    }

    Ok(())
}
