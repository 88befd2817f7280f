//! Process termination primitives.

use prochelper_common::{ProcessError, ProcessResult};

use crate::table::SignalDelivery;

/// Force kill a process (SIGKILL on Unix, TerminateProcess on Windows).
///
/// A process that is already gone when the signal is sent is not an error:
/// the process table can change between lookup and kill, so this returns
/// [`SignalDelivery::AlreadyExited`] instead.
pub fn force_kill(pid: u32) -> ProcessResult<SignalDelivery> {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let raw_pid = i32::try_from(pid)
            .map_err(|_| ProcessError::terminate_failed(pid, "PID out of range"))?;

        match kill(Pid::from_raw(raw_pid), Signal::SIGKILL) {
            Ok(()) => Ok(SignalDelivery::Sent),
            Err(Errno::ESRCH) => Ok(SignalDelivery::AlreadyExited),
            Err(Errno::EPERM) => Err(ProcessError::access_denied(pid, "send SIGKILL")),
            Err(e) => Err(ProcessError::terminate_failed(pid, e.to_string())),
        }
    }

    #[cfg(windows)]
    {
        use windows::Win32::Foundation::CloseHandle;
        use windows::Win32::System::Threading::{OpenProcess, TerminateProcess, PROCESS_TERMINATE};

        const E_ACCESSDENIED_WIN32: u32 = 0x80070005;

        unsafe {
            let handle = match OpenProcess(PROCESS_TERMINATE, false, pid) {
                Ok(h) if !h.is_invalid() => h,
                Ok(_) => {
                    return Err(ProcessError::terminate_failed(
                        pid,
                        "Failed to open process for termination",
                    ));
                }
                Err(e) => {
                    if !crate::check::process_exists(pid)? {
                        return Ok(SignalDelivery::AlreadyExited);
                    }
                    if e.code().0 as u32 == E_ACCESSDENIED_WIN32 {
                        return Err(ProcessError::access_denied(pid, "open for termination"));
                    }
                    return Err(ProcessError::terminate_failed(
                        pid,
                        format!("Failed to open process for termination: {}", e),
                    ));
                }
            };

            let result = TerminateProcess(handle, 1);
            let _ = CloseHandle(handle);

            match result {
                Ok(()) => Ok(SignalDelivery::Sent),
                Err(e) => {
                    if !crate::check::process_exists(pid)? {
                        return Ok(SignalDelivery::AlreadyExited);
                    }
                    Err(ProcessError::terminate_failed(
                        pid,
                        format!("TerminateProcess failed: {}", e),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn test_kill_of_unused_pid_is_benign() {
        // Well above any kernel pid_max, so nothing can own it
        assert_eq!(force_kill(2_000_000_000).unwrap(), SignalDelivery::AlreadyExited);
    }

    #[test]
    #[cfg(unix)]
    fn test_kill_rejects_out_of_range_pid() {
        let err = force_kill(u32::MAX).unwrap_err();
        assert!(matches!(err, ProcessError::TerminateFailed { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn test_kill_terminates_child() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        assert_eq!(force_kill(pid).unwrap(), SignalDelivery::Sent);

        let status = child.wait().unwrap();
        assert!(!status.success());
    }
}
