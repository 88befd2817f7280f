//! Process existence checking.

use prochelper_common::{ProcessError, ProcessResult};

/// Check if a process with the given PID exists.
///
/// On Unix this uses `kill(pid, 0)`, which sends no signal but reports
/// whether the PID is in use. On Windows it uses `OpenProcess`. A process we
/// are not allowed to inspect still exists, so permission errors map to
/// `Ok(true)`.
///
/// Zombies still exist by this definition. Use
/// [`ProcessTable::has_exited`](crate::ProcessTable::has_exited) when a
/// reaped-or-not distinction matters.
///
/// # Examples
///
/// ```rust,no_run
/// use prochelper_process::process_exists;
///
/// let exists = process_exists(1234).unwrap();
/// if exists {
///     println!("Process 1234 is running");
/// }
/// ```
pub fn process_exists(pid: u32) -> ProcessResult<bool> {
    #[cfg(unix)]
    {
        process_exists_unix(pid)
    }

    #[cfg(windows)]
    {
        process_exists_windows(pid)
    }
}

#[cfg(unix)]
fn process_exists_unix(pid: u32) -> ProcessResult<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw_pid) = i32::try_from(pid) else {
        return Ok(false);
    };

    match kill(Pid::from_raw(raw_pid), None) {
        Ok(_) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(Errno::EPERM) => Ok(true),
        Err(e) => Err(ProcessError::lookup_failed(
            pid.to_string(),
            format!("Failed to check process: {}", e),
        )),
    }
}

#[cfg(windows)]
fn process_exists_windows(pid: u32) -> ProcessResult<bool> {
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};

    const E_INVALIDARG_WIN32: u32 = 0x80070057;
    const E_ACCESSDENIED_WIN32: u32 = 0x80070005;

    unsafe {
        match OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) {
            Ok(handle) => {
                let _ = CloseHandle(handle);
                Ok(true)
            }
            Err(e) => match e.code().0 as u32 {
                E_INVALIDARG_WIN32 => Ok(false),
                E_ACCESSDENIED_WIN32 => Ok(true),
                _ => Err(ProcessError::lookup_failed(
                    pid.to_string(),
                    format!("Failed to check process: {}", e),
                )),
            },
        }
    }
}
