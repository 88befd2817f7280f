// E2E test support for the process control helper

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use sysinfo::{Pid, ProcessRefreshKind, System};

static NAME_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A process name no other process on the machine is using.
///
/// Kept under 15 characters so Linux does not truncate it in `comm`.
pub fn unique_name(prefix: &str) -> String {
    let n = NAME_COUNTER.fetch_add(1, Ordering::SeqCst);
    let name = format!("{}{}{}", prefix, std::process::id() % 100_000, n);
    assert!(name.len() <= 15, "process name too long: {}", name);
    name
}

/// Locate a standard system binary such as `sleep`.
pub fn system_binary(name: &str) -> Option<PathBuf> {
    ["/bin", "/usr/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|path| path.is_file())
}

/// Whether `path` is a standalone binary rather than a link to a multi-call
/// binary such as busybox, which dispatches on its own file name.
pub fn is_standalone_binary(path: &Path, name: &str) -> bool {
    fs::canonicalize(path)
        .ok()
        .and_then(|real| real.file_name().map(|f| f == name))
        .unwrap_or(false)
}

/// Copy `source` into `dir` under the file name `name`, keeping permissions.
pub fn stage_named_copy(source: &Path, name: &str, dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let target = dir.join(name);
    fs::copy(source, &target)?;
    Ok(target)
}

/// The name the OS reports for the running test process.
pub fn own_process_name() -> String {
    let mut system = System::new();
    system.refresh_processes_specifics(ProcessRefreshKind::new());
    system
        .process(Pid::from_u32(std::process::id()))
        .map(|p| p.name().to_string())
        .expect("current process missing from process table")
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(20));
    }
}
