//! Process launch descriptors.
//!
//! A [`ProcessDescriptor`] is an inert description of how to launch a
//! process. Building one touches no OS state; only [`ProcessDescriptor::spawn`]
//! and [`ProcessDescriptor::spawn_watched`] start anything, and those are
//! called by the owner of the descriptor, never by the helper.

use std::io;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use prochelper_common::{ProcessError, ProcessResult};
use tracing::{debug, info, warn};

use crate::arguments::split_arguments;
use crate::launched::LaunchedProcess;
use crate::validation::validate_executable;

/// How a launched process presents itself to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchMode {
    /// Window hidden, standard streams inherited.
    Hidden,
    /// No console window, standard output redirected to a pipe.
    Background,
}

/// Window presentation of a launched process.
///
/// Only Windows distinguishes these; elsewhere there is no window to manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowStyle {
    /// Whatever the program normally shows.
    Normal,
    /// Started with `SW_HIDE`, so even a GUI window stays invisible.
    Hidden,
    /// No console is created (`CREATE_NO_WINDOW`).
    NoWindow,
}

/// An unstarted specification of a process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDescriptor {
    program: String,
    arguments: String,
    mode: LaunchMode,
    window: WindowStyle,
    capture_output: bool,
    exit_events: bool,
}

impl ProcessDescriptor {
    /// Descriptor for a process with a hidden window and inherited output.
    pub fn hidden(program: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
            mode: LaunchMode::Hidden,
            window: WindowStyle::Hidden,
            capture_output: false,
            exit_events: false,
        }
    }

    /// Descriptor for a windowless process whose stdout is captured and whose
    /// exit can be observed through [`ProcessDescriptor::spawn_watched`].
    pub fn background(program: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            arguments: arguments.into(),
            mode: LaunchMode::Background,
            window: WindowStyle::NoWindow,
            capture_output: true,
            exit_events: true,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The raw, unsplit argument string.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    /// The argument string split the way it is passed on non-Windows platforms.
    pub fn argv(&self) -> Vec<String> {
        split_arguments(&self.arguments)
    }

    pub fn mode(&self) -> LaunchMode {
        self.mode
    }

    /// Override the window presentation chosen by the launch mode.
    pub fn with_window_style(mut self, window: WindowStyle) -> Self {
        self.window = window;
        self
    }

    pub fn window_style(&self) -> WindowStyle {
        self.window
    }

    /// Whether the launched process may show a window to the user.
    pub fn shows_window(&self) -> bool {
        self.window == WindowStyle::Normal
    }

    pub fn captures_output(&self) -> bool {
        self.capture_output
    }

    pub fn exit_events_enabled(&self) -> bool {
        self.exit_events
    }

    /// Build the platform command for this descriptor without starting it.
    ///
    /// `Command` cannot request `SW_HIDE`; on Windows a hidden style is
    /// approximated here with `CREATE_NO_WINDOW`, while [`spawn`](Self::spawn)
    /// starts hidden descriptors with a truly hidden window.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;

            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            if self.window != WindowStyle::Normal {
                cmd.creation_flags(CREATE_NO_WINDOW);
            }
            if !self.arguments.is_empty() {
                cmd.raw_arg(&self.arguments);
            }
        }

        #[cfg(not(windows))]
        {
            cmd.args(self.argv());
        }

        if self.capture_output {
            cmd.stdout(Stdio::piped());
        }

        cmd
    }

    /// Start the described process.
    pub fn spawn(&self) -> ProcessResult<LaunchedProcess> {
        validate_executable(&self.program)?;

        let launched = self
            .spawn_platform()
            .map_err(|e| ProcessError::spawn_failed(&self.program, e.to_string()))?;

        info!(
            "Process spawned: {} (PID: {}, mode: {:?}, window: {:?})",
            self.program,
            launched.id(),
            self.mode,
            self.window
        );
        Ok(launched)
    }

    #[cfg(windows)]
    fn spawn_platform(&self) -> io::Result<LaunchedProcess> {
        // A captured stdout needs the pipe plumbing of `Command`
        if self.window == WindowStyle::Hidden && !self.capture_output {
            return crate::hidden_windows::spawn_hidden(&self.program, &self.arguments)
                .map(LaunchedProcess::from_hidden);
        }
        self.command().spawn().map(LaunchedProcess::from_child)
    }

    #[cfg(not(windows))]
    fn spawn_platform(&self) -> io::Result<LaunchedProcess> {
        self.command().spawn().map(LaunchedProcess::from_child)
    }

    fn spawn_child(&self) -> ProcessResult<Child> {
        validate_executable(&self.program)?;

        let child = self
            .command()
            .spawn()
            .map_err(|e| ProcessError::spawn_failed(&self.program, e.to_string()))?;

        info!(
            "Process spawned: {} (PID: {}, mode: {:?})",
            self.program,
            child.id(),
            self.mode
        );
        Ok(child)
    }

    /// Start the described process and call `on_exit` from a watcher thread
    /// once it exits.
    ///
    /// Requires a descriptor with exit events enabled. The watcher owns the
    /// child and reaps it, so a watched process never lingers as a zombie.
    pub fn spawn_watched<F>(&self, on_exit: F) -> ProcessResult<WatchedProcess>
    where
        F: FnOnce(u32, io::Result<ExitStatus>) + Send + 'static,
    {
        if !self.exit_events {
            return Err(ProcessError::configuration(
                &self.program,
                "Exit events are not enabled for this descriptor",
            ));
        }

        let mut child = self.spawn_child()?;
        let pid = child.id();
        let stdout = child.stdout.take();
        let program = self.program.clone();

        let watcher = thread::Builder::new()
            .name(format!("exit-watch-{}", pid))
            .spawn(move || {
                debug!("Exit watcher started for {} (PID: {})", program, pid);
                let status = child.wait();
                match &status {
                    Ok(s) => debug!("Process {} (PID: {}) exited: {}", program, pid, s),
                    Err(e) => warn!("Failed to wait for {} (PID: {}): {}", program, pid, e),
                }
                on_exit(pid, status);
            })
            .map_err(|e| {
                ProcessError::spawn_failed(&self.program, format!("exit watcher: {}", e))
            })?;

        Ok(WatchedProcess {
            pid,
            stdout,
            watcher,
        })
    }
}

/// A process started by [`ProcessDescriptor::spawn_watched`].
#[derive(Debug)]
pub struct WatchedProcess {
    pid: u32,
    stdout: Option<ChildStdout>,
    watcher: JoinHandle<()>,
}

impl WatchedProcess {
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Take the captured standard output, if the descriptor captured it.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Block until the process has exited and its exit callback returned.
    pub fn join(self) -> ProcessResult<()> {
        self.watcher.join().map_err(|_| {
            ProcessError::terminate_failed(self.pid, "exit callback panicked")
        })
    }
}
