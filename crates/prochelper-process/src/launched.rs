//! Handles to processes started from a descriptor.

use std::io;
use std::process::{Child, ChildStdout, ExitStatus};

/// A process started by [`ProcessDescriptor::spawn`](crate::ProcessDescriptor::spawn).
///
/// Mirrors the parts of [`std::process::Child`] callers need. Windows hidden
/// launches go through `CreateProcessW` and carry a raw process handle
/// instead of a `Child`.
#[derive(Debug)]
pub struct LaunchedProcess {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Std(Child),
    #[cfg(windows)]
    Hidden(crate::hidden_windows::HiddenChild),
}

impl LaunchedProcess {
    pub(crate) fn from_child(child: Child) -> Self {
        Self {
            inner: Inner::Std(child),
        }
    }

    #[cfg(windows)]
    pub(crate) fn from_hidden(child: crate::hidden_windows::HiddenChild) -> Self {
        Self {
            inner: Inner::Hidden(child),
        }
    }

    pub fn id(&self) -> u32 {
        match &self.inner {
            Inner::Std(child) => child.id(),
            #[cfg(windows)]
            Inner::Hidden(child) => child.id(),
        }
    }

    /// Take the captured standard output, if the descriptor captured it.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        match &mut self.inner {
            Inner::Std(child) => child.stdout.take(),
            #[cfg(windows)]
            Inner::Hidden(_) => None,
        }
    }

    /// Block until the process exits.
    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        match &mut self.inner {
            Inner::Std(child) => child.wait(),
            #[cfg(windows)]
            Inner::Hidden(child) => child.wait(),
        }
    }

    /// Exit status if the process has exited, without blocking.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        match &mut self.inner {
            Inner::Std(child) => child.try_wait(),
            #[cfg(windows)]
            Inner::Hidden(child) => child.try_wait(),
        }
    }
}
