//! Windows hidden-window launches.
//!
//! `std::process::Command` cannot set `STARTUPINFO.wShowWindow`, so a GUI
//! program started through it shows its window. Hidden descriptors are
//! started with `CreateProcessW` and `STARTF_USESHOWWINDOW` / `SW_HIDE`
//! instead.

use std::io;
use std::os::windows::process::ExitStatusExt;
use std::process::ExitStatus;

use windows::core::{PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Threading::{
    CreateProcessW, GetExitCodeProcess, WaitForSingleObject, PROCESS_CREATION_FLAGS,
    PROCESS_INFORMATION, STARTF_USESHOWWINDOW, STARTUPINFOW,
};
use windows::Win32::UI::WindowsAndMessaging::SW_HIDE;

const WAIT_OBJECT_0: u32 = 0;
const WAIT_TIMEOUT: u32 = 0x102;
const INFINITE: u32 = u32::MAX;

/// A process started with a hidden window. Owns the process handle.
#[derive(Debug)]
pub(crate) struct HiddenChild {
    pid: u32,
    process: HANDLE,
    status: Option<ExitStatus>,
}

impl HiddenChild {
    pub(crate) fn id(&self) -> u32 {
        self.pid
    }

    pub(crate) fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        match self.wait_for(INFINITE)? {
            Some(status) => Ok(status),
            None => Err(io::Error::new(
                io::ErrorKind::Other,
                "infinite wait returned before process exit",
            )),
        }
    }

    pub(crate) fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        if self.status.is_some() {
            return Ok(self.status);
        }
        self.wait_for(0)
    }

    fn wait_for(&mut self, millis: u32) -> io::Result<Option<ExitStatus>> {
        let event = unsafe { WaitForSingleObject(self.process, millis) };
        match event.0 {
            WAIT_OBJECT_0 => {
                let mut code = 0u32;
                unsafe { GetExitCodeProcess(self.process, &mut code) }
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                let status = ExitStatus::from_raw(code);
                self.status = Some(status);
                Ok(Some(status))
            }
            WAIT_TIMEOUT => Ok(None),
            _ => Err(io::Error::last_os_error()),
        }
    }
}

impl Drop for HiddenChild {
    fn drop(&mut self) {
        unsafe {
            let _ = CloseHandle(self.process);
        }
    }
}

/// Quote `program` for a command line the way `CommandLineToArgvW` reads it.
fn quote_program(program: &str) -> String {
    if program.is_empty() || program.contains([' ', '\t', '"']) {
        format!("\"{}\"", program.replace('"', "\\\""))
    } else {
        program.to_string()
    }
}

pub(crate) fn command_line(program: &str, arguments: &str) -> String {
    let mut line = quote_program(program);
    if !arguments.is_empty() {
        line.push(' ');
        line.push_str(arguments);
    }
    line
}

/// Start `program` with its window hidden and standard streams inherited.
pub(crate) fn spawn_hidden(program: &str, arguments: &str) -> io::Result<HiddenChild> {
    let mut line: Vec<u16> = command_line(program, arguments)
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();

    let startup = STARTUPINFOW {
        cb: std::mem::size_of::<STARTUPINFOW>() as u32,
        dwFlags: STARTF_USESHOWWINDOW,
        wShowWindow: SW_HIDE.0 as u16,
        ..Default::default()
    };
    let mut info = PROCESS_INFORMATION::default();

    unsafe {
        CreateProcessW(
            PCWSTR::null(),
            PWSTR(line.as_mut_ptr()),
            None,
            None,
            false,
            PROCESS_CREATION_FLAGS(0),
            None,
            PCWSTR::null(),
            &startup,
            &mut info,
        )
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let _ = CloseHandle(info.hThread);
    }

    Ok(HiddenChild {
        pid: info.dwProcessId,
        process: info.hProcess,
        status: None,
    })
}
