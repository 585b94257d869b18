// SPDX-License-Identifier: MIT

//! Direct process creation.
//!
//! `CreateProcessW` with the assembled command line, an optional
//! code-integrity attribute list, an optional kill-on-close job, then a
//! blocking wait for the child to exit.

use std::mem;

use log::{debug, error, warn};
use windows::Win32::{
    Foundation::{CloseHandle, GetLastError, HANDLE, WAIT_FAILED},
    System::Threading,
};
use windows::core::{PCWSTR, PWSTR};

use super::{code_integrity::CodeIntegrityGuard, job::Job};
use crate::args::LaunchRequest;
use crate::cmdline;
use crate::launch::LaunchError;

struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            let _ = unsafe { CloseHandle(self.0) };
        }
    }
}

// Field order is drop order: the thread handle closes before the process
// handle.
struct SpawnedProcess {
    _thread: OwnedHandle,
    process: OwnedHandle,
}

/// Launch as a direct child and block until it exits.
///
/// The child's own exit code is logged but not propagated; creation failure
/// is the only error this strategy surfaces.
pub fn launch(request: &LaunchRequest) -> Result<(), LaunchError> {
    let executable = cmdline::to_wide_nul(request.executable());
    // CreateProcessW may write into the command-line buffer, so it is built
    // as a mutable wide string rather than borrowed.
    let mut command_line = cmdline::to_wide_nul(&cmdline::join_command(request.command()));

    // Guard unavailability is a normal outcome; the launch proceeds bare.
    let guard = if request.flags.code_integrity_guard {
        CodeIntegrityGuard::new()
    } else {
        None
    };

    unsafe {
        let mut startup: Threading::STARTUPINFOEXW = mem::zeroed();
        let mut creation_flags = Threading::PROCESS_CREATION_FLAGS(0);
        match &guard {
            Some(g) => {
                startup.StartupInfo.cb = mem::size_of::<Threading::STARTUPINFOEXW>() as u32;
                startup.lpAttributeList = g.list();
                creation_flags |= Threading::EXTENDED_STARTUPINFO_PRESENT;
            }
            None => {
                startup.StartupInfo.cb = mem::size_of::<Threading::STARTUPINFOW>() as u32;
            }
        }

        let mut info: Threading::PROCESS_INFORMATION = mem::zeroed();
        if let Err(e) = Threading::CreateProcessW(
            PCWSTR(executable.as_ptr()),            // application name, as given
            Some(PWSTR(command_line.as_mut_ptr())), // full quoted command line
            None,                                   // process attributes
            None,                                   // thread attributes
            false,                                  // no handle inheritance
            creation_flags,
            None,           // inherit the environment
            PCWSTR::null(), // inherit the working directory
            &startup.StartupInfo,
            &mut info,
        ) {
            error!("CreateProcess failed - {:#010x}", e.code().0);
            return Err(LaunchError::CreateProcess(e));
        }

        // The attribute list only configures the creation call; it is not
        // needed across the wait.
        drop(guard);

        // Declared before the process handles so it drops after them; the
        // kill-on-close policy is the last thing to let go.
        let job = if request.flags.job {
            Job::contain(info.hProcess)
        } else {
            None
        };
        let spawned = SpawnedProcess {
            _thread: OwnedHandle(info.hThread),
            process: OwnedHandle(info.hProcess),
        };

        if Threading::WaitForSingleObject(spawned.process.0, Threading::INFINITE) == WAIT_FAILED {
            warn!("WaitForSingleObject failed - {:#010x}", GetLastError().0);
        }

        let mut code = 0u32;
        match Threading::GetExitCodeProcess(spawned.process.0, &mut code) {
            Ok(()) => debug!("child exited with code {code}"),
            Err(e) => warn!("GetExitCodeProcess failed - {:#010x}", e.code().0),
        }

        drop(spawned);
        drop(job);
    }

    Ok(())
}
