// SPDX-License-Identifier: MIT

//! Kill-on-close job containment.

use std::mem;

use log::warn;
use windows::Win32::{
    Foundation::{CloseHandle, HANDLE},
    System::JobObjects,
};

/// A job object that terminates its members when the handle closes.
///
/// The handle stays open across the blocking wait and closes on scope exit,
/// killing anything still running in the job.
pub struct Job {
    handle: HANDLE,
}

impl Job {
    /// Create the job and assign `process` to it.
    ///
    /// Limit and assignment failures are logged and the job is still
    /// returned; the launch proceeds without containment guarantees.
    pub fn contain(process: HANDLE) -> Option<Self> {
        unsafe {
            let handle =
                match JobObjects::CreateJobObjectW(None, windows::core::PCWSTR::null()) {
                    Ok(h) => h,
                    Err(e) => {
                        warn!("CreateJobObjectW failed - {:#010x}", e.code().0);
                        return None;
                    }
                };

            let mut info: JobObjects::JOBOBJECT_EXTENDED_LIMIT_INFORMATION = mem::zeroed();
            info.BasicLimitInformation.LimitFlags = JobObjects::JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE
                | JobObjects::JOB_OBJECT_LIMIT_BREAKAWAY_OK;

            if let Err(e) = JobObjects::SetInformationJobObject(
                handle,
                JobObjects::JobObjectExtendedLimitInformation,
                (&info as *const JobObjects::JOBOBJECT_EXTENDED_LIMIT_INFORMATION).cast(),
                mem::size_of::<JobObjects::JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
            ) {
                warn!("SetInformationJobObject failed - {:#010x}", e.code().0);
            }

            if let Err(e) = JobObjects::AssignProcessToJobObject(handle, process) {
                warn!("AssignProcessToJobObject failed - {:#010x}", e.code().0);
            }

            Some(Self { handle })
        }
    }
}

impl Drop for Job {
    fn drop(&mut self) {
        // Closing the handle is what fires the kill-on-close limit.
        let _ = unsafe { CloseHandle(self.handle) };
    }
}
