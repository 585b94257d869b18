// SPDX-License-Identifier: MIT

//! Code-integrity proc/thread attribute list.
//!
//! Windows sizes the attribute list through a probe call that is expected to
//! fail with `ERROR_INSUFFICIENT_BUFFER`.  The buffer, the initialized list,
//! and the policy value it points at are owned together so the release
//! ordering holds on every path: the list is deleted before its backing
//! memory is freed.

use log::warn;
use windows::Win32::{
    Foundation::{ERROR_INSUFFICIENT_BUFFER, GetLastError},
    System::SystemServices::PROCESS_CREATION_MITIGATION_POLICY_BLOCK_NON_MICROSOFT_BINARIES_ALWAYS_ON,
    System::Threading,
};

/// A one-entry attribute list restricting the new process to binaries signed
/// by Microsoft, permanently for the life of that process.
///
/// Construction is best-effort: `None` means "guard unavailable" and the
/// caller launches without it.
pub struct CodeIntegrityGuard {
    // The attribute entry stores a pointer to the policy value, not a copy;
    // the box keeps that address stable until the list is deleted.
    _policy: Box<u64>,
    _buf: Vec<u8>,
    list: Threading::LPPROC_THREAD_ATTRIBUTE_LIST,
}

impl CodeIntegrityGuard {
    pub fn new() -> Option<Self> {
        unsafe {
            // Probe for the required buffer size.  Success here is unexpected
            // but tolerated; any error other than the insufficient-buffer
            // signal aborts construction.
            let mut size: usize = 0;
            if let Err(e) =
                Threading::InitializeProcThreadAttributeList(None, 1, Some(0), &mut size)
            {
                if GetLastError() != ERROR_INSUFFICIENT_BUFFER {
                    warn!(
                        "InitializeProcThreadAttributeList probe failed - {:#010x}",
                        e.code().0
                    );
                    return None;
                }
            }

            let mut buf = vec![0u8; size];
            let list = Threading::LPPROC_THREAD_ATTRIBUTE_LIST(buf.as_mut_ptr().cast());
            if let Err(e) =
                Threading::InitializeProcThreadAttributeList(Some(list), 1, Some(0), &mut size)
            {
                warn!("InitializeProcThreadAttributeList failed - {:#010x}", e.code().0);
                return None;
            }

            let policy =
                Box::new(PROCESS_CREATION_MITIGATION_POLICY_BLOCK_NON_MICROSOFT_BINARIES_ALWAYS_ON);
            if let Err(e) = Threading::UpdateProcThreadAttribute(
                list,
                0, // dwFlags must be 0
                Threading::PROC_THREAD_ATTRIBUTE_MITIGATION_POLICY as usize,
                Some((policy.as_ref() as *const u64).cast()),
                std::mem::size_of::<u64>(),
                None,
                None,
            ) {
                warn!("UpdateProcThreadAttribute failed - {:#010x}", e.code().0);
                Threading::DeleteProcThreadAttributeList(list);
                return None;
            }

            Some(Self {
                _policy: policy,
                _buf: buf,
                list,
            })
        }
    }

    pub fn list(&self) -> Threading::LPPROC_THREAD_ATTRIBUTE_LIST {
        self.list
    }
}

impl Drop for CodeIntegrityGuard {
    fn drop(&mut self) {
        unsafe { Threading::DeleteProcThreadAttributeList(self.list) };
    }
}
