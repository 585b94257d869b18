// SPDX-License-Identifier: MIT

//! Process-wide image-load mitigation.

use std::mem;

use log::warn;
use windows::Win32::System::Threading;

// PreferSystem32Images bit of PROCESS_MITIGATION_IMAGE_LOAD_POLICY.
const PREFER_SYSTEM32_IMAGES: u32 = 1 << 2;

/// Prefer the System32 copy of an image when the loader resolves one by name.
/// Set on the current process ahead of the launch so the child starts under
/// it.  Failure is logged and the launch continues unhardened.
pub fn prefer_system32_images() {
    unsafe {
        let mut policy: Threading::PROCESS_MITIGATION_IMAGE_LOAD_POLICY = mem::zeroed();
        policy.Anonymous.Flags = PREFER_SYSTEM32_IMAGES;
        if let Err(e) = Threading::SetProcessMitigationPolicy(
            Threading::ProcessImageLoadPolicy,
            (&policy as *const Threading::PROCESS_MITIGATION_IMAGE_LOAD_POLICY).cast(),
            mem::size_of::<Threading::PROCESS_MITIGATION_IMAGE_LOAD_POLICY>(),
        ) {
            warn!("SetProcessMitigationPolicy failed - {:#010x}", e.code().0);
        }
    }
}
