// SPDX-License-Identifier: MIT

//! Registered-handler execution via `ShellExecuteExW`.

use std::mem;

use log::{info, warn};
use windows::Win32::UI::{Shell, WindowsAndMessaging::SW_SHOWNORMAL};
use windows::core::PCWSTR;

use crate::args::LaunchRequest;
use crate::cmdline;

/// Hand the launch to the registered handler for the target.
///
/// The asynchronous form returns as soon as the shell accepts the request;
/// the synchronous form suppresses UI and blocks only as long as the call
/// itself does.  Failure is logged with the OS error code; there is nothing
/// to degrade to.
pub fn launch(request: &LaunchRequest) {
    let file = cmdline::to_wide_nul(request.executable());
    let params = cmdline::to_wide_nul(&cmdline::join_params(request.arguments()));

    let mut exec_info: Shell::SHELLEXECUTEINFOW = unsafe { mem::zeroed() };
    exec_info.cbSize = mem::size_of::<Shell::SHELLEXECUTEINFOW>() as u32;
    exec_info.fMask = if request.flags.asynchronous {
        Shell::SEE_MASK_ASYNCOK
    } else {
        Shell::SEE_MASK_NOASYNC | Shell::SEE_MASK_FLAG_NO_UI
    };
    exec_info.lpFile = PCWSTR(file.as_ptr());
    exec_info.lpParameters = PCWSTR(params.as_ptr());
    exec_info.nShow = SW_SHOWNORMAL.0;

    match unsafe { Shell::ShellExecuteExW(&mut exec_info) } {
        Ok(()) => info!(
            "ShellExecuteExW succeeded, hInstApp={:?}",
            exec_info.hInstApp
        ),
        Err(e) => warn!("ShellExecuteExW failed - {:#010x}", e.code().0),
    }
}
