// SPDX-License-Identifier: MIT

//! Launch through Explorer's shell automation object.
//!
//! Explorer runs at the regular desktop integrity level, so a launch it
//! performs on our behalf lands under its process tree instead of ours.
//! Every step of the chain down to `IShellDispatch2` is best-effort: the
//! first failure is logged and the launch is abandoned.

use core::ffi::c_void;

use log::{info, warn};
use windows::Win32::{
    System::Com,
    UI::{Shell, WindowsAndMessaging::SW_SHOWNORMAL},
};
use windows::core::{BSTR, Interface, VARIANT};

use crate::args::LaunchRequest;
use crate::cmdline;

pub fn launch(request: &LaunchRequest) {
    unsafe {
        let hr = Com::CoInitialize(None);
        if hr.is_ok() {
            execute_via_desktop(request);
        } else {
            warn!("CoInitialize failed - {:#010x}", hr.0);
        }
        // Teardown is unconditional, matching the initialization call above.
        Com::CoUninitialize();
    }
}

fn execute_via_desktop(request: &LaunchRequest) {
    unsafe {
        // NB: Explorer may be a local server, not an inproc server.
        let shell_windows: Shell::IShellWindows = match Com::CoCreateInstance(
            &Shell::ShellWindows,
            None,
            Com::CLSCTX_INPROC_SERVER | Com::CLSCTX_LOCAL_SERVER,
        ) {
            Ok(v) => v,
            Err(e) => {
                warn!("CoCreateInstance(ShellWindows) failed - {:#010x}", e.code().0);
                return;
            }
        };

        // 1. Find the shell view for the desktop.  An S_FALSE "not found"
        // comes back through the bindings as a null-dispatch error; either
        // way there is no desktop window to talk to.
        let desktop = VARIANT::from(Shell::CSIDL_DESKTOP as i32);
        let empty = VARIANT::default();
        let mut hwnd = 0i32;
        let disp_desktop = match shell_windows.FindWindowSW(
            &desktop,
            &empty,
            Shell::SWC_DESKTOP.0,
            &mut hwnd,
            Shell::SWFO_NEEDDISPATCH.0,
        ) {
            Ok(v) => v,
            Err(e) => {
                warn!("IShellWindows::FindWindowSW failed - {:#010x}", e.code().0);
                return;
            }
        };

        let provider: Com::IServiceProvider = match disp_desktop.cast() {
            Ok(v) => v,
            Err(e) => {
                warn!("QueryInterface(IServiceProvider) failed - {:#010x}", e.code().0);
                return;
            }
        };

        let mut browser_raw: *mut c_void = core::ptr::null_mut();
        if let Err(e) = provider.QueryService(
            &Shell::SID_STopLevelBrowser,
            &Shell::IShellBrowser::IID,
            &mut browser_raw,
        ) {
            warn!("IServiceProvider::QueryService failed - {:#010x}", e.code().0);
            return;
        }
        let browser = Shell::IShellBrowser::from_raw(browser_raw);

        let view = match browser.QueryActiveShellView() {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    "IShellBrowser::QueryActiveShellView failed - {:#010x}",
                    e.code().0
                );
                return;
            }
        };

        // 2. Get the automation object for the desktop background.
        let mut view_raw: *mut c_void = core::ptr::null_mut();
        if let Err(e) = view.GetItemObject(
            Shell::SVGIO_BACKGROUND.0 as u32,
            &Com::IDispatch::IID,
            &mut view_raw,
        ) {
            warn!("IShellView::GetItemObject failed - {:#010x}", e.code().0);
            return;
        }
        let disp_view = Com::IDispatch::from_raw(view_raw);

        let folder_view: Shell::IShellFolderViewDual = match disp_view.cast() {
            Ok(v) => v,
            Err(e) => {
                warn!("QueryInterface(IShellFolderViewDual) failed - {:#010x}", e.code().0);
                return;
            }
        };

        // 3. Walk up to the IShellDispatch2 application object.
        let disp_shell = match folder_view.Application() {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    "IShellFolderViewDual::get_Application failed - {:#010x}",
                    e.code().0
                );
                return;
            }
        };
        let shell: Shell::IShellDispatch2 = match disp_shell.cast() {
            Ok(v) => v,
            Err(e) => {
                warn!("QueryInterface(IShellDispatch2) failed - {:#010x}", e.code().0);
                return;
            }
        };

        // Pass the foreground privilege along so the shell can put the new
        // process in front.  Not fatal when refused.
        if let Err(e) = Com::CoAllowSetForegroundWindow(&shell, None) {
            warn!("CoAllowSetForegroundWindow failed - {:#010x}", e.code().0);
        }

        // 4. Ask Explorer to execute with default verb and working directory.
        let file = BSTR::from(request.executable().to_string_lossy().as_ref());
        let params = cmdline::join_params(request.arguments());
        let params = VARIANT::from(params.to_string_lossy().as_ref());
        let default = VARIANT::default();
        let show = VARIANT::from(SW_SHOWNORMAL.0);

        match shell.ShellExecute(&file, &params, &default, &default, &show) {
            Ok(()) => info!("IShellDispatch2::ShellExecute succeeded"),
            Err(e) => warn!(
                "IShellDispatch2::ShellExecute returned - {:#010x}",
                e.code().0
            ),
        }
    }
}
