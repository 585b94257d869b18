// SPDX-License-Identifier: MIT

//! Windows launch strategies.
//!
//! One strategy per launch method; the code-integrity and job helpers are
//! consumed by the direct-creation strategy only.

mod code_integrity;
mod create_process;
mod job;
mod mitigation;
mod shell_automation;
mod shell_execute;

use crate::args::{LaunchRequest, Method};
use crate::launch::LaunchError;

pub(crate) fn dispatch(request: &LaunchRequest) -> Result<(), LaunchError> {
    // Process-wide, so it happens before any strategy runs.
    if request.flags.mitigation_policy {
        mitigation::prefer_system32_images();
    }

    match request.method {
        Method::CreateProcess => create_process::launch(request),
        Method::ShellExecute => {
            shell_execute::launch(request);
            Ok(())
        }
        Method::ShellExecuteByExplorer => {
            shell_automation::launch(request);
            Ok(())
        }
        Method::Uninitialized => unreachable!("validated requests always carry a method"),
    }
}
