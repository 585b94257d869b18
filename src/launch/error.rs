//! Dispatch-level errors.

use thiserror::Error;

/// A launch attempt that could not be dispatched.
///
/// Best-effort hardening failures never surface here; they are logged where
/// they happen and the launch proceeds without the feature.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[cfg(windows)]
    #[error("CreateProcess failed: {0}")]
    CreateProcess(#[from] windows::core::Error),

    #[error("process launching is only supported on Windows")]
    Unsupported,
}
