//! # la
//!
//! A command-line launcher that starts one Windows process through one of
//! three OS launch mechanisms, with optional image-load and code-integrity
//! hardening and an optional kill-on-close job.

pub mod args;
pub mod cmdline;
pub mod launch;

pub use args::{ArgsError, LaunchFlags, LaunchRequest, Method};
pub use launch::{LaunchError, dispatch};
