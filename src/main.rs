//! CLI entry point: collect tokens, validate, dispatch, map to exit codes.

use std::env;
use std::ffi::OsString;
use std::io;
use std::process::ExitCode;

use log::error;

use la::{args, launch};

fn main() -> ExitCode {
    env_logger::init();

    let tokens: Vec<OsString> = env::args_os().skip(1).collect();
    let request = match args::parse_or_usage(&tokens, &mut io::stdout()) {
        Ok(request) => request,
        Err(_) => return ExitCode::FAILURE,
    };

    match launch::dispatch(&request) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
