//! Command-line argument validation.
//!
//! Raw tokens either become a [`LaunchRequest`] or a typed [`ArgsError`];
//! there is no partially-valid state in between.  Everything after the `-c`
//! separator is command material and is captured verbatim, so a token that
//! happens to look like a selector is still just an argument there.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::Write;

use thiserror::Error;

/// Which OS mechanism performs the launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    /// Parser starting state; never present in a completed request.
    #[default]
    Uninitialized,
    /// Launch as a direct child via `CreateProcessW`.
    CreateProcess,
    /// Launch through the registered-handler primitive `ShellExecuteExW`.
    ShellExecute,
    /// Ask Explorer's automation object to perform the launch on our behalf.
    ShellExecuteByExplorer,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Uninitialized => "(uninitialized)",
            Method::CreateProcess => "CreateProcess",
            Method::ShellExecute => "ShellExecute",
            Method::ShellExecuteByExplorer => "ShellExecuteByExplorer",
        })
    }
}

/// Independent launch options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchFlags {
    /// Return as soon as the OS accepts the request instead of waiting.
    pub asynchronous: bool,
    /// Turn on the PreferSystem32Images image-load policy before launching.
    pub mitigation_policy: bool,
    /// Attach the block-non-Microsoft-binaries mitigation to the new process.
    pub code_integrity_guard: bool,
    /// Confine the new process to a kill-on-close job object.
    pub job: bool,
}

/// A validated, immutable launch description.
///
/// A value of this type always holds a non-empty command, a concrete method,
/// and a flag combination the dispatcher accepts; rejected input never
/// produces one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub method: Method,
    pub flags: LaunchFlags,
    command: Vec<OsString>,
}

impl LaunchRequest {
    /// The executable path or name (the first command token).
    pub fn executable(&self) -> &OsStr {
        &self.command[0]
    }

    /// The argument tokens following the executable.
    pub fn arguments(&self) -> &[OsString] {
        &self.command[1..]
    }

    /// All command tokens, executable first.
    pub fn command(&self) -> &[OsString] {
        &self.command
    }
}

/// Why a token sequence was rejected.
///
/// The rendered messages are exactly what the usage sink receives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgsError {
    #[error("the parameter --api needs a value")]
    MethodNeedsValue,
    #[error("unknown method: `{0}`")]
    UnknownMethod(String),
    #[error("invalid argument: `{0}`")]
    InvalidArgument(String),
    #[error("specify a command following the `-c` option")]
    CommandMissing,
    #[error("specify a launch method with --api")]
    MethodMissing,
    #[error("CreateProcess must be synchronous")]
    SynchronousOnly,
    #[error("ShellExecuteByExplorer must be asynchronous")]
    AsynchronousOnly,
    #[error("job works with CreateProcess only")]
    JobRequiresCreateProcess,
}

/// Option summary rendered beneath a rejection message.
const USAGE: &str = "\
Usage: la [OPTION]... -c [COMMAND]...

  --api=[cp|se|shell]   choose a method to launch a process: CreateProcess,
                        ShellExecute, or IShellDispatch2.ShellExecute
  --async               launch a process asynchronously
  --policy              turn on PreferSystem32Images before launching a process
  --cig                 launch a process with CIG
  --job                 launch a process with job
";

/// Validate raw tokens (program name excluded) into a launch request.
///
/// Parsing is pure: the same token sequence always yields the same result.
/// The first error wins and stops the scan; cross-field rules apply only
/// once every token has been consumed.
pub fn parse_tokens(tokens: &[OsString]) -> Result<LaunchRequest, ArgsError> {
    let mut method = Method::default();
    let mut flags = LaunchFlags::default();
    let mut command: Vec<OsString> = Vec::new();
    let mut past_separator = false;

    for token in tokens {
        if past_separator {
            command.push(token.clone());
            continue;
        }
        match token.to_str() {
            Some("-c") => past_separator = true,
            Some("--async") => flags.asynchronous = true,
            Some("--policy") => flags.mitigation_policy = true,
            Some("--cig") => flags.code_integrity_guard = true,
            Some("--job") => flags.job = true,
            Some("--api") => return Err(ArgsError::MethodNeedsValue),
            Some(text) if text.starts_with("--api=") => {
                method = match &text["--api=".len()..] {
                    "cp" => Method::CreateProcess,
                    "se" => Method::ShellExecute,
                    "shell" => Method::ShellExecuteByExplorer,
                    other => return Err(ArgsError::UnknownMethod(other.to_string())),
                };
            }
            // Anything else before the separator, non-unicode tokens included.
            _ => {
                return Err(ArgsError::InvalidArgument(
                    token.to_string_lossy().into_owned(),
                ));
            }
        }
    }

    if command.is_empty() {
        return Err(ArgsError::CommandMissing);
    }
    if method == Method::Uninitialized {
        return Err(ArgsError::MethodMissing);
    }
    if method == Method::CreateProcess && flags.asynchronous {
        return Err(ArgsError::SynchronousOnly);
    }
    if method == Method::ShellExecuteByExplorer && !flags.asynchronous {
        return Err(ArgsError::AsynchronousOnly);
    }
    if method != Method::CreateProcess && flags.job {
        return Err(ArgsError::JobRequiresCreateProcess);
    }

    Ok(LaunchRequest {
        method,
        flags,
        command,
    })
}

/// Validate tokens, rendering the rejection message and usage text into
/// `usage` when validation fails.  Nothing is written on success.
pub fn parse_or_usage(
    tokens: &[OsString],
    usage: &mut dyn Write,
) -> Result<LaunchRequest, ArgsError> {
    parse_tokens(tokens).inspect_err(|e| {
        // The sink is stdout in practice; a failed write has nowhere to go.
        let _ = writeln!(usage, "{e}\n\n{USAGE}");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{OsStr, OsString};

    fn toks(raw: &[&str]) -> Vec<OsString> {
        raw.iter().map(OsString::from).collect()
    }

    #[test]
    fn automation_request_with_all_flags() {
        let request = parse_tokens(&toks(&[
            "--cig",
            "--api=shell",
            "--async",
            "--policy",
            "-c",
            "--api=command",
            "arg1",
            "arg2",
        ]))
        .unwrap();
        assert_eq!(request.method, Method::ShellExecuteByExplorer);
        assert!(request.flags.asynchronous);
        assert!(request.flags.code_integrity_guard);
        assert!(request.flags.mitigation_policy);
        assert!(!request.flags.job);
        // Everything after -c is command material, selector lookalikes included.
        assert_eq!(request.executable(), OsStr::new("--api=command"));
        assert_eq!(
            request.arguments(),
            [OsString::from("arg1"), OsString::from("arg2")]
        );
    }

    #[test]
    fn create_process_request_without_arguments() {
        let request = parse_tokens(&toks(&["--api=cp", "--policy", "-c", "cmd"])).unwrap();
        assert_eq!(request.method, Method::CreateProcess);
        assert!(!request.flags.asynchronous);
        assert!(!request.flags.code_integrity_guard);
        assert_eq!(request.executable(), OsStr::new("cmd"));
        assert!(request.arguments().is_empty());
    }

    #[test]
    fn empty_token_list_needs_a_command() {
        assert_eq!(parse_tokens(&[]), Err(ArgsError::CommandMissing));
    }

    #[test]
    fn missing_separator_needs_a_command() {
        assert_eq!(
            parse_tokens(&toks(&["--cig", "--api=shell", "--async", "--policy"])),
            Err(ArgsError::CommandMissing)
        );
    }

    #[test]
    fn separator_with_nothing_after_it() {
        assert_eq!(
            parse_tokens(&toks(&["--api=cp", "-c"])),
            Err(ArgsError::CommandMissing)
        );
    }

    #[test]
    fn unknown_method_echoes_the_value() {
        let err = parse_tokens(&toks(&["--api=invalid", "-c", "cmd", "x"]));
        assert_eq!(err, Err(ArgsError::UnknownMethod("invalid".to_string())));
        assert_eq!(
            err.unwrap_err().to_string(),
            "unknown method: `invalid`"
        );
    }

    #[test]
    fn bare_api_needs_a_value() {
        assert_eq!(
            parse_tokens(&toks(&["--api", "-c", "cmd"])),
            Err(ArgsError::MethodNeedsValue)
        );
    }

    #[test]
    fn api_without_equals_is_an_invalid_argument() {
        assert_eq!(
            parse_tokens(&toks(&["--apix", "-c", "cmd"])),
            Err(ArgsError::InvalidArgument("--apix".to_string()))
        );
    }

    #[test]
    fn unrecognized_token_echoes_verbatim() {
        assert_eq!(
            parse_tokens(&toks(&["--api=cp", "--?", "-c", "cmd"])),
            Err(ArgsError::InvalidArgument("--?".to_string()))
        );
    }

    #[test]
    fn first_error_wins() {
        // The unknown method is reached before the invalid token.
        assert_eq!(
            parse_tokens(&toks(&["--api=invalid", "--?", "-c", "cmd"])),
            Err(ArgsError::UnknownMethod("invalid".to_string()))
        );
    }

    #[test]
    fn method_is_required() {
        assert_eq!(
            parse_tokens(&toks(&["-c", "cmd"])),
            Err(ArgsError::MethodMissing)
        );
    }

    #[test]
    fn create_process_rejects_async() {
        assert_eq!(
            parse_tokens(&toks(&["--api=cp", "--async", "-c", "cmd"])),
            Err(ArgsError::SynchronousOnly)
        );
    }

    #[test]
    fn explorer_requires_async() {
        assert_eq!(
            parse_tokens(&toks(&["--api=shell", "-c", "cmd"])),
            Err(ArgsError::AsynchronousOnly)
        );
    }

    #[test]
    fn job_requires_create_process() {
        assert_eq!(
            parse_tokens(&toks(&["--api=se", "--job", "-c", "cmd"])),
            Err(ArgsError::JobRequiresCreateProcess)
        );
        assert_eq!(
            parse_tokens(&toks(&["--api=shell", "--async", "--job", "-c", "cmd"])),
            Err(ArgsError::JobRequiresCreateProcess)
        );
        assert!(parse_tokens(&toks(&["--api=cp", "--job", "-c", "cmd"])).is_ok());
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = toks(&["--cig", "--api=shell", "--async", "-c", "cmd", "a", "b"]);
        assert_eq!(parse_tokens(&raw), parse_tokens(&raw));
    }

    #[test]
    fn usage_sink_sees_rejections_only() {
        let mut sink = Vec::new();
        parse_or_usage(&toks(&["--api=cp", "-c", "cmd"]), &mut sink).unwrap();
        assert!(sink.is_empty());

        let err = parse_or_usage(&toks(&["--api=bogus", "-c", "cmd"]), &mut sink);
        assert!(err.is_err());
        let text = String::from_utf8(sink).unwrap();
        assert!(text.contains("unknown method: `bogus`"));
        assert!(text.contains("Usage: la"));
    }
}
