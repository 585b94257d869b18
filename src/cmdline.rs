//! Command-line string assembly.
//!
//! Two joining rules exist: the full command line handed to `CreateProcessW`
//! wraps whitespace-bearing tokens in double quotes, while the parameter
//! string for the shell-execute paths is joined bare.  Nothing beyond the
//! quote-on-space rule is applied; callers wanting the full Windows argument
//! grammar must pre-quote their tokens.

use std::ffi::{OsStr, OsString};

/// Join the argument tokens (everything after the executable) with single
/// spaces, no quoting.  `ShellExecuteExW` and the shell automation object
/// take their parameter string in this form.
pub fn join_params(arguments: &[OsString]) -> OsString {
    let mut out = OsString::new();
    for (i, arg) in arguments.iter().enumerate() {
        if i > 0 {
            out.push(" ");
        }
        out.push(arg);
    }
    out
}

/// Join all command tokens into the single command-line string passed to
/// `CreateProcessW`, wrapping any token that contains a space in double
/// quotes.
pub fn join_command(tokens: &[OsString]) -> OsString {
    let mut out = OsString::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(" ");
        }
        if contains_space(token) {
            out.push("\"");
            out.push(token);
            out.push("\"");
        } else {
            out.push(token);
        }
    }
    out
}

fn contains_space(token: &OsStr) -> bool {
    token.as_encoded_bytes().contains(&b' ')
}

/// Convert an OS string into a NUL-terminated wide (16-bit) C string.
#[cfg(windows)]
pub fn to_wide_nul(s: &OsStr) -> Vec<u16> {
    use std::os::windows::ffi::OsStrExt;
    s.encode_wide().chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    fn toks(raw: &[&str]) -> Vec<OsString> {
        raw.iter().map(OsString::from).collect()
    }

    #[test]
    fn quotes_only_tokens_containing_spaces() {
        let joined = join_command(&toks(&["cmd", "a b", "c"]));
        assert_eq!(joined, OsString::from("cmd \"a b\" c"));
    }

    #[test]
    fn single_token_passes_through() {
        assert_eq!(join_command(&toks(&["cmd.exe"])), OsString::from("cmd.exe"));
    }

    #[test]
    fn executable_with_space_is_quoted() {
        let joined = join_command(&toks(&["C:\\Program Files\\tool.exe", "run"]));
        assert_eq!(
            joined,
            OsString::from("\"C:\\Program Files\\tool.exe\" run")
        );
    }

    #[test]
    fn parameter_string_is_never_quoted() {
        assert_eq!(join_params(&toks(&["a b", "c"])), OsString::from("a b c"));
    }

    #[test]
    fn empty_argument_list_joins_to_nothing() {
        assert_eq!(join_params(&[]), OsString::new());
    }

    #[test]
    fn joining_is_idempotent() {
        let raw = toks(&["cmd", "a b", "c"]);
        assert_eq!(join_command(&raw), join_command(&raw));
    }
}
