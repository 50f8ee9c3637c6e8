// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX shell argument quoting.
//!
//! Used wherever a value is substituted into a `sh -c` / `su - -c` command
//! string. The quoting law: the quoted form, evaluated by a POSIX shell,
//! yields the original bytes with no interpolation.

/// Quote a single argument for a POSIX shell.
///
/// Wraps in single quotes; each embedded `'` becomes `'\''` (close quote,
/// escaped quote, reopen). The empty string quotes to `''`.
pub fn escape_shell_arg(arg: &str) -> String {
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Join a program and its arguments into one quoted shell command string.
pub fn shell_join<S: AsRef<str>>(parts: &[S]) -> String {
    parts.iter().map(|p| escape_shell_arg(p.as_ref())).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
#[path = "escape_tests.rs"]
mod tests;
