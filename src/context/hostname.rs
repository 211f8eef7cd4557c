//! Local host name resolution.
//!
//! Tries, in order:
//! 1. `/etc/hostname`
//! 2. the `hostname` command
//! 3. `HOSTNAME` environment variable
//! 4. `COMPUTERNAME` environment variable (Windows)
//!
//! The first non-empty, trimmed value wins. The operating system is asked
//! first; the variables are inherited and may name another machine.

use std::path::Path;
use std::process::Command;

use tracing::warn;

use crate::env::Env;

const HOSTNAME_FILE: &str = "/etc/hostname";

/// Resolve the local host name, or `None` if every strategy fails.
pub fn local_host_name(env: &Env) -> Option<String> {
    resolve(env, Path::new(HOSTNAME_FILE), true)
}

fn resolve(env: &Env, hostname_file: &Path, query_command: bool) -> Option<String> {
    let resolved = read_hostname_file(hostname_file)
        .or_else(|| query_command.then(run_hostname_command).flatten())
        .or_else(|| env.non_empty("HOSTNAME"))
        .or_else(|| env.non_empty("COMPUTERNAME"));

    if resolved.is_none() {
        warn!("unable to infer local host name; host layer disabled");
    }
    resolved
}

fn read_hostname_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    first_non_empty_line(&content)
}

fn run_hostname_command() -> Option<String> {
    let output = Command::new("hostname").output().ok()?;
    if !output.status.success() {
        return None;
    }
    first_non_empty_line(&String::from_utf8_lossy(&output.stdout))
}

fn first_non_empty_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
