//! Command line splitting and detached process spawning

use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::error::{Error, Result};

/// A command that was started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spawned {
    /// OS process id of the child
    pub pid:     u32,
    /// Program that was started
    pub program: String,
}

/// Split a command line into words using POSIX shell rules
///
/// # Errors
/// Returns error if the line holds no words or has unbalanced quotes.
pub fn split_command(cmdline: &str) -> Result<Vec<String>> {
    if cmdline.trim().is_empty() {
        return Err(Error::EmptyCommand);
    }
    let words = shlex::split(cmdline).ok_or_else(|| Error::split("unbalanced quotes"))?;
    if words.is_empty() {
        return Err(Error::EmptyCommand);
    }
    Ok(words)
}

/// Quote a single word so it splits back into itself
///
/// # Errors
/// Returns error if the word contains a NUL character.
pub fn quote(word: &str) -> Result<String> {
    shlex::try_quote(word)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| Error::split(&e.to_string()))
}

/// Start `cmdline` as a detached process
///
/// The child gets null stdio and, on unix, its own process group. It is not
/// waited on.
///
/// # Errors
/// Returns error if the line cannot be split or the program cannot be started.
pub fn spawn(cmdline: &str) -> Result<Spawned> {
    let words = split_command(cmdline)?;
    let (program, args) = words.split_first().ok_or(Error::EmptyCommand)?;

    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    detach(&mut command);

    match command.spawn() {
        Ok(child) => {
            let pid = child.id();
            info!(program = %program, pid, "launched");
            Ok(Spawned { pid, program: program.clone() })
        },
        Err(e) => {
            warn!(program = %program, error = %e, "launch failed");
            Err(Error::spawn(program, e))
        },
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}
