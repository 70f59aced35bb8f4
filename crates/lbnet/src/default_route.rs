//! Outgoing interface of the default route.
//!
//! Read from the `ip route` listing rather than netlink so the answer
//! matches what an operator sees on the host.

use std::env;
use std::io::{self, Read};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Output of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited with status zero.
    pub success: bool,
    /// Exit code, `None` if killed by a signal.
    pub code: Option<i32>,
    /// stdout and stderr interleaved in the order they were written.
    pub output: String,
}

/// Process-execution collaborator.
pub trait CommandRunner {
    /// Locate an executable. Names containing `/` are checked as given.
    fn look_path(&self, name: &str) -> io::Result<PathBuf>;

    /// Run `path` with `args` and capture both output streams.
    fn combined_output(&self, path: &Path, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runs commands on the host, searching `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

impl CommandRunner for SystemCommandRunner {
    fn look_path(&self, name: &str) -> io::Result<PathBuf> {
        let not_found =
            || io::Error::new(io::ErrorKind::NotFound, format!("executable file not found: {name}"));

        if name.contains('/') {
            let path = PathBuf::from(name);
            return if is_executable(&path) {
                Ok(path)
            } else {
                Err(not_found())
            };
        }

        let search = env::var_os("PATH").ok_or_else(not_found)?;
        env::split_paths(&search)
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
            .ok_or_else(not_found)
    }

    /// Both streams share one pipe, so the output keeps the order the
    /// command wrote it in.
    fn combined_output(&self, path: &Path, args: &[&str]) -> io::Result<CommandOutput> {
        let (mut reader, writer) = io::pipe()?;
        let mut command = Command::new(path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        let mut child = command.spawn()?;
        // The builder holds write ends; reading to EOF needs them closed.
        drop(command);

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw)?;
        let status = child.wait()?;

        Ok(CommandOutput {
            success: status.success(),
            code: status.code(),
            output: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

/// Extract the device of the first `default via` line of an `ip route`
/// listing.
pub fn parse_default_interface(listing: &str) -> Result<String> {
    let line = listing
        .lines()
        .find(|line| line.starts_with("default via"))
        .ok_or(Error::DefaultRouteNotFound)?;

    // default via <gw> dev <iface> ...
    line.split(' ')
        .nth(4)
        .map(str::to_owned)
        .ok_or_else(|| Error::UnparseableRoute {
            line: line.to_owned(),
        })
}

/// Finds the interface carrying the default route.
pub struct DefaultRouteInspector<'a, C> {
    runner: &'a C,
    command: &'a str,
}

impl<'a, C: CommandRunner> DefaultRouteInspector<'a, C> {
    /// `command` is the name of the `ip` binary, usually just `"ip"`.
    pub fn new(runner: &'a C, command: &'a str) -> Self {
        Self { runner, command }
    }

    pub fn get_default_interface(&self) -> Result<String> {
        let path = self
            .runner
            .look_path(self.command)
            .map_err(|source| Error::CommandUnavailable {
                command: self.command.to_owned(),
                source,
            })?;

        tracing::debug!(command = %path.display(), "listing routes");
        let result = self
            .runner
            .combined_output(&path, &["route"])
            .map_err(|e| Error::CommandFailed {
                command: format!("{} route", self.command),
                reason: e.to_string(),
                output: String::new(),
            })?;

        if !result.success {
            let reason = match result.code {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_owned(),
            };
            return Err(Error::CommandFailed {
                command: format!("{} route", self.command),
                reason,
                output: result.output,
            });
        }

        parse_default_interface(&result.output)
    }
}
