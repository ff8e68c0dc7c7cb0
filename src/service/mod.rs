// src/service/mod.rs

use std::{ffi::OsStr, fmt, process, str::FromStr};
use tracing::debug;

use crate::error::{Error, Result};

pub mod launchd;
pub mod systemd;

pub use launchd::Launchd;
pub use systemd::Systemd;

pub const USAGE: &str = "Usage: lianke install | remove | start | stop | status";

/// The capability set every host service manager adapter provides.
///
/// Each call returns the status line to print on success.
pub trait ServiceController {
    fn install(&self) -> Result<String>;
    fn remove(&self) -> Result<String>;
    fn start(&self) -> Result<String>;
    fn stop(&self) -> Result<String>;
    fn status(&self) -> Result<String>;
}

/// Lifecycle operations reachable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Install,
    Remove,
    Start,
    Stop,
    Status,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Install => "install",
            Action::Remove => "remove",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Status => "status",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "install" => Ok(Action::Install),
            "remove" => Ok(Action::Remove),
            "start" => Ok(Action::Start),
            "stop" => Ok(Action::Stop),
            "status" => Ok(Action::Status),
            other => Err(other.to_string()),
        }
    }
}

/// What the process was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// No arguments: serve in the foreground until signalled.
    Serve,
    Manage(Action),
    /// Unrecognised command; print usage and change nothing.
    Usage(String),
}

impl Command {
    /// Interpret the arguments that follow the program name. Only the first
    /// one is looked at.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match args.into_iter().next() {
            None => Command::Serve,
            Some(arg) => match arg.as_ref().parse::<Action>() {
                Ok(action) => Command::Manage(action),
                Err(other) => Command::Usage(other),
            },
        }
    }
}

pub fn manage(action: Action, controller: &dyn ServiceController) -> Result<String> {
    match action {
        Action::Install => controller.install(),
        Action::Remove => controller.remove(),
        Action::Start => controller.start(),
        Action::Stop => controller.stop(),
        Action::Status => controller.status(),
    }
}

/// Pick the adapter for the service manager of the running system.
pub fn controller_for_host(name: &str, description: &str) -> Result<Box<dyn ServiceController>> {
    if cfg!(target_os = "macos") {
        Ok(Box::new(Launchd::new(name, description)?))
    } else if cfg!(target_os = "linux") {
        Ok(Box::new(Systemd::new(name, description)?))
    } else {
        Err(Error::lifecycle(
            "detect service manager",
            format!("unsupported system: {}", std::env::consts::OS),
        ))
    }
}

/// Run a service-manager tool and return its stdout. A non-zero exit is a
/// lifecycle failure carrying the tool's stderr.
pub(crate) fn exec<S: AsRef<OsStr>>(
    action: &'static str,
    program: impl AsRef<OsStr>,
    args: &[S],
) -> Result<String> {
    let program = program.as_ref();
    let output = spawn(action, program, args)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::lifecycle(
            action,
            format!("{:?} exited with {}: {}", program, output.status, stderr.trim()),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Like [`exec`], but a non-zero exit is `Ok(None)`. Only a tool that cannot
/// be run at all is an error.
pub(crate) fn query_exec<S: AsRef<OsStr>>(
    action: &'static str,
    program: impl AsRef<OsStr>,
    args: &[S],
) -> Result<Option<String>> {
    let output = spawn(action, program.as_ref(), args)?;
    if output.status.success() {
        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    } else {
        Ok(None)
    }
}

fn spawn<S: AsRef<OsStr>>(
    action: &'static str,
    program: &OsStr,
    args: &[S],
) -> Result<process::Output> {
    debug!(program = ?program, action, "running service manager");
    process::Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::lifecycle(action, format!("running {:?}: {}", program, e)))
}

pub(crate) fn ok_line(verb: &str, description: &str) -> String {
    format!("{} {}: [  OK  ]", verb, description)
}
