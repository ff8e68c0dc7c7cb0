// src/service/systemd.rs

use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

use super::{exec, ok_line, ServiceController};
use crate::error::{Error, Result};

const UNIT_DIR: &str = "/etc/systemd/system";

/// Service controller backed by a systemd unit file.
#[derive(Debug, Clone)]
pub struct Systemd {
    name: String,
    description: String,
    executable: PathBuf,
    unit_dir: PathBuf,
    systemctl: PathBuf,
}

/// The bits of `systemctl show` the controller cares about.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct UnitState {
    pub active: bool,
    pub pid: u32,
}

impl Systemd {
    /// Controller for the currently running executable.
    pub fn new(name: &str, description: &str) -> Result<Self> {
        let executable =
            env::current_exe().map_err(|e| Error::lifecycle("locate executable", e))?;
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            executable,
            unit_dir: PathBuf::from(UNIT_DIR),
            systemctl: PathBuf::from("systemctl"),
        })
    }

    pub fn with_unit_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = dir.into();
        self
    }

    pub fn with_systemctl(mut self, program: impl Into<PathBuf>) -> Self {
        self.systemctl = program.into();
        self
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = path.into();
        self
    }

    fn unit_name(&self) -> String {
        format!("{}.service", self.name)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.unit_name())
    }

    pub fn is_installed(&self) -> bool {
        self.unit_path().exists()
    }

    fn render_unit(&self) -> String {
        format!(
            "[Unit]\n\
             Description={description}\n\
             Requires=network.target\n\
             After=network.target\n\
             \n\
             [Service]\n\
             ExecStart={exec}\n\
             Restart=on-failure\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            description = self.description,
            exec = self.executable.display(),
        )
    }

    fn systemctl(&self, action: &'static str, args: &[&str]) -> Result<String> {
        exec(action, &self.systemctl, args)
    }

    fn unit_state(&self, action: &'static str) -> Result<UnitState> {
        let out = self.systemctl(
            action,
            &["show", &self.unit_name(), "--property=ActiveState,MainPID"],
        )?;
        Ok(parse_show(&out))
    }

    fn require_installed(&self, action: &'static str) -> Result<()> {
        if self.is_installed() {
            Ok(())
        } else {
            Err(Error::lifecycle(action, "service is not installed"))
        }
    }
}

impl ServiceController for Systemd {
    fn install(&self) -> Result<String> {
        let action = "install";
        if self.is_installed() {
            return Err(Error::lifecycle(action, "service has already been installed"));
        }

        let path = self.unit_path();
        write_file(action, &path, &self.render_unit())?;
        info!(unit = %path.display(), "wrote unit file");

        self.systemctl(action, &["daemon-reload"])?;
        self.systemctl(action, &["enable", &self.unit_name()])?;
        Ok(ok_line("Install", &self.description))
    }

    fn remove(&self) -> Result<String> {
        let action = "remove";
        self.require_installed(action)?;

        self.systemctl(action, &["disable", &self.unit_name()])?;
        let path = self.unit_path();
        fs::remove_file(&path)
            .map_err(|e| Error::lifecycle(action, format!("{}: {}", path.display(), e)))?;
        info!(unit = %path.display(), "removed unit file");
        Ok(ok_line("Removing", &self.description))
    }

    fn start(&self) -> Result<String> {
        let action = "start";
        self.require_installed(action)?;
        if self.unit_state(action)?.active {
            return Err(Error::lifecycle(action, "service is already running"));
        }

        self.systemctl(action, &["start", &self.unit_name()])?;
        Ok(ok_line("Starting", &self.description))
    }

    fn stop(&self) -> Result<String> {
        let action = "stop";
        self.require_installed(action)?;
        if !self.unit_state(action)?.active {
            return Err(Error::lifecycle(action, "service has already been stopped"));
        }

        self.systemctl(action, &["stop", &self.unit_name()])?;
        Ok(ok_line("Stopping", &self.description))
    }

    fn status(&self) -> Result<String> {
        let action = "status";
        self.require_installed(action)?;

        let state = self.unit_state(action)?;
        if state.active {
            Ok(format!("Service (pid {}) is running...", state.pid))
        } else {
            Ok("Service is stopped".to_string())
        }
    }
}

pub(crate) fn parse_show(text: &str) -> UnitState {
    let mut state = UnitState::default();
    for line in text.lines() {
        if let Some(v) = line.strip_prefix("ActiveState=") {
            state.active = v.trim() == "active";
        } else if let Some(v) = line.strip_prefix("MainPID=") {
            state.pid = v.trim().parse().unwrap_or(0);
        }
    }
    state
}

pub(crate) fn write_file(action: &'static str, path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| Error::lifecycle(action, format!("{}: {}", parent.display(), e)))?;
    }
    fs::write(path, contents)
        .map_err(|e| Error::lifecycle(action, format!("{}: {}", path.display(), e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn controller(dir: &Path, systemctl: &str) -> Systemd {
        Systemd::new("lianke", "lianke market trade data")
            .unwrap()
            .with_unit_dir(dir)
            .with_systemctl(systemctl)
            .with_executable("/usr/local/bin/lianke")
    }

    #[test]
    fn test_install_writes_unit_once() {
        let tmp = tempdir().unwrap();
        let ctl = controller(tmp.path(), "true");

        let msg = ctl.install().unwrap();
        assert_eq!(msg, "Install lianke market trade data: [  OK  ]");

        let unit = fs::read_to_string(tmp.path().join("lianke.service")).unwrap();
        assert!(unit.contains("Description=lianke market trade data\n"));
        assert!(unit.contains("ExecStart=/usr/local/bin/lianke\n"));
        assert!(unit.contains("WantedBy=multi-user.target"));

        let err = ctl.install().unwrap_err();
        assert!(err.to_string().contains("already been installed"));
    }

    #[test]
    fn test_remove_requires_install() {
        let tmp = tempdir().unwrap();
        let ctl = controller(tmp.path(), "true");

        assert!(ctl.remove().is_err());
        ctl.install().unwrap();
        assert_eq!(ctl.remove().unwrap(), "Removing lianke market trade data: [  OK  ]");
        assert!(!ctl.is_installed());
    }

    #[test]
    fn test_start_stop_status_follow_unit_state() {
        let tmp = tempdir().unwrap();
        let ctl = controller(tmp.path(), "true");

        assert!(ctl.status().is_err());
        assert!(ctl.start().is_err());

        ctl.install().unwrap();
        // `true` prints nothing, so the unit always looks inactive
        assert_eq!(ctl.status().unwrap(), "Service is stopped");
        assert_eq!(ctl.start().unwrap(), "Starting lianke market trade data: [  OK  ]");
        let err = ctl.stop().unwrap_err();
        assert!(err.to_string().contains("already been stopped"));
    }

    #[test]
    fn test_systemctl_failure_is_lifecycle_error() {
        let tmp = tempdir().unwrap();
        let ctl = controller(tmp.path(), "false");

        let err = ctl.install().unwrap_err();
        assert!(matches!(err, Error::LifecycleFailed { action: "install", .. }));
    }

    #[test]
    fn test_parse_show() {
        let running = parse_show("ActiveState=active\nMainPID=4242\n");
        assert_eq!(
            running,
            UnitState {
                active: true,
                pid: 4242
            }
        );

        let stopped = parse_show("MainPID=0\nActiveState=inactive\n");
        assert!(!stopped.active);
        assert_eq!(parse_show(""), UnitState::default());
    }
}
