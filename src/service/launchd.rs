// src/service/launchd.rs

use std::{env, fs, path::PathBuf};
use tracing::info;

use super::systemd::write_file;
use super::{exec, ok_line, query_exec, ServiceController};
use crate::error::{Error, Result};

const DAEMON_DIR: &str = "/Library/LaunchDaemons";
const LOG_DIR: &str = "/usr/local/var/log";

/// Service controller backed by a launchd property list.
#[derive(Debug, Clone)]
pub struct Launchd {
    name: String,
    description: String,
    executable: PathBuf,
    plist_dir: PathBuf,
    launchctl: PathBuf,
}

impl Launchd {
    pub fn new(name: &str, description: &str) -> Result<Self> {
        let executable =
            env::current_exe().map_err(|e| Error::lifecycle("locate executable", e))?;
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            executable,
            plist_dir: PathBuf::from(DAEMON_DIR),
            launchctl: PathBuf::from("launchctl"),
        })
    }

    pub fn with_plist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.plist_dir = dir.into();
        self
    }

    pub fn with_launchctl(mut self, program: impl Into<PathBuf>) -> Self {
        self.launchctl = program.into();
        self
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = path.into();
        self
    }

    pub fn plist_path(&self) -> PathBuf {
        self.plist_dir.join(format!("{}.plist", self.name))
    }

    pub fn is_installed(&self) -> bool {
        self.plist_path().exists()
    }

    fn render_plist(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
	<key>Label</key>
	<string>{name}</string>
	<key>ProgramArguments</key>
	<array>
		<string>{exec}</string>
	</array>
	<key>KeepAlive</key>
	<true/>
	<key>RunAtLoad</key>
	<true/>
	<key>StandardOutPath</key>
	<string>{logs}/{name}.log</string>
	<key>StandardErrorPath</key>
	<string>{logs}/{name}.err</string>
</dict>
</plist>
"#,
            name = xml_escape(&self.name),
            exec = xml_escape(&self.executable.display().to_string()),
            logs = LOG_DIR,
        )
    }

    /// PID of the loaded job, if launchd reports one.
    fn running_pid(&self, action: &'static str) -> Result<Option<u32>> {
        // `launchctl list <label>` exits non-zero when the job is not loaded
        let out = query_exec(action, &self.launchctl, &["list", self.name.as_str()])?;
        Ok(out.as_deref().and_then(parse_list_pid))
    }

    fn require_installed(&self, action: &'static str) -> Result<()> {
        if self.is_installed() {
            Ok(())
        } else {
            Err(Error::lifecycle(action, "service is not installed"))
        }
    }
}

impl ServiceController for Launchd {
    fn install(&self) -> Result<String> {
        let action = "install";
        if self.is_installed() {
            return Err(Error::lifecycle(action, "service has already been installed"));
        }

        let path = self.plist_path();
        write_file(action, &path, &self.render_plist())?;
        info!(plist = %path.display(), "wrote launchd plist");
        Ok(ok_line("Install", &self.description))
    }

    fn remove(&self) -> Result<String> {
        let action = "remove";
        self.require_installed(action)?;

        let path = self.plist_path();
        if self.running_pid(action)?.is_some() {
            exec(action, &self.launchctl, &[PathBuf::from("unload"), path.clone()])?;
        }
        fs::remove_file(&path)
            .map_err(|e| Error::lifecycle(action, format!("{}: {}", path.display(), e)))?;
        info!(plist = %path.display(), "removed launchd plist");
        Ok(ok_line("Removing", &self.description))
    }

    fn start(&self) -> Result<String> {
        let action = "start";
        self.require_installed(action)?;
        if self.running_pid(action)?.is_some() {
            return Err(Error::lifecycle(action, "service is already running"));
        }

        exec(action, &self.launchctl, &[PathBuf::from("load"), self.plist_path()])?;
        Ok(ok_line("Starting", &self.description))
    }

    fn stop(&self) -> Result<String> {
        let action = "stop";
        self.require_installed(action)?;
        if self.running_pid(action)?.is_none() {
            return Err(Error::lifecycle(action, "service has already been stopped"));
        }

        exec(action, &self.launchctl, &[PathBuf::from("unload"), self.plist_path()])?;
        Ok(ok_line("Stopping", &self.description))
    }

    fn status(&self) -> Result<String> {
        let action = "status";
        self.require_installed(action)?;

        match self.running_pid(action)? {
            Some(pid) => Ok(format!("Service (pid {}) is running...", pid)),
            None => Ok("Service is stopped".to_string()),
        }
    }
}

/// Pull `"PID" = 123;` out of `launchctl list <label>` output.
fn parse_list_pid(text: &str) -> Option<u32> {
    text.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("\"PID\"")?;
        let value = rest.trim_start().strip_prefix('=')?;
        value.trim().trim_end_matches(';').trim().parse().ok()
    })
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
