//! [`Transport`] backed by the `adb` executable.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::debug;
use uiautomator_core::error::ApiError;

use super::{DeviceList, ServerProcess, ShellOutput, Transport};
use crate::paths;

/// Line `adb devices` prints before the device table.
const DEVICES_MARKER: &str = "List of devices attached";

/// How often [`AdbProcess::wait_timeout`] re-checks the child.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs adb commands against one device (or the only one, without a serial).
#[derive(Debug, Clone)]
pub struct AdbTransport {
    adb: PathBuf,
    serial: Option<String>,
}

impl AdbTransport {
    pub fn new(adb: PathBuf, serial: Option<String>) -> Self {
        Self { adb, serial }
    }

    /// Resolve adb from the environment and target `serial` when given.
    pub fn from_env(serial: Option<String>) -> Result<Self, ApiError> {
        Ok(Self::new(paths::resolve_adb()?, serial))
    }

    pub fn adb(&self) -> &Path {
        &self.adb
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// Base command with the device selector applied.
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        debug!("adb {}", args.join(" "));
        self.command()
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run adb {}", args.join(" ")))
    }

    fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = self.run(args)?;
        if !output.status.success() {
            bail!(
                "adb {} failed ({}): {}",
                args.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output)
    }
}

impl Transport for AdbTransport {
    fn list_devices(&self) -> Result<DeviceList> {
        // Listing is global; the serial selector does not apply.
        let output = Command::new(&self.adb)
            .arg("devices")
            .stdin(Stdio::null())
            .output()
            .context("Failed to run adb devices")?;
        parse_devices(&String::from_utf8_lossy(&output.stdout))
    }

    fn push(&self, local: &Path, remote: &str) -> Result<()> {
        let local = local.to_string_lossy();
        self.run_checked(&["push", &local, remote])?;
        Ok(())
    }

    fn pull(&self, remote: &str, local: &Path) -> Result<()> {
        let local = local.to_string_lossy();
        self.run_checked(&["pull", remote, &local])?;
        Ok(())
    }

    fn shell(&self, args: &[&str]) -> Result<ShellOutput> {
        let mut full = vec!["shell"];
        full.extend_from_slice(args);
        let output = self.run(&full)?;
        Ok(ShellOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    fn forward(&self, local_port: u16, remote_port: u16) -> Result<()> {
        let local = format!("tcp:{}", local_port);
        let remote = format!("tcp:{}", remote_port);
        self.run_checked(&["forward", &local, &remote])?;
        Ok(())
    }

    fn spawn(&self, args: &[&str]) -> Result<Box<dyn ServerProcess>> {
        debug!("adb shell {} (background)", args.join(" "));
        let mut cmd = self.command();
        cmd.arg("shell")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Own process group: the server must not receive SIGHUP when the
        // invoking terminal closes.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn adb shell {}", args.join(" ")))?;
        Ok(Box::new(AdbProcess { child }))
    }
}

/// Parse `adb devices` output into serial → state.
///
/// Errors when the header line is missing, which means adb itself is broken.
pub fn parse_devices(output: &str) -> Result<DeviceList> {
    let line_re = Regex::new(r"^(\S+)\s+(\S+)").context("Invalid device line pattern")?;

    let mut lines = output.lines();
    if !lines.by_ref().any(|line| line.trim() == DEVICES_MARKER) {
        bail!("adb is not working: missing '{}' in output", DEVICES_MARKER);
    }

    let devices = lines
        .filter_map(|line| line_re.captures(line.trim()))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    Ok(devices)
}

/// A backgrounded `adb shell` child.
struct AdbProcess {
    child: Child,
}

impl ServerProcess for AdbProcess {
    fn id(&self) -> Option<u32> {
        Some(self.child.id())
    }

    fn is_running(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) => {
                debug!("Error checking server process status: {}", e);
                false
            }
        }
    }

    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool> {
        let start = Instant::now();
        loop {
            if self.child.try_wait()?.is_some() {
                return Ok(true);
            }
            if start.elapsed() >= timeout {
                return Ok(false);
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }

    fn kill(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }
        self.child.kill().context("Failed to kill server process")?;
        self.child.wait().context("Failed to reap server process")?;
        Ok(())
    }
}
