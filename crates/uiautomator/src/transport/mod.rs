//! Device transport: the shell-level collaborator used to reach one device.
//!
//! [`Transport`] is the seam the session manager is written against;
//! [`adb::AdbTransport`] implements it on top of the `adb` executable.

pub mod adb;

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};

pub use adb::AdbTransport;

/// Attached devices: serial → state (`device`, `offline`, `unauthorized`, ...).
pub type DeviceList = BTreeMap<String, String>;

/// State adb reports for a usable device.
pub const DEVICE_READY: &str = "device";

/// Captured result of a device shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    pub stdout: String,
    pub exit_code: i32,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Handle to a long-running process started with [`Transport::spawn`].
pub trait ServerProcess: Send {
    /// Host-side process id, when there is one.
    fn id(&self) -> Option<u32>;

    fn is_running(&mut self) -> bool;

    /// Wait up to `timeout` for the process to exit. Returns whether it did.
    fn wait_timeout(&mut self, timeout: Duration) -> Result<bool>;

    fn kill(&mut self) -> Result<()>;
}

/// Shell-level access to a single attached device.
pub trait Transport: Send + Sync {
    fn list_devices(&self) -> Result<DeviceList>;

    fn push(&self, local: &Path, remote: &str) -> Result<()>;

    fn pull(&self, remote: &str, local: &Path) -> Result<()>;

    /// Run a command in the device shell and capture its output.
    fn shell(&self, args: &[&str]) -> Result<ShellOutput>;

    /// Forward host `tcp:local_port` to device `tcp:remote_port`.
    fn forward(&self, local_port: u16, remote_port: u16) -> Result<()>;

    /// Start a device shell command in the background.
    fn spawn(&self, args: &[&str]) -> Result<Box<dyn ServerProcess>>;

    /// Kill a device process by pid.
    fn kill(&self, pid: u32) -> Result<()> {
        let pid = pid.to_string();
        let output = self.shell(&["kill", "-9", &pid])?;
        if !output.success() {
            bail!(
                "kill -9 {} exited with {}: {}",
                pid,
                output.exit_code,
                output.stdout.trim()
            );
        }
        Ok(())
    }
}
