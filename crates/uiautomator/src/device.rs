//! Device-wide operations.
//!
//! Every call goes through [`AutomatorServer::jsonrpc`], which re-checks
//! liveness and brings the server up when needed.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;
use uiautomator_core::actions::{Key, Orientation, Panel, ScreenPower};
use uiautomator_core::error::ApiError;
use uiautomator_core::info::DeviceInfo;
use uiautomator_core::protocol::method;
use uiautomator_core::selector::Selector;

use crate::object::UiObject;
use crate::rpc;
use crate::server::AutomatorServer;

/// Default step count for device swipes and drags.
pub const DEFAULT_SWIPE_STEPS: u32 = 100;

const DUMP_FILE: &str = "dump.xml";
const SCREENSHOT_FILE: &str = "screenshot.png";

/// What [`Device::wait`] waits for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceWait {
    /// The foreground application goes idle.
    Idle { timeout_ms: u64 },
    /// A window content update, optionally restricted to one package.
    Update {
        timeout_ms: u64,
        package: Option<String>,
    },
}

impl DeviceWait {
    pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

    pub fn idle() -> Self {
        DeviceWait::Idle {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn update(package: Option<String>) -> Self {
        DeviceWait::Update {
            timeout_ms: Self::DEFAULT_TIMEOUT_MS,
            package,
        }
    }
}

/// Screenshot encoding options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenshotOptions {
    pub scale: f32,
    pub quality: u8,
}

impl Default for ScreenshotOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            quality: 100,
        }
    }
}

/// Facade over one device's automation server.
pub struct Device<'a> {
    server: &'a AutomatorServer,
}

impl<'a> Device<'a> {
    pub fn new(server: &'a AutomatorServer) -> Self {
        Self { server }
    }

    pub fn server(&self) -> &AutomatorServer {
        self.server
    }

    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, ApiError> {
        self.server.jsonrpc()?.call(method, params)
    }

    fn call_as<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T, ApiError> {
        rpc::call_as(self.server.jsonrpc()?.as_ref(), method, params)
    }

    /// Handle on the elements matching `selector`.
    pub fn select(&self, selector: Selector) -> Result<UiObject, ApiError> {
        Ok(UiObject::new(self.server.jsonrpc()?, selector))
    }

    pub fn ping(&self) -> Result<String, ApiError> {
        self.call_as(method::PING, vec![])
    }

    pub fn info(&self) -> Result<DeviceInfo, ApiError> {
        self.call_as(method::DEVICE_INFO, vec![])
    }

    pub fn click(&self, x: i32, y: i32) -> Result<bool, ApiError> {
        self.call_as(method::CLICK, vec![json!(x), json!(y)])
    }

    pub fn swipe(&self, sx: i32, sy: i32, ex: i32, ey: i32, steps: u32) -> Result<bool, ApiError> {
        self.call_as(
            method::SWIPE,
            vec![json!(sx), json!(sy), json!(ex), json!(ey), json!(steps)],
        )
    }

    pub fn drag(&self, sx: i32, sy: i32, ex: i32, ey: i32, steps: u32) -> Result<bool, ApiError> {
        self.call_as(
            method::DRAG,
            vec![json!(sx), json!(sy), json!(ex), json!(ey), json!(steps)],
        )
    }

    /// Dump the window hierarchy XML into `local`.
    ///
    /// `None` when the server produced no file or it could not be pulled.
    pub fn dump(&self, local: &Path) -> Result<Option<PathBuf>, ApiError> {
        let remote: Option<String> =
            self.call_as(method::DUMP_WINDOW_HIERARCHY, vec![json!(true), json!(DUMP_FILE)])?;
        Ok(self.retrieve(remote, local))
    }

    /// Take a screenshot into `local`. `None` as for [`Device::dump`].
    pub fn screenshot(
        &self,
        local: &Path,
        options: ScreenshotOptions,
    ) -> Result<Option<PathBuf>, ApiError> {
        let remote: Option<String> = self.call_as(
            method::TAKE_SCREENSHOT,
            vec![
                json!(SCREENSHOT_FILE),
                json!(options.scale),
                json!(options.quality),
            ],
        )?;
        Ok(self.retrieve(remote, local))
    }

    /// Pull a server-written file and remove it from the device.
    fn retrieve(&self, remote: Option<String>, local: &Path) -> Option<PathBuf> {
        let remote = remote.filter(|path| !path.is_empty())?;
        let transport = self.server.transport();

        let pulled = transport.pull(&remote, local);
        if let Err(e) = transport.shell(&["rm", &remote]) {
            warn!("Failed to remove {} from device: {:#}", remote, e);
        }

        match pulled {
            Ok(()) => Some(local.to_path_buf()),
            Err(e) => {
                warn!("Failed to pull {}: {:#}", remote, e);
                None
            }
        }
    }

    pub fn freeze_rotation(&self, freeze: bool) -> Result<(), ApiError> {
        self.call(method::FREEZE_ROTATION, vec![json!(freeze)])?;
        Ok(())
    }

    pub fn orientation(&self) -> Result<Orientation, ApiError> {
        let info = self.info()?;
        info.orientation().ok_or_else(|| {
            ApiError::rpc(format!(
                "Device reported unknown display rotation {}",
                info.display_rotation
            ))
        })
    }

    pub fn set_orientation(&self, orientation: Orientation) -> Result<(), ApiError> {
        self.call(method::SET_ORIENTATION, vec![json!(orientation.as_str())])?;
        Ok(())
    }

    /// Text last traversed in a web view (highlighted text).
    pub fn last_traversed_text(&self) -> Result<Option<String>, ApiError> {
        self.call_as(method::GET_LAST_TRAVERSED_TEXT, vec![])
    }

    pub fn clear_traversed_text(&self) -> Result<(), ApiError> {
        self.call(method::CLEAR_LAST_TRAVERSED_TEXT, vec![])?;
        Ok(())
    }

    pub fn open(&self, panel: Panel) -> Result<bool, ApiError> {
        let name = match panel {
            Panel::Notification => method::OPEN_NOTIFICATION,
            Panel::QuickSettings => method::OPEN_QUICK_SETTINGS,
        };
        self.call_as(name, vec![])
    }

    pub fn watcher_triggered(&self, name: &str) -> Result<bool, ApiError> {
        self.call_as(method::HAS_WATCHER_TRIGGERED, vec![json!(name)])
    }

    pub fn press(&self, key: impl Into<Key>) -> Result<bool, ApiError> {
        let (method, params) = press_params(key.into());
        self.call_as(method, params)
    }

    pub fn wakeup(&self) -> Result<(), ApiError> {
        self.call(method::WAKE_UP, vec![])?;
        Ok(())
    }

    pub fn sleep(&self) -> Result<(), ApiError> {
        self.call(method::SLEEP, vec![])?;
        Ok(())
    }

    pub fn screen(&self, power: ScreenPower) -> Result<(), ApiError> {
        match power {
            ScreenPower::On => self.wakeup(),
            ScreenPower::Off => self.sleep(),
        }
    }

    /// Block until the condition holds or its timeout elapses.
    ///
    /// Idle waits have no outcome on the server and report `true` once done.
    pub fn wait(&self, wait: DeviceWait) -> Result<bool, ApiError> {
        match wait {
            DeviceWait::Idle { timeout_ms } => {
                self.call(method::WAIT_FOR_IDLE, vec![json!(timeout_ms)])?;
                Ok(true)
            }
            DeviceWait::Update {
                timeout_ms,
                package,
            } => self.call_as(
                method::WAIT_FOR_WINDOW_UPDATE,
                vec![json!(package), json!(timeout_ms)],
            ),
        }
    }
}

fn press_params(key: Key) -> (&'static str, Vec<Value>) {
    match key {
        Key::Named(name) => (method::PRESS_KEY, vec![json!(name.as_str())]),
        Key::Code { code, meta: None } => (method::PRESS_KEY_CODE, vec![json!(code)]),
        Key::Code {
            code,
            meta: Some(meta),
        } => (method::PRESS_KEY_CODE, vec![json!(code), json!(meta)]),
    }
}
