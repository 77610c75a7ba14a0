//! Host-side control of Android UI automation.
//!
//! An [`AutomatorServer`] owns the JSON-RPC automation server running on one
//! device: it stages the server jars, launches the instrumentation over adb,
//! forwards a local port and polls until the server answers. A [`Device`]
//! issues device-wide calls through it, and [`UiObject`] handles act on the
//! elements matched by a [`Selector`].
//!
//! ```no_run
//! use uiautomator::{AutomatorServer, Device, Selector};
//!
//! # fn main() -> Result<(), uiautomator::ApiError> {
//! let server = AutomatorServer::from_env()?;
//! let device = Device::new(&server);
//! device.press(uiautomator_core::actions::NamedKey::Home)?;
//! device.select(Selector::new().text("Settings"))?.click()?;
//! server.stop()?;
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod object;
pub mod paths;
pub mod rpc;
pub mod server;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use device::Device;
pub use object::{ObjectAction, UiObject};
pub use server::{AutomatorServer, ServerConfig};
pub use uiautomator_core::error::{ApiError, ErrorCode};
pub use uiautomator_core::selector::Selector;
