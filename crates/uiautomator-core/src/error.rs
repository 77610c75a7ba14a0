//! Error types with actionable suggestions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes carried by every [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidField,
    DeviceUnavailable,
    AmbiguousTarget,
    TransportError,
    RpcError,
    AttributeNotFound,
    SessionConflict,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::InvalidField => write!(f, "INVALID_FIELD"),
            ErrorCode::DeviceUnavailable => write!(f, "DEVICE_UNAVAILABLE"),
            ErrorCode::AmbiguousTarget => write!(f, "AMBIGUOUS_TARGET"),
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorCode::RpcError => write!(f, "RPC_ERROR"),
            ErrorCode::AttributeNotFound => write!(f, "ATTRIBUTE_NOT_FOUND"),
            ErrorCode::SessionConflict => write!(f, "SESSION_CONFLICT"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// An error with a machine-readable code and a human hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub suggestion: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (hint: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Unknown selector field or keyword outside an action's vocabulary.
    pub fn invalid_field(name: &str, allowed: &[&str]) -> Self {
        Self {
            code: ErrorCode::InvalidField,
            message: format!("'{}' is not allowed", name),
            suggestion: Some(format!("Use one of: {}", allowed.join(", "))),
        }
    }

    /// A known selector field was given a value of the wrong kind.
    pub fn invalid_field_value(field: &str, expected: &str, got: &str) -> Self {
        Self {
            code: ErrorCode::InvalidField,
            message: format!("Field '{}' expects {}, got '{}'", field, expected, got),
            suggestion: Some(format!("Pass {} for '{}'", expected, field)),
        }
    }

    pub fn no_devices() -> Self {
        Self {
            code: ErrorCode::DeviceUnavailable,
            message: "Device not attached".to_string(),
            suggestion: Some("Connect a device and check it appears in 'adb devices'".into()),
        }
    }

    /// The device selected through `ANDROID_SERIAL` is not in the device list.
    pub fn device_not_found(serial: &str) -> Self {
        Self {
            code: ErrorCode::DeviceUnavailable,
            message: format!("Device '{}' not attached", serial),
            suggestion: Some(
                "Check $ANDROID_SERIAL against the serials listed by 'adb devices'".into(),
            ),
        }
    }

    /// The device is listed but not usable (offline, unauthorized, ...).
    pub fn device_not_ready(serial: &str, state: &str) -> Self {
        Self {
            code: ErrorCode::DeviceUnavailable,
            message: format!("Device '{}' is {}", serial, state),
            suggestion: Some(
                "Unlock the device and accept the USB debugging prompt, then retry".into(),
            ),
        }
    }

    pub fn ambiguous_target(count: usize) -> Self {
        Self {
            code: ErrorCode::AmbiguousTarget,
            message: format!(
                "Multiple devices attached ({}) but $ANDROID_SERIAL environment not set",
                count
            ),
            suggestion: Some("Set ANDROID_SERIAL to the serial of the device to drive".into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::TransportError,
            message: message.into(),
            suggestion: Some("Check that adb is installed and 'adb devices' works".into()),
        }
    }

    /// Create a transport error with a custom suggestion.
    pub fn transport_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            code: ErrorCode::TransportError,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    pub fn rpc(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::RpcError,
            message: message.into(),
            suggestion: Some(
                "Run 'uiautomator ping' to check the automation server is reachable".into(),
            ),
        }
    }

    /// Error object returned by the remote server for a specific method.
    pub fn rpc_remote(method: &str, code: i64, message: &str) -> Self {
        Self {
            code: ErrorCode::RpcError,
            message: format!("Remote call '{}' failed ({}): {}", method, code, message),
            suggestion: Some("Check the selector matches an element on screen".into()),
        }
    }

    pub fn attribute_not_found(name: &str) -> Self {
        Self {
            code: ErrorCode::AttributeNotFound,
            message: format!("Element has no attribute '{}'", name),
            suggestion: Some("Run 'uiautomator object info' to list the attributes".into()),
        }
    }

    pub fn session_conflict(local_port: u16) -> Self {
        Self {
            code: ErrorCode::SessionConflict,
            message: format!(
                "An automation server is already running on local port {}",
                local_port
            ),
            suggestion: Some("Stop it with 'uiautomator stop' before starting again".into()),
        }
    }

    pub fn startup_timeout(waited: std::time::Duration) -> Self {
        Self {
            code: ErrorCode::RpcError,
            message: format!("Automation server did not answer ping within {:?}", waited),
            suggestion: Some(
                "Check the device screen is unlocked and no other uiautomator instance is running"
                    .into(),
            ),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InternalError,
            message: message.into(),
            suggestion: Some("This is an internal error. Please report it if it persists.".into()),
        }
    }
}
