//! Environment-derived locations: adb executable, device target, artifact cache.
//!
//! Priority for the adb executable:
//! 1. `$ANDROID_HOME/platform-tools/adb` (must exist when `ANDROID_HOME` is set)
//! 2. `adb` found on `PATH`
//!
//! Priority for the artifact cache directory:
//! 1. `UIAUTOMATOR_CACHE_DIR` (explicit override)
//! 2. Platform cache dir (`~/.cache/uiautomator` on Linux)
//! 3. System temp dir (last resort)
//!
//! Empty variables are ignored everywhere.

use std::env;
use std::path::PathBuf;

use uiautomator_core::error::ApiError;

pub const ANDROID_SERIAL_ENV: &str = "ANDROID_SERIAL";
pub const ANDROID_HOME_ENV: &str = "ANDROID_HOME";
pub const CACHE_DIR_ENV: &str = "UIAUTOMATOR_CACHE_DIR";

#[cfg(windows)]
const ADB_EXECUTABLE: &str = "adb.exe";
#[cfg(not(windows))]
const ADB_EXECUTABLE: &str = "adb";

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Device explicitly selected through `ANDROID_SERIAL`.
pub fn get_serial() -> Option<String> {
    non_empty_var(ANDROID_SERIAL_ENV)
}

/// Locate the adb executable.
pub fn resolve_adb() -> Result<PathBuf, ApiError> {
    if let Some(home) = non_empty_var(ANDROID_HOME_ENV) {
        let adb = PathBuf::from(&home)
            .join("platform-tools")
            .join(ADB_EXECUTABLE);
        if !adb.exists() {
            return Err(ApiError::transport_with_suggestion(
                format!("Adb not found in $ANDROID_HOME path: {}", home),
                "Point ANDROID_HOME at an SDK containing platform-tools/adb",
            ));
        }
        return Ok(adb);
    }

    which::which(ADB_EXECUTABLE).map_err(|_| {
        ApiError::transport_with_suggestion(
            "$ANDROID_HOME environment not set and adb is not on PATH",
            "Set ANDROID_HOME to your Android SDK or add platform-tools to PATH",
        )
    })
}

/// Directory holding downloaded server artifacts.
pub fn get_cache_dir() -> PathBuf {
    if let Some(dir) = non_empty_var(CACHE_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(cache) = dirs::cache_dir() {
        return cache.join("uiautomator");
    }

    env::temp_dir().join("uiautomator")
}
