//! Server artifacts: download once into the local cache, push on every start.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};
use uiautomator_core::error::ApiError;

use crate::transport::Transport;

/// Device directory the instrumentation runner loads jars from.
pub const DEVICE_DIR: &str = "/data/local/tmp/";

/// A jar the automation server needs on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub name: &'static str,
    pub url: &'static str,
}

pub const SERVER_ARTIFACTS: [Artifact; 2] = [
    Artifact {
        name: "bundle.jar",
        url: "https://github.com/xiaocong/android-uiautomator-jsonrpcserver/blob/release/dist/bundle.jar?raw=true",
    },
    Artifact {
        name: "uiautomator-stub.jar",
        url: "https://github.com/xiaocong/android-uiautomator-jsonrpcserver/blob/release/dist/uiautomator-stub.jar?raw=true",
    },
];

/// Downloads one artifact to a local path.
pub trait ArtifactFetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Fetches over HTTPS, writing to `<name>.part` and renaming into place so an
/// interrupted download never looks cached.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("Failed to download {}", url))?
            .bytes()
            .with_context(|| format!("Failed to read body of {}", url))?;

        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let partial = dest.with_file_name(format!("{}.part", file_name));

        fs::write(&partial, &bytes)
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        fs::rename(&partial, dest)
            .with_context(|| format!("Failed to move {} into place", partial.display()))?;
        Ok(())
    }
}

/// Makes the server artifacts available on the device.
pub struct ArtifactStager {
    cache_dir: PathBuf,
    artifacts: Vec<Artifact>,
    fetcher: Box<dyn ArtifactFetcher>,
}

impl ArtifactStager {
    pub fn new(cache_dir: PathBuf, fetcher: Box<dyn ArtifactFetcher>) -> Self {
        Self {
            cache_dir,
            artifacts: SERVER_ARTIFACTS.to_vec(),
            fetcher,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cached_path(&self, artifact: &Artifact) -> PathBuf {
        self.cache_dir.join(artifact.name)
    }

    /// Fetch any artifact missing from the cache, then push all of them.
    ///
    /// Returns the artifact file names in launch order.
    pub fn stage(&self, transport: &dyn Transport) -> Result<Vec<&'static str>, ApiError> {
        fs::create_dir_all(&self.cache_dir).map_err(|e| {
            ApiError::transport_with_suggestion(
                format!(
                    "Failed to create cache directory {}: {}",
                    self.cache_dir.display(),
                    e
                ),
                "Set UIAUTOMATOR_CACHE_DIR to a writable directory",
            )
        })?;

        let mut names = Vec::with_capacity(self.artifacts.len());
        for artifact in &self.artifacts {
            let local = self.cached_path(artifact);
            if local.exists() {
                debug!("Using cached {}", local.display());
            } else {
                info!("Downloading {} to {}", artifact.name, local.display());
                self.fetcher.fetch(artifact.url, &local).map_err(|e| {
                    ApiError::transport_with_suggestion(
                        format!("Failed to download {}: {:#}", artifact.name, e),
                        format!(
                            "Check network access, or place {} in {} manually",
                            artifact.name,
                            self.cache_dir.display()
                        ),
                    )
                })?;
            }

            transport.push(&local, DEVICE_DIR).map_err(|e| {
                ApiError::transport(format!("Failed to push {}: {:#}", artifact.name, e))
            })?;
            names.push(artifact.name);
        }
        Ok(names)
    }
}
