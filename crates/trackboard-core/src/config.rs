//! Dashboard configuration: where the tracking service lives and how long to
//! wait for it.

use std::time::Duration;

use reqwest::Url;

use crate::error::{DashError, Result};

/// Configuration shared by every view render.
#[derive(Debug, Clone)]
pub struct DashConfig {
    /// Base URL of the tracking service, always ending in `/`.
    pub tracking_uri: Url,
    /// Upper bound for a single tracking-service request.
    pub request_timeout: Duration,
    /// Deepest artifact directory the walker will descend into.
    pub max_artifact_depth: usize,
}

impl DashConfig {
    pub const ENV_TRACKING_URI: &'static str = "MLFLOW_TRACKING_URI";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_ARTIFACT_DEPTH: usize = 32;

    pub fn new(tracking_uri: &str) -> Result<Self> {
        Ok(Self {
            tracking_uri: parse_tracking_uri(tracking_uri)?,
            request_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            max_artifact_depth: Self::DEFAULT_MAX_ARTIFACT_DEPTH,
        })
    }

    /// Reads the tracking URI from `MLFLOW_TRACKING_URI`.
    pub fn from_env() -> Result<Self> {
        let uri = std::env::var(Self::ENV_TRACKING_URI).map_err(|_| {
            DashError::Config(format!("{} is not set", Self::ENV_TRACKING_URI))
        })?;
        Self::new(&uri)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_artifact_depth(mut self, depth: usize) -> Self {
        self.max_artifact_depth = depth;
        self
    }
}

fn parse_tracking_uri(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DashError::Config("tracking URI is empty".to_string()));
    }
    let mut url = Url::parse(raw)
        .map_err(|e| DashError::Config(format!("malformed tracking URI '{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DashError::Config(format!(
            "tracking URI must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(DashError::Config(format!("tracking URI '{}' has no host", raw)));
    }
    // Url::join replaces the last segment unless the base ends with a slash.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
