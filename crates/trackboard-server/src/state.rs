//! Shared application state for the Axum server.

use std::sync::Arc;

use trackboard_core::{DashConfig, DashContext};

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<DashContext>,
    /// Shown by `/api/config`; `None` when serving a non-HTTP service.
    pub tracking_uri: Option<String>,
}

impl AppState {
    pub fn new(ctx: DashContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            tracking_uri: None,
        }
    }

    pub fn with_tracking_uri(mut self, uri: impl Into<String>) -> Self {
        self.tracking_uri = Some(uri.into());
        self
    }
}

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dashboard: DashConfig,
}

impl ServerConfig {
    pub fn new(dashboard: DashConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            dashboard,
        }
    }
}
