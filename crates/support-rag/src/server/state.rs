//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::service::RagService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service: Arc<RagService>,
}

impl AppState {
    /// Open the index and providers described by `config`
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::from_service(Arc::new(RagService::from_config(config)?)))
    }

    /// Wrap an already assembled service
    pub fn from_service(service: Arc<RagService>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { service }),
        }
    }

    pub fn service(&self) -> &Arc<RagService> {
        &self.inner.service
    }

    pub fn config(&self) -> &RagConfig {
        self.inner.service.config()
    }
}
