//! Shared application state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::handlers::live::ClientRegistry;

/// State shared by all handlers.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Connected-client registry
    pub registry: Arc<ClientRegistry>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            registry: Arc::new(ClientRegistry::new()),
        }
    }
}
