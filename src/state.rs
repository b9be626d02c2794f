use std::sync::Arc;

use crate::store::MemoryStore;
use crate::utils::config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(ServerConfig::default()),
        }
    }

    pub fn with_config(config: ServerConfig) -> Self {
        AppState {
            store: Arc::new(MemoryStore::new()),
            config: Arc::new(config),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
