use crate::chat::SessionRegistry;
use crate::core::AppConfig;

pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            sessions: SessionRegistry::new(),
        }
    }
}
