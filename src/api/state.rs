use std::sync::Arc;

use crate::config::AppConfig;
use crate::hydrate::Hydrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub hydrator: Arc<Hydrator>,
}

impl AppState {
    pub fn new(config: AppConfig, hydrator: Hydrator) -> Self {
        Self {
            config: Arc::new(config),
            hydrator: Arc::new(hydrator),
        }
    }
}
