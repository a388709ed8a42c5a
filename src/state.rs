use std::sync::Arc;

use tracing::warn;

use crate::config::ServerConfig;
use crate::core::bridge::MediaBridge;
use crate::core::realtime::{OpenAIRealtimeFactory, RealtimeFactory};

/// Application state shared by all handlers
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub bridge: Arc<MediaBridge>,
}

impl AppState {
    /// Build state that opens OpenAI Realtime sessions for every call.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        if !config.has_openai_api_key() {
            warn!("OPENAI_API_KEY not configured; calls will not reach the realtime service");
        }
        let factory = Arc::new(OpenAIRealtimeFactory::new(config.realtime_config()));
        Self::with_factory(config, factory)
    }

    /// Build state around a custom realtime factory.
    pub fn with_factory(config: ServerConfig, factory: Arc<dyn RealtimeFactory>) -> Arc<Self> {
        Arc::new(Self {
            config,
            bridge: Arc::new(MediaBridge::new(factory)),
        })
    }
}
