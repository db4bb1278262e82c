use std::sync::Arc;

use crate::application::{ChatService, FeedbackService};
use crate::infrastructure::storage::RedisPool;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub feedback: Arc<FeedbackService>,
    /// Present when records are kept in Redis; checked by `/ready`.
    pub redis_pool: Option<RedisPool>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>, feedback: Arc<FeedbackService>, config: AppConfig) -> Self {
        Self {
            chat,
            feedback,
            redis_pool: None,
            config: Arc::new(config),
        }
    }

    pub fn with_redis_pool(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }
}
