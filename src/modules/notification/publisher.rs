use deadpool_redis::redis::AsyncCommands;

use crate::{api::error, modules::notification::event::FriendEvent};

#[async_trait::async_trait]
pub trait EventPublisher {
    async fn publish(&self, event: &FriendEvent) -> Result<(), error::SystemError>;
}

/// Publishes every event as JSON on its own Redis channel.
#[derive(Clone)]
pub struct RedisPublisher {
    pool: deadpool_redis::Pool,
}

impl RedisPublisher {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, event: &FriendEvent) -> Result<(), error::SystemError> {
        let mut conn = self.pool.get().await?;

        let payload = serde_json::to_vec(event)?;

        conn.publish::<_, _, ()>(event.channel(), payload).await?;

        Ok(())
    }
}
