//! Redis-backed session storage

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::session::SessionState,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// State of a session; a fresh state when unknown or expired
    async fn load(&self, session_id: Uuid) -> AppResult<SessionState>;
    async fn save(&self, session_id: Uuid, state: &SessionState) -> AppResult<()>;
    async fn ping(&self) -> AppResult<()>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    client: Client,
    ttl_seconds: u64,
}

fn session_key(session_id: Uuid) -> String {
    format!("session:{}", session_id)
}

impl RedisSessionStore {
    /// Create a new session store and check the connection
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let store = Self { client, ttl_seconds };
        store.ping().await?;
        Ok(store)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: Uuid) -> AppResult<SessionState> {
        let mut conn = self.connection().await?;

        let stored: Option<String> = conn
            .get(session_key(session_id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to read session from Redis: {}", e)))?;

        match stored {
            Some(json) => Ok(serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable session {}: {}", session_id, e);
                SessionState::default()
            })),
            None => Ok(SessionState::default()),
        }
    }

    async fn save(&self, session_id: Uuid, state: &SessionState) -> AppResult<()> {
        let mut conn = self.connection().await?;

        let json = serde_json::to_string(state)
            .map_err(|e| AppError::Internal(format!("Failed to encode session: {}", e)))?;
        conn.set_ex::<_, _, ()>(session_key(session_id), json, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store session in Redis: {}", e)))?;

        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }
}
