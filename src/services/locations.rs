//! Redis store for last-known driver locations
//!
//! Location pings are frequent, ephemeral and last-write-wins, so they
//! go to Redis with a TTL instead of the deliveries table. No history
//! is retained.

use redis::{AsyncCommands, Client};

use crate::{
    error::{AppError, AppResult},
    models::delivery::GeoPoint,
};

#[derive(Clone)]
pub struct LocationStore {
    client: Client,
    ttl_seconds: u64,
}

impl LocationStore {
    /// Create a new location store and verify the connection
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { client, ttl_seconds })
    }

    /// Overwrite the last-known location of a delivery
    pub async fn store(&self, delivery_id: uuid::Uuid, point: &GeoPoint) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("delivery:location:{}", delivery_id);
        let value = serde_json::to_string(point)
            .map_err(|e| AppError::Internal(format!("Failed to encode location: {}", e)))?;

        conn.set_ex::<_, _, ()>(&key, value, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store location in Redis: {}", e)))?;

        Ok(())
    }

    /// Last-known location of a delivery, if recent enough
    pub async fn get(&self, delivery_id: uuid::Uuid) -> AppResult<Option<GeoPoint>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("delivery:location:{}", delivery_id);
        let value: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get location from Redis: {}", e)))?;

        match value {
            Some(raw) => {
                let point = serde_json::from_str(&raw)
                    .map_err(|e| AppError::Internal(format!("Failed to decode location: {}", e)))?;
                Ok(Some(point))
            }
            None => Ok(None),
        }
    }
}
