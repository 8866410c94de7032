//! Redis cache for computed availability windows
//!
//! Windows are stored under a key that embeds a generation counter. Every
//! closure or reservation mutation increments the counter, so entries
//! written before the change are never read again and simply expire.
//!
//! Callers read the generation once, before building, and write the built
//! window under that same generation. A mutation that lands during the build
//! then leaves the entry behind on the old generation.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};

use crate::{
    availability::{AvailabilityWindow, DateKey},
    error::{AppError, AppResult},
};

const GENERATION_KEY: &str = "tavola:availability:generation";

/// Generation-keyed store for built windows. Implementations never fail a
/// request: errors are logged and surface as misses.
#[async_trait]
pub trait WindowCache: Send + Sync {
    /// Current generation, or `None` when it cannot be read.
    async fn generation(&self) -> Option<u64>;

    async fn get_window(
        &self,
        today: DateKey,
        horizon_days: u32,
        generation: u64,
    ) -> Option<AvailabilityWindow>;

    /// Store a window built from data read at `generation`.
    async fn put_window(&self, window: &AvailabilityWindow, generation: u64);

    /// Make every cached window stale
    async fn invalidate(&self);
}

#[derive(Clone)]
pub struct AvailabilityCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl AvailabilityCache {
    /// Connect and check the server answers
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Cache(format!("Failed to create Redis client: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Cache(format!("Redis connection test failed: {}", e)))?;

        Ok(Self { conn, ttl_seconds })
    }

    async fn read_generation(&self) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let generation: Option<u64> = conn
            .get(GENERATION_KEY)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to read cache generation: {}", e)))?;
        Ok(generation.unwrap_or(0))
    }

    async fn try_get_window(
        &self,
        today: DateKey,
        horizon_days: u32,
        generation: u64,
    ) -> AppResult<Option<AvailabilityWindow>> {
        let key = window_key(today, horizon_days, generation);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to read {}: {}", key, e)))?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::Cache(format!("Corrupt cache entry {}: {}", key, e)))
        })
        .transpose()
    }

    async fn try_put_window(&self, window: &AvailabilityWindow, generation: u64) -> AppResult<()> {
        let key = window_key(window.today, window.horizon_days, generation);
        let json = serde_json::to_string(window)
            .map_err(|e| AppError::Cache(format!("Failed to encode window: {}", e)))?;

        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, json, self.ttl_seconds)
            .await
            .map_err(|e| AppError::Cache(format!("Failed to write {}: {}", key, e)))?;
        Ok(())
    }
}

#[async_trait]
impl WindowCache for AvailabilityCache {
    async fn generation(&self) -> Option<u64> {
        match self.read_generation().await {
            Ok(generation) => Some(generation),
            Err(e) => {
                tracing::warn!(error = %e, "Availability cache bypassed");
                None
            }
        }
    }

    async fn get_window(
        &self,
        today: DateKey,
        horizon_days: u32,
        generation: u64,
    ) -> Option<AvailabilityWindow> {
        match self.try_get_window(today, horizon_days, generation).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, "Availability cache read bypassed");
                None
            }
        }
    }

    async fn put_window(&self, window: &AvailabilityWindow, generation: u64) {
        if let Err(e) = self.try_put_window(window, generation).await {
            tracing::warn!(error = %e, "Availability cache write bypassed");
        }
    }

    async fn invalidate(&self) {
        let mut conn = self.conn.clone();
        match conn.incr::<_, _, u64>(GENERATION_KEY, 1).await {
            Ok(generation) => tracing::debug!(generation, "Availability cache invalidated"),
            Err(e) => tracing::warn!(error = %e, "Failed to invalidate availability cache"),
        }
    }
}

fn window_key(today: DateKey, horizon_days: u32, generation: u64) -> String {
    format!("tavola:availability:window:{}:{}:{}", generation, today, horizon_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_key_changes_with_generation() {
        let today = DateKey::from_local_parts(2025, 6, 10).unwrap();
        assert_eq!(window_key(today, 90, 3), "tavola:availability:window:3:2025-06-10:90");
        assert_ne!(window_key(today, 90, 3), window_key(today, 90, 4));
        assert_ne!(window_key(today, 90, 3), window_key(today, 30, 3));
    }
}
