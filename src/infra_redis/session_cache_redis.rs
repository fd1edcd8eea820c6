use crate::application_port::*;
use crate::domain_port::SessionCache;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed session cache. `ConnectionManager` handles reconnection on
/// its own; a request that hits a dropped connection fails with a store
/// error and the next one retries on a fresh connection.
pub struct RedisSessionCache {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionCache {
    pub fn new(conn: redis::aio::ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisSessionCache {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let val: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(val)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, AuthError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        // GETDEL: read and remove in one round trip, atomic on the server.
        let val: Option<String> = conn
            .get_del(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(val)
    }
}
