use crate::application_port::*;

/// Key-value store with per-key expiration. Holds the two kinds of auth
/// state: the single live refresh token per account, and the denylist of
/// revoked tokens. Single logical instance; per-key operations are atomic
/// in the backing store.
#[async_trait::async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), AuthError>;

    async fn delete(&self, key: &str) -> Result<(), AuthError>;

    /// Read-and-delete in one step. Used for eager invalidation on login and
    /// as a compare-and-remove primitive during rotation.
    async fn get_and_delete(&self, key: &str) -> Result<Option<String>, AuthError>;
}

/// Cache key for the currently-authorized refresh token of an account.
pub fn refresh_key(account_id: crate::domain_model::AccountId) -> String {
    format!("refresh:{}", account_id)
}

/// Cache key marking a specific token string as revoked.
pub fn denylist_key(token: &str) -> String {
    format!("denylist:{}", token)
}
