use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Persistent store of accounts. Password hashing happens inside the write
/// path; the auth core never sees a hash it did not read from here.
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch an account by its normalized email (for login).
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError>;

    /// Insert a new account. The plaintext password is hashed before it is
    /// written. Fails with `DuplicateAccount` when the email is taken.
    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AccountRecord, AuthError>;

    async fn verify_password(
        &self,
        account: &AccountRecord,
        password: &str,
    ) -> Result<bool, AuthError>;

    async fn count_active(&self) -> Result<u64, AuthError>;

    /// Page of active accounts, sorted. `offset`/`limit` are precomputed by
    /// the caller; sorting is restricted to the whitelisted fields.
    async fn list_active(
        &self,
        offset: u64,
        limit: u16,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> Result<Vec<AccountRecord>, AuthError>;
}
