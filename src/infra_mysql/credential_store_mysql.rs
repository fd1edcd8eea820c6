use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{AccountRecord, CredentialStore};
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use std::sync::Arc;
use uuid::Uuid;

pub struct MySqlCredentialStore {
    pool: MySqlPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl MySqlCredentialStore {
    pub fn new(pool: MySqlPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        MySqlCredentialStore { pool, hasher }
    }

    #[inline]
    fn id_as_bytes(id: &AccountId) -> &[u8] {
        id.0.as_bytes()
    }

    #[inline]
    fn id_from_bytes(id: &[u8]) -> Result<AccountId, AuthError> {
        Ok(AccountId(
            Uuid::from_slice(id).map_err(|e| AuthError::Store(e.to_string()))?,
        ))
    }

    fn row_to_record(row: MySqlRow) -> Result<AccountRecord, AuthError> {
        let account_id_bytes: Vec<u8> = row
            .try_get("account_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let account_id = Self::id_from_bytes(&account_id_bytes)?;

        let name: String = row
            .try_get("name")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let is_active: bool = row
            .try_get("is_active")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(AccountRecord {
            account_id,
            name,
            email,
            password_hash,
            is_active,
            created_at,
        })
    }

    // Sort columns are whitelisted here; the query string never sees user
    // input directly.
    fn order_clause(sort_field: SortField, sort_order: SortOrder) -> &'static str {
        match (sort_field, sort_order) {
            (SortField::CreatedAt, SortOrder::Asc) => "created_at ASC",
            (SortField::CreatedAt, SortOrder::Desc) => "created_at DESC",
            (SortField::Name, SortOrder::Asc) => "name ASC",
            (SortField::Name, SortOrder::Desc) => "name DESC",
            (SortField::Email, SortOrder::Asc) => "email ASC",
            (SortField::Email, SortOrder::Desc) => "email DESC",
        }
    }
}

#[async_trait::async_trait]
impl CredentialStore for MySqlCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT account_id, name, email, password_hash, is_active, created_at
FROM account
WHERE email = ?
"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_record).transpose()
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AccountRecord, AuthError> {
        let account_id = AccountId(Uuid::new_v4());
        let password_hash = self.hasher.hash_password(password).await?;
        let created_at = Utc::now();

        sqlx::query(
            r#"
INSERT INTO account (account_id, name, email, password_hash, is_active, created_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(Self::id_as_bytes(&account_id))
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .bind(true)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::DuplicateAccount
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        Ok(AccountRecord {
            account_id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            is_active: true,
            created_at,
        })
    }

    async fn verify_password(
        &self,
        account: &AccountRecord,
        password: &str,
    ) -> Result<bool, AuthError> {
        self.hasher
            .verify_password(password, &account.password_hash)
            .await
    }

    async fn count_active(&self) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM account WHERE is_active = 1"#)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(count as u64)
    }

    async fn list_active(
        &self,
        offset: u64,
        limit: u16,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> Result<Vec<AccountRecord>, AuthError> {
        let query = format!(
            r#"
SELECT account_id, name, email, password_hash, is_active, created_at
FROM account
WHERE is_active = 1
ORDER BY {}
LIMIT ? OFFSET ?
"#,
            Self::order_clause(sort_field, sort_order)
        );

        let rows = sqlx::query(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        rows.into_iter().map(Self::row_to_record).collect()
    }
}
