use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{AccountRecord, CredentialStore};
use chrono::Utc;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;

/// In-memory credential store, keyed by normalized email. Same hashing
/// contract as the MySQL store: the plaintext never leaves the write path.
pub struct MemCredentialStore {
    accounts: DashMap<String, AccountRecord>,
    hasher: Arc<dyn CredentialHasher>,
}

impl MemCredentialStore {
    pub fn new(hasher: Arc<dyn CredentialHasher>) -> Self {
        MemCredentialStore {
            accounts: DashMap::new(),
            hasher,
        }
    }
}

fn compare(a: &AccountRecord, b: &AccountRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, AuthError> {
        Ok(self.accounts.get(email).map(|rec| rec.value().clone()))
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AccountRecord, AuthError> {
        let password_hash = self.hasher.hash_password(password).await?;
        let record = AccountRecord {
            account_id: AccountId(uuid::Uuid::new_v4()),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            is_active: true,
            created_at: Utc::now(),
        };

        match self.accounts.entry(email.to_string()) {
            dashmap::Entry::Occupied(_) => Err(AuthError::DuplicateAccount),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
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
        Ok(self.accounts.iter().filter(|rec| rec.is_active).count() as u64)
    }

    async fn list_active(
        &self,
        offset: u64,
        limit: u16,
        sort_field: SortField,
        sort_order: SortOrder,
    ) -> Result<Vec<AccountRecord>, AuthError> {
        let mut records: Vec<AccountRecord> = self
            .accounts
            .iter()
            .filter(|rec| rec.is_active)
            .map(|rec| rec.value().clone())
            .collect();

        records.sort_by(|a, b| {
            let ord = compare(a, b, sort_field);
            match sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(records
            .into_iter()
            .skip(offset as usize)
            .take(usize::from(limit))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::Argon2PasswordHasher;

    fn store() -> MemCredentialStore {
        MemCredentialStore::new(Arc::new(Argon2PasswordHasher))
    }

    #[tokio::test]
    async fn create_hashes_the_password() {
        let store = store();
        let rec = store
            .create("Ann", "ann@x.com", "pw-eight-chars")
            .await
            .unwrap();
        assert_ne!(rec.password_hash, "pw-eight-chars");
        assert!(store.verify_password(&rec, "pw-eight-chars").await.unwrap());
        assert!(!store.verify_password(&rec, "wrong").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = store();
        store
            .create("Ann", "ann@x.com", "pw-eight-chars")
            .await
            .unwrap();
        let result = store.create("Ann Again", "ann@x.com", "other-password").await;
        assert!(matches!(result, Err(AuthError::DuplicateAccount)));
        assert_eq!(store.count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn find_by_email_misses_cleanly() {
        let store = store();
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }
}
