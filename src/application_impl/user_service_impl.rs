use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::CredentialStore;
use std::sync::Arc;

pub struct RealUserService {
    credential_store: Arc<dyn CredentialStore>,
}

impl RealUserService {
    pub fn new(credential_store: Arc<dyn CredentialStore>) -> RealUserService {
        RealUserService { credential_store }
    }
}

#[async_trait::async_trait]
impl UserService for RealUserService {
    async fn list_accounts(&self, query: AccountPageQuery) -> Result<AccountPage, AuthError> {
        let PageNumber(page) = query.page.unwrap_or_default();
        let page = page.max(1);
        let PageSize(limit) = query.limit.unwrap_or_default();
        let limit = limit.clamp(1, 100);
        let sort_field = query.sort_field.unwrap_or_default();
        let sort_order = query.sort.unwrap_or_default();

        let total = self.credential_store.count_active().await?;

        let offset = u64::from(page - 1) * u64::from(limit);
        let records = self
            .credential_store
            .list_active(offset, limit, sort_field, sort_order)
            .await?
            .into_iter()
            .map(|rec| AccountInfo {
                account_id: rec.account_id,
                name: rec.name,
                email: rec.email,
            })
            .collect();

        Ok(AccountPage {
            total,
            records,
            current_page: page,
            total_pages: total.div_ceil(u64::from(limit)),
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::Argon2PasswordHasher;
    use crate::infra_mem::MemCredentialStore;

    async fn seeded_store(n: usize) -> Arc<MemCredentialStore> {
        let store = Arc::new(MemCredentialStore::new(Arc::new(Argon2PasswordHasher)));
        for i in 0..n {
            store
                .create(
                    &format!("User {:02}", i),
                    &format!("user{:02}@x.com", i),
                    "pw-eight-chars",
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn paginates_with_defaults() {
        let service = RealUserService::new(seeded_store(13).await);

        let page = service
            .list_accounts(AccountPageQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 13);
        assert_eq!(page.records.len(), 10);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.limit, 10);
    }

    #[tokio::test]
    async fn last_page_holds_the_remainder() {
        let service = RealUserService::new(seeded_store(13).await);

        let page = service
            .list_accounts(AccountPageQuery {
                page: Some(PageNumber(2)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.current_page, 2);
    }

    #[tokio::test]
    async fn sorts_by_email_descending() {
        let service = RealUserService::new(seeded_store(3).await);

        let page = service
            .list_accounts(AccountPageQuery {
                sort_field: Some(SortField::Email),
                sort: Some(SortOrder::Desc),
                ..Default::default()
            })
            .await
            .unwrap();
        let emails: Vec<_> = page.records.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, ["user02@x.com", "user01@x.com", "user00@x.com"]);
    }

    #[tokio::test]
    async fn records_carry_only_public_fields() {
        let service = RealUserService::new(seeded_store(1).await);

        let page = service
            .list_accounts(AccountPageQuery::default())
            .await
            .unwrap();
        let json = serde_json::to_value(&page.records[0]).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["name"], "User 00");
    }
}
