use super::{AccountInfo, AuthError};
use crate::domain_model::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountPageQuery {
    pub page: Option<PageNumber>,
    pub limit: Option<PageSize>,
    pub sort_field: Option<SortField>,
    pub sort: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountPage {
    pub total: u64,
    pub records: Vec<AccountInfo>,
    pub current_page: u32,
    pub total_pages: u64,
    pub limit: u16,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Paginated listing of active accounts, projected to public fields.
    async fn list_accounts(&self, query: AccountPageQuery) -> Result<AccountPage, AuthError>;
}
