use crate::domain_model::AccountId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account already exists")]
    DuplicateAccount,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("invalid refresh token")]
    InvalidRefreshToken,
    #[error("token invalid")]
    TokenInvalid,
    #[error("token expired")]
    TokenExpired,
    #[error("token revoked")]
    TokenRevoked,
    #[error("validation error: {0}")]
    Validation(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public projection of an account. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Eq, PartialEq)]
pub struct AccountInfo {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub account: AccountInfo,
    pub tokens: TokenPair,
}

/// Identity attached to a request by the gate: decoded claims plus the raw
/// bearer token (logout needs the presented token string).
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
    pub bearer: String,
}

/// The claim set both tokens are signed over.
#[derive(Debug, Clone)]
pub struct IdentityClaims {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct TokenClaims {
    pub account_id: AccountId,
    pub name: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    /// One short-lived access token and one long-lived refresh token, both
    /// signed over the same claims.
    async fn issue(&self, claims: &IdentityClaims) -> Result<TokenPair, AuthError>;

    async fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Signature/expiry check only. A valid signature is necessary but not
    /// sufficient: rotation must additionally consult the session cache.
    async fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError>;

    async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError>;

    /// Denylists the presented access token and drops the account's session
    /// entry. Idempotent.
    async fn logout(&self, identity: Option<AccountId>, bearer: &str) -> Result<(), AuthError>;

    /// Exchange a live refresh token for a fresh pair, invalidating the old
    /// one. Every failure collapses to `InvalidRefreshToken`.
    async fn rotate_refresh_token(
        &self,
        account_id: AccountId,
        refresh_token: &str,
    ) -> Result<AuthSession, AuthError>;

    /// The gate's read-only path: denylist check, then signature/expiry.
    async fn authenticate(&self, bearer: &str) -> Result<AuthContext, AuthError>;
}
