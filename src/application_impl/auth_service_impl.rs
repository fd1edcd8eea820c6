use crate::application_port::*;
use crate::domain_model::{AccountId, SessionState};
use crate::domain_port::{denylist_key, refresh_key, CredentialStore, SessionCache};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::InternalError(format!("verify error: {}", e))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// Access and refresh tokens are signed with independent secrets so a
    /// leaked refresh key cannot mint access tokens, and vice versa.
    pub access_key: Vec<u8>,
    pub refresh_key: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // account id as string
    name: String,
    email: String,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
}

fn encode_token(
    identity: &IdentityClaims,
    key: &[u8],
    ttl: Duration,
    cfg: &JwtConfig,
) -> Result<(String, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = iat_dt + ttl;
    let claims = Claims {
        sub: identity.account_id.to_string(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key),
    )
    .map_err(|e| AuthError::InternalError(e.to_string()))?;
    Ok((token, exp_dt))
}

fn decode_token(token: &str, key: &[u8], cfg: &JwtConfig) -> Result<TokenClaims, AuthError> {
    let mut v = Validation::new(Algorithm::HS256);
    v.validate_exp = true;
    v.set_audience(&[cfg.audience.clone()]);
    v.set_issuer(&[cfg.issuer.clone()]);
    let data =
        decode::<Claims>(token, &DecodingKey::from_secret(key), &v).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        })?;

    let account_id = data
        .claims
        .sub
        .parse::<AccountId>()
        .map_err(|_| AuthError::TokenInvalid)?;

    Ok(TokenClaims {
        account_id,
        name: data.claims.name,
        email: data.claims.email,
        issued_at: DateTime::from_timestamp(data.claims.iat, 0).unwrap_or_else(Utc::now),
        expires_at: DateTime::from_timestamp(data.claims.exp, 0).unwrap_or_else(Utc::now),
    })
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue(&self, claims: &IdentityClaims) -> Result<TokenPair, AuthError> {
        let (access_token, access_exp) =
            encode_token(claims, &self.cfg.access_key, self.cfg.access_ttl, &self.cfg)?;
        let (refresh_token, refresh_exp) = encode_token(
            claims,
            &self.cfg.refresh_key,
            self.cfg.refresh_ttl,
            &self.cfg,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    async fn verify_access(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode_token(token, &self.cfg.access_key, &self.cfg)
    }

    async fn verify_refresh(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode_token(token, &self.cfg.refresh_key, &self.cfg)
    }
}

/// Marker value stored under a denylist key.
const REVOKED: &str = "revoked";

pub struct RealAuthService {
    credential_store: Arc<dyn CredentialStore>,
    session_cache: Arc<dyn SessionCache>,
    token_codec: Arc<dyn TokenCodec>,
    /// Upper bound used when the remaining validity of a revoked token is
    /// unknown. Set to the refresh-token lifetime.
    denylist_ttl_secs: u64,
    min_password_len: usize,
}

impl RealAuthService {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        session_cache: Arc<dyn SessionCache>,
        token_codec: Arc<dyn TokenCodec>,
        denylist_ttl_secs: u64,
    ) -> Self {
        Self {
            credential_store,
            session_cache,
            token_codec,
            denylist_ttl_secs,
            min_password_len: 8,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn validate_register(&self, input: &RegisterInput) -> Result<(), AuthError> {
        if input.name.trim().is_empty() {
            return Err(AuthError::Validation("name must not be empty".to_string()));
        }
        let email = Self::normalize_email(&input.email);
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(AuthError::Validation("email is not valid".to_string()));
        }
        if input.password.len() < self.min_password_len {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        Ok(())
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let secs = (until - Utc::now()).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    /// Issue a token pair and record the refresh token as the account's one
    /// live session entry. A cache failure here surfaces to the caller; the
    /// tokens are never returned without the entry being written.
    async fn issue_session(&self, identity: IdentityClaims) -> Result<AuthSession, AuthError> {
        let tokens = self.token_codec.issue(&identity).await?;

        let ttl_secs = Self::ttl_secs(tokens.refresh_token_expires_at);
        self.session_cache
            .set_with_expiry(
                &refresh_key(identity.account_id),
                &tokens.refresh_token,
                ttl_secs,
            )
            .await?;

        Ok(AuthSession {
            account: AccountInfo {
                account_id: identity.account_id,
                name: identity.name,
                email: identity.email,
            },
            tokens,
        })
    }

    /// Tagged view of the cache entry for an account, for tests and
    /// diagnostics.
    pub async fn session_state(&self, account_id: AccountId) -> Result<SessionState, AuthError> {
        match self.session_cache.get(&refresh_key(account_id)).await? {
            Some(refresh_token) => Ok(SessionState::Active { refresh_token }),
            None => Ok(SessionState::Missing),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let email = Self::normalize_email(&input.email);

        // Unknown email, inactive account and wrong password all collapse to
        // the same error so the endpoint cannot be used for enumeration.
        let rec = self
            .credential_store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !rec.is_active {
            debug!(account_id = %rec.account_id, "login rejected: account inactive");
            return Err(AuthError::InvalidCredentials);
        }

        let ok = self
            .credential_store
            .verify_password(&rec, &input.password)
            .await?;
        if !ok {
            debug!(account_id = %rec.account_id, "login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        // Eager invalidation: a login always revokes the previous refresh
        // token, so a fixated or stolen session does not outlive it.
        self.session_cache
            .get_and_delete(&refresh_key(rec.account_id))
            .await?;

        self.issue_session(IdentityClaims {
            account_id: rec.account_id,
            name: rec.name,
            email: rec.email,
        })
        .await
    }

    async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        self.validate_register(&input)?;
        let email = Self::normalize_email(&input.email);

        if self.credential_store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateAccount);
        }

        let rec = self
            .credential_store
            .create(input.name.trim(), &email, &input.password)
            .await?;

        self.issue_session(IdentityClaims {
            account_id: rec.account_id,
            name: rec.name,
            email: rec.email,
        })
        .await
    }

    async fn logout(&self, identity: Option<AccountId>, bearer: &str) -> Result<(), AuthError> {
        let account_id = identity.ok_or(AuthError::NotAuthenticated)?;

        // Both writes are idempotent: re-denylisting a token and deleting an
        // absent entry are no-ops in the cache.
        self.session_cache
            .set_with_expiry(&denylist_key(bearer), REVOKED, self.denylist_ttl_secs)
            .await?;
        self.session_cache
            .delete(&refresh_key(account_id))
            .await?;

        debug!(%account_id, "session closed");
        Ok(())
    }

    async fn rotate_refresh_token(
        &self,
        account_id: AccountId,
        refresh_token: &str,
    ) -> Result<AuthSession, AuthError> {
        // Every deny branch collapses to InvalidRefreshToken for the client;
        // the distinct causes are only visible in the logs.
        let key = refresh_key(account_id);

        let Some(stored) = self.session_cache.get(&key).await? else {
            debug!(%account_id, "refresh rejected: no live session");
            return Err(AuthError::InvalidRefreshToken);
        };

        if stored != refresh_token {
            debug!(%account_id, "refresh rejected: not the live token");
            return Err(AuthError::InvalidRefreshToken);
        }

        if self
            .session_cache
            .get(&denylist_key(refresh_token))
            .await?
            .is_some()
        {
            debug!(%account_id, "refresh rejected: token denylisted");
            return Err(AuthError::InvalidRefreshToken);
        }

        let claims = match self.token_codec.verify_refresh(refresh_token).await {
            Ok(claims) => claims,
            Err(e) => {
                debug!(%account_id, cause = %e, "refresh rejected: verification failed");
                return Err(AuthError::InvalidRefreshToken);
            }
        };
        if claims.account_id != account_id {
            debug!(%account_id, "refresh rejected: subject mismatch");
            return Err(AuthError::InvalidRefreshToken);
        }

        // Consume the presented token: denylist it for its remaining life so
        // an in-flight duplicate cannot reuse it, then remove the session
        // entry. The read-and-delete plus re-compare means that of two
        // concurrent rotations with the same token, only the first wins.
        self.session_cache
            .set_with_expiry(
                &denylist_key(refresh_token),
                REVOKED,
                Self::ttl_secs(claims.expires_at),
            )
            .await?;
        match self.session_cache.get_and_delete(&key).await? {
            Some(current) if current == refresh_token => {}
            _ => {
                debug!(%account_id, "refresh rejected: lost rotation race");
                return Err(AuthError::InvalidRefreshToken);
            }
        }

        self.issue_session(IdentityClaims {
            account_id,
            name: claims.name,
            email: claims.email,
        })
        .await
    }

    async fn authenticate(&self, bearer: &str) -> Result<AuthContext, AuthError> {
        if self
            .session_cache
            .get(&denylist_key(bearer))
            .await?
            .is_some()
        {
            debug!("bearer rejected: token denylisted");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.token_codec.verify_access(bearer).await?;

        Ok(AuthContext {
            account_id: claims.account_id,
            name: claims.name,
            email: claims.email,
            bearer: bearer.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_mem::{MemCredentialStore, MemSessionCache};

    fn test_codec() -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            issuer: "cadenza.test".to_string(),
            audience: "cadenza-client".to_string(),
            access_ttl: Duration::from_secs(60),
            refresh_ttl: Duration::from_secs(3600),
            access_key: b"test-access-secret".to_vec(),
            refresh_key: b"test-refresh-secret".to_vec(),
        })
    }

    fn test_service() -> RealAuthService {
        let hasher = Arc::new(Argon2PasswordHasher);
        RealAuthService::new(
            Arc::new(MemCredentialStore::new(hasher)),
            Arc::new(MemSessionCache::new()),
            Arc::new(test_codec()),
            3600,
        )
    }

    fn ann() -> RegisterInput {
        RegisterInput {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "pw-eight-chars".to_string(),
        }
    }

    fn identity() -> IdentityClaims {
        IdentityClaims {
            account_id: AccountId(uuid::Uuid::new_v4()),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
        }
    }

    #[tokio::test]
    async fn issue_and_verify_roundtrip() {
        let codec = test_codec();
        let identity = identity();

        let pair = codec.issue(&identity).await.unwrap();
        assert_ne!(pair.access_token, pair.refresh_token);
        assert!(pair.refresh_token_expires_at > pair.access_token_expires_at);

        let access = codec.verify_access(&pair.access_token).await.unwrap();
        assert_eq!(access.account_id, identity.account_id);
        assert_eq!(access.name, "Ann");
        assert_eq!(access.email, "ann@x.com");

        let refresh = codec.verify_refresh(&pair.refresh_token).await.unwrap();
        assert_eq!(refresh.account_id, identity.account_id);
    }

    #[tokio::test]
    async fn tokens_do_not_cross_verify() {
        let codec = test_codec();
        let pair = codec.issue(&identity()).await.unwrap();

        // The access secret must not validate a refresh token, and the other
        // way round.
        assert!(matches!(
            codec.verify_access(&pair.refresh_token).await,
            Err(AuthError::TokenInvalid)
        ));
        assert!(matches!(
            codec.verify_refresh(&pair.access_token).await,
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let codec = test_codec();
        let identity = identity();

        let claims = Claims {
            sub: identity.account_id.to_string(),
            name: identity.name.clone(),
            email: identity.email.clone(),
            exp: (Utc::now() - Duration::from_secs(600)).timestamp(),
            iat: (Utc::now() - Duration::from_secs(1200)).timestamp(),
            iss: "cadenza.test".to_string(),
            aud: "cadenza-client".to_string(),
        };
        let stale = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-access-secret"),
        )
        .unwrap();

        assert!(matches!(
            codec.verify_access(&stale).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn tampered_token_rejected() {
        let codec = test_codec();
        let pair = codec.issue(&identity()).await.unwrap();

        let mut forged = pair.access_token.clone();
        forged.pop();
        forged.push('A');

        assert!(matches!(
            codec.verify_access(&forged).await,
            Err(AuthError::TokenInvalid)
        ));
    }

    #[tokio::test]
    async fn login_tracks_exactly_one_session_entry() {
        let service = test_service();
        let registered = service.register(ann()).await.unwrap();
        let account_id = registered.account.account_id;

        let logged_in = service
            .login(LoginInput {
                email: "ann@x.com".to_string(),
                password: "pw-eight-chars".to_string(),
            })
            .await
            .unwrap();

        let state = service.session_state(account_id).await.unwrap();
        assert_eq!(
            state,
            SessionState::Active {
                refresh_token: logged_in.tokens.refresh_token.clone()
            }
        );
    }

    #[tokio::test]
    async fn second_login_invalidates_first_refresh_token() {
        let service = test_service();
        service.register(ann()).await.unwrap();

        let input = LoginInput {
            email: "ann@x.com".to_string(),
            password: "pw-eight-chars".to_string(),
        };
        let first = service.login(input.clone()).await.unwrap();
        let second = service.login(input).await.unwrap();
        assert_ne!(first.tokens.refresh_token, second.tokens.refresh_token);

        let replay = service
            .rotate_refresh_token(first.account.account_id, &first.tokens.refresh_token)
            .await;
        assert!(matches!(replay, Err(AuthError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn rotation_is_single_use() {
        let service = test_service();
        let session = service.register(ann()).await.unwrap();
        let account_id = session.account.account_id;
        let original = session.tokens.refresh_token.clone();

        let rotated = service
            .rotate_refresh_token(account_id, &original)
            .await
            .unwrap();
        assert_ne!(rotated.tokens.refresh_token, original);
        assert_eq!(rotated.account.account_id, account_id);
        assert_eq!(rotated.account.name, "Ann");
        assert_eq!(rotated.account.email, "ann@x.com");

        // The consumed token is still valid by signature and expiry, but the
        // session entry now holds the new one.
        let replay = service.rotate_refresh_token(account_id, &original).await;
        assert!(matches!(replay, Err(AuthError::InvalidRefreshToken)));

        // The new token keeps working.
        service
            .rotate_refresh_token(account_id, &rotated.tokens.refresh_token)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rotation_rejects_foreign_account_id() {
        let service = test_service();
        let session = service.register(ann()).await.unwrap();

        let other = AccountId(uuid::Uuid::new_v4());
        let result = service
            .rotate_refresh_token(other, &session.tokens.refresh_token)
            .await;
        assert!(matches!(result, Err(AuthError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let service = test_service();
        let session = service.register(ann()).await.unwrap();
        let account_id = session.account.account_id;
        let bearer = session.tokens.access_token.clone();

        service.logout(Some(account_id), &bearer).await.unwrap();
        service.logout(Some(account_id), &bearer).await.unwrap();

        assert_eq!(
            service.session_state(account_id).await.unwrap(),
            SessionState::Missing
        );
    }

    #[tokio::test]
    async fn logout_requires_identity() {
        let service = test_service();
        let result = service.logout(None, "some-token").await;
        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn logged_out_access_token_is_rejected() {
        let service = test_service();
        let session = service.register(ann()).await.unwrap();
        let bearer = session.tokens.access_token.clone();

        // Accepted while the session is live.
        service.authenticate(&bearer).await.unwrap();

        service
            .logout(Some(session.account.account_id), &bearer)
            .await
            .unwrap();

        // Unexpired, signature-valid, and still refused.
        assert!(matches!(
            service.authenticate(&bearer).await,
            Err(AuthError::TokenRevoked)
        ));
    }

    #[tokio::test]
    async fn duplicate_register_leaves_session_untouched() {
        let service = test_service();
        let first = service.register(ann()).await.unwrap();

        let result = service.register(ann()).await;
        assert!(matches!(result, Err(AuthError::DuplicateAccount)));

        // The failed attempt performed no session entry write.
        assert_eq!(
            service
                .session_state(first.account.account_id)
                .await
                .unwrap(),
            SessionState::Active {
                refresh_token: first.tokens.refresh_token.clone()
            }
        );
    }

    #[tokio::test]
    async fn register_rotate_replay_scenario() {
        let service = test_service();

        let session = service.register(ann()).await.unwrap();
        assert_eq!(session.account.name, "Ann");
        assert_eq!(session.account.email, "ann@x.com");
        let account_id = session.account.account_id;
        let original = session.tokens.refresh_token.clone();

        let rotated = service
            .rotate_refresh_token(account_id, &original)
            .await
            .unwrap();
        assert_ne!(rotated.tokens.refresh_token, original);

        let replay = service.rotate_refresh_token(account_id, &original).await;
        assert!(matches!(replay, Err(AuthError::InvalidRefreshToken)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let service = test_service();
        service.register(ann()).await.unwrap();

        let wrong_password = service
            .login(LoginInput {
                email: "ann@x.com".to_string(),
                password: "not-her-password".to_string(),
            })
            .await;
        let unknown_email = service
            .login(LoginInput {
                email: "nobody@x.com".to_string(),
                password: "pw-eight-chars".to_string(),
            })
            .await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn email_is_normalized_on_register_and_login() {
        let service = test_service();
        let session = service
            .register(RegisterInput {
                name: "Ann".to_string(),
                email: "  Ann@X.Com ".to_string(),
                password: "pw-eight-chars".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.account.email, "ann@x.com");

        service
            .login(LoginInput {
                email: "ANN@x.com".to_string(),
                password: "pw-eight-chars".to_string(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_rejects_malformed_input() {
        let service = test_service();

        let bad_email = service
            .register(RegisterInput {
                name: "Ann".to_string(),
                email: "not-an-email".to_string(),
                password: "pw-eight-chars".to_string(),
            })
            .await;
        assert!(matches!(bad_email, Err(AuthError::Validation(_))));

        let short_password = service
            .register(RegisterInput {
                name: "Ann".to_string(),
                email: "ann@x.com".to_string(),
                password: "short".to_string(),
            })
            .await;
        assert!(matches!(short_password, Err(AuthError::Validation(_))));
    }
}
