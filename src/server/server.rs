use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_llm::*;
use crate::infra_mem::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub assistant_service: Arc<dyn AssistantService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);

        let access_key = std::env::var("CADENZA_ACCESS_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-access-secret".to_string())
            .into_bytes();
        let refresh_key = std::env::var("CADENZA_REFRESH_TOKEN_SECRET")
            .unwrap_or_else(|_| "dev-refresh-secret".to_string())
            .into_bytes();
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
            access_key,
            refresh_key,
        }));

        let (credential_store, session_cache, pool): (
            Arc<dyn CredentialStore>,
            Arc<dyn SessionCache>,
            Option<Pool<MySql>>,
        ) = match settings.auth.backend.as_str() {
            "memory" => (
                Arc::new(MemCredentialStore::new(credential_hasher.clone())),
                Arc::new(MemSessionCache::new()),
                None,
            ),
            "real" => {
                let redis_client = redis::Client::open(settings.redis.url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                let session_cache = Arc::new(RedisSessionCache::new(
                    redis_manager,
                    settings.redis.key_prefix.clone(),
                ));

                let pool = Pool::<MySql>::connect(&settings.database.url).await?;
                let credential_store = Arc::new(MySqlCredentialStore::new(
                    pool.clone(),
                    credential_hasher.clone(),
                ));

                (credential_store, session_cache, Some(pool))
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            credential_store.clone(),
            session_cache,
            token_codec,
            settings.auth.refresh_ttl_secs,
        ));

        let user_service: Arc<dyn UserService> =
            Arc::new(RealUserService::new(credential_store));

        let completion_client: Arc<dyn CompletionClient> = match settings.assistant.backend.as_str()
        {
            "fake" => Arc::new(FakeCompletionClient::new()),
            "real" => {
                let api_key = std::env::var("CADENZA_COMPLETION_API_KEY").unwrap_or_default();
                Arc::new(HttpCompletionClient::try_new(CompletionConfig {
                    endpoint: settings.assistant.endpoint.clone(),
                    api_key,
                    temperature: settings.assistant.temperature,
                    top_p: settings.assistant.top_p,
                    timeout_secs: settings.assistant.timeout_secs,
                })?)
            }
            other => return Err(anyhow::anyhow!("Unknown assistant backend: {}", other)),
        };
        let assistant_service: Arc<dyn AssistantService> = Arc::new(RealAssistantService::new(
            completion_client,
            AssistantLimits::default(),
        ));

        info!("server started");

        Ok(Self {
            auth_service,
            user_service,
            assistant_service,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
