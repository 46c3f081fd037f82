use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::server::*;
use crate::settings::{DEV_JWT_SECRET, Settings};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Storage and delivery adapters the services are built on.
pub struct Backends {
    pub user_repo: Arc<dyn UserRepo>,
    pub squad_repo: Arc<dyn SquadRepo>,
    pub employee_repo: Arc<dyn EmployeeRepo>,
    pub report_repo: Arc<dyn ReportRepo>,
    pub cache_store: Arc<dyn CacheStore>,
    pub reset_notifier: Arc<dyn ResetNotifier>,
    pub pool: Option<MySqlPool>,
}

impl Backends {
    pub fn in_memory(
        store: Arc<MemoryStore>,
        cache_store: Arc<dyn CacheStore>,
        reset_notifier: Arc<dyn ResetNotifier>,
    ) -> Self {
        Backends {
            user_repo: store.clone(),
            squad_repo: store.clone(),
            employee_repo: store.clone(),
            report_repo: store,
            cache_store,
            reset_notifier,
            pool: None,
        }
    }

    async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let reset_notifier: Arc<dyn ResetNotifier> =
            Arc::new(LogResetNotifier::new(&settings.auth.frontend_url));

        let cache_store: Arc<dyn CacheStore> = match settings.cache.backend.as_str() {
            "redis" => Arc::new(RedisCacheStore::new(
                &settings.cache.url,
                settings.cache.key_prefix.clone(),
                Duration::from_millis(settings.cache.connect_timeout_ms),
                Duration::from_millis(settings.cache.response_timeout_ms),
            )?),
            "memory" => Arc::new(MemoryCacheStore::new()),
            other => return Err(anyhow::anyhow!("Unknown cache backend: {}", other)),
        };

        match settings.store.backend.as_str() {
            "mysql" => {
                let pool = MySqlPoolOptions::new()
                    .max_connections(settings.store.max_connections)
                    .connect(&settings.store.dsn)
                    .await?;
                if settings.store.run_migrations {
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    info!("database migrations applied");
                }
                Ok(Backends {
                    user_repo: Arc::new(MySqlUserRepo::new(pool.clone())),
                    squad_repo: Arc::new(MySqlSquadRepo::new(pool.clone())),
                    employee_repo: Arc::new(MySqlEmployeeRepo::new(pool.clone())),
                    report_repo: Arc::new(MySqlReportRepo::new(pool.clone())),
                    cache_store,
                    reset_notifier,
                    pool: Some(pool),
                })
            }
            "memory" => {
                warn!("using the in-memory store; data is lost on exit");
                Ok(Self::in_memory(
                    Arc::new(MemoryStore::new()),
                    cache_store,
                    reset_notifier,
                ))
            }
            other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        }
    }
}

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub squad_service: Arc<dyn SquadService>,
    pub employee_service: Arc<dyn EmployeeService>,
    pub report_service: Arc<dyn ReportService>,
    pub cache: Arc<dyn CacheService>,
    supervisor_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let backends = Backends::from_settings(settings).await?;
        Self::assemble(settings, backends).await
    }

    pub async fn assemble(settings: &Settings, backends: Backends) -> anyhow::Result<Self> {
        let auth = &settings.auth;
        if auth.jwt_secret == DEV_JWT_SECRET {
            warn!("auth.jwt_secret is the development default");
        }
        if auth.jwt_secret.is_empty() {
            return Err(anyhow::anyhow!("auth.jwt_secret must not be empty"));
        }

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(
            Argon2PasswordHasher::with_cost(
                auth.password_hash_memory_kib,
                auth.password_hash_iterations,
            )?,
        );
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            access_ttl: Duration::from_secs(auth.access_ttl_secs),
            refresh_ttl: Duration::from_secs(auth.refresh_ttl_secs),
            signing_key: auth.jwt_secret.clone().into_bytes(),
        }));

        let cache: Arc<dyn CacheService> = Arc::new(RealCacheService::new(backends.cache_store));
        if !cache.connect().await {
            warn!("cache unavailable at startup; serving from the store");
        }

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            backends.user_repo,
            credential_hasher,
            token_codec,
            backends.reset_notifier,
            Duration::from_secs(auth.reset_ttl_secs),
        ));
        let squad_service: Arc<dyn SquadService> = Arc::new(RealSquadService::new(
            backends.squad_repo.clone(),
            cache.clone(),
        ));
        let employee_service: Arc<dyn EmployeeService> = Arc::new(RealEmployeeService::new(
            backends.employee_repo.clone(),
            backends.squad_repo.clone(),
            cache.clone(),
        ));
        let report_service: Arc<dyn ReportService> = Arc::new(RealReportService::new(
            backends.report_repo,
            backends.employee_repo,
            backends.squad_repo,
            cache.clone(),
        ));

        // region runtime infra
        let cancel = CancellationToken::new();
        let supervisor_handle = match settings.cache.reconnect_interval_secs {
            0 => None,
            secs => Some(spawn_cache_supervisor(
                cache.clone(),
                Duration::from_secs(secs),
                cancel.clone(),
            )),
        };
        // endregion

        info!("server started");

        Ok(Self {
            auth_service,
            squad_service,
            employee_service,
            report_service,
            cache,
            supervisor_handle: Mutex::new(supervisor_handle),
            cancel,
            pool: backends.pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self
            .supervisor_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("cache supervisor dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
