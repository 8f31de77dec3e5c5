//! Wiring of the identity cache, resolver, and account flows.

use crate::account_service::AccountService;
use crate::invalidation::InvalidationPolicy;
use crate::mailer::Mailer;
use crate::repository::IdentityRepository;
use crate::resolver::{AdminAllowList, IdentityResolver};
use crate::session::SessionAuthenticator;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;
use warden_cache::{spawn_startup_probe, CacheStore, ProbeReport};
use warden_config::AppConfig;
use warden_core::WardenResult;
use warden_security::{PasswordHasher, TokenProvider};

/// Builds the cache store described by configuration.
pub fn cache_store_from_config(config: &AppConfig) -> WardenResult<Arc<CacheStore>> {
    let backend = warden_cache::connect(&config.cache)?;
    let store = CacheStore::new(backend, &config.cache, config.app.environment);
    info!(
        backend = store.backend_name(),
        table = %store.table_name(warden_cache::CacheTable::Identity),
        reads_enabled = store.reads_enabled(),
        ttl_secs = store.ttl_secs(),
        "Identity cache configured"
    );
    Ok(Arc::new(store))
}

/// The assembled service graph.
pub struct Warden {
    pub config: AppConfig,
    pub cache: Arc<CacheStore>,
    pub resolver: Arc<IdentityResolver>,
    pub invalidation: InvalidationPolicy,
    pub accounts: Arc<AccountService>,
}

impl Warden {
    /// Wires every component from configuration and the two external seams.
    pub fn build(
        config: AppConfig,
        repository: Arc<dyn IdentityRepository>,
        mailer: Arc<dyn Mailer>,
    ) -> WardenResult<Self> {
        let cache = cache_store_from_config(&config)?;
        let tokens = Arc::new(TokenProvider::new(&config.security));
        let hasher = Arc::new(PasswordHasher::with_cost(config.security.password_hash_cost));

        let resolver = Arc::new(IdentityResolver::new(
            Arc::clone(&cache),
            Arc::clone(&repository),
            AdminAllowList::new(&config.security.admin_emails),
        ));
        let invalidation = InvalidationPolicy::new(Arc::clone(&cache));
        let session = SessionAuthenticator::new(tokens.clone(), Arc::clone(&resolver));

        let accounts = Arc::new(AccountService::new(
            repository,
            hasher,
            tokens,
            mailer,
            invalidation.clone(),
            session,
            config.security.app_url.clone(),
        ));

        Ok(Self {
            config,
            cache,
            resolver,
            invalidation,
            accounts,
        })
    }

    /// Starts background work: the one-shot cache connectivity test.
    ///
    /// Returns `None` if the process has already run it.
    pub fn start_background(&self) -> Option<JoinHandle<ProbeReport>> {
        spawn_startup_probe(Arc::clone(&self.cache))
    }
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden")
            .field("environment", &self.config.app.environment)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
