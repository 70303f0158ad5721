//! Wiring of the tenant resolver module.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tenant_resolver_sdk::TenantDirectory;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::rest::routes;
use crate::api::rest::TenantResolutionState;
use crate::config::TenantResolverConfig;
use crate::domain::cache::TenantCache;
use crate::domain::directory::DirectoryService;
use crate::domain::service::Service;
use crate::infra::storage::{Migrator, SeaOrmTenantDirectory};

/// Resolver and lifecycle services sharing one directory and one cache.
#[derive(Clone)]
pub struct TenantResolverModule {
    service: Arc<Service>,
    directory: Arc<DirectoryService>,
    state: TenantResolutionState,
}

impl TenantResolverModule {
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        cfg: &TenantResolverConfig,
    ) -> anyhow::Result<Self> {
        cfg.validate()?;
        let cache = Arc::new(TenantCache::new(cfg.cache_ttl, cfg.cache_capacity));
        let service = Arc::new(Service::new(Arc::clone(&directory), Arc::clone(&cache)));
        let lifecycle = Arc::new(DirectoryService::new(directory, cache, cfg.trial_delta()?));
        let state = TenantResolutionState {
            service: Arc::clone(&service),
            header_name: cfg.header()?,
            expose_context_header: cfg.expose_context_header,
        };

        tracing::info!(
            category = "tenant_resolver",
            event = "module.initialized",
            header = %state.header_name,
            cache_ttl = ?cfg.cache_ttl,
            cache_capacity = cfg.cache_capacity,
            "tenant resolver initialized"
        );
        Ok(Self {
            service,
            directory: lifecycle,
            state,
        })
    }

    /// Module backed by the `tenants` table of `db`.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn with_database(db: DatabaseConnection, cfg: &TenantResolverConfig) -> anyhow::Result<Self> {
        Self::new(Arc::new(SeaOrmTenantDirectory::new(db)), cfg)
    }

    /// Apply pending migrations of the `tenants` table.
    ///
    /// # Errors
    /// Returns an error if a migration fails.
    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        Migrator::up(db, None).await?;
        Ok(())
    }

    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<DirectoryService> {
        &self.directory
    }

    /// Background job expiring lapsed tenants every `period`.
    pub fn spawn_lapse_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let directory = Arc::clone(&self.directory);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match directory.expire_lapsed(Utc::now()).await {
                    Ok(expired) if !expired.is_empty() => tracing::info!(
                        category = "tenant_directory",
                        event = "sweep.completed",
                        expired = expired.len(),
                        "lapsed tenants expired"
                    ),
                    Ok(_) => {}
                    Err(e) => tracing::error!(
                        category = "tenant_directory",
                        event = "sweep.failed",
                        error = %e,
                        "lapse sweep failed"
                    ),
                }
            }
        })
    }

    /// Tenant administration; every route requires a `PlatformAdmin` caller.
    pub fn admin_router(&self) -> Router {
        routes::admin_router(Arc::clone(&self.directory))
    }

    /// `tenant_routes` plus `GET /me/tenant`, behind tenant resolution.
    pub fn tenant_router(&self, tenant_routes: Router) -> Router {
        routes::tenant_scoped(tenant_routes, self.state.clone())
    }

    /// Admin routes merged with `tenant_routes` placed behind tenant resolution.
    pub fn router(&self, tenant_routes: Router) -> Router {
        self.admin_router().merge(self.tenant_router(tenant_routes))
    }
}
