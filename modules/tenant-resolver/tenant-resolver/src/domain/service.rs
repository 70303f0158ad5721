//! Tenant resolution: turns a claimed identifier into a `TenantContext`.

use std::future::Future;
use std::sync::Arc;

use tenancy_context::TenantContext;
use tenant_resolver_sdk::{
    CallerIdentity, RequestMeta, ResolutionError, TenantDirectory, TenantRecord, normalize_slug,
};
use tracing::Instrument;

use super::cache::TenantCache;

/// Boundary gate run once per inbound operation.
///
/// Every branch emits exactly one structured event with
/// `category = "tenant_resolver"`. Cross-tenant attempts additionally go to
/// the `security_audit` target.
pub struct Service {
    directory: Arc<dyn TenantDirectory>,
    cache: Arc<TenantCache>,
}

impl Service {
    pub fn new(directory: Arc<dyn TenantDirectory>, cache: Arc<TenantCache>) -> Self {
        Self { directory, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<TenantCache> {
        &self.cache
    }

    /// Resolve `claimed` (slug, any casing) for an optional authenticated caller.
    ///
    /// # Errors
    /// - `HeaderMissing` when `claimed` is absent or blank
    /// - `NotFound` for unknown and inactive tenants alike
    /// - `CrossTenantAccess` when the caller belongs to another tenant
    /// - `Internal` on directory failures
    pub async fn resolve(
        &self,
        claimed: Option<&str>,
        caller: Option<&CallerIdentity>,
        meta: &RequestMeta,
    ) -> Result<TenantContext, ResolutionError> {
        let span = tracing::info_span!(
            "tenant.resolve",
            correlation_id = %meta.correlation_id,
        );
        self.resolve_inner(claimed, caller, meta).instrument(span).await
    }

    async fn resolve_inner(
        &self,
        claimed: Option<&str>,
        caller: Option<&CallerIdentity>,
        meta: &RequestMeta,
    ) -> Result<TenantContext, ResolutionError> {
        let Some(slug) = claimed.map(normalize_slug).filter(|s| !s.is_empty()) else {
            tracing::warn!(
                category = "tenant_resolver",
                event = "resolution.header_missing",
                method = %meta.method,
                path = %meta.path,
                "tenant identifier missing"
            );
            return Err(ResolutionError::HeaderMissing);
        };

        let record = match self.lookup(&slug).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(
                    category = "tenant_resolver",
                    event = "resolution.not_found",
                    tenant_slug = %slug,
                    method = %meta.method,
                    path = %meta.path,
                    "tenant not found or inactive"
                );
                return Err(ResolutionError::NotFound);
            }
            Err(err) => {
                tracing::error!(
                    category = "tenant_resolver",
                    event = "resolution.error",
                    tenant_slug = %slug,
                    error = %err,
                    "tenant lookup failed"
                );
                return Err(err);
            }
        };

        if let Some(caller) = caller
            && !caller.is_affiliated_with(&record)
        {
            tracing::error!(
                target: "security_audit",
                category = "tenant_resolver",
                event = "resolution.cross_tenant",
                severity = "HIGH",
                caller_id = %caller.id,
                caller_email = caller.email.as_deref().unwrap_or(""),
                caller_tenant = %caller.tenant,
                requested_tenant = %slug,
                method = %meta.method,
                path = %meta.path,
                client_ip = meta.client_ip.as_deref().unwrap_or(""),
                user_agent = meta.user_agent.as_deref().unwrap_or(""),
                "cross-tenant access attempt"
            );
            return Err(ResolutionError::CrossTenantAccess);
        }

        let ctx = record.to_context();
        if !ctx.is_valid() {
            tracing::error!(
                category = "tenant_resolver",
                event = "resolution.error",
                tenant_slug = %slug,
                "directory returned a record without identity"
            );
            return Err(ResolutionError::Internal("tenant record lacks identity".to_owned()));
        }

        tracing::info!(
            category = "tenant_resolver",
            event = "resolution.success",
            tenant_id = %ctx.tenant_id(),
            tenant_slug = %ctx.slug(),
            "tenant resolved"
        );
        Ok(ctx)
    }

    async fn lookup(&self, slug: &str) -> Result<Option<TenantRecord>, ResolutionError> {
        let generation = self.cache.generation();
        if let Some(hit) = self.cache.get(slug) {
            return Ok(Some(hit));
        }
        let found = self
            .directory
            .find_active_by_slug(slug)
            .await
            .map_err(|e| ResolutionError::Internal(e.to_string()))?
            .filter(|r| r.active);
        if let Some(record) = &found {
            self.cache.insert_if_unchanged(record, generation);
        }
        Ok(found)
    }

    /// Resolve, then run `f` inside a context scope for the resolved tenant.
    ///
    /// `f` is never invoked when resolution fails.
    ///
    /// # Errors
    /// Same as [`Service::resolve`]; a context the carrier refuses maps to `Internal`.
    pub async fn run_resolved<F, Fut>(
        &self,
        claimed: Option<&str>,
        caller: Option<&CallerIdentity>,
        meta: &RequestMeta,
        f: F,
    ) -> Result<Fut::Output, ResolutionError>
    where
        F: FnOnce(TenantContext) -> Fut,
        Fut: Future,
    {
        let ctx = self.resolve(claimed, caller, meta).await?;
        tenancy_context::run_with(ctx.clone(), f(ctx))
            .await
            .map_err(|e| {
                tracing::error!(
                    category = "tenant_resolver",
                    event = "resolution.error",
                    correlation_id = %meta.correlation_id,
                    error = %e,
                    "context scope could not be installed"
                );
                ResolutionError::Internal(e.to_string())
            })
    }
}
