//! Tenant lifecycle: onboarding, billing transitions and deactivation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tenant_resolver_sdk::{
    NewTenant, SlugValidation, TenantDirectory, TenantDirectoryError, TenantPatch, TenantRecord,
    TenantStatus, normalize_slug, validate_slug,
};
use uuid::Uuid;

use super::cache::TenantCache;
use super::error::DomainError;

const NAME_MAX_LEN: usize = 200;

/// Lifecycle operations over the tenant directory.
///
/// Every mutation invalidates the resolver cache entry of the tenant it touched.
/// Writes go through [`TenantPatch`] or `mark_expired`, so they only touch the
/// columns they change.
pub struct DirectoryService {
    directory: Arc<dyn TenantDirectory>,
    cache: Arc<TenantCache>,
    trial_period: Duration,
}

impl DirectoryService {
    pub fn new(
        directory: Arc<dyn TenantDirectory>,
        cache: Arc<TenantCache>,
        trial_period: Duration,
    ) -> Self {
        Self {
            directory,
            cache,
            trial_period,
        }
    }

    /// Onboard a tenant in `Trial` status.
    ///
    /// # Errors
    /// `Validation` for a blank or overlong name, `InvalidSlug`, `SlugTaken`.
    pub async fn register(&self, new: NewTenant) -> Result<TenantRecord, DomainError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "name must not be empty"));
        }
        if name.chars().count() > NAME_MAX_LEN {
            return Err(DomainError::validation(
                "name",
                format!("name must be at most {NAME_MAX_LEN} characters long"),
            ));
        }
        let slug = validate_slug(&new.slug)
            .into_result()
            .map_err(|reason| DomainError::InvalidSlug {
                slug: new.slug.trim().to_owned(),
                reason,
            })?;

        if self.directory.find_by_slug(&slug).await?.is_some() {
            return Err(DomainError::SlugTaken { slug });
        }

        let now = Utc::now();
        let record = TenantRecord {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            slug,
            active: true,
            status: TenantStatus::Trial,
            trial_ends_at: Some(now + self.trial_period),
            subscription_ends_at: None,
            created_at: now,
            updated_at: now,
        };
        // The unique index still reports SlugTaken if a concurrent registration won.
        let record = self.directory.insert(record).await?;
        self.cache.invalidate(&record.slug);

        tracing::info!(
            category = "tenant_directory",
            event = "tenant.registered",
            tenant_id = %record.id,
            tenant_slug = %record.slug,
            trial_ends_at = ?record.trial_ends_at,
            "tenant registered"
        );
        Ok(record)
    }

    /// Tenant by slug, active or not.
    ///
    /// # Errors
    /// `NotFound` if no tenant uses the slug.
    pub async fn get(&self, slug: &str) -> Result<TenantRecord, DomainError> {
        let slug = normalize_slug(slug);
        self.directory
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| DomainError::not_found(slug))
    }

    /// Syntax and availability of a candidate slug.
    ///
    /// # Errors
    /// Directory failures only.
    pub async fn check_slug(&self, candidate: &str) -> Result<(SlugValidation, bool), DomainError> {
        let validation = validate_slug(candidate);
        let available = if validation.valid {
            self.directory
                .find_by_slug(&validation.normalized)
                .await?
                .is_none()
        } else {
            false
        };
        Ok((validation, available))
    }

    /// # Errors
    /// `NotFound` if no tenant uses the slug.
    pub async fn set_status(
        &self,
        slug: &str,
        status: TenantStatus,
    ) -> Result<TenantRecord, DomainError> {
        self.mutate(slug, "tenant.status_changed", TenantPatch::status(status))
            .await
    }

    /// Switch to `Paid` until `until`.
    ///
    /// # Errors
    /// `Validation` if `until` is not in the future, `NotFound`.
    pub async fn activate_subscription(
        &self,
        slug: &str,
        until: DateTime<Utc>,
    ) -> Result<TenantRecord, DomainError> {
        if until <= Utc::now() {
            return Err(DomainError::validation(
                "subscription_ends_at",
                "subscription end must be in the future",
            ));
        }
        let patch = TenantPatch {
            status: Some(TenantStatus::Paid),
            subscription_ends_at: Some(until),
            ..TenantPatch::default()
        };
        self.mutate(slug, "tenant.subscription_activated", patch)
            .await
    }

    /// Soft-deactivate; the tenant stops resolving immediately.
    ///
    /// # Errors
    /// `NotFound` if no tenant uses the slug.
    pub async fn deactivate(&self, slug: &str) -> Result<TenantRecord, DomainError> {
        self.mutate(slug, "tenant.deactivated", TenantPatch::active(false))
            .await
    }

    /// # Errors
    /// `NotFound` if no tenant uses the slug.
    pub async fn reactivate(&self, slug: &str) -> Result<TenantRecord, DomainError> {
        self.mutate(slug, "tenant.reactivated", TenantPatch::active(true))
            .await
    }

    /// Mark every trial or subscription that ended before `now` as `Expired`.
    ///
    /// Runs per tenant inside that tenant's context scope. A tenant that was
    /// deactivated or renewed after the listing is skipped.
    ///
    /// # Errors
    /// The first directory failure; tenants expired before it stay expired.
    pub async fn expire_lapsed(&self, now: DateTime<Utc>) -> Result<Vec<TenantRecord>, DomainError> {
        let lapsed = self.directory.list_lapsed(now).await?;
        let mut expired = Vec::with_capacity(lapsed.len());
        for record in lapsed {
            let directory = Arc::clone(&self.directory);
            let id = record.id;
            let outcome = tenancy_context::run_with(record.to_context(), async move {
                directory.mark_expired(id, now).await
            })
            .await
            .map_err(|e| DomainError::Directory(e.to_string()))??;

            let Some(updated) = outcome else {
                tracing::debug!(
                    category = "tenant_directory",
                    event = "tenant.expire_skipped",
                    tenant_id = %record.id,
                    tenant_slug = %record.slug,
                    "tenant changed since listing"
                );
                continue;
            };
            self.cache.invalidate(&updated.slug);
            tracing::info!(
                category = "tenant_directory",
                event = "tenant.expired",
                tenant_id = %updated.id,
                tenant_slug = %updated.slug,
                "tenant period lapsed"
            );
            expired.push(updated);
        }
        Ok(expired)
    }

    async fn mutate(
        &self,
        slug: &str,
        event: &'static str,
        patch: TenantPatch,
    ) -> Result<TenantRecord, DomainError> {
        let current = self.get(slug).await?;
        let record = self
            .directory
            .update(current.id, patch, Utc::now())
            .await
            .map_err(|e| match e {
                TenantDirectoryError::NotFound { .. } => DomainError::not_found(&current.slug),
                other => other.into(),
            })?;
        self.cache.invalidate(&record.slug);

        tracing::info!(
            category = "tenant_directory",
            event,
            tenant_id = %record.id,
            tenant_slug = %record.slug,
            status = %record.status,
            active = record.active,
            "tenant updated"
        );
        Ok(record)
    }
}
