//! Storage contract for the tenant directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use uuid::Uuid;

use crate::error::TenantDirectoryError;
use crate::models::{TenantPatch, TenantRecord};

/// Durable registry of tenant records.
///
/// Slugs passed in are already normalized (trimmed, lowercase). Records are
/// never hard-deleted; deactivation flips `active`.
///
/// ```ignore
/// let directory: Arc<dyn TenantDirectory> = Arc::new(SeaOrmTenantDirectory::new(db));
/// let tenant = directory.find_active_by_slug("cafe-kopi").await?;
/// ```
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Active tenant with the given slug.
    ///
    /// Inactive and missing tenants both yield `Ok(None)`.
    async fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError>;

    /// Tenant with the given slug regardless of its active flag.
    async fn find_by_slug(&self, slug: &str)
    -> Result<Option<TenantRecord>, TenantDirectoryError>;

    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// - `SlugTaken` if another tenant already uses the slug
    async fn insert(&self, record: TenantRecord) -> Result<TenantRecord, TenantDirectoryError>;

    /// Write the fields set in `patch` and bump `updated_at` to `now`.
    ///
    /// Columns not named by the patch are left as stored.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no record has this id
    async fn update(
        &self,
        id: Uuid,
        patch: TenantPatch,
        now: DateTime<Utc>,
    ) -> Result<TenantRecord, TenantDirectoryError>;

    /// Active trial or paid tenants whose current period ended before `now`.
    async fn list_lapsed(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TenantRecord>, TenantDirectoryError>;

    /// Set status `Expired` on the tenant `id`, provided it is still active and
    /// its current period ended before `now`.
    ///
    /// The check and the write are one statement. `Ok(None)` means the tenant
    /// no longer qualifies (deactivated, renewed or changed status since it
    /// was listed).
    async fn mark_expired(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<TenantRecord>, TenantDirectoryError>;
}
