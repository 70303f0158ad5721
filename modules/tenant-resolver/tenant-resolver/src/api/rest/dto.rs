use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenancy_context::TenantContext;
use tenant_resolver_sdk::{NewTenant, SlugRejection, SlugValidation, TenantRecord, TenantStatus};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub active: bool,
    pub status: TenantStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantRecord> for TenantDto {
    fn from(r: TenantRecord) -> Self {
        Self {
            id: r.id,
            name: r.name,
            slug: r.slug,
            active: r.active,
            status: r.status,
            trial_ends_at: r.trial_ends_at,
            subscription_ends_at: r.subscription_ends_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterTenantRequest {
    pub name: String,
    pub slug: String,
}

impl From<RegisterTenantRequest> for NewTenant {
    fn from(req: RegisterTenantRequest) -> Self {
        Self {
            name: req.name,
            slug: req.slug,
        }
    }
}

/// `subscription_ends_at` is required when moving to `paid`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: TenantStatus,
    #[serde(default)]
    pub subscription_ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlugCheckQuery {
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlugCheckDto {
    pub slug: String,
    pub valid: bool,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlugRejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl SlugCheckDto {
    pub fn new(validation: SlugValidation, available: bool) -> Self {
        Self {
            slug: validation.normalized,
            valid: validation.valid,
            available,
            reason: validation.reason,
            message: validation.reason.map(SlugRejection::message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantContextDto {
    pub tenant_id: Uuid,
    pub slug: String,
    pub name: String,
}

impl From<TenantContext> for TenantContextDto {
    fn from(ctx: TenantContext) -> Self {
        Self {
            tenant_id: ctx.tenant_id(),
            slug: ctx.slug().to_owned(),
            name: ctx.name().to_owned(),
        }
    }
}
