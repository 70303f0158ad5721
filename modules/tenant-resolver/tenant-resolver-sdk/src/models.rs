//! Domain models for the tenant resolver module.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenancy_context::TenantContext;
use uuid::Uuid;

/// A tenant as stored in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    pub id: Uuid,
    pub name: String,
    /// Normalized (lowercase) and unique.
    pub slug: String,
    /// Soft-deactivation flag; inactive tenants never resolve.
    pub active: bool,
    pub status: TenantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRecord {
    /// Context value installed for operations of this tenant.
    #[must_use]
    pub fn to_context(&self) -> TenantContext {
        TenantContext::new(self.id, self.slug.clone(), self.name.clone())
    }

    /// Whether the current trial or subscription period ended before `now`.
    #[must_use]
    pub fn is_lapsed(&self, now: DateTime<Utc>) -> bool {
        let ends_at = match self.status {
            TenantStatus::Trial => self.trial_ends_at,
            TenantStatus::Paid => self.subscription_ends_at,
            TenantStatus::Expired | TenantStatus::Suspended => None,
        };
        ends_at.is_some_and(|t| t < now)
    }
}

/// Billing lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    #[default]
    Trial,
    Paid,
    Expired,
    Suspended,
}

impl TenantStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Paid => "paid",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(Self::Trial),
            "paid" => Ok(Self::Paid),
            "expired" => Ok(Self::Expired),
            "suspended" => Ok(Self::Suspended),
            other => Err(format!("unknown tenant status '{other}'")),
        }
    }
}

/// Column-level change for [`TenantDirectory::update`](crate::TenantDirectory::update).
///
/// Unset fields keep their stored value, so concurrent changes to different
/// columns never overwrite each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TenantPatch {
    pub active: Option<bool>,
    pub status: Option<TenantStatus>,
    pub subscription_ends_at: Option<DateTime<Utc>>,
}

impl TenantPatch {
    #[must_use]
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn status(status: TenantStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Apply the set fields to an in-memory record.
    pub fn apply_to(&self, record: &mut TenantRecord) {
        if let Some(active) = self.active {
            record.active = active;
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(until) = self.subscription_ends_at {
            record.subscription_ends_at = Some(until);
        }
    }
}

/// Input for tenant onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTenant {
    pub name: String,
    pub slug: String,
}

/// Pre-authenticated caller, placed in request extensions by the
/// authentication layer in front of the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Tenant the caller belongs to, as an id or a slug.
    pub tenant: String,
}

impl CallerIdentity {
    /// Affiliation matches the tenant's id or slug, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn is_affiliated_with(&self, tenant: &TenantRecord) -> bool {
        let affiliation = self.tenant.trim();
        affiliation.eq_ignore_ascii_case(&tenant.slug)
            || Uuid::parse_str(affiliation).is_ok_and(|id| id == tenant.id)
    }
}

/// Platform operator allowed to administer tenants. Placed in request
/// extensions by the authentication layer, next to [`CallerIdentity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformAdmin {
    pub id: String,
}

/// Request metadata recorded in resolution logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: String,
    pub path: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub correlation_id: String,
}
