use sea_orm::{ColumnTrait, Condition, Value, sea_query::Expr};
use uuid::Uuid;

use crate::entity_traits::TenantOwned;
use crate::error::ScopeError;

/// Tenant id of the active context.
///
/// Fails closed: a missing context or a context without a tenant id (for
/// example one identified by slug only) yields
/// [`ScopeError::NoTenantContext`].
///
/// # Errors
/// [`ScopeError::NoTenantContext`] as described above.
pub fn active_tenant_id() -> Result<Uuid, ScopeError> {
    match tenancy_context::try_current() {
        Some(ctx) if !ctx.tenant_id().is_nil() => Ok(ctx.tenant_id()),
        Some(ctx) => {
            tracing::warn!(
                category = "tenant_scope",
                event = "scope.no_tenant_id",
                tenant_slug = %ctx.slug(),
                "tenant context has no tenant id; refusing data access"
            );
            Err(ScopeError::NoTenantContext)
        }
        None => {
            tracing::warn!(
                category = "tenant_scope",
                event = "scope.no_context",
                "data access attempted outside of a tenant scope"
            );
            Err(ScopeError::NoTenantContext)
        }
    }
}

/// `"<table>"."<tenant_col>" = tenant_id`, qualified so it stays unambiguous
/// when the caller joins other tables.
#[must_use]
pub fn tenant_condition<E>(tenant_id: Uuid) -> Condition
where
    E: TenantOwned,
{
    Condition::all().add(Expr::col((E::default(), E::tenant_col())).eq(tenant_id))
}

/// `"<id_col>" = id`.
#[must_use]
pub fn id_condition<E, V>(id: V) -> Condition
where
    E: TenantOwned,
    V: Into<Value>,
{
    Condition::all().add(E::id_col().eq(id))
}
