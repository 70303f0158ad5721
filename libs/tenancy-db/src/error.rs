use uuid::Uuid;

/// Errors that can occur during tenant-scoped data access.
#[derive(thiserror::Error, Debug)]
pub enum ScopeError {
    /// Database error occurred during query execution.
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    /// No usable tenant context is active; nothing was sent to the database.
    #[error("no tenant context is active for this operation")]
    NoTenantContext,

    /// A row was stamped with, or moved to, a tenant other than the active one.
    #[error("row targets a tenant other than the active tenant {active}")]
    TenantMismatch { active: Uuid },

    /// Invalid use of the scoped interface.
    #[error("invalid scoped operation: {0}")]
    Invalid(&'static str),
}
