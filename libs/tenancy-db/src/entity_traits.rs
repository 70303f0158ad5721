use sea_orm::EntityTrait;

/// Contract for entities whose rows belong to exactly one tenant.
///
/// The tenant column must hold a `Uuid` and is immutable once a row exists.
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Clone, Debug, PartialEq, DeriveEntityModel, TenantOwned)]
/// #[sea_orm(table_name = "orders")]
/// #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
/// pub struct Model { /* ... */ }
/// ```
pub trait TenantOwned: EntityTrait {
    /// Column storing the owning tenant id.
    fn tenant_col() -> Self::Column;

    /// Column identifying a single row, used by `find_by_id`, `update_one`
    /// and `delete_one`.
    fn id_col() -> Self::Column;
}
