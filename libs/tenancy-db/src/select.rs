use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, FromQueryResult, IntoIdentity,
    IntoSimpleExpr, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
};

use crate::error::ScopeError;

/// A `Select` that already carries the tenant filter of the active context.
///
/// Obtained from [`TenantConn::select`](crate::TenantConn::select). Further
/// chaining only narrows the result set; the tenant filter stays in place.
///
/// ```ignore
/// let latest = db
///     .select::<order::Entity>()?
///     .filter(Condition::all().add(order::Column::Total.gt(100)))
///     .order_by(order::Column::CreatedAt, Order::Desc)
///     .limit(10)
///     .all()
///     .await?;
/// ```
#[must_use]
pub struct ScopedSelect<'a, E: EntityTrait, C> {
    pub(crate) inner: sea_orm::Select<E>,
    pub(crate) conn: &'a C,
}

impl<E, C> ScopedSelect<'_, E, C>
where
    E: EntityTrait,
    C: ConnectionTrait + Send + Sync,
{
    /// Add additional filters; the tenant condition remains.
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    pub fn order_by<O>(mut self, col: O, order: sea_orm::Order) -> Self
    where
        O: sea_orm::IntoSimpleExpr,
    {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.inner = QuerySelect::limit(self.inner, limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.inner = QuerySelect::offset(self.inner, offset);
        self
    }

    /// Render the statement for `backend` with values inlined.
    ///
    /// For logging and diagnostics only.
    #[must_use]
    pub fn to_sql(&self, backend: DbBackend) -> String {
        self.inner.build(backend).to_string()
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn all(self) -> Result<Vec<E::Model>, ScopeError> {
        Ok(self.inner.all(self.conn).await?)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn one(self) -> Result<Option<E::Model>, ScopeError> {
        Ok(self.inner.one(self.conn).await?)
    }

    /// # Errors
    /// Returns `ScopeError::Db` if the database query fails.
    pub async fn count(self) -> Result<u64, ScopeError>
    where
        E::Model: FromQueryResult + Send + Sync,
    {
        Ok(self.inner.count(self.conn).await?)
    }
}

/// Projection-only view of a tenant-scoped select, handed to the `shape`
/// callback of [`TenantConn::aggregate`](crate::TenantConn::aggregate).
///
/// Columns, grouping, `HAVING` and ordering can be added. The statement
/// itself is not reachable, so no join, union or `WHERE` rewrite can bring in
/// rows of another tenant.
#[must_use]
pub struct AggregateShape<E: EntityTrait> {
    pub(crate) inner: sea_orm::Select<E>,
}

impl<E: EntityTrait> AggregateShape<E> {
    pub fn column<T: ColumnTrait>(mut self, col: T) -> Self {
        self.inner = QuerySelect::column(self.inner, col);
        self
    }

    pub fn column_as<T, I>(mut self, expr: T, alias: I) -> Self
    where
        T: IntoSimpleExpr,
        I: IntoIdentity,
    {
        self.inner = QuerySelect::column_as(self.inner, expr, alias);
        self
    }

    pub fn group_by<T: IntoSimpleExpr>(mut self, col: T) -> Self {
        self.inner = QuerySelect::group_by(self.inner, col);
        self
    }

    /// Filter groups. Row selection stays with the tenant scope.
    pub fn having(mut self, cond: sea_orm::Condition) -> Self {
        self.inner = QuerySelect::having(self.inner, cond);
        self
    }

    pub fn order_by<T: IntoSimpleExpr>(mut self, col: T, order: sea_orm::Order) -> Self {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    /// Render the shaped statement for `backend` with values inlined.
    #[must_use]
    pub fn to_sql(&self, backend: DbBackend) -> String {
        self.inner.build(backend).to_string()
    }
}
