//! Tenant-scoped connection wrapper.
//!
//! Repositories of tenant-owned data hold a [`TenantConn`] instead of a raw
//! `DatabaseConnection`:
//!
//! ```ignore
//! pub struct OrdersRepo {
//!     db: TenantConn,
//! }
//!
//! impl OrdersRepo {
//!     pub async fn open_orders(&self) -> Result<Vec<order::Model>, ScopeError> {
//!         self.db
//!             .find_many::<order::Entity>(Condition::all().add(order::Column::Open.eq(true)))
//!             .await
//!     }
//! }
//! ```
//!
//! The active tenant is read from the task-local context on every call, so
//! one `TenantConn` can be shared by all requests of all tenants.

use std::{future::Future, pin::Pin};

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ActiveValue, Condition, ConnectionTrait,
    DatabaseConnection, DatabaseTransaction, EntityName, EntityTrait, FromQueryResult,
    IntoActiveModel, QueryFilter, QuerySelect, TransactionTrait, Value,
};
use uuid::Uuid;

use crate::cond::{active_tenant_id, id_condition, tenant_condition};
use crate::entity_traits::TenantOwned;
use crate::error::ScopeError;
use crate::select::{AggregateShape, ScopedSelect};

/// Boxed future returned by [`TenantConn::transaction`] callbacks.
pub type TxFuture<'t, T, Err> = Pin<Box<dyn Future<Output = Result<T, Err>> + Send + 't>>;

/// Tenant-scoped database handle.
///
/// # Guarantees
///
/// - Reads, updates and deletes are narrowed to the active tenant.
/// - Inserts are stamped with the active tenant; an explicit foreign tenant id
///   is rejected with [`ScopeError::TenantMismatch`].
/// - Without an active tenant id every operation fails with
///   [`ScopeError::NoTenantContext`] before any SQL is issued.
#[derive(Clone, Debug)]
pub struct TenantConn<C = DatabaseConnection> {
    conn: C,
}

impl TenantConn<DatabaseConnection> {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl<C> TenantConn<C>
where
    C: ConnectionTrait + Send + Sync,
{
    /// Scoped select builder for `E`.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] without an active tenant.
    pub fn select<E>(&self) -> Result<ScopedSelect<'_, E, C>, ScopeError>
    where
        E: TenantOwned,
    {
        let tenant_id = active_tenant_id()?;
        Ok(ScopedSelect {
            inner: E::find().filter(tenant_condition::<E>(tenant_id)),
            conn: &self.conn,
        })
    }

    /// All rows of the active tenant matching `cond`.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn find_many<E>(&self, cond: Condition) -> Result<Vec<E::Model>, ScopeError>
    where
        E: TenantOwned,
    {
        self.select::<E>()?.filter(cond).all().await
    }

    /// First row of the active tenant matching `cond`.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn find_one<E>(&self, cond: Condition) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantOwned,
    {
        self.select::<E>()?.filter(cond).one().await
    }

    /// Row `id` if it belongs to the active tenant.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn find_by_id<E, V>(&self, id: V) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantOwned,
        V: Into<Value>,
    {
        self.find_one::<E>(id_condition::<E, _>(id)).await
    }

    /// Number of rows of the active tenant matching `cond`.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn count<E>(&self, cond: Condition) -> Result<u64, ScopeError>
    where
        E: TenantOwned,
        E::Model: FromQueryResult + Send + Sync,
    {
        self.select::<E>()?.filter(cond).count().await
    }

    /// Projection or grouping over the rows of the active tenant.
    ///
    /// `shape` receives a projection-only [`AggregateShape`] over rows already
    /// narrowed to the tenant and `cond`. It may add columns, grouping,
    /// `HAVING` and ordering; it cannot reach the `WHERE` clause, joins or set
    /// operations, so the result never includes rows of another tenant.
    ///
    /// ```ignore
    /// #[derive(FromQueryResult)]
    /// struct StatusCount { status: String, n: i64 }
    ///
    /// let per_status: Vec<StatusCount> = db
    ///     .aggregate::<order::Entity, _, _>(Condition::all(), |q| {
    ///         q.column(order::Column::Status)
    ///             .column_as(order::Column::Id.count(), "n")
    ///             .group_by(order::Column::Status)
    ///     })
    ///     .await?;
    /// ```
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn aggregate<E, T, F>(&self, cond: Condition, shape: F) -> Result<Vec<T>, ScopeError>
    where
        E: TenantOwned,
        T: FromQueryResult + Send + Sync,
        F: FnOnce(AggregateShape<E>) -> AggregateShape<E>,
    {
        let tenant_id = active_tenant_id()?;
        let scoped = E::find()
            .select_only()
            .filter(tenant_condition::<E>(tenant_id))
            .filter(cond);
        let shaped = shape(AggregateShape { inner: scoped }).inner;
        Ok(shaped.into_model::<T>().all(&self.conn).await?)
    }

    /// Insert `am`, stamping the active tenant when its tenant column is unset.
    ///
    /// # Errors
    /// - [`ScopeError::NoTenantContext`] without an active tenant
    /// - [`ScopeError::TenantMismatch`] when `am` names another tenant
    /// - [`ScopeError::Db`] if the insert fails
    pub async fn create<E>(&self, am: E::ActiveModel) -> Result<E::Model, ScopeError>
    where
        E: TenantOwned,
        E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
        E::Model: IntoActiveModel<E::ActiveModel>,
    {
        let tenant_id = active_tenant_id()?;
        let mut am = am;
        let col = E::tenant_col();
        let expected = Value::from(tenant_id);

        match am.get(col) {
            ActiveValue::NotSet => am.set(col, expected),
            ActiveValue::Set(v) | ActiveValue::Unchanged(v) => {
                if v != expected {
                    return Err(mismatch::<E>(tenant_id, &v, "create"));
                }
            }
        }

        Ok(am.insert(&self.conn).await?)
    }

    /// Update row `id` of the active tenant with the set fields of `am`.
    ///
    /// Returns `Ok(None)` when the row does not exist or belongs to another
    /// tenant. The id column of `am` is ignored.
    ///
    /// # Errors
    /// - [`ScopeError::NoTenantContext`] without an active tenant
    /// - [`ScopeError::TenantMismatch`] when `am` tries to move the row
    /// - [`ScopeError::Db`] if the statement fails
    pub async fn update_one<E, V>(
        &self,
        id: V,
        am: E::ActiveModel,
    ) -> Result<Option<E::Model>, ScopeError>
    where
        E: TenantOwned,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
        V: Into<Value>,
    {
        let tenant_id = active_tenant_id()?;
        let id: Value = id.into();
        let mut am = am;
        am.not_set(E::id_col());
        keep_tenant::<E>(&mut am, tenant_id, "update_one")?;

        if am.is_changed() {
            let result = E::update_many()
                .set(am)
                .filter(id_condition::<E, _>(id.clone()))
                .filter(tenant_condition::<E>(tenant_id))
                .exec(&self.conn)
                .await?;
            if result.rows_affected == 0 {
                return Ok(None);
            }
        }

        self.find_by_id::<E, _>(id).await
    }

    /// Update every row of the active tenant matching `cond`.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Errors
    /// - [`ScopeError::NoTenantContext`] without an active tenant
    /// - [`ScopeError::TenantMismatch`] when `am` tries to move rows
    /// - [`ScopeError::Invalid`] when `am` sets no column
    /// - [`ScopeError::Db`] if the statement fails
    pub async fn update_many<E>(&self, cond: Condition, am: E::ActiveModel) -> Result<u64, ScopeError>
    where
        E: TenantOwned,
        E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    {
        let tenant_id = active_tenant_id()?;
        let mut am = am;
        keep_tenant::<E>(&mut am, tenant_id, "update_many")?;
        if !am.is_changed() {
            return Err(ScopeError::Invalid("update_many requires at least one set column"));
        }

        let result = E::update_many()
            .set(am)
            .filter(tenant_condition::<E>(tenant_id))
            .filter(cond)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Delete row `id` of the active tenant.
    ///
    /// `Ok(false)` when the row does not exist or belongs to another tenant.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn delete_one<E, V>(&self, id: V) -> Result<bool, ScopeError>
    where
        E: TenantOwned,
        V: Into<Value>,
    {
        let affected = self.delete_many::<E>(id_condition::<E, _>(id)).await?;
        Ok(affected > 0)
    }

    /// Delete every row of the active tenant matching `cond`.
    ///
    /// # Errors
    /// [`ScopeError::NoTenantContext`] or [`ScopeError::Db`].
    pub async fn delete_many<E>(&self, cond: Condition) -> Result<u64, ScopeError>
    where
        E: TenantOwned,
    {
        let tenant_id = active_tenant_id()?;
        let result = E::delete_many()
            .filter(tenant_condition::<E>(tenant_id))
            .filter(cond)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Run `f` inside a database transaction.
    ///
    /// `f` receives a transactional `TenantConn` scoped to the same tenant.
    /// The transaction commits when `f` returns `Ok` and rolls back otherwise.
    ///
    /// ```ignore
    /// db.transaction(|tx| Box::pin(async move {
    ///     let order = tx.create::<order::Entity>(order_am).await?;
    ///     tx.create::<line::Entity>(line_am(order.id)).await?;
    ///     Ok::<_, ScopeError>(order)
    /// }))
    /// .await?;
    /// ```
    ///
    /// # Errors
    /// Whatever `f` returns, or [`ScopeError`] (converted into `Err`) when
    /// there is no active tenant or the transaction cannot begin or commit.
    pub async fn transaction<T, Err, F>(&self, f: F) -> Result<T, Err>
    where
        C: TransactionTrait,
        T: Send,
        Err: From<ScopeError> + Send,
        F: for<'t> FnOnce(&'t TenantConn<DatabaseTransaction>) -> TxFuture<'t, T, Err> + Send,
    {
        let tenant_id = active_tenant_id()?;
        let txn = self.conn.begin().await.map_err(ScopeError::from)?;
        let scoped = TenantConn { conn: txn };

        let outcome = f(&scoped).await;
        match outcome {
            Ok(value) => {
                scoped.conn.commit().await.map_err(ScopeError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = scoped.conn.rollback().await {
                    tracing::error!(
                        category = "tenant_scope",
                        event = "scope.rollback_failed",
                        tenant_id = %tenant_id,
                        error = %rollback,
                        "transaction rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

/// Reject writes that would move rows to another tenant. Writing the active
/// tenant id is dropped from the statement since it cannot change anything.
fn keep_tenant<E>(am: &mut E::ActiveModel, tenant_id: Uuid, op: &'static str) -> Result<(), ScopeError>
where
    E: TenantOwned,
    E::ActiveModel: ActiveModelTrait<Entity = E>,
{
    let col = E::tenant_col();
    if let ActiveValue::Set(v) = am.get(col) {
        if v != Value::from(tenant_id) {
            return Err(mismatch::<E>(tenant_id, &v, op));
        }
        am.not_set(col);
    }
    Ok(())
}

fn mismatch<E>(active: Uuid, attempted: &Value, op: &'static str) -> ScopeError
where
    E: TenantOwned,
{
    let entity = E::default();
    tracing::error!(
        category = "tenant_scope",
        event = "scope.tenant_mismatch",
        entity = entity.table_name(),
        operation = op,
        active_tenant = %active,
        attempted = ?attempted,
        "write targets a tenant other than the active one"
    );
    ScopeError::TenantMismatch { active }
}
