//! Tenant-scoped persistence access.
//!
//! [`TenantConn`] is the only path from tenant-aware code to rows of a
//! [`TenantOwned`] entity. Every operation reads the active
//! [`tenancy_context::TenantContext`] and either narrows the statement to that
//! tenant or refuses to run it. The wrapped connection is never handed out.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use sea_orm::entity::prelude::*;
//! use tenancy_db::{TenantConn, TenantOwned};
//!
//! #[derive(Clone, Debug, PartialEq, DeriveEntityModel, TenantOwned)]
//! #[sea_orm(table_name = "orders")]
//! #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
//! pub struct Model {
//!     #[sea_orm(primary_key, auto_increment = false)]
//!     pub id: Uuid,
//!     pub tenant_id: Uuid,
//!     pub total: i64,
//! }
//!
//! // inside a tenant scope installed by the resolver
//! let open = db
//!     .find_many::<Entity>(Condition::all().add(Column::Total.gt(0)))
//!     .await?;
//! ```
//!
//! # Manual implementation
//!
//! ```rust,ignore
//! impl tenancy_db::TenantOwned for Entity {
//!     fn tenant_col() -> Self::Column {
//!         Column::TenantId
//!     }
//!     fn id_col() -> Self::Column {
//!         Column::Id
//!     }
//! }
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Lets the derive's `::tenancy_db::` paths resolve inside this crate's tests.
extern crate self as tenancy_db;

pub mod cond;
pub mod conn;
pub mod entity_traits;
pub mod error;
pub mod select;

pub use cond::{active_tenant_id, id_condition, tenant_condition};
pub use conn::TenantConn;
pub use entity_traits::TenantOwned;
pub use error::ScopeError;
pub use select::{AggregateShape, ScopedSelect};

/// Derive macro for [`TenantOwned`].
pub use tenancy_db_macros::TenantOwned;
