// Proc-macro crate for tenancy-db derives
//
//! # tenancy-db-macros
//!
//! ## `#[derive(TenantOwned)]`
//!
//! Implements `tenancy_db::TenantOwned` for the `Entity` generated next to a
//! sea-orm `Model`. Both columns must be named explicitly; there are no
//! implicit defaults.
//!
//! ```ignore
//! use sea_orm::entity::prelude::*;
//! use tenancy_db::TenantOwned;
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
//! ```

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod tenant_owned;

/// Derive macro for implementing `TenantOwned`.
///
/// # Attributes
///
/// - `tenant_col = "column_name"`: column holding the owning tenant id
/// - `id_col = "column_name"`: primary identifier column used by the
///   single-row operations
#[proc_macro_derive(TenantOwned, attributes(tenant_owned))]
#[proc_macro_error]
pub fn derive_tenant_owned(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    tenant_owned::expand_derive_tenant_owned(input).into()
}
