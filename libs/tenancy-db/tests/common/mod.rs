#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use sea_orm::{ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DbBackend, Schema};
use tenancy_context::TenantContext;
use tenancy_db::TenantConn;
use uuid::Uuid;

pub mod order {
    use sea_orm::entity::prelude::*;
    use tenancy_db::TenantOwned;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantOwned)]
    #[sea_orm(table_name = "orders")]
    #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub status: String,
        pub total: i64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Fresh in-memory database with the `orders` table.
///
/// One connection, so every task shares the same database.
pub async fn setup() -> TenantConn {
    let opts = ConnectOptions::new("sqlite::memory:")
        .max_connections(1)
        .to_owned();
    let db = Database::connect(opts).await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);
    db.execute(
        db.get_database_backend()
            .build(&schema.create_table_from_entity(order::Entity)),
    )
    .await
    .unwrap();
    TenantConn::new(db)
}

pub fn tenant(slug: &str) -> TenantContext {
    TenantContext::builder()
        .tenant_id(Uuid::new_v4())
        .slug(slug)
        .name(slug)
        .build()
}

pub fn new_order(status: &str, total: i64) -> order::ActiveModel {
    order::ActiveModel {
        id: Set(Uuid::new_v4()),
        status: Set(status.to_owned()),
        total: Set(total),
        ..Default::default()
    }
}
