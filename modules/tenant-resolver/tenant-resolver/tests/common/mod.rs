#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use axum::body::Body;
use axum::extract::Extension;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::{
    ActiveValue::Set, ConnectOptions, Condition, ConnectionTrait, Database, DatabaseConnection,
    DbBackend, Schema,
};
use serde::Deserialize;
use serde_json::Value;
use tenancy_db::TenantConn;
use tenant_resolver::api::rest::error::ProblemScope;
use tenant_resolver::{
    CallerIdentity, NewTenant, PlatformAdmin, TenantRecord, TenantResolverConfig,
    TenantResolverModule,
};
use uuid::Uuid;

pub mod note {
    use sea_orm::entity::prelude::*;
    use tenancy_db::TenantOwned;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, TenantOwned)]
    #[sea_orm(table_name = "notes")]
    #[tenant_owned(tenant_col = "tenant_id", id_col = "id")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: Uuid,
        pub tenant_id: Uuid,
        pub body: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub struct TestApp {
    pub router: Router,
    pub module: TenantResolverModule,
    pub db: DatabaseConnection,
    pub cafe: TenantRecord,
    pub warung: TenantRecord,
}

pub async fn database() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    TenantResolverModule::migrate(&db).await.unwrap();
    db
}

#[derive(Deserialize)]
struct NewNote {
    body: String,
}

async fn list_notes(Extension(conn): Extension<TenantConn>) -> Result<Json<Vec<String>>, StatusCode> {
    let notes = conn
        .find_many::<note::Entity>(Condition::all())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(notes.into_iter().map(|n| n.body).collect()))
}

async fn create_note(
    Extension(conn): Extension<TenantConn>,
    Json(req): Json<NewNote>,
) -> Result<(StatusCode, Json<Uuid>), StatusCode> {
    let created = conn
        .create::<note::Entity>(note::ActiveModel {
            id: Set(Uuid::new_v4()),
            body: Set(req.body),
            ..Default::default()
        })
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(created.id)))
}

async fn trace_id(scope: ProblemScope) -> Json<Option<String>> {
    Json(scope.trace_id)
}

/// Two active tenants, `cafe-kopi` and `warung-ani`, a tenant-scoped `/notes`
/// resource and `/trace`, which reports the correlation id handlers see.
pub async fn spawn_app(cfg: TenantResolverConfig) -> TestApp {
    let db = database().await;
    let schema = Schema::new(DbBackend::Sqlite);
    db.execute(
        db.get_database_backend()
            .build(&schema.create_table_from_entity(note::Entity)),
    )
    .await
    .unwrap();

    let module = TenantResolverModule::with_database(db.clone(), &cfg).unwrap();
    let cafe = register(&module, "Cafe Kopi", "cafe-kopi").await;
    let warung = register(&module, "Warung Ani", "warung-ani").await;

    let tenant_routes = Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/trace", get(trace_id))
        .layer(Extension(TenantConn::new(db.clone())));
    let router = module.router(tenant_routes);

    TestApp {
        router,
        module,
        db,
        cafe,
        warung,
    }
}

pub async fn register(module: &TenantResolverModule, name: &str, slug: &str) -> TenantRecord {
    module
        .directory()
        .register(NewTenant {
            name: name.to_owned(),
            slug: slug.to_owned(),
        })
        .await
        .unwrap()
}

pub fn caller_of(tenant: &TenantRecord) -> CallerIdentity {
    CallerIdentity {
        id: "user-1".to_owned(),
        email: Some("owner@example.test".to_owned()),
        tenant: tenant.id.to_string(),
    }
}

pub struct Req {
    method: &'static str,
    uri: String,
    tenant: Option<String>,
    request_id: Option<String>,
    caller: Option<CallerIdentity>,
    admin: bool,
    body: Option<String>,
}

impl Req {
    pub fn new(method: &'static str, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            tenant: None,
            request_id: None,
            caller: None,
            admin: false,
            body: None,
        }
    }

    pub fn tenant(mut self, slug: &str) -> Self {
        self.tenant = Some(slug.to_owned());
        self
    }

    pub fn request_id(mut self, id: &str) -> Self {
        self.request_id = Some(id.to_owned());
        self
    }

    pub fn caller(mut self, caller: CallerIdentity) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Authenticated as a platform administrator.
    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn json(mut self, body: &Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn raw_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_owned());
        self
    }

    pub fn build(self) -> Request<Body> {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(t) = self.tenant {
            builder = builder.header("x-tenant-id", t);
        }
        if let Some(id) = self.request_id {
            builder = builder.header("x-request-id", id);
        }
        let body = match self.body {
            Some(b) => {
                builder = builder.header("content-type", "application/json");
                Body::from(b)
            }
            None => Body::empty(),
        };
        let mut req = builder.body(body).unwrap();
        if let Some(c) = self.caller {
            req.extensions_mut().insert(c);
        }
        if self.admin {
            req.extensions_mut().insert(PlatformAdmin {
                id: "ops-1".to_owned(),
            });
        }
        req
    }
}

pub async fn body_json(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
