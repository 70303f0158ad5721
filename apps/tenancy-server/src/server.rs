//! Server wiring: database, migrations, router and listener.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::routing::get;
use axum::{Extension, Router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tenant_resolver::{PlatformAdmin, TenantResolverModule};
use tokio::net::TcpListener;

use crate::config::{AppConfig, DatabaseConfig};

async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .connect_timeout(cfg.connect_timeout)
        .sqlx_logging(false);
    Database::connect(opts)
        .await
        .context("failed to connect to the database")
}

async fn health() -> &'static str {
    "ok"
}

/// Public router: tenant-scoped routes and `/health`.
pub fn build_router(module: &TenantResolverModule) -> Router {
    module
        .tenant_router(Router::new())
        .route("/health", get(health))
}

/// Router of the admin listener. Callers reaching it act as platform admin.
pub fn build_admin_router(module: &TenantResolverModule) -> Router {
    module
        .admin_router()
        .layer(Extension(PlatformAdmin {
            id: "admin-listener".to_owned(),
        }))
        .route("/health", get(health))
}

async fn bind(addr: SocketAddr, name: &str) -> Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {name} listener on {addr}"))?;
    tracing::info!(addr = %addr, listener = name, "tenancy server listening");
    Ok(listener)
}

async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")
}

/// Run until Ctrl-C.
///
/// # Errors
/// Fails fast when context propagation is unavailable, the database is
/// unreachable, a migration fails or the address cannot be bound.
pub async fn run(config: AppConfig) -> Result<()> {
    tenancy_context::ensure_propagation_available()
        .context("tenant context propagation is unavailable")?;

    let db = connect(&config.database).await?;
    TenantResolverModule::migrate(&db).await?;
    let module = TenantResolverModule::with_database(db, &config.tenant_resolver)?;
    let sweeper = module.spawn_lapse_sweeper(config.tenant_resolver.lapse_sweep_interval);

    let public = bind(config.server.bind_addr, "public").await?;
    match config.server.admin_bind_addr {
        Some(addr) => {
            let admin = bind(addr, "admin").await?;
            tokio::try_join!(
                serve(public, build_router(&module)),
                serve(admin, build_admin_router(&module)),
            )?;
        }
        None => serve(public, build_router(&module)).await?,
    }

    sweeper.abort();
    tracing::info!("tenancy server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    async fn module() -> TenantResolverModule {
        let db = connect(&DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        TenantResolverModule::migrate(&db).await.unwrap();
        TenantResolverModule::with_database(db, &Default::default()).unwrap()
    }

    #[tokio::test]
    async fn router_serves_health_and_guards_tenant_routes() {
        let module = module().await;
        let app = build_router(&module);

        let resp = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .oneshot(Request::get("/me/tenant").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn administration_only_on_admin_listener() {
        let module = module().await;

        let resp = build_router(&module)
            .oneshot(Request::get("/tenants/ghost-shop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("TENANT_NOT_FOUND"));

        let resp = build_admin_router(&module)
            .oneshot(Request::get("/tenants/ghost-shop").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
