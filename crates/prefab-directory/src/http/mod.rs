//! Composes the feature routers into the directory's HTTP surface.

pub mod extract;

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::Router;
use chrono::Duration;

use crate::accounts::{
    auth_router, require_admin, require_session, session_router, users_admin_router,
    AccountService,
};
use crate::blog::{blog_admin_router, blog_router, BlogService};
use crate::builders::{builders_admin_router, BuilderService};
use crate::catalog::{catalog_admin_router, catalog_router, CatalogService};
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::leads::{leads_admin_router, leads_router, LeadService};
use crate::storage::SqliteStore;
use crate::uploads::{uploads_admin_router, uploads_router, UploadStore};

/// Every service the routers need, sharing one store.
#[derive(Clone)]
pub struct DirectoryServices {
    pub catalog: Arc<CatalogService>,
    pub blog: Arc<BlogService>,
    pub leads: Arc<LeadService>,
    pub builders: Arc<BuilderService>,
    pub accounts: Arc<AccountService>,
    pub uploads: Arc<UploadStore>,
}

impl DirectoryServices {
    pub fn new(store: Arc<SqliteStore>, uploads: UploadStore, session_ttl: Duration) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(store.clone(), store.clone())),
            blog: Arc::new(BlogService::new(store.clone(), store.clone())),
            leads: Arc::new(LeadService::new(store.clone())),
            builders: Arc::new(BuilderService::new(store.clone())),
            accounts: Arc::new(AccountService::new(store, session_ttl)),
            uploads: Arc::new(uploads),
        }
    }

    pub fn from_config(store: Arc<SqliteStore>, config: &AppConfig) -> Self {
        Self::new(
            store,
            UploadStore::from_config(&config.uploads),
            Duration::hours(config.auth.session_ttl_hours),
        )
    }
}

/// Public routes, editor routes behind a session, and user administration behind the admin role.
pub fn directory_router(services: &DirectoryServices) -> Router {
    let accounts = services.accounts.clone();

    let public = Router::new()
        .merge(catalog_router(services.catalog.clone()))
        .merge(blog_router(services.blog.clone()))
        .merge(leads_router(services.leads.clone()))
        .merge(auth_router(accounts.clone()))
        .merge(uploads_router(services.uploads.clone()));

    let editor = Router::new()
        .merge(session_router(accounts.clone()))
        .merge(catalog_admin_router(services.catalog.clone()))
        .merge(blog_admin_router(services.blog.clone()))
        .merge(leads_admin_router(services.leads.clone()))
        .merge(builders_admin_router(services.builders.clone()))
        .merge(uploads_admin_router(services.uploads.clone()))
        .route_layer(from_fn_with_state(accounts.clone(), require_session));

    let admin = users_admin_router(accounts.clone())
        .route_layer(from_fn_with_state(accounts, require_admin));

    public.merge(editor).merge(admin).fallback(unknown_route)
}

async fn unknown_route() -> ServiceError {
    ServiceError::NotFound("route")
}
