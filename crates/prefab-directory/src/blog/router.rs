use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use super::domain::{BlogPost, PostDetail, PostId, PostInput, PostSummary};
use super::service::BlogService;
use crate::accounts::AuthenticatedUser;
use crate::error::ServiceError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BlogListQuery {
    #[serde(default)]
    limit: Option<usize>,
}

pub fn blog_router(service: Arc<BlogService>) -> Router {
    Router::new()
        .route("/api/blog", get(list_posts))
        .route("/api/blog/:slug", get(post_detail))
        .with_state(service)
}

/// Post management for signed-in editors.
pub fn blog_admin_router(service: Arc<BlogService>) -> Router {
    Router::new()
        .route("/api/admin/blog", get(admin_list_posts).post(admin_create_post))
        .route(
            "/api/admin/blog/:id",
            get(admin_get_post)
                .put(admin_update_post)
                .delete(admin_delete_post),
        )
        .with_state(service)
}

pub(crate) async fn list_posts(
    State(service): State<Arc<BlogService>>,
    ApiQuery(query): ApiQuery<BlogListQuery>,
) -> Result<Json<Vec<PostSummary>>, ServiceError> {
    Ok(Json(service.list_published(query.limit)?))
}

pub(crate) async fn post_detail(
    State(service): State<Arc<BlogService>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<PostDetail>, ServiceError> {
    Ok(Json(service.published_post(&slug)?))
}

async fn admin_list_posts(
    State(service): State<Arc<BlogService>>,
) -> Result<Json<Vec<BlogPost>>, ServiceError> {
    Ok(Json(service.list_all_posts()?))
}

async fn admin_get_post(
    State(service): State<Arc<BlogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BlogPost>, ServiceError> {
    Ok(Json(service.get_post(PostId(id))?))
}

async fn admin_create_post(
    State(service): State<Arc<BlogService>>,
    Extension(actor): Extension<AuthenticatedUser>,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<(StatusCode, Json<BlogPost>), ServiceError> {
    let created = service.create_post(Some(actor.user_id), input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn admin_update_post(
    State(service): State<Arc<BlogService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<Json<BlogPost>, ServiceError> {
    Ok(Json(service.update_post(PostId(id), input)?))
}

async fn admin_delete_post(
    State(service): State<Arc<BlogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_post(PostId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
