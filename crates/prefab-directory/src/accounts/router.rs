use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;

use super::domain::{AuthenticatedUser, LoginRequest, UserId, UserInput, UserUpdate, UserView};
use super::service::AccountService;
use super::session::{cleared_session_cookie, session_cookie, session_token};
use crate::error::ServiceError;
use crate::http::extract::{ApiJson, ApiPath};

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
    user: UserView,
}

/// Public sign-in and sign-out endpoints.
pub fn auth_router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .with_state(service)
}

/// Endpoints for any signed-in user. Callers wrap this router with [`require_session`].
pub fn session_router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/auth/me", get(current_user))
        .with_state(service)
}

/// User administration. Callers wrap this router with [`require_admin`].
pub fn users_admin_router(service: Arc<AccountService>) -> Router {
    Router::new()
        .route("/api/admin/users", get(list_users).post(create_user))
        .route(
            "/api/admin/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(service)
}

/// Rejects requests without a live session and attaches the [`AuthenticatedUser`] extension.
pub async fn require_session(
    State(service): State<Arc<AccountService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = session_token(request.headers()).ok_or(ServiceError::Unauthorized)?;
    let user = service.authenticate(&token)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Like [`require_session`] but also requires the admin role.
pub async fn require_admin(
    State(service): State<Arc<AccountService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let token = session_token(request.headers()).ok_or(ServiceError::Unauthorized)?;
    let user = service.authenticate(&token)?;
    if !user.is_admin() {
        return Err(ServiceError::Forbidden(
            "admin role required".to_string(),
        ));
    }
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub(crate) async fn login(
    State(service): State<Arc<AccountService>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    let (session, user) = service.login(request)?;
    let cookie = session_cookie(&session, service.session_ttl());
    let body = LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        user,
    };
    Ok(([(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

pub(crate) async fn logout(
    State(service): State<Arc<AccountService>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session_token(&headers) {
        service.logout(&token);
    }
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, cleared_session_cookie())],
    )
        .into_response()
}

async fn current_user(
    State(service): State<Arc<AccountService>>,
    Extension(actor): Extension<AuthenticatedUser>,
) -> Result<Json<UserView>, ServiceError> {
    Ok(Json(service.current_user(&actor)?))
}

async fn list_users(
    State(service): State<Arc<AccountService>>,
) -> Result<Json<Vec<UserView>>, ServiceError> {
    Ok(Json(service.list_users()?))
}

async fn get_user(
    State(service): State<Arc<AccountService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserView>, ServiceError> {
    Ok(Json(service.get_user(UserId(id))?))
}

async fn create_user(
    State(service): State<Arc<AccountService>>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<(StatusCode, Json<UserView>), ServiceError> {
    let created = service.create_user(input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(service): State<Arc<AccountService>>,
    Extension(actor): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<UserView>, ServiceError> {
    Ok(Json(service.update_user(&actor, UserId(id), update)?))
}

async fn delete_user(
    State(service): State<Arc<AccountService>>,
    Extension(actor): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_user(&actor, UserId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
