use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::domain::{
    BuilderDetail, BuilderId, BuilderInput, BuilderSummary, House, HouseBuilder, HouseId,
    HouseInput,
};
use super::service::BuilderService;
use crate::error::ServiceError;
use crate::http::extract::{ApiJson, ApiPath};

/// Admin CRUD for builders and their houses.
pub fn builders_admin_router(service: Arc<BuilderService>) -> Router {
    Router::new()
        .route(
            "/api/admin/builders",
            get(list_builders).post(create_builder),
        )
        .route(
            "/api/admin/builders/:id",
            get(get_builder).put(update_builder).delete(delete_builder),
        )
        .route(
            "/api/admin/builders/:id/houses",
            get(list_houses).post(create_house),
        )
        .route(
            "/api/admin/houses/:id",
            get(get_house).put(update_house).delete(delete_house),
        )
        .with_state(service)
}

async fn list_builders(
    State(service): State<Arc<BuilderService>>,
) -> Result<Json<Vec<BuilderSummary>>, ServiceError> {
    Ok(Json(service.list_builders()?))
}

async fn get_builder(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BuilderDetail>, ServiceError> {
    Ok(Json(service.get_builder(BuilderId(id))?))
}

async fn create_builder(
    State(service): State<Arc<BuilderService>>,
    ApiJson(input): ApiJson<BuilderInput>,
) -> Result<(StatusCode, Json<HouseBuilder>), ServiceError> {
    let created = service.create_builder(input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_builder(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<BuilderInput>,
) -> Result<Json<HouseBuilder>, ServiceError> {
    Ok(Json(service.update_builder(BuilderId(id), input)?))
}

async fn delete_builder(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_builder(BuilderId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_houses(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<House>>, ServiceError> {
    Ok(Json(service.list_houses(BuilderId(id))?))
}

async fn create_house(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<HouseInput>,
) -> Result<(StatusCode, Json<House>), ServiceError> {
    let created = service.create_house(BuilderId(id), input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_house(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<House>, ServiceError> {
    Ok(Json(service.get_house(HouseId(id))?))
}

async fn update_house(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<HouseInput>,
) -> Result<Json<House>, ServiceError> {
    Ok(Json(service.update_house(HouseId(id), input)?))
}

async fn delete_house(
    State(service): State<Arc<BuilderService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_house(HouseId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
