use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    CategorySummary, HomeModel, Manufacturer, ManufacturerDetail, ManufacturerId,
    ManufacturerInput, ManufacturerSummary, ModelDetail, ModelId, ModelInput, ModelSummary,
};
use super::map::MapView;
use super::search::{ManufacturerQuery, ModelQuery};
use super::service::{CatalogService, CategoryListing};
use crate::error::ServiceError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};

/// Public directory endpoints: manufacturers, models, categories, and the map feed.
pub fn catalog_router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route("/api/manufacturers", get(list_manufacturers))
        .route("/api/manufacturers/:slug", get(manufacturer_detail))
        .route("/api/models", get(search_models))
        .route("/api/models/:slug", get(model_detail))
        .route("/api/categories", get(list_categories))
        .route("/api/categories/:slug", get(category_models))
        .route("/api/map/markers", get(map_markers))
        .with_state(service)
}

/// Admin CRUD for manufacturers and models. Callers wrap this router with session checks.
pub fn catalog_admin_router(service: Arc<CatalogService>) -> Router {
    Router::new()
        .route(
            "/api/admin/manufacturers",
            get(admin_list_manufacturers).post(admin_create_manufacturer),
        )
        .route(
            "/api/admin/manufacturers/:id",
            get(admin_get_manufacturer)
                .put(admin_update_manufacturer)
                .delete(admin_delete_manufacturer),
        )
        .route(
            "/api/admin/models",
            get(admin_list_models).post(admin_create_model),
        )
        .route(
            "/api/admin/models/:id",
            get(admin_get_model)
                .put(admin_update_model)
                .delete(admin_delete_model),
        )
        .with_state(service)
}

pub(crate) async fn list_manufacturers(
    State(service): State<Arc<CatalogService>>,
    ApiQuery(query): ApiQuery<ManufacturerQuery>,
) -> Result<Json<Vec<ManufacturerSummary>>, ServiceError> {
    Ok(Json(service.list_manufacturers(&query)?))
}

pub(crate) async fn manufacturer_detail(
    State(service): State<Arc<CatalogService>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ManufacturerDetail>, ServiceError> {
    Ok(Json(service.manufacturer_detail(&slug)?))
}

pub(crate) async fn search_models(
    State(service): State<Arc<CatalogService>>,
    ApiQuery(query): ApiQuery<ModelQuery>,
) -> Result<Json<Vec<ModelSummary>>, ServiceError> {
    Ok(Json(service.search_models(&query)?))
}

pub(crate) async fn model_detail(
    State(service): State<Arc<CatalogService>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<ModelDetail>, ServiceError> {
    Ok(Json(service.model_detail(&slug)?))
}

pub(crate) async fn list_categories(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<Vec<CategorySummary>>, ServiceError> {
    Ok(Json(service.categories()?))
}

pub(crate) async fn category_models(
    State(service): State<Arc<CatalogService>>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<CategoryListing>, ServiceError> {
    Ok(Json(service.category_models(&slug)?))
}

pub(crate) async fn map_markers(
    State(service): State<Arc<CatalogService>>,
    ApiQuery(query): ApiQuery<ManufacturerQuery>,
) -> Result<Json<MapView>, ServiceError> {
    Ok(Json(service.map_view(&query)?))
}

async fn admin_list_manufacturers(
    State(service): State<Arc<CatalogService>>,
) -> Result<Json<Vec<Manufacturer>>, ServiceError> {
    Ok(Json(service.list_all_manufacturers()?))
}

async fn admin_get_manufacturer(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Manufacturer>, ServiceError> {
    Ok(Json(service.get_manufacturer(ManufacturerId(id))?))
}

async fn admin_create_manufacturer(
    State(service): State<Arc<CatalogService>>,
    ApiJson(input): ApiJson<ManufacturerInput>,
) -> Result<(StatusCode, Json<Manufacturer>), ServiceError> {
    let created = service.create_manufacturer(input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn admin_update_manufacturer(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ManufacturerInput>,
) -> Result<Json<Manufacturer>, ServiceError> {
    Ok(Json(service.update_manufacturer(ManufacturerId(id), input)?))
}

async fn admin_delete_manufacturer(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_manufacturer(ManufacturerId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct AdminModelFilter {
    #[serde(default)]
    manufacturer_id: Option<i64>,
}

async fn admin_list_models(
    State(service): State<Arc<CatalogService>>,
    ApiQuery(filter): ApiQuery<AdminModelFilter>,
) -> Result<Json<Vec<HomeModel>>, ServiceError> {
    let models = service.list_all_models(filter.manufacturer_id.map(ManufacturerId))?;
    Ok(Json(models))
}

async fn admin_get_model(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<HomeModel>, ServiceError> {
    Ok(Json(service.get_model(ModelId(id))?))
}

async fn admin_create_model(
    State(service): State<Arc<CatalogService>>,
    ApiJson(input): ApiJson<ModelInput>,
) -> Result<(StatusCode, Json<HomeModel>), ServiceError> {
    let created = service.create_model(input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn admin_update_model(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ModelInput>,
) -> Result<Json<HomeModel>, ServiceError> {
    Ok(Json(service.update_model(ModelId(id), input)?))
}

async fn admin_delete_model(
    State(service): State<Arc<CatalogService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_model(ModelId(id))?;
    Ok(StatusCode::NO_CONTENT)
}
