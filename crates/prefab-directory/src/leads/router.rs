use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{
    ContactForm, Lead, LeadId, LeadKind, LeadReceipt, SurveyForm, WaitlistForm,
};
use super::service::LeadService;
use crate::error::ServiceError;
use crate::http::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeadFilter {
    #[serde(default)]
    kind: Option<LeadKind>,
}

/// Public form endpoints.
pub fn leads_router(service: Arc<LeadService>) -> Router {
    Router::new()
        .route("/api/leads/contact", post(submit_contact))
        .route("/api/leads/waitlist", post(join_waitlist))
        .route("/api/leads/survey", post(submit_survey))
        .with_state(service)
}

pub fn leads_admin_router(service: Arc<LeadService>) -> Router {
    Router::new()
        .route("/api/admin/leads", get(list_leads))
        .route("/api/admin/leads/export", get(export_leads))
        .route("/api/admin/leads/:id", get(get_lead).delete(delete_lead))
        .with_state(service)
}

async fn submit_contact(
    State(service): State<Arc<LeadService>>,
    ApiJson(form): ApiJson<ContactForm>,
) -> Result<(StatusCode, Json<LeadReceipt>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.submit_contact(form)?)))
}

async fn join_waitlist(
    State(service): State<Arc<LeadService>>,
    ApiJson(form): ApiJson<WaitlistForm>,
) -> Result<(StatusCode, Json<LeadReceipt>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.join_waitlist(form)?)))
}

async fn submit_survey(
    State(service): State<Arc<LeadService>>,
    ApiJson(form): ApiJson<SurveyForm>,
) -> Result<(StatusCode, Json<LeadReceipt>), ServiceError> {
    Ok((StatusCode::CREATED, Json(service.submit_survey(form)?)))
}

async fn list_leads(
    State(service): State<Arc<LeadService>>,
    ApiQuery(filter): ApiQuery<LeadFilter>,
) -> Result<Json<Vec<Lead>>, ServiceError> {
    Ok(Json(service.list_leads(filter.kind)?))
}

async fn get_lead(
    State(service): State<Arc<LeadService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Lead>, ServiceError> {
    Ok(Json(service.get_lead(LeadId(id))?))
}

async fn delete_lead(
    State(service): State<Arc<LeadService>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ServiceError> {
    service.delete_lead(LeadId(id))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_leads(
    State(service): State<Arc<LeadService>>,
    ApiQuery(filter): ApiQuery<LeadFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let csv = service.export_csv(filter.kind)?;
    let filename = match filter.kind {
        Some(kind) => format!("attachment; filename=\"leads-{}.csv\"", kind.label()),
        None => "attachment; filename=\"leads.csv\"".to_string(),
    };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv,
    ))
}
