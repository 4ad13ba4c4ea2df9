use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::{ApiError, AppState};
use crate::models::{Application, EventDetails, Member, NewApplication, NewMember, NewsItem, SiteConfig};
use crate::security::is_authorized;
use crate::store::NewsQuery;

/// Body of every successful API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if is_authorized(state.config.api_key.as_deref(), headers) {
        Ok(())
    } else {
        warn!("Rejected write request with missing or invalid API key");
        Err(ApiError::Unauthorized)
    }
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn site_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SiteConfig>>, ApiError> {
    let site = state
        .store
        .get_site_config(&state.config.site_id)
        .await
        .map_err(ApiError::store("Failed to fetch site configuration"))?;

    Ok(ok(site))
}

/// Raw `/api/news` query string; numbers are parsed by hand so a bad value
/// gets the usual JSON error body.
#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    pub featured: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
}

impl NewsParams {
    pub fn to_query(&self) -> Result<NewsQuery, ApiError> {
        Ok(NewsQuery {
            featured: Some(self.featured.as_deref() == Some("true")),
            limit: parse_number("limit", self.limit.as_deref())?,
            page: parse_number("page", self.page.as_deref())?,
        })
    }
}

fn parse_number(name: &str, value: Option<&str>) -> Result<Option<u32>, ApiError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{} must be a positive integer", name))),
    }
}

pub async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<ApiResponse<Vec<NewsItem>>>, ApiError> {
    let query = params.to_query()?;
    let items = state
        .store
        .get_news(&state.config.site_id, &query)
        .await
        .map_err(ApiError::store("Failed to fetch news items"))?;

    Ok(ok(items))
}

pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Option<EventDetails>>>, ApiError> {
    let event = state
        .store
        .get_event_details(&state.config.site_id)
        .await
        .map_err(ApiError::store("Failed to fetch event details"))?;

    Ok(ok(event))
}

pub async fn upsert_member(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewMember>, JsonRejection>,
) -> Result<Json<ApiResponse<Member>>, ApiError> {
    authorize(&state, &headers)?;
    let Json(mut member) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    member.site_id = state.config.site_id.clone();

    let saved = state
        .store
        .upsert_member(&member)
        .await
        .map_err(ApiError::store("Failed to save member"))?;

    info!("Member {} saved", saved.id);
    Ok(ok(saved))
}

pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<NewApplication>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Application>>), ApiError> {
    authorize(&state, &headers)?;
    let Json(mut application) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    application.site_id = state.config.site_id.clone();

    let created = state
        .store
        .submit_application(&application)
        .await
        .map_err(ApiError::store("Failed to submit application"))?;

    Ok((StatusCode::CREATED, ok(created)))
}

#[derive(Debug, Deserialize)]
pub struct ApplicationsParams {
    pub email: Option<String>,
}

pub async fn member_applications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ApplicationsParams>,
) -> Result<Json<ApiResponse<Vec<Application>>>, ApiError> {
    authorize(&state, &headers)?;
    let email = params
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;

    let applications = state
        .store
        .get_member_applications(&state.config.site_id, &email)
        .await
        .map_err(ApiError::store("Failed to fetch applications"))?;

    Ok(ok(applications))
}
