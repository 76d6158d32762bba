//! HTTP surface over a `Site`.
//!
//! Read-only endpoints answer conversion, resolution and permalink queries.
//! Admin endpoints (`/admin/...`) need the configured API key in `x-api-key`
//! and are disabled when no key is configured.

use crate::config::Config;
use crate::content::{Entity, EntityId};
use crate::error::{ConfigurationError, RoutingError};
use crate::i18n::{RequestContext, RequestInfo};
use crate::metrics::MetricsReport;
use crate::permalink::{AlternateLink, PermalinkOptions};
use crate::resolver::Resolution;
use crate::routes::RouteRule;
use crate::security::{verify_api_key, AdminAccess};
use crate::site::Site;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct AppState {
    pub site: Site,
    pub config: Config,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert", get(convert))
        .route("/resolve", get(resolve))
        .route("/permalink/:id", get(permalink))
        .route("/entities/:id/alternates", get(alternates))
        .route("/routes", get(routes))
        .route("/metrics", get(metrics))
        .route("/admin/rebuild-routes", post(rebuild_routes))
        .route("/admin/entities/:id/resave", post(resave_entity))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Errors ====================

#[derive(Debug)]
pub enum AppError {
    Routing(RoutingError),
    Unauthorized,
    AdminDisabled,
}

impl From<RoutingError> for AppError {
    fn from(e: RoutingError) -> Self {
        AppError::Routing(e)
    }
}

impl From<ConfigurationError> for AppError {
    fn from(e: ConfigurationError) -> Self {
        AppError::Routing(e.into())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Routing(RoutingError::EntityNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Routing(RoutingError::UnknownLanguage(_)) => StatusCode::BAD_REQUEST,
            AppError::Routing(RoutingError::EmptySlugCandidate) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Routing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::AdminDisabled => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Routing(e) => e.to_string(),
            AppError::Unauthorized => "invalid or missing API key".to_string(),
            AppError::AdminDisabled => "admin endpoints are disabled".to_string(),
        };
        if status.is_server_error() {
            warn!("Request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ==================== Request context ====================

/// Describe the browsing context of an HTTP request for language detection.
///
/// The referring page stands in for the current URL; without a referrer the
/// default-language home page is assumed.
pub fn request_context(site: &Site, headers: &HeaderMap, language_cookie: &str) -> RequestInfo {
    let referrer = header_str(headers, header::REFERER.as_str()).map(str::to_string);
    let current_url = referrer
        .clone()
        .unwrap_or_else(|| site.site_url().home_url(site.default_language()));

    let mut ctx = site.request(&current_url);
    ctx.ajax = header_str(headers, "x-requested-with")
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));
    ctx.admin = ctx.is_admin_origin(&current_url);
    ctx.referrer = referrer;
    ctx.cookie_language = cookie_value(headers, language_cookie);
    ctx.user_locale = header_str(headers, header::ACCEPT_LANGUAGE.as_str())
        .and_then(first_language_tag);
    ctx
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// "en-US,en;q=0.9" -> "en_US"
fn first_language_tag(accept_language: &str) -> Option<String> {
    accept_language
        .split(',')
        .next()
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(|tag| tag.replace('-', "_"))
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    match verify_api_key(state.config.api_key.as_deref(), header_str(headers, "x-api-key")) {
        AdminAccess::Granted => Ok(()),
        AdminAccess::Denied => {
            warn!("Rejected admin request with invalid API key");
            Err(AppError::Unauthorized)
        }
        AdminAccess::Disabled => Err(AppError::AdminDisabled),
    }
}

// ==================== Handlers ====================

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ConvertParams {
    pub url: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub url: String,
    pub language: String,
}

pub async fn convert(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ConvertParams>,
) -> Json<ConvertResponse> {
    let site = &state.site;
    let mut detector = site.detector();
    detector.detect(&request_context(site, &headers, &state.config.language_cookie));

    let language = match params.lang.as_deref() {
        Some(slug) => site.language_or_default(Some(slug)).slug().to_string(),
        None => detector
            .current()
            .map(|language| language.slug().to_string())
            .unwrap_or_else(|| site.default_language().slug().to_string()),
    };
    let url = site
        .converter()
        .convert(params.url.as_deref(), Some(&language), &mut detector);

    Json(ConvertResponse { url, language })
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ResolveParams>,
) -> Json<ResolveResponse> {
    let site = &state.site;
    let mut detector = site.detector();
    detector.detect(&request_context(site, &headers, &state.config.language_cookie));

    let mut response = ResolveResponse {
        found: false,
        language: None,
        entity: None,
        archive: None,
    };
    if let Some(resolved) = site.resolver().resolve_target(&params.url, &mut detector) {
        response.language = Some(resolved.language.slug().to_string());
        match resolved.resolution {
            Resolution::Entity(entity) => {
                response.found = true;
                response.entity = Some(entity);
            }
            Resolution::Archive { content_type } => {
                response.found = true;
                response.archive = Some(content_type);
            }
            Resolution::NotFound => {}
        }
    }
    Json(response)
}

#[derive(Debug, Default, Deserialize)]
pub struct PermalinkParams {
    pub lang: Option<String>,
    pub check_visibility: Option<bool>,
    pub treat_as_published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PermalinkResponse {
    pub id: EntityId,
    pub language: String,
    pub url: String,
}

pub async fn permalink(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(params): Query<PermalinkParams>,
) -> Result<Json<PermalinkResponse>, AppError> {
    let site = &state.site;
    let id = EntityId(id);
    let entity = site
        .store()
        .get_entity(id)
        .ok_or(RoutingError::EntityNotFound(id))?;
    let language = match params.lang.as_deref() {
        Some(slug) => site.registry().lookup(slug)?,
        None => site.default_language(),
    };

    let defaults = PermalinkOptions::default();
    let options = PermalinkOptions {
        check_visibility: params.check_visibility.unwrap_or(defaults.check_visibility),
        treat_as_published: params.treat_as_published.unwrap_or(defaults.treat_as_published),
    };
    let url = site.permalinks().build(&entity, language, options);

    Ok(Json(PermalinkResponse {
        id,
        language: language.slug().to_string(),
        url,
    }))
}

pub async fn alternates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<AlternateLink>>, AppError> {
    let id = EntityId(id);
    let entity = state
        .site
        .store()
        .get_entity(id)
        .ok_or(RoutingError::EntityNotFound(id))?;
    Ok(Json(state.site.permalinks().alternates(&entity)))
}

pub async fn routes(State(state): State<Arc<AppState>>) -> Json<Vec<RouteRule>> {
    Json(state.site.routes().rules().cloned().collect())
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsReport> {
    Json(state.site.metrics().report())
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub rules: usize,
    pub warnings: Vec<String>,
}

pub async fn rebuild_routes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<RebuildResponse>, AppError> {
    require_admin(&state, &headers)?;
    let report = state.site.rebuild_routes()?;
    info!("Route table rebuilt via admin endpoint");
    Ok(Json(RebuildResponse {
        rules: state.site.routes().len(),
        warnings: report.warnings,
    }))
}

pub async fn resave_entity(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.site.resave_entity(EntityId(id))?))
}
