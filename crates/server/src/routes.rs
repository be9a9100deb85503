//! Router and request handlers.
//!
//! The endpoints mirror the product flow: scrape a page, caption an image,
//! connect an Instagram account, inspect or drop the connection, publish.
//! Handlers stay thin (validation plus one or two calls into
//! `postprep-core`) and all failure paths funnel through [`ApiError`].

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use postprep_core::{
    AccountStore, CaptionOptions, CaptionRequest, CaptionResponse, FetchConfig, InstagramClient, OpenRouterClient,
    PageExtract, PostprepError, extract_page, fetch_page,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared handler context.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn AccountStore>,
    fetch: FetchConfig,
    caption: Option<Arc<OpenRouterClient>>,
    instagram: Option<Arc<InstagramClient>>,
    redirect_uri: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, config: &ServerConfig) -> Self {
        let caption = config
            .openrouter_api_key
            .as_ref()
            .map(|key| Arc::new(OpenRouterClient::new(key.clone())));

        let instagram = config
            .instagram
            .as_ref()
            .map(|app| Arc::new(InstagramClient::new(app.client_id.clone(), app.client_secret.clone())));

        let redirect_uri = config.instagram.as_ref().map(|app| app.redirect_uri.clone());

        Self { store, fetch: FetchConfig::default(), caption, instagram, redirect_uri }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/scrape", post(scrape))
        .route("/api/caption", post(caption))
        .route("/api/instagram/connect", post(connect))
        .route(
            "/api/instagram/account/{user_id}",
            get(account_status).delete(disconnect),
        )
        .route("/api/instagram/publish", post(publish))
        .layer(
            tower::ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(60)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct ScrapeRequest {
    url: String,
}

/// Fetch a page and run the extractor over it.
async fn scrape(State(state): State<AppState>, Json(req): Json<ScrapeRequest>) -> Result<Json<PageExtract>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    Url::parse(&req.url).map_err(|e| ApiError::bad_request(format!("Invalid URL: {e}")))?;

    tracing::info!(url = %req.url, "scraping page");

    let html = fetch_page(&req.url, &state.fetch).await?;
    let page = extract_page(&html, &req.url)?;

    tracing::debug!(images = page.images.len(), title = %page.title, "extraction complete");

    Ok(Json(page))
}

/// Wire shape of the caption endpoint: the extraction fields and the style
/// preferences arrive in one flat object.
#[derive(Deserialize)]
struct CaptionApiRequest {
    #[serde(flatten)]
    request: CaptionRequest,
    #[serde(flatten)]
    options: CaptionOptions,
}

async fn caption(
    State(state): State<AppState>,
    Json(req): Json<CaptionApiRequest>,
) -> Result<Json<CaptionResponse>, ApiError> {
    let client = state
        .caption
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("OPENROUTER_API_KEY"))?;

    let response = client.generate(&req.request, &req.options).await?;
    Ok(Json(response))
}

#[derive(Deserialize)]
struct ConnectRequest {
    code: String,
    user_id: String,
}

#[derive(Serialize)]
struct ConnectResponse {
    success: bool,
    username: String,
}

/// Exchange an OAuth code and persist the resulting connection.
async fn connect(
    State(state): State<AppState>,
    Json(req): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>, ApiError> {
    if req.code.trim().is_empty() || req.user_id.trim().is_empty() {
        return Err(ApiError::bad_request("Code and user_id are required"));
    }

    let client = state
        .instagram
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Instagram app credentials"))?;
    let redirect_uri = state
        .redirect_uri
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Instagram app credentials"))?;

    let account = client.connect(&req.code, redirect_uri, &req.user_id).await?;
    state.store.put(&account)?;

    Ok(Json(ConnectResponse { success: true, username: account.username }))
}

/// Connection status for a user. The access token never leaves the store.
#[derive(Serialize)]
struct AccountStatus {
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<bool>,
}

async fn account_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<AccountStatus>, ApiError> {
    match state.store.get(&user_id)? {
        Some(account) => {
            let expires_at = account.token_expires_at.format(&Rfc3339).ok();
            Ok(Json(AccountStatus {
                connected: true,
                username: Some(account.username.clone()),
                expires_at,
                expired: Some(account.is_token_expired(OffsetDateTime::now_utc())),
            }))
        }
        None => Ok(Json(AccountStatus { connected: false, username: None, expires_at: None, expired: None })),
    }
}

async fn disconnect(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete(&user_id)?;
    tracing::info!(%user_id, "Instagram connection removed");
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishRequest {
    user_id: String,
    image_url: String,
    caption: String,
}

/// Publish an image + caption to the user's connected account.
async fn publish(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.image_url.trim().is_empty() {
        return Err(PostprepError::MissingField("imageUrl").into());
    }
    if req.caption.trim().is_empty() {
        return Err(PostprepError::MissingField("caption").into());
    }

    let client = state
        .instagram
        .as_ref()
        .ok_or_else(|| ApiError::not_configured("Instagram app credentials"))?;

    let account = state
        .store
        .get(&req.user_id)?
        .ok_or_else(|| ApiError::from(PostprepError::AccountNotFound(req.user_id.clone())))?;

    if account.is_token_expired(OffsetDateTime::now_utc()) {
        tracing::warn!(user_id = %req.user_id, "publishing with an expired token");
    }

    let post_id = client.publish(&account, &req.image_url, &req.caption).await?;

    Ok(Json(json!({ "success": true, "postId": post_id })))
}
