use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use page_extract_cli::{
    text::{html_to_simple_text, html_to_text},
    PageContext,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractPayload {
    pub url: String,
    pub html: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyPayload {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct TextPayload {
    pub html: String,
    #[serde(default)]
    pub simple: bool,
}

async fn load_page(
    state: &AppState,
    payload: ExtractPayload,
) -> Result<PageContext, (StatusCode, Json<Value>)> {
    let html = match payload.html {
        Some(html) => html,
        None => state.fetcher.fetch_html(&payload.url).await.map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "message": e.to_string() })),
            )
        })?,
    };
    Ok(PageContext::new(payload.url, html))
}

/// POST /api/extract/list
pub async fn extract_list(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ExtractPayload>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let page = load_page(&state, payload).await?;
    let supported = state.registry.is_processor_available(&page);
    let items = state.registry.extract_current_list(&page);

    Ok((StatusCode::OK, Json(json!({ "supported": supported, "items": items }))))
}

/// POST /api/extract/article
pub async fn extract_article(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ExtractPayload>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let page = load_page(&state, payload).await?;
    let supported = state.registry.is_processor_available(&page);
    let article = state.registry.extract_current_article(&page);

    Ok((StatusCode::OK, Json(json!({ "supported": supported, "article": article }))))
}

/// POST /api/classify
pub async fn classify(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ClassifyPayload>,
) -> impl IntoResponse {
    let supported = state.registry.processor_for(&payload.url).is_some();
    let kind = state.registry.page_kind(&payload.url);
    Json(json!({ "supported": supported, "kind": kind }))
}

/// POST /api/text
pub async fn to_text(Json(payload): Json<TextPayload>) -> impl IntoResponse {
    let text = if payload.simple {
        html_to_simple_text(&payload.html)
    } else {
        html_to_text(&payload.html)
    };
    Json(json!({ "text": text }))
}

/// GET /api/domains
pub async fn domains(Extension(state): Extension<AppState>) -> impl IntoResponse {
    Json(json!({ "domains": state.registry.supported_domains() }))
}
