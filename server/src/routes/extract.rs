use axum::routing::get;
use axum::{routing::post, Router};
use crate::handlers::extract_handlers::{classify, domains, extract_article, extract_list, to_text};
use crate::handlers::service_handler::{analyze, poll_job};

pub fn extract_routes() -> Router {
    Router::new()
    .route("/extract/list", post(extract_list))
    .route("/extract/article", post(extract_article))
    .route("/classify", post(classify))
    .route("/text", post(to_text))
    .route("/domains", get(domains))
    .route("/analyze", post(analyze))
    .route("/jobs/{id}", get(poll_job))
}
