use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use page_extract_cli::{page::analyze_page, PageContext};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::{AppState, JobStatus};

#[derive(Deserialize)]
pub struct AnalyzePayload {
    pub url: String,
    /// Markup to analyze; fetched from `url` when absent.
    pub html: Option<String>,
}

#[derive(Serialize)]
pub struct JobCreated {
    pub job_id: Uuid,
}

/// POST /api/analyze
pub async fn analyze(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AnalyzePayload>,
) -> impl IntoResponse {
    let job_id = Uuid::new_v4();
    state.jobs.insert(job_id, JobStatus::Pending);
    info!(%job_id, url = %payload.url, "analysis job queued");

    let state_clone = state.clone();
    tokio::spawn(async move {
        let html = match payload.html {
            Some(html) => html,
            None => match state_clone.fetcher.fetch_html(&payload.url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(%job_id, error = %e, "analysis fetch failed");
                    state_clone.jobs.insert(job_id, JobStatus::Failed { error: e.to_string() });
                    return;
                }
            },
        };

        // parsing is CPU bound and the parse tree is not Send
        let page = PageContext::new(payload.url, html);
        let content = tokio::task::spawn_blocking(move || {
            futures::executor::block_on(analyze_page(&page))
        })
        .await;

        let status = match content {
            Ok(content) => JobStatus::Done { content: Box::new(content) },
            Err(e) => JobStatus::Failed {
                error: format!("Thread join error: {}", e),
            },
        };
        state_clone.jobs.insert(job_id, status);
    });

    (StatusCode::ACCEPTED, Json(json!(JobCreated { job_id })))
}

/// GET /api/jobs/{id}
///
/// A finished job is handed out once and then dropped from the table.
pub async fn poll_job(
    Extension(state): Extension<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatus>, (StatusCode, Json<Value>)> {
    if let Some((_, finished)) = state.jobs.remove_if(&id, |_, status| status.is_finished()) {
        info!(job_id = %id, "analysis job collected");
        return Ok(Json(finished));
    }
    match state.jobs.get(&id) {
        Some(pending) => Ok(Json(pending.value().clone())),
        None => Err((StatusCode::NOT_FOUND, Json(json!({ "error": "Job not found" })))),
    }
}
