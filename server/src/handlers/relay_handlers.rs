use axum::{Extension, Json};
use page_extract_cli::fetch::{handle_fetch_request, FetchRequest, FetchResponse};

use crate::state::AppState;

/// POST /relay
///
/// Always answers 200; fetch failures are reported through `success: false`.
pub async fn relay(
    Extension(state): Extension<AppState>,
    Json(request): Json<FetchRequest>,
) -> Json<FetchResponse> {
    Json(handle_fetch_request(state.fetcher.as_ref(), &request).await)
}
