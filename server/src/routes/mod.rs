pub mod extract;
pub mod relay;

use axum::{Extension, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use extract::extract_routes;
use relay::relay_routes;

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(relay_routes())
        .nest("/api", extract_routes())
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
