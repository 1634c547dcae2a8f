use axum::{routing::post, Router};
use crate::handlers::relay_handlers::relay;

pub fn relay_routes() -> Router {
    Router::new()
    .route("/relay", post(relay))
}
