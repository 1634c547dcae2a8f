use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use page_extract_cli::fetch::{
    handle_fetch_request, FetchOptions, FetchRequest, FetchResponse, HttpFetcher, PageFetcher,
    RelayClient,
};
use page_extract_cli::FetchError;
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::net::TcpListener;

type Hits = Arc<AtomicUsize>;

/// Serves `app` on an ephemeral local port and returns its base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn unavailable(State(hits): State<Hits>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::SERVICE_UNAVAILABLE
}

async fn missing(State(hits): State<Hits>) -> StatusCode {
    hits.fetch_add(1, Ordering::SeqCst);
    StatusCode::NOT_FOUND
}

async fn recovers(State(hits): State<Hits>) -> (StatusCode, &'static str) {
    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
        (StatusCode::BAD_GATEWAY, "")
    } else {
        (StatusCode::OK, "<p>back</p>")
    }
}

async fn origin(hits: Hits) -> String {
    let app = Router::new()
        .route("/unavailable", get(unavailable))
        .route("/missing", get(missing))
        .route("/recovers", get(recovers))
        .with_state(hits);
    serve(app).await
}

fn retrying(retries: usize) -> HttpFetcher {
    HttpFetcher::new(FetchOptions {
        retries,
        retry_interval: Some(Duration::from_millis(5)),
        ..FetchOptions::default()
    })
    .unwrap()
}

#[tokio::test]
async fn server_errors_are_retried_until_exhausted() {
    let hits = Hits::default();
    let base = origin(hits.clone()).await;

    let err = retrying(2)
        .fetch_html(&format!("{base}/unavailable"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn client_errors_fail_on_first_attempt() {
    let hits = Hits::default();
    let base = origin(hits.clone()).await;

    let err = retrying(2)
        .fetch_html(&format!("{base}/missing"))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Http { status: 404, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_failure_then_success() {
    let hits = Hits::default();
    let base = origin(hits.clone()).await;

    let html = retrying(1)
        .fetch_html(&format!("{base}/recovers"))
        .await
        .unwrap();

    assert_eq!(html, "<p>back</p>");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn no_retries_means_one_attempt() {
    let hits = Hits::default();
    let base = origin(hits.clone()).await;

    let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
    assert!(fetcher.fetch_html(&format!("{base}/unavailable")).await.is_err());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn relay_server_error_is_a_delivery_failure() {
    let base = serve(Router::new().route(
        "/relay",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    let err = RelayClient::new(format!("{base}/relay"))
        .fetch_html("https://example.com/")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Delivery(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn undecodable_relay_body_is_a_delivery_failure() {
    let base = serve(Router::new().route("/relay", post(|| async { "<html>not json</html>" }))).await;

    let err = RelayClient::new(format!("{base}/relay"))
        .fetch_html("https://example.com/")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Delivery(_)));
}

#[tokio::test]
async fn unreachable_relay_is_a_delivery_failure() {
    // bind then drop to get a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = RelayClient::new(format!("http://{addr}/relay"))
        .fetch_html("https://example.com/")
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Delivery(_)));
}

#[tokio::test]
async fn relay_refusal_is_passed_through() {
    let base = serve(
        Router::new()
            .route(
                "/relay",
                post(|| async { Json(json!({ "success": false, "error": "HTTP 404: Not Found" })) }),
            )
            .route("/bare", post(|| async { Json(json!({ "success": false })) })),
    )
    .await;

    let err = RelayClient::new(format!("{base}/relay"))
        .fetch_html("https://example.com/")
        .await
        .unwrap_err();
    assert!(matches!(&err, FetchError::Rejected(msg) if msg == "HTTP 404: Not Found"));

    let err = RelayClient::new(format!("{base}/bare"))
        .fetch_html("https://example.com/")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to fetch content");
}

#[tokio::test]
async fn relay_round_trip_over_http() {
    let hits = Hits::default();
    let pages = origin(hits.clone()).await;

    // a relay that fetches for real and echoes the wire response
    let relay = serve(Router::new().route(
        "/relay",
        post(|Json(req): Json<FetchRequest>| async move {
            let fetcher = HttpFetcher::new(FetchOptions::default()).unwrap();
            Json::<FetchResponse>(handle_fetch_request(&fetcher, &req).await)
        }),
    ))
    .await;
    let client = RelayClient::new(format!("{relay}/relay"));

    let err = client.fetch_html(&format!("{pages}/missing")).await.unwrap_err();
    assert!(matches!(&err, FetchError::Rejected(msg) if msg == "HTTP 404: Not Found"));

    let html = client.fetch_html(&format!("{pages}/recovers")).await;
    assert!(html.is_err());
    let html = client.fetch_html(&format!("{pages}/recovers")).await.unwrap();
    assert_eq!(html, "<p>back</p>");
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
