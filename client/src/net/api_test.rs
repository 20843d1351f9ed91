use super::*;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};

const FOUND_BODY: &str = r#"{"answer_ja":"ゲートに触れた場合は2秒のペナルティです。","confidence":0.82,"citations":[{"rule_id":"R25","section_title":"Touching a gate","quote_en":"A touch of a gate pole...","source_url":"https://example.test/r25","score":0.9}],"meta":{"rag_corpus":"icf-2024","top_k":5,"warnings":[]}}"#;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn fixed_reply(status: StatusCode, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        ASK_PATH,
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );
    (serve(app).await, hits)
}

fn unreachable_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// =============================================================
// parse_reply
// =============================================================

#[test]
fn parse_reply_success_returns_response() {
    let response = parse_reply(200, FOUND_BODY).unwrap();
    assert_eq!(response.citations.len(), 1);
    assert_eq!(response.citations[0].rule_id, "R25");
    assert_eq!(response.meta.rag_corpus, "icf-2024");
}

#[test]
fn parse_reply_error_status_is_typed() {
    let err = parse_reply(404, r#"{"error":"no match","code":"NOT_FOUND"}"#).unwrap_err();
    let (status, body) = err.api_error().unwrap();
    assert_eq!(status, 404);
    assert_eq!(body.error, "no match");
}

#[test]
fn parse_reply_error_status_with_unparsable_body_is_untyped() {
    let err = parse_reply(500, "Internal Server Error").unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
    assert!(err.to_string().contains("500"));
}

#[test]
fn parse_reply_malformed_success_body_is_untyped() {
    let err = parse_reply(200, r#"{"answer_ja":"x"}"#).unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}

#[test]
fn parse_reply_keeps_out_of_range_scores() {
    let body = r#"{"answer_ja":"x","confidence":1.7,"citations":[{"score":-0.2}],"meta":{"rag_corpus":"c","top_k":1}}"#;
    let response = parse_reply(200, body).unwrap();
    assert_eq!(response.confidence, 1.7);
    assert_eq!(response.citations[0].score, -0.2);
}

#[test]
fn endpoint_joins_trimmed_base() {
    let client = ApiClient::new("http://gateway.test:3000/").unwrap();
    assert_eq!(client.base_url(), "http://gateway.test:3000");
    assert_eq!(endpoint(client.base_url(), ASK_PATH), "http://gateway.test:3000/api/ask");
}

// =============================================================
// ask_question over HTTP
// =============================================================

#[tokio::test]
async fn ask_question_posts_json_once() {
    let seen = Arc::new(std::sync::Mutex::new(None::<(Option<String>, Bytes)>));
    let recorder = seen.clone();
    let app = Router::new().route(
        ASK_PATH,
        post(move |headers: HeaderMap, body: Bytes| {
            let recorder = recorder.clone();
            async move {
                let content_type = headers
                    .get(header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);
                *recorder.lock().unwrap() = Some((content_type, body));
                (StatusCode::OK, FOUND_BODY)
            }
        }),
    );
    let base = serve(app).await;
    let client = ApiClient::new(&base).unwrap();

    let request = AskRequest::new("ゲートに触った場合のペナルティは？");
    let response = client.ask_question(&request).await.unwrap();
    assert!((response.confidence - 0.82).abs() < f64::EPSILON);

    let (content_type, body) = seen.lock().unwrap().clone().unwrap();
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let sent: AskRequest = serde_json::from_slice(&body).unwrap();
    assert_eq!(sent, request);
}

#[tokio::test]
async fn ask_question_maps_not_found_to_typed_error() {
    let (base, hits) = fixed_reply(StatusCode::NOT_FOUND, r#"{"error":"no match","code":"NOT_FOUND"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let err = client.ask_question(&AskRequest::new("q")).await.unwrap_err();
    assert!(err.is_typed());
    assert_eq!(err.api_error().unwrap().0, 404);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ask_question_does_not_retry_server_errors() {
    let (base, hits) = fixed_reply(StatusCode::SERVICE_UNAVAILABLE, r#"{"error":"busy"}"#).await;
    let client = ApiClient::new(&base).unwrap();

    let err = client.ask_question(&AskRequest::new("q")).await.unwrap_err();
    assert_eq!(err.api_error().map(|(s, b)| (s, b.error.clone())), Some((503, "busy".to_owned())));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ask_question_unreachable_is_transport_error() {
    let client = ApiClient::new(&unreachable_base()).unwrap();

    let err = client.ask_question(&AskRequest::new("q")).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(!err.is_typed());
}

#[tokio::test]
async fn deadline_elapses_on_slow_backend() {
    let app = Router::new().route(
        ASK_PATH,
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, FOUND_BODY)
        }),
    );
    let base = serve(app).await;
    let client = ApiClient::new(&base).unwrap().with_deadline(Some(Duration::from_millis(100)));

    let err = client.ask(&AskRequest::new("q")).await.unwrap_err();
    assert!(matches!(err, ClientError::DeadlineElapsed(d) if d == Duration::from_millis(100)));
    assert!(!err.is_typed());
}

#[tokio::test]
async fn deadline_not_hit_returns_response() {
    let (base, _hits) = fixed_reply(StatusCode::OK, FOUND_BODY).await;
    let client = ApiClient::new(&base).unwrap();

    let response = client
        .ask_question_with_deadline(&AskRequest::new("q"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(response.meta.top_k, 5);
}

#[tokio::test]
async fn ping_reports_health_status() {
    let app = Router::new().route(HEALTH_PATH, get(|| async { StatusCode::OK }));
    let base = serve(app).await;
    let client = ApiClient::new(&base).unwrap();

    assert_eq!(client.ping().await.unwrap(), 200);
}
