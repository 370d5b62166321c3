//! HTTP-level tests for RedditClient against an in-process listing server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use reddit_client::{RedditClient, RedditError};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct SeenRequest {
    subreddit: String,
    query: HashMap<String, String>,
    authorization: Option<String>,
    user_agent: Option<String>,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

async fn listing(
    State(seen): State<Seen>,
    Path(subreddit): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    seen.lock().unwrap().push(SeenRequest {
        subreddit: subreddit.clone(),
        query: query.clone(),
        authorization: header("authorization"),
        user_agent: header("user-agent"),
    });

    if subreddit == "private" {
        return (StatusCode::FORBIDDEN, Json(json!({"message": "Forbidden"})));
    }

    let body = match query.get("after").map(String::as_str) {
        None => json!({"kind": "Listing", "data": {"after": "t3_next", "children": [
            {"kind": "t3", "data": {"name": "t3_a", "title": "A", "selftext": "alpha", "upvote_ratio": 0.5}}
        ]}}),
        Some(_) => json!({"kind": "Listing", "data": {"after": null, "children": [
            {"kind": "t3", "data": {"name": "t3_b", "title": "B", "selftext": "beta", "upvote_ratio": 0.75}}
        ]}}),
    };
    (StatusCode::OK, Json(body))
}

async fn serve() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/r/{subreddit}/new", get(listing))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

#[tokio::test]
async fn first_page_sends_limit_auth_and_user_agent() {
    let (base, seen) = serve().await;
    let client = RedditClient::new()
        .with_base_url(&base)
        .with_user_agent("tagger-test/1.0");

    let page = client
        .new_posts_page("investing", "tok123", None, 100)
        .await
        .unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].name, "t3_a");
    assert_eq!(page.after.as_deref(), Some("t3_next"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].subreddit, "investing");
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("100"));
    assert!(!seen[0].query.contains_key("after"));
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok123"));
    assert_eq!(seen[0].user_agent.as_deref(), Some("tagger-test/1.0"));
}

#[tokio::test]
async fn cursor_is_passed_as_after() {
    let (base, seen) = serve().await;
    let client = RedditClient::new().with_base_url(&base);

    let page = client
        .new_posts_page("investing", "tok", Some("t3_next"), 100)
        .await
        .unwrap();

    assert_eq!(page.posts[0].name, "t3_b");
    assert!(page.after.is_none());
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].query.get("after").map(String::as_str), Some("t3_next"));
}

#[tokio::test]
async fn limit_is_clamped_to_page_maximum() {
    let (base, seen) = serve().await;
    let client = RedditClient::new().with_base_url(&base);

    client
        .new_posts_page("investing", "tok", None, 500)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].query.get("limit").map(String::as_str), Some("100"));
}

#[tokio::test]
async fn non_success_status_is_api_error() {
    let (base, _seen) = serve().await;
    let client = RedditClient::new().with_base_url(&base);

    let err = client
        .new_posts_page("private", "tok", None, 100)
        .await
        .unwrap_err();

    match err {
        RedditError::Api { status, .. } => assert_eq!(status, 403),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RedditClient::new().with_base_url(&format!("http://{addr}"));

    let err = client
        .new_posts_page("investing", "tok", None, 100)
        .await
        .unwrap_err();

    assert!(matches!(err, RedditError::Network(_)), "got {err:?}");
}
