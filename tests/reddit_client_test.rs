//! Integration tests for the Reddit client against a mock API.

use reddit_saved_archiver::archiver::Mode;
use reddit_saved_archiver::config::Config;
use reddit_saved_archiver::reddit::{RedditClient, RedditError, SavedItem};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    Config {
        reddit_auth_url: format!("{}/api/v1/access_token", server.uri()),
        reddit_api_base: server.uri(),
        ..Config::for_testing()
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-123",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .mount(server)
        .await;
}

fn link(id: &str) -> serde_json::Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "title": format!("Post {id}"),
            "subreddit": "rust",
            "author": "ferris",
            "url": format!("https://example.com/{id}.png"),
            "permalink": format!("/r/rust/comments/{id}/post/"),
            "created_utc": 1_700_000_000.0,
            "selftext_html": null,
            "score": 42
        }
    })
}

fn comment(id: &str, replies: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "author": "crab",
            "body_html": "<p>hi</p>",
            "score": 1,
            "permalink": format!("/r/rust/comments/p1/post/{id}/"),
            "created_utc": 1_700_000_000.0,
            "replies": replies
        }
    })
}

fn listing(children: Vec<serde_json::Value>, after: Option<&str>) -> serde_json::Value {
    json!({ "kind": "Listing", "data": { "children": children, "after": after } })
}

#[tokio::test]
async fn test_saved_listing_follows_pagination() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/user/test-user/saved"))
        .and(query_param("after", "t3_b"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![comment("c1", json!(""))],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/test-user/saved"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            vec![link("a"), link("b")],
            Some("t3_b"),
        )))
        .mount(&server)
        .await;

    let client = RedditClient::login(&test_config(&server)).await.unwrap();
    let items = client.listing(Mode::Saved).await.unwrap();

    let ids: Vec<_> = items
        .iter()
        .map(|item| match item {
            SavedItem::Post(p) => format!("post:{}", p.id),
            SavedItem::Comment(c) => format!("comment:{}", c.id),
        })
        .collect();
    assert_eq!(ids, vec!["post:a", "post:b", "comment:c1"]);
}

#[tokio::test]
async fn test_comments_drop_more_placeholders() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let more = json!({ "kind": "more", "data": { "count": 12, "children": ["x", "y"] } });
    let nested = listing(vec![comment("c2", json!("")), more.clone()], None);
    let body = json!([
        listing(vec![link("p1")], None),
        listing(vec![comment("c1", nested), more], None),
    ]);
    Mock::given(method("GET"))
        .and(path("/comments/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = RedditClient::login(&test_config(&server)).await.unwrap();
    let comments = client.comments("p1").await.unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].id, "c1");
    assert_eq!(comments[0].replies.len(), 1);
    assert_eq!(comments[0].replies[0].id, "c2");
    assert_eq!(comments[0].author.as_deref(), Some("crab"));
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let err = RedditClient::login(&test_config(&server)).await.unwrap_err();
    assert!(matches!(err, RedditError::Auth { ref reason } if reason == "invalid_grant"));
}

#[tokio::test]
async fn test_listing_error_status() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/user/test-user/upvoted"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = RedditClient::login(&test_config(&server)).await.unwrap();
    let err = client.listing(Mode::Upvoted).await.unwrap_err();
    assert!(matches!(err, RedditError::Status { status: 403, .. }));
}
