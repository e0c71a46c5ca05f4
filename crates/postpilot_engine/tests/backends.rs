use postpilot_engine::{
    EngineConfig, ForumClient, GeminiClient, HeadlineSource, MicroblogClient, RedditClient,
    RssHeadlineSource, ServiceError, Target, TextGenerator, XClient, GEMINI_API_KEY,
    REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET, REDDIT_PASSWORD, REDDIT_USERNAME, X_ACCESS_TOKEN,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{
    basic_auth, bearer_token, body_json, body_string_contains, header, method, path,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> EngineConfig {
    let mut config = EngineConfig::from_lookup(|name| {
        let value = match name {
            GEMINI_API_KEY => "gemini-key",
            X_ACCESS_TOKEN => "x-token",
            REDDIT_CLIENT_ID => "client-id",
            REDDIT_CLIENT_SECRET => "client-secret",
            REDDIT_USERNAME => "poster",
            REDDIT_PASSWORD => "hunter2",
            _ => return None,
        };
        Some(value.to_string())
    });
    config.endpoints.gemini = server.uri();
    config.endpoints.x = server.uri();
    config.endpoints.reddit_auth = server.uri();
    config.endpoints.reddit_api = server.uri();
    config.feed_url = format!("{}/feed", server.uri());
    config
}

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
}

#[tokio::test]
async fn gemini_generate_sends_key_and_cleans_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(header("x-goog-api-key", "gemini-key"))
        .and(body_string_contains("Write about Rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("  **Rust** is great\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).expect("client");
    let text = client.generate("Write about Rust").await.expect("generate ok");
    assert_eq!(text, "Rust is great");
}

#[tokio::test]
async fn gemini_refine_wraps_draft_in_instructions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash:generateContent"))
        .and(body_string_contains("280 characters or less"))
        .and(body_string_contains("Launch day"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply("\"Launch day! #rust\"")),
        )
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).expect("client");
    let text = client
        .refine("Launch day", Target::Microblog)
        .await
        .expect("refine ok");
    assert_eq!(text, "Launch day! #rust");
}

#[tokio::test]
async fn gemini_bad_key_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&config_for(&server)).expect("client");
    let err = client.generate("hello").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::HttpStatus {
            service: "Gemini",
            status: 400,
            message: "API key not valid.".to_string()
        }
    );
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.credentials.gemini_api_key = None;
    let client = GeminiClient::new(&config).expect("client");
    let err = client.generate("hello").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::MissingCredential {
            name: GEMINI_API_KEY
        }
    );
}

#[tokio::test]
async fn x_post_returns_permalink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(bearer_token("x-token"))
        .and(body_json(json!({ "text": "Shipping today #rust" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1790000000000000000", "text": "Shipping today #rust" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = XClient::new(&config_for(&server)).expect("client");
    let receipt = client.post("Shipping today #rust").await.expect("post ok");
    assert_eq!(receipt.id.as_deref(), Some("1790000000000000000"));
    assert_eq!(
        receipt.permalink.as_deref(),
        Some("https://x.com/i/status/1790000000000000000")
    );
}

#[tokio::test]
async fn x_forbidden_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "title": "Forbidden",
            "detail": "You are not permitted to perform this action."
        })))
        .mount(&server)
        .await;

    let client = XClient::new(&config_for(&server)).expect("client");
    let err = client.post("hi").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Unauthorized {
            service: "X",
            message: "You are not permitted to perform this action.".to_string()
        }
    );
}

async fn mount_reddit_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(basic_auth("client-id", "client-secret"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=poster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "reddit-token",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn reddit_post_authenticates_then_submits() {
    let server = MockServer::start().await;
    mount_reddit_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/submit"))
        .and(bearer_token("reddit-token"))
        .and(body_string_contains("sr=test"))
        .and(body_string_contains("kind=self"))
        .and(body_string_contains("api_type=json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": {
                "errors": [],
                "data": {
                    "id": "1abc",
                    "name": "t3_1abc",
                    "url": "https://www.reddit.com/r/test/comments/1abc/title/"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RedditClient::new(&config_for(&server)).expect("client");
    let receipt = client
        .post("Title", "Body text", "test")
        .await
        .expect("post ok");
    assert_eq!(
        receipt.permalink.as_deref(),
        Some("https://www.reddit.com/r/test/comments/1abc/title/")
    );
}

#[tokio::test]
async fn reddit_wrong_password_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/submit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = RedditClient::new(&config_for(&server)).expect("client");
    let err = client.post("Title", "Body", "test").await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::Unauthorized {
            service: "Reddit",
            message: "invalid_grant".to_string()
        }
    );
}

#[tokio::test]
async fn reddit_submit_errors_are_rejected() {
    let server = MockServer::start().await;
    mount_reddit_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "json": { "errors": [["RATELIMIT", "you are doing that too much", "ratelimit"]] }
        })))
        .mount(&server)
        .await;

    let client = RedditClient::new(&config_for(&server)).expect("client");
    let err = client.post("Title", "Body", "test").await.unwrap_err();
    assert!(matches!(err, ServiceError::Rejected { service: "Reddit", .. }));
    assert!(err.to_string().contains("RATELIMIT"));
}

const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>AI</title>
<item><title>First</title><link>https://example.com/1</link><description>One</description></item>
<item><title>Second</title><link>https://example.com/2</link></item>
</channel></rss>"#;

#[tokio::test]
async fn rss_source_fetches_and_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEED, "application/rss+xml"))
        .mount(&server)
        .await;

    let source = RssHeadlineSource::new(&config_for(&server)).expect("source");
    let articles = source.fetch(1).await.expect("fetch ok");
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].title, "First");
    assert_eq!(articles[0].summary.as_deref(), Some("One"));
}

#[tokio::test]
async fn rss_source_rejects_html_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let source = RssHeadlineSource::new(&config_for(&server)).expect("source");
    let err = source.fetch(5).await.unwrap_err();
    assert!(matches!(err, ServiceError::Decode { service: "RSS", .. }));
}

#[tokio::test]
async fn rss_source_enforces_size_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FEED, "application/rss+xml"))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.http.max_bytes = 16;
    let source = RssHeadlineSource::new(&config).expect("source");
    let err = source.fetch(5).await.unwrap_err();
    assert_eq!(
        err,
        ServiceError::TooLarge {
            service: "RSS",
            max_bytes: 16
        }
    );
}
