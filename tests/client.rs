//! Integration tests for StoryClient against a mock transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;
use storyserver_client::hash::base64_hmac_sha1;
use storyserver_client::{Config, Context, Error, ErrorKind, HttpSend, Result, StoryClient};

const KEY_ID: &str = "23u73reqmzh4x4y0ujyanv0r";
const SECRET_KEY: &str = "1ce48e640809f8622647ae8b75f7970ad8733c207b31c901e8134c5c652bce6c";

/// Mock transport that captures the outgoing request and returns a canned
/// response.
#[derive(Debug)]
struct MockHttpSend {
    status: u16,
    content_type: &'static str,
    body: &'static str,
    captured: Arc<Mutex<Option<http::request::Parts>>>,
}

impl MockHttpSend {
    fn json(body: &'static str) -> Self {
        Self {
            status: 200,
            content_type: "application/json; charset=utf8",
            body,
            captured: Arc::new(Mutex::new(None)),
        }
    }

    fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, _) = req.into_parts();
        *self.captured.lock().unwrap() = Some(parts);

        let resp = http::Response::builder()
            .status(self.status)
            .header("content-type", self.content_type)
            .body(Bytes::from_static(self.body.as_bytes()))
            .unwrap();
        Ok(resp)
    }
}

/// Mock transport that fails every round trip.
#[derive(Debug)]
struct FailingHttpSend;

#[async_trait]
impl HttpSend for FailingHttpSend {
    async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::transport_failed("connection refused"))
    }
}

fn config() -> Config {
    Config::new()
        .with_story_server("http://127.0.0.1:9233/api/v1")
        .with_app_server("http://www.somewebsite.com")
        .with_key_id(KEY_ID)
        .with_secret_key(SECRET_KEY)
        .with_format("thumbnail", "450x300")
        .with_format("preview", "900l")
        .with_format("large", "1024l")
        .with_format("special", "175x55")
}

type Captured = Arc<Mutex<Option<http::request::Parts>>>;

fn client_with(mock: MockHttpSend) -> (StoryClient, Captured) {
    let _ = env_logger::builder().is_test(true).try_init();

    let captured = mock.captured.clone();
    let ctx = Context::new().with_http_send(mock);
    let client = StoryClient::new(ctx, config()).unwrap();
    (client, captured)
}

fn captured_parts(captured: &Captured) -> http::request::Parts {
    captured.lock().unwrap().take().expect("request was sent")
}

#[tokio::test]
async fn test_get_index_without_ids_omits_query() -> Result<()> {
    let (client, captured) = client_with(MockHttpSend::json(r#"{"stories":[]}"#));

    let index = client.get_index(&[], "").await?;

    let parts = captured_parts(&captured);
    assert_eq!(
        parts.uri.to_string(),
        format!("http://127.0.0.1:9233/api/v1/stories/{KEY_ID}")
    );
    assert_eq!(parts.uri.query(), None);
    assert_eq!(parts.method, http::Method::GET);

    assert_eq!(index.data, json!({ "stories": [] }));
    assert_eq!(index.app_server, "http://www.somewebsite.com");
    assert_eq!(index.response.status, 200);
    assert!(index.response.is_success());
    assert_eq!(
        index.response.content_type.as_deref(),
        Some("application/json; charset=utf8")
    );

    Ok(())
}

#[tokio::test]
async fn test_get_index_with_ids_joins_with_commas() -> Result<()> {
    let (client, captured) = client_with(MockHttpSend::json(r#"{"stories":[]}"#));

    client.get_index(&["3", "5"], "").await?;

    let parts = captured_parts(&captured);
    assert_eq!(parts.uri.query(), Some("ids=3,5"));
    assert_eq!(parts.uri.path(), format!("/api/v1/stories/{KEY_ID}"));

    Ok(())
}

#[tokio::test]
async fn test_request_headers_on_the_wire() -> Result<()> {
    let (client, captured) = client_with(MockHttpSend::json("{}"));

    client.get_index(&[], "").await?;

    let parts = captured_parts(&captured);

    // `date` is an HTTP date.
    let date = parts.headers.get("date").unwrap().to_str().unwrap();
    assert!(date.ends_with(" GMT"), "not an HTTP date: {date}");
    chrono::DateTime::parse_from_rfc2822(date).expect("date header must parse");

    // `authorization` is recomputable from the date that was actually sent.
    let expected_signature = base64_hmac_sha1(
        SECRET_KEY.as_bytes(),
        format!("date: {date}").as_bytes(),
    );
    assert_eq!(
        parts.headers.get("authorization").unwrap().to_str().unwrap(),
        format!(
            "Signature keyId=\"{KEY_ID}\",algorithm=\"hmac-sha1\",\
             headers=\"date\",signature=\"{expected_signature}\""
        )
    );

    // `formats` is the JSON-serialized preset map, sorted by name.
    assert_eq!(
        parts.headers.get("formats").unwrap().to_str().unwrap(),
        r#"{"large":"1024l","preview":"900l","special":"175x55","thumbnail":"450x300"}"#
    );

    Ok(())
}

#[tokio::test]
async fn test_get_story_by_id_builds_path_and_app_server() -> Result<()> {
    let (client, captured) = client_with(MockHttpSend::json(r#"{"title":"The Garden"}"#));

    let story = client.get_story_by_id("21", "chapter/2").await?;

    let parts = captured_parts(&captured);
    assert_eq!(parts.uri.path(), format!("/api/v1/stories/{KEY_ID}/21"));

    assert_eq!(story.story_id, "21");
    assert_eq!(story.data, json!({ "title": "The Garden" }));
    assert_eq!(story.app_server, "http://www.somewebsite.com/chapter/2");

    Ok(())
}

#[tokio::test]
async fn test_get_story_by_id_with_empty_path() -> Result<()> {
    let (client, _captured) = client_with(MockHttpSend::json("{}"));

    let story = client.get_story_by_id("21", "").await?;
    assert_eq!(story.app_server, "http://www.somewebsite.com");

    Ok(())
}

#[tokio::test]
async fn test_get_story_by_url_percent_encodes_segment() -> Result<()> {
    let (client, captured) = client_with(MockHttpSend::json("{}"));

    let story = client
        .get_story_by_url("https://example.com/a story", "")
        .await?;

    let parts = captured_parts(&captured);
    assert_eq!(
        parts.uri.path(),
        format!("/api/v1/stories/{KEY_ID}/url/https:%2F%2Fexample.com%2Fa%20story")
    );

    // The envelope carries the caller's url untouched.
    assert_eq!(story.url, "https://example.com/a story");

    Ok(())
}

#[tokio::test]
async fn test_safe_json_escapes_body() -> Result<()> {
    let (client, _captured) =
        client_with(MockHttpSend::json(r#"{"q":"O'Brien","p":"a\\b"}"#));

    let story = client.get_story_by_id("21", "").await?;

    assert_eq!(story.data["q"], json!("O'Brien"));
    assert_eq!(story.data["p"], json!("a\\b"));
    assert_eq!(
        story.response.safe_json,
        r#"{"q":"O\'Brien","p":"a\\\\b"}"#
    );

    Ok(())
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let (client, _captured) = client_with(
        MockHttpSend::json("<html>oops</html>").with_content_type("text/html"),
    );

    let err = client.get_story_by_id("21", "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResponseMalformed);
}

#[tokio::test]
async fn test_non_2xx_status_passes_through() -> Result<()> {
    let (client, _captured) =
        client_with(MockHttpSend::json(r#"{"error":"boom"}"#).with_status(500));

    let story = client.get_story_by_id("21", "").await?;

    assert_eq!(story.response.status, 500);
    assert!(!story.response.is_success());
    assert_eq!(story.data, json!({ "error": "boom" }));

    Ok(())
}

#[tokio::test]
async fn test_transport_failure_surfaces() {
    let ctx = Context::new().with_http_send(FailingHttpSend);
    let client = StoryClient::new(ctx, config()).unwrap();

    let err = client.get_index(&[], "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailed);
}
