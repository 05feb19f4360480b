//! HTTP adapter tests: in-process via `oneshot` and over a real listener.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router as AxumRouter;
use tower::ServiceExt;

use versioned_router::config::parse_config;
use versioned_router::http::HttpServer;
use versioned_router::observability::metrics;

mod common;

const CONFIG: &str = r#"
[expressions]
id = '\d+'

[default_route]
status = 404
body = "nothing at {path}"

[[routes]]
methods = ["GET"]
pattern = "/users/:id-(:id:)"
body = "user {id}"

[[routes]]
methods = ["GET"]
pattern = "/users/:id-(:id:)"
version = "2.0.0"
body = "v2 user {id}"

[[routes]]
methods = ["POST", "PUT"]
pattern = "/docs/:kind-(pdf|html)/*"
status = 201
content_type = "application/json"
body = '{"kind": "{kind}", "rest": "{*}"}'
"#;

fn app(toml: &str) -> AxumRouter {
    let config = parse_config(toml).unwrap();
    let router = common::config_router(toml);
    HttpServer::new(&config.server, router).unwrap().into_router()
}

async fn send(app: AxumRouter, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_dispatch_with_params() {
    let (status, headers, body) = send(app(CONFIG), get("/users/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "user 7");
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/plain; charset=utf-8"
    );
}

#[tokio::test]
async fn test_version_header_selects_handler() {
    let request = Request::builder()
        .uri("/users/7")
        .header("accept-version", "2.x")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(CONFIG), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "v2 user 7");
}

#[tokio::test]
async fn test_custom_version_header() {
    let toml = format!("[server]\nversion_header = \"x-api-version\"\n{CONFIG}");
    let request = Request::builder()
        .uri("/users/7")
        .header("x-api-version", "2.0.0")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = send(app(&toml), request).await;
    assert_eq!(body, "v2 user 7");
}

#[tokio::test]
async fn test_enum_and_wildcard_route() {
    let request = Request::builder()
        .method("PUT")
        .uri("/docs/pdf/a/b.pdf?download=1")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(app(CONFIG), request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["kind"], "pdf");
    assert_eq!(json["rest"], "a/b.pdf");
}

#[tokio::test]
async fn test_fallback_and_not_found() {
    let (status, _, body) = send(app(CONFIG), get("/users/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    // Fallback gets no parameters, so the placeholder stays
    assert_eq!(body, "nothing at {path}");

    let (status, _, body) = send(app("[[routes]]\npattern = \"/a\"\n"), get("/b")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "No matching route found");
}

#[tokio::test]
async fn test_unsupported_method() {
    let request = Request::builder()
        .method("BREW")
        .uri("/users/7")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(CONFIG), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    // The client's token never becomes a metric label
    assert_eq!(metrics::method_label("BREW"), metrics::OTHER_METHOD);
}

#[tokio::test]
async fn test_request_id_generated_and_propagated() {
    let (_, headers, _) = send(app(CONFIG), get("/users/1")).await;
    let generated = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    let request = Request::builder()
        .uri("/users/1")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(app(CONFIG), request).await;
    assert_eq!(headers.get("x-request-id").unwrap(), "abc-123");
}

#[tokio::test]
async fn test_end_to_end_over_tcp() {
    let server = common::start_server(CONFIG).await;
    let client = reqwest::Client::new();

    let response = client.get(server.url("/users/42")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "user 42");

    let response = client
        .get(server.url("/users/42"))
        .header("accept-version", "2")
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "v2 user 42");

    let response = client
        .post(server.url("/docs/html/index"))
        .body("ignored")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let json: serde_json::Value = response.json().await.unwrap();
    assert_eq!(json["kind"], "html");
    assert_eq!(json["rest"], "index");

    server.stop().await;
}
