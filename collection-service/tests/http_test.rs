//! Router behaviour over the in-memory backend
#![cfg(feature = "http")]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use collection_service::prelude::*;
use prost::Message;
use tower::ServiceExt;

const PROFILE: &str = "http://example.com/profile/kv";
const BINARY: &str = "application/vnd.collection+protobuf";

fn config() -> HttpConfig {
    HttpConfig {
        href: "http://example.com/kv".to_string(),
        profile_href: PROFILE.to_string(),
        ..HttpConfig::default()
    }
}

fn app(store: MemoryStore) -> Router {
    let config = config();
    router(with_item_hrefs(CollectionService::new(store), &config), config)
}

fn request(method: Method, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, BINARY)
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn template_body(k: &str, v: &str) -> Vec<u8> {
    KeyValueTemplate::new(k, v).into_collection().encode_to_vec()
}

#[tokio::test]
async fn test_post_creates_and_renders_binary() {
    let store = MemoryStore::new();
    let (status, headers, body) = send(
        app(store.clone()),
        request(Method::POST, "/", template_body("a", "1")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        headers[header::CONTENT_TYPE],
        format!("{BINARY}; profile={PROFILE}").as_str()
    );
    assert_eq!(headers[header::LINK], format!("<{PROFILE}>; rel=\"profile\"").as_str());

    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    assert_eq!(resource.collection.href, "http://example.com/kv");
    assert_eq!(resource.collection.items.len(), 1);
    assert_eq!(resource.collection.items[0].href, "http://example.com/kv/a");
    assert_eq!(store.get("a").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_get_item_and_collection() {
    let store = MemoryStore::new();
    let service = CollectionService::new(store.clone());
    service.store(KeyValueTemplate::new("a", "1"));
    service.store(KeyValueTemplate::new("b", "2"));

    let (status, _, body) = send(app(store.clone()), request(Method::GET, "/b", Vec::new())).await;
    assert_eq!(status, StatusCode::OK);
    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    let pb = resource.collection.items[0].pb.clone().unwrap();
    assert_eq!((pb.key.as_str(), pb.value.as_str()), ("b", "2"));

    let (status, _, body) = send(app(store), request(Method::GET, "/", Vec::new())).await;
    assert_eq!(status, StatusCode::OK);
    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    assert_eq!(resource.collection.items.len(), 2);
}

#[tokio::test]
async fn test_get_missing_item_renders_error() {
    let (status, headers, body) =
        send(app(MemoryStore::new()), request(Method::GET, "/nope", Vec::new())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(headers.contains_key(header::LINK));
    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    let error = resource.collection.error.unwrap();
    assert_eq!(error.title, "Not Found");
}

#[tokio::test]
async fn test_put_updates_only_existing_items() {
    let store = MemoryStore::new();

    let (status, _, _) = send(
        app(store.clone()),
        request(Method::PUT, "/a", template_body("a", "1")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(store.is_empty());

    CollectionService::new(store.clone()).store(KeyValueTemplate::new("a", "1"));
    let (status, _, _) = send(
        app(store.clone()),
        request(Method::PUT, "/a", template_body("a", "2")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.get("a").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_post_garbage_is_bad_request() {
    let (status, _, body) = send(
        app(MemoryStore::new()),
        request(Method::POST, "/", vec![0x0a, 0xff, 0xff]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    assert_eq!(resource.collection.error.unwrap().title, "Error parsing body");
}

#[tokio::test]
async fn test_delete_twice() {
    let store = MemoryStore::new();
    CollectionService::new(store.clone()).store(KeyValueTemplate::new("a", "1"));

    let (status, headers, body) =
        send(app(store.clone()), request(Method::DELETE, "/a", Vec::new())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
    assert!(!headers.contains_key(header::LINK));

    let (status, _, body) =
        send(app(store.clone()), request(Method::DELETE, "/a", Vec::new())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let resource = KeyValueResource::decode(body.as_slice()).unwrap();
    assert!(resource.collection.error.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_text_plain_rendering() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/")
        .header(header::ACCEPT, "text/plain")
        .body(Body::empty())
        .unwrap();

    let (status, headers, body) = send(app(MemoryStore::new()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("KeyValueResource"));
    assert!(text.contains("http://example.com/kv"));
}
