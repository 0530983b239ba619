//! HTTP front end for collection services
//!
//! Maps HTTP verbs onto [`CollectionService`] operations and renders each
//! [`Outcome`] as a response:
//!
//! | Route          | Verb   | Operation                                 |
//! |----------------|--------|-------------------------------------------|
//! | `/`, `/{key}`  | GET    | `query`                                   |
//! | `/`, `/{key}`  | PUT    | `query`, then `store_bytes` when it is 200 |
//! | `/`, `/{key}`  | POST   | `store_bytes`                             |
//! | `/`, `/{key}`  | DELETE | `delete`                                  |
//!
//! A `204` outcome renders an empty body. Any other outcome gets the configured
//! collection href, a `Link: <profile>; rel="profile"` header, and either a
//! `text/plain` diagnostic dump (when `Accept` is exactly `text/plain`) or the
//! binary protobuf encoding.
//!
//! # Example
//!
//! ```rust,no_run
//! use collection_service::config::HttpConfig;
//! use collection_service::http::{router, with_item_hrefs};
//! use collection_service::memory::MemoryStore;
//! use collection_service::service::CollectionService;
//!
//! # async fn run() -> std::io::Result<()> {
//! let config = HttpConfig::default();
//! let service = with_item_hrefs(CollectionService::new(MemoryStore::new()), &config);
//! let app = router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::memory::{MemoryStore, Record};
use crate::model::{Collection, CollectionItem, Resource};
use crate::outcome::Outcome;
use crate::service::{CollectionService, ResourceService};

/// Media type selecting the diagnostic text representation
pub const TEXT_PLAIN: &str = "text/plain";

/// A [`ResourceService`] that can be addressed over HTTP
pub trait CollectionEndpoint: ResourceService {
    /// Criteria for the collection (`None`) or the item under `key`
    fn criteria(key: Option<String>) -> Self::Criteria;

    /// Path segment identifying `value` under the collection href
    fn item_key(value: &Self::Value) -> String;
}

impl CollectionEndpoint for MemoryStore {
    fn criteria(key: Option<String>) -> Option<String> {
        key
    }

    fn item_key(record: &Record) -> String {
        record.key.clone()
    }
}

/// Append an item hook that sets each item href under `config.href`
pub fn with_item_hrefs<S>(service: CollectionService<S>, config: &HttpConfig) -> CollectionService<S>
where
    S: CollectionEndpoint + 'static,
{
    let config = config.clone();
    service.with_hook(move |item, value| {
        item.set_href(config.item_href(&S::item_key(value)));
    })
}

struct EndpointState<S: ResourceService> {
    service: CollectionService<S>,
    config: HttpConfig,
}

impl<S: ResourceService> EndpointState<S> {
    fn render(&self, headers: &HeaderMap, outcome: Outcome<S::Resource>) -> Response {
        render(&self.config, accept(headers), outcome)
    }
}

/// Build a router serving `service`
pub fn router<S>(service: CollectionService<S>, config: HttpConfig) -> Router
where
    S: CollectionEndpoint + 'static,
{
    let state = Arc::new(EndpointState { service, config });

    Router::new()
        .route(
            "/",
            get(query_collection::<S>)
                .put(replace_collection::<S>)
                .post(store_collection::<S>)
                .delete(delete_collection::<S>),
        )
        .route(
            "/{key}",
            get(query_item::<S>)
                .put(replace_item::<S>)
                .post(store_collection::<S>)
                .delete(delete_item::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Render an outcome as an HTTP response
pub fn render<R: Resource>(config: &HttpConfig, accept: &str, outcome: Outcome<R>) -> Response {
    let (status, resource) = outcome.into_parts();

    let mut resource = match resource {
        Some(resource) if status != StatusCode::NO_CONTENT => resource,
        _ => return status.into_response(),
    };
    resource.collection_mut().set_href(config.href.clone());

    let mut response = if accept == TEXT_PLAIN {
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN))],
            format!("{resource:#?}"),
        )
            .into_response()
    } else {
        let mut response = (status, resource.encode_to_vec()).into_response();
        if let Ok(content_type) = HeaderValue::from_str(&config.full_content_type()) {
            response.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        response
    };

    if let Ok(link) = HeaderValue::from_str(&config.profile_link()) {
        response.headers_mut().insert(header::LINK, link);
    }

    response
}

fn accept(headers: &HeaderMap) -> &str {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

type Endpoint<S> = State<Arc<EndpointState<S>>>;

async fn query_collection<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.service.query(&S::criteria(None));
    state.render(&headers, outcome)
}

async fn query_item<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.service.query(&S::criteria(Some(key)));
    state.render(&headers, outcome)
}

async fn replace_collection<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = replace(&state.service, &S::criteria(None), &body);
    state.render(&headers, outcome)
}

async fn replace_item<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = replace(&state.service, &S::criteria(Some(key)), &body);
    state.render(&headers, outcome)
}

async fn store_collection<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = state.service.store_bytes(&body);
    state.render(&headers, outcome)
}

async fn delete_collection<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.service.delete(&S::criteria(None));
    state.render(&headers, outcome)
}

async fn delete_item<S: CollectionEndpoint + 'static>(
    State(state): Endpoint<S>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    let outcome = state.service.delete(&S::criteria(Some(key)));
    state.render(&headers, outcome)
}

// PUT only stores into something that already resolves.
fn replace<S: ResourceService>(
    service: &CollectionService<S>,
    criteria: &S::Criteria,
    body: &[u8],
) -> Outcome<S::Resource> {
    let outcome = service.query(criteria);
    if outcome.status == StatusCode::OK {
        service.store_bytes(body)
    } else {
        outcome
    }
}
