//! # collection-service
//!
//! A uniform way to expose an arbitrary backing data source as a browsable
//! collection of items with query, store and delete operations. Every operation
//! produces a status-coded [`Outcome`](outcome::Outcome) whose resource
//! describes the collection, its items, the submitted template and any error.
//!
//! ## Features
//!
//! - **Extension points**: implement [`ResourceService`](service::ResourceService)
//!   for a backend (query, validate, save, delete, project)
//! - **Consistent outcomes**: recoverable errors keep their status, anything else
//!   becomes a generic 500; submitted templates are echoed even on failure
//! - **Item hooks**: decorate projected items without touching the backend
//! - **Binary wire format**: resources are prost messages, `store_bytes` decodes
//!   them directly
//! - **HTTP front end** (`http` feature): axum router with content negotiation
//!
//! ## Example
//!
//! ```rust
//! use collection_service::prelude::*;
//!
//! let service = CollectionService::new(MemoryStore::new());
//!
//! let outcome = service.store(KeyValueTemplate::new("a", "1"));
//! assert_eq!(outcome.status, StatusCode::CREATED);
//!
//! let outcome = service.query(&Some("a".to_string()));
//! assert_eq!(outcome.status, StatusCode::OK);
//! assert_eq!(outcome.collection().unwrap().items().len(), 1);
//!
//! let outcome = service.query(&None);
//! assert_eq!(outcome.collection().unwrap().items().len(), 1);
//! ```

pub mod config;
pub mod error;
pub mod hooks;
pub mod memory;
pub mod model;
pub mod observability;
pub mod outcome;
pub mod service;

#[cfg(feature = "http")]
pub mod http;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, HttpConfig, ServiceConfig};
    pub use crate::error::{Error, Result, ServiceError};
    pub use crate::hooks::{ItemHook, ItemHooks};
    pub use crate::memory::{
        KeyValue, KeyValueCollection, KeyValueItem, KeyValueResource, KeyValueTemplate,
        MemoryStore, Record,
    };
    pub use crate::model::{Collection, CollectionError, CollectionItem, Resource};
    pub use crate::observability::init_tracing;
    pub use crate::outcome::{capture, Outcome};
    pub use crate::service::{
        CollectionOf, CollectionService, ItemOf, ResourceService, ServiceHooks, TemplateOf,
    };

    #[cfg(feature = "http")]
    pub use crate::http::{render, router, with_item_hrefs, CollectionEndpoint};

    pub use ::http::StatusCode;
}
