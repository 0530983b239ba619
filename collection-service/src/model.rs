//! Resource model for collection responses
//!
//! A response is a [`Resource`] wrapping a single [`Collection`]. The collection
//! carries the projected items (in projection order), at most one input
//! template, at most one [`CollectionError`], and an href filled in by the
//! front end once the operation has completed.
//!
//! Each concrete service defines its own prost messages for these shapes so the
//! item and template payloads can be domain-specific while the binary encoding
//! stays schema-based. The traits in this module are the structural view the
//! orchestrator needs.
//!
//! # Example
//!
//! ```rust
//! use collection_service::memory::{KeyValue, KeyValueResource, KeyValueTemplate};
//! use collection_service::model::{Collection, Resource};
//!
//! let mut resource = KeyValueResource::default();
//! resource.collection_mut().set_template(KeyValueTemplate {
//!     pb: Some(KeyValue { key: "a".into(), value: "1".into() }),
//! });
//! assert!(resource.collection().template().is_some());
//! assert!(resource.collection().items().is_empty());
//! ```

use std::fmt;

/// Error object carried by a collection when an operation fails
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct CollectionError {
    /// Short human-readable summary
    #[prost(string, tag = "1")]
    pub title: String,
    /// Application error code (the numeric status by default)
    #[prost(string, tag = "2")]
    pub code: String,
    /// Detailed description of the failure
    #[prost(string, tag = "3")]
    pub message: String,
}

impl CollectionError {
    /// Create a new collection error
    pub fn new(
        title: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Top-level response message
pub trait Resource: prost::Message + Default + Clone + fmt::Debug {
    /// The collection message nested in this resource
    type Collection: Collection;

    /// Borrow the collection
    fn collection(&self) -> &Self::Collection;

    /// Mutably borrow the collection
    fn collection_mut(&mut self) -> &mut Self::Collection;
}

/// Collection message: items, template, error and href
pub trait Collection: prost::Message + Default + Clone + fmt::Debug {
    /// One projected domain record
    type Item: CollectionItem;

    /// Client-submitted input payload for create/update
    type Template: Clone + Default + PartialEq + fmt::Debug;

    /// The collection href
    fn href(&self) -> &str;

    /// Set the collection href
    fn set_href(&mut self, href: String);

    /// Items in projection order
    fn items(&self) -> &[Self::Item];

    /// Append a fresh, empty item and return it for projection
    fn add_item(&mut self) -> &mut Self::Item;

    /// Drop every projected item
    fn clear_items(&mut self);

    /// The template, if one is present
    fn template(&self) -> Option<&Self::Template>;

    /// Replace the template
    fn set_template(&mut self, template: Self::Template);

    /// Remove and return the template
    fn take_template(&mut self) -> Option<Self::Template>;

    /// The error, if one is present
    fn error(&self) -> Option<&CollectionError>;

    /// Replace the error
    fn set_error(&mut self, error: CollectionError);
}

/// An item inside a collection
pub trait CollectionItem: Default + fmt::Debug {
    /// The item href
    fn href(&self) -> &str;

    /// Set the item href
    fn set_href(&mut self, href: String);
}
