//! Resource service contract and orchestration
//!
//! A backend implements [`ResourceService`], the six extension points the
//! collection protocol needs. [`CollectionService`] composes a backend with its
//! [`ItemHooks`] and exposes the public operations, each of which runs inside a
//! single [`capture`] scope and always returns an [`Outcome`].
//!
//! | Operation          | Success status        | Resource                       |
//! |--------------------|-----------------------|--------------------------------|
//! | `query`            | 200                   | projected items                |
//! | `store`            | status from `save`    | echoed template + one item     |
//! | `store_bytes`      | status from `save`    | echoed template + one item     |
//! | `delete` (removed) | 204                   | none                           |
//! | `delete` (absent)  | 404                   | empty, no error object         |
//!
//! Failures resolve to the raised error's status (or 500) with the collection
//! error populated; an echoed template survives the failure.
//!
//! # Example
//!
//! ```rust
//! use collection_service::memory::{KeyValue, KeyValueTemplate, MemoryStore};
//! use collection_service::service::CollectionService;
//! use http::StatusCode;
//!
//! let service = CollectionService::new(MemoryStore::new());
//! let template = KeyValueTemplate {
//!     pb: Some(KeyValue { key: "a".into(), value: "1".into() }),
//! };
//!
//! assert_eq!(service.store(template).status, StatusCode::CREATED);
//! assert_eq!(service.delete(&Some("a".into())).status, StatusCode::NO_CONTENT);
//! ```

use http::StatusCode;
use prost::Message;

use crate::error::{Result, ServiceError};
use crate::hooks::ItemHooks;
use crate::model::{Collection, Resource};
use crate::outcome::{capture, Outcome};

/// Collection message of a service
pub type CollectionOf<S> = <<S as ResourceService>::Resource as Resource>::Collection;

/// Item message of a service
pub type ItemOf<S> = <CollectionOf<S> as Collection>::Item;

/// Template message of a service
pub type TemplateOf<S> = <CollectionOf<S> as Collection>::Template;

/// Hook list matching a service's items and values
pub type ServiceHooks<S> = ItemHooks<ItemOf<S>, <S as ResourceService>::Value>;

/// Extension points a concrete backend supplies
///
/// Implementations own their storage and its consistency; the orchestrator
/// imposes no locking of its own.
pub trait ResourceService: Send + Sync {
    /// Response message shaped for this service's domain
    type Resource: Resource;

    /// Selection criteria for `query_items` and `delete`
    type Criteria;

    /// Domain value projected onto items
    type Value;

    /// Fresh, empty resource for one operation
    fn new_resource(&self) -> Self::Resource {
        Self::Resource::default()
    }

    /// Values matching `criteria`
    ///
    /// `Ok(None)` means "not found" and is distinct from an empty sequence.
    fn query_items(
        &self,
        criteria: &Self::Criteria,
    ) -> Result<Option<impl IntoIterator<Item = Self::Value>>>;

    /// Convert a template into a value for [`save`](Self::save)
    ///
    /// Fails with a recoverable error when the template is unacceptable.
    fn validate_template(
        &self,
        template: &<<Self::Resource as Resource>::Collection as Collection>::Template,
    ) -> Result<Self::Value>;

    /// Persist `value`
    ///
    /// Returns `201 Created` for an insert and `200 OK` for an update.
    fn save(&self, value: &Self::Value) -> Result<StatusCode>;

    /// Remove the record matching `criteria`; `false` if nothing matched
    fn delete(&self, criteria: &Self::Criteria) -> Result<bool>;

    /// Write `value`'s fields onto `item`
    fn project(
        &self,
        item: &mut <<Self::Resource as Resource>::Collection as Collection>::Item,
        value: &Self::Value,
    );
}

/// Public operations over a [`ResourceService`] backend
pub struct CollectionService<S: ResourceService> {
    backend: S,
    hooks: ServiceHooks<S>,
}

impl<S: ResourceService> CollectionService<S> {
    /// Compose a service with no item hooks
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            hooks: ItemHooks::new(),
        }
    }

    /// Append an item hook
    #[must_use]
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut ItemOf<S>, &S::Value) + Send + Sync + 'static,
    {
        self.hooks.add(hook);
        self
    }

    /// Replace the item hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: ServiceHooks<S>) -> Self {
        self.hooks = hooks;
        self
    }

    /// The backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// The registered item hooks
    pub fn hooks(&self) -> &ServiceHooks<S> {
        &self.hooks
    }

    /// Query the backend and project every matching value
    pub fn query(&self, criteria: &S::Criteria) -> Outcome<S::Resource> {
        let outcome = self.run(|outcome| {
            let values = self
                .backend
                .query_items(criteria)?
                .ok_or_else(ServiceError::not_found)?;
            if let Some(collection) = outcome.collection_mut() {
                for value in values {
                    self.add_item(collection, &value);
                }
            }
            Ok(())
        });
        tracing::debug!(status = outcome.status.as_u16(), "query");
        outcome
    }

    /// Validate and save `template`
    ///
    /// The template is echoed into the response before validation so it is
    /// visible even when validation or saving fails.
    pub fn store(&self, template: TemplateOf<S>) -> Outcome<S::Resource> {
        let outcome = self.run(|outcome| self.store_template(outcome, template));
        tracing::debug!(status = outcome.status.as_u16(), "store");
        outcome
    }

    /// Decode a collection message and store its template
    ///
    /// A body that does not decode resolves to `400 Error parsing body`.
    pub fn store_bytes(&self, bytes: &[u8]) -> Outcome<S::Resource> {
        let outcome = self.run(|outcome| {
            let mut collection =
                <CollectionOf<S> as Message>::decode(bytes).map_err(ServiceError::parse_body)?;
            let template = collection.take_template().unwrap_or_default();
            self.store_template(outcome, template)
        });
        tracing::debug!(
            status = outcome.status.as_u16(),
            len = bytes.len(),
            "store_bytes"
        );
        outcome
    }

    /// Delete the record matching `criteria`
    ///
    /// `204` with no resource when a record was removed, `404` with the empty
    /// resource when nothing matched. A raised error populates the collection
    /// error like any other operation.
    pub fn delete(&self, criteria: &S::Criteria) -> Outcome<S::Resource> {
        let outcome = self.run(|outcome| {
            if self.backend.delete(criteria)? {
                outcome.status = StatusCode::NO_CONTENT;
                outcome.resource = None;
            } else {
                outcome.status = StatusCode::NOT_FOUND;
            }
            Ok(())
        });
        tracing::debug!(status = outcome.status.as_u16(), "delete");
        outcome
    }

    fn run<F>(&self, operation: F) -> Outcome<S::Resource>
    where
        F: FnOnce(&mut Outcome<S::Resource>) -> Result<()>,
    {
        capture(StatusCode::OK, Some(self.backend.new_resource()), operation)
    }

    fn store_template(
        &self,
        outcome: &mut Outcome<S::Resource>,
        template: TemplateOf<S>,
    ) -> Result<()> {
        if let Some(collection) = outcome.collection_mut() {
            collection.set_template(template.clone());
        }

        let value = self.backend.validate_template(&template)?;
        outcome.status = self.backend.save(&value)?;

        if let Some(collection) = outcome.collection_mut() {
            self.add_item(collection, &value);
        }
        Ok(())
    }

    fn add_item(&self, collection: &mut CollectionOf<S>, value: &S::Value) {
        let item = collection.add_item();
        self.backend.project(item, value);
        self.hooks.run(item, value);
    }
}

impl<S: ResourceService + Clone> Clone for CollectionService<S> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            hooks: self.hooks.clone(),
        }
    }
}
