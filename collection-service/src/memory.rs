//! In-memory key/value backend
//!
//! A reference [`ResourceService`] storing string values under string keys.
//! It doubles as the demo backend for `collection-server` and as the fixture
//! for the crate's tests.
//!
//! Items and templates carry their payload in a nested [`KeyValue`] message,
//! so a template has the same shape as an item's payload.

use std::sync::Arc;

use dashmap::DashMap;
use http::StatusCode;

use crate::error::{Result, ServiceError};
use crate::model::{Collection, CollectionError, CollectionItem, Resource};
use crate::service::ResourceService;

/// Key/value payload shared by items and templates
#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct KeyValue {
    /// Record key
    #[prost(string, tag = "1")]
    pub key: String,
    /// Record value
    #[prost(string, tag = "2")]
    pub value: String,
}

/// Collection item carrying one record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValueItem {
    #[prost(string, tag = "1")]
    pub href: String,
    #[prost(message, optional, tag = "2")]
    pub pb: Option<KeyValue>,
}

/// Input template for creating or updating a record
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValueTemplate {
    #[prost(message, optional, tag = "1")]
    pub pb: Option<KeyValue>,
}

/// Key/value collection
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValueCollection {
    #[prost(string, tag = "1")]
    pub href: String,
    #[prost(message, repeated, tag = "2")]
    pub items: Vec<KeyValueItem>,
    #[prost(message, optional, tag = "3")]
    pub template: Option<KeyValueTemplate>,
    #[prost(message, optional, tag = "4")]
    pub error: Option<CollectionError>,
}

/// Key/value resource
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct KeyValueResource {
    #[prost(message, required, tag = "1")]
    pub collection: KeyValueCollection,
}

impl KeyValueTemplate {
    /// Template submitting `key` = `value`
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            pb: Some(KeyValue {
                key: key.into(),
                value: value.into(),
            }),
        }
    }

    /// Wrap this template in a collection, ready for encoding
    pub fn into_collection(self) -> KeyValueCollection {
        KeyValueCollection {
            template: Some(self),
            ..Default::default()
        }
    }
}

impl Resource for KeyValueResource {
    type Collection = KeyValueCollection;

    fn collection(&self) -> &KeyValueCollection {
        &self.collection
    }

    fn collection_mut(&mut self) -> &mut KeyValueCollection {
        &mut self.collection
    }
}

impl Collection for KeyValueCollection {
    type Item = KeyValueItem;
    type Template = KeyValueTemplate;

    fn href(&self) -> &str {
        &self.href
    }

    fn set_href(&mut self, href: String) {
        self.href = href;
    }

    fn items(&self) -> &[KeyValueItem] {
        &self.items
    }

    fn add_item(&mut self) -> &mut KeyValueItem {
        self.items.push(KeyValueItem::default());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    fn clear_items(&mut self) {
        self.items.clear();
    }

    fn template(&self) -> Option<&KeyValueTemplate> {
        self.template.as_ref()
    }

    fn set_template(&mut self, template: KeyValueTemplate) {
        self.template = Some(template);
    }

    fn take_template(&mut self) -> Option<KeyValueTemplate> {
        self.template.take()
    }

    fn error(&self) -> Option<&CollectionError> {
        self.error.as_ref()
    }

    fn set_error(&mut self, error: CollectionError) {
        self.error = Some(error);
    }
}

impl CollectionItem for KeyValueItem {
    fn href(&self) -> &str {
        &self.href
    }

    fn set_href(&mut self, href: String) {
        self.href = href;
    }
}

/// A validated record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Non-empty key the value is stored under
    pub key: String,
    /// Stored value
    pub value: String,
}

/// Key/value store backed by a concurrent map
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.get(key).map(|entry| entry.value().clone())
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn record(&self, key: &str) -> Option<Record> {
        self.get(key).map(|value| Record {
            key: key.to_string(),
            value,
        })
    }

    fn records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self
            .data
            .iter()
            .map(|entry| Record {
                key: entry.key().clone(),
                value: entry.value().clone(),
            })
            .collect();
        records.sort_by(|a, b| a.key.cmp(&b.key));
        records
    }
}

impl ResourceService for MemoryStore {
    type Resource = KeyValueResource;
    type Criteria = Option<String>;
    type Value = Record;

    fn query_items(
        &self,
        criteria: &Option<String>,
    ) -> Result<Option<impl IntoIterator<Item = Record>>> {
        Ok(match criteria {
            None => Some(self.records()),
            Some(key) => self.record(key).map(|record| vec![record]),
        })
    }

    fn validate_template(&self, template: &KeyValueTemplate) -> Result<Record> {
        match &template.pb {
            Some(pb) if !pb.key.is_empty() => Ok(Record {
                key: pb.key.clone(),
                value: pb.value.clone(),
            }),
            _ => Err(ServiceError::bad_request("Missing Key").into()),
        }
    }

    fn save(&self, record: &Record) -> Result<StatusCode> {
        let previous = self.data.insert(record.key.clone(), record.value.clone());
        tracing::trace!(key = %record.key, updated = previous.is_some(), "Saved record");
        Ok(if previous.is_some() {
            StatusCode::OK
        } else {
            StatusCode::CREATED
        })
    }

    fn delete(&self, criteria: &Option<String>) -> Result<bool> {
        Ok(criteria
            .as_ref()
            .is_some_and(|key| self.data.remove(key).is_some()))
    }

    fn project(&self, item: &mut KeyValueItem, record: &Record) {
        item.pb = Some(KeyValue {
            key: record.key.clone(),
            value: record.value.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Option<String> {
        Some(k.to_string())
    }

    #[test]
    fn test_save_reports_insert_then_update() {
        let store = MemoryStore::new();
        let record = Record {
            key: "a".to_string(),
            value: "1".to_string(),
        };
        assert_eq!(store.save(&record).unwrap(), StatusCode::CREATED);
        assert_eq!(store.save(&record).unwrap(), StatusCode::OK);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_validate_rejects_empty_key() {
        let store = MemoryStore::new();
        let err = store
            .validate_template(&KeyValueTemplate::new("", "v"))
            .unwrap_err();
        match err {
            crate::error::Error::Recoverable(err) => {
                assert_eq!(err.status, StatusCode::BAD_REQUEST);
                assert_eq!(err.title, "Missing Key");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(store
            .validate_template(&KeyValueTemplate::default())
            .is_err());
    }

    #[test]
    fn test_query_distinguishes_missing_from_empty() {
        let store = MemoryStore::new();

        let all: Vec<Record> = store
            .query_items(&None)
            .unwrap()
            .map(|values| values.into_iter().collect())
            .unwrap();
        assert!(all.is_empty());

        assert!(store.query_items(&key("a")).unwrap().is_none());
    }

    #[test]
    fn test_query_all_is_sorted() {
        let store = MemoryStore::new();
        for k in ["c", "a", "b"] {
            store
                .save(&Record {
                    key: k.to_string(),
                    value: k.to_uppercase(),
                })
                .unwrap();
        }
        let keys: Vec<String> = store
            .query_items(&None)
            .unwrap()
            .unwrap()
            .into_iter()
            .map(|record| record.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        store
            .save(&Record {
                key: "a".to_string(),
                value: "1".to_string(),
            })
            .unwrap();
        assert!(!store.delete(&None).unwrap());
        assert!(store.delete(&key("a")).unwrap());
        assert!(!store.delete(&key("a")).unwrap());
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store
            .save(&Record {
                key: "shared".to_string(),
                value: "yes".to_string(),
            })
            .unwrap();
        assert_eq!(clone.get("shared").as_deref(), Some("yes"));
    }
}
