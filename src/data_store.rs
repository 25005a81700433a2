//! # Document Store
//!
//! CRUD and search over the documents of a world, built on an injected [`KvBackend`].
//!
//! ## Storage Model
//!
//! ```text
//! World ──┬── collection "actors" ──► <world>/data/actors  (one store handle)
//!         │                              ├── !actors!abcdEFGH12345678 → {document}
//!         │                              └── !actors!...
//!         └── collection "items"  ──► <world>/data/items
//! ```
//!
//! A document type maps to a collection name through [`collection_name_for`]; the world
//! must expose that collection.  Each operation opens the collection's handle, does its
//! work, and closes the handle before returning.  There is no locking in this layer:
//! concurrent writes to one document race and the last write wins.
//!
//! ## Lifecycle
//!
//! A document is created with a fresh `_id` (or the one supplied) and `_stats`
//! block, rewritten in full by each update, and finally deleted.  Updates deep-merge
//! a payload into the stored document; protected paths such as `_id` and
//! `_stats.createdTime` are never overwritten and every dropped write comes back as
//! a warning.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use worldkeeper::{DocumentStore, MemoryBackend, StoreSettings, World, WriteMeta};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = DocumentStore::new(MemoryBackend::new(), StoreSettings::default());
//! let world = World::new("test-world", "/worlds/test-world", ["actors"]);
//!
//! let created = store
//!     .create(&world, "Actor", json!({"name": "Bilbo", "type": "character"}), &WriteMeta::default())
//!     .await
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//! let id = created.id().unwrap().to_string();
//! assert_eq!(id.len(), 16);
//!
//! let fetched = store.get(&world, "Actor", &id).await.unwrap().into_result().unwrap();
//! assert_eq!(fetched, created);
//! # });
//! ```

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    Document, DocumentError, DocumentId, DocumentStats, KvBackend, KvHandle, OperationResult,
    ProtectedPaths, SearchOptions, SearchResults, StoreError, WildcardPattern, World, WriteMeta,
    collection_name_for, collection_prefix, encode_key, merge,
};

/// Settings stamped into every document the store writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSettings {
    /// Host core version recorded as `_stats.coreVersion`.
    pub core_version: Option<String>,
    /// Game system recorded as `_stats.systemId`.
    pub system_id: Option<String>,
    /// Game system version recorded as `_stats.systemVersion`.
    pub system_version: Option<String>,
    /// Paths updates may never overwrite.
    pub protected_paths: ProtectedPaths,
}

/// Document CRUD and search over worlds whose collections live in `B`.
#[derive(Debug, Clone)]
pub struct DocumentStore<B: KvBackend> {
    backend: B,
    settings: StoreSettings,
}

impl<B: KvBackend> DocumentStore<B> {
    /// Creates a store over `backend`.
    pub fn new(backend: B, settings: StoreSettings) -> Self {
        Self { backend, settings }
    }

    /// The settings this store stamps into documents.
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// The underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Draws a fresh document identifier.  No uniqueness check is made.
    pub fn generate_id() -> DocumentId {
        DocumentId::generate()
    }

    /// Collections the world exposes.
    pub fn list_collections(&self, world: &World) -> Vec<String> {
        world.document_collections.clone()
    }

    /// Inserts a new document of `document_type` built from `data`.
    ///
    /// A string `_id` in `data` is kept when it is a well-formed identifier and not
    /// already taken; otherwise a fresh one is drawn.  `_stats` is always replaced.
    ///
    /// # Errors
    /// `StoreError::InvalidArgument` when `document_type` is empty or `data` is not an
    /// object; store faults as they occur.
    pub async fn create(
        &self,
        world: &World,
        document_type: &str,
        data: Value,
        meta: &WriteMeta,
    ) -> Result<OperationResult<Document>, StoreError> {
        let collection = match resolve_collection(world, document_type)? {
            Ok(collection) => collection,
            Err(e) => return Ok(OperationResult::failure(e)),
        };
        let mut document = Document::from_value(data)?;

        let supplied = match document.get(crate::document::ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => match s.parse::<DocumentId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    return Ok(OperationResult::failure(DocumentError::InvalidId(s.clone())));
                }
            },
            Some(other) => {
                return Ok(OperationResult::failure(DocumentError::InvalidId(
                    other.to_string(),
                )));
            }
        };
        let id = supplied.clone().unwrap_or_else(DocumentId::generate);

        let now = Utc::now().timestamp_millis();
        document.set_id(&id);
        document.set_stats(&DocumentStats {
            created_time: now,
            modified_time: now,
            core_version: self.settings.core_version.clone(),
            system_id: self.settings.system_id.clone(),
            system_version: self.settings.system_version.clone(),
            last_modified_by: meta.user_id.clone(),
        })?;

        let key = encode_key(&collection, id.as_str());
        let mut handle = self.backend.open(&world.collection_path(&collection)).await?;
        let written = async {
            if supplied.is_some() && handle.get(&key).await?.is_some() {
                return Ok(false);
            }
            handle.put(&key, &document.to_value()).await?;
            Ok::<_, StoreError>(true)
        }
        .await;
        let closed = handle.close().await;
        let written = written?;
        closed?;

        if !written {
            return Ok(OperationResult::failure(DocumentError::AlreadyExists {
                collection,
                id: id.to_string(),
            }));
        }
        info!(world = %world.id, collection = %collection, id = %id, "created document");
        Ok(OperationResult::success(document))
    }

    /// Fetches one document by id.
    pub async fn get(
        &self,
        world: &World,
        document_type: &str,
        id: &str,
    ) -> Result<OperationResult<Document>, StoreError> {
        let collection = match resolve_collection(world, document_type)? {
            Ok(collection) => collection,
            Err(e) => return Ok(OperationResult::failure(e)),
        };
        let key = encode_key(&collection, id);
        let handle = self.backend.open(&world.collection_path(&collection)).await?;
        let found = handle.get(&key).await;
        handle.close().await?;

        match found? {
            Some(value) => Ok(OperationResult::success(stored_document(&key, value)?)),
            None => Ok(OperationResult::failure(DocumentError::NotFound {
                collection,
                id: id.to_string(),
            })),
        }
    }

    /// Deep-merges `payload` into the stored document and rewrites it.
    ///
    /// Protected paths in the payload are dropped; each one is reported as a warning on
    /// the result.  `_stats.modifiedTime` and `_stats.lastModifiedBy` are restamped.
    pub async fn update(
        &self,
        world: &World,
        document_type: &str,
        id: &str,
        payload: &Value,
        meta: &WriteMeta,
    ) -> Result<OperationResult<Document>, StoreError> {
        if !payload.is_object() {
            return Err(StoreError::InvalidArgument(format!(
                "update payload must be an object, got {}",
                crate::json_type_name(payload)
            )));
        }
        let collection = match resolve_collection(world, document_type)? {
            Ok(collection) => collection,
            Err(e) => return Ok(OperationResult::failure(e)),
        };
        let key = encode_key(&collection, id);
        let mut handle = self.backend.open(&world.collection_path(&collection)).await?;
        let updated = async {
            let Some(existing) = handle.get(&key).await? else {
                return Ok(None);
            };
            let outcome = merge(&existing, payload, &self.settings.protected_paths);
            let mut document = stored_document(&key, outcome.document)?;
            document.touch(Utc::now().timestamp_millis(), meta.user_id.as_deref());
            handle.put(&key, &document.to_value()).await?;
            Ok::<_, StoreError>(Some((document, outcome.skipped)))
        }
        .await;
        let closed = handle.close().await;
        let updated = updated?;
        closed?;

        let Some((document, skipped)) = updated else {
            return Ok(OperationResult::failure(DocumentError::NotFound {
                collection,
                id: id.to_string(),
            }));
        };
        let warnings: Vec<String> = skipped
            .iter()
            .map(|path| {
                warn!(collection = %collection, id, path = %path, "dropped write to protected field");
                protected_write_warning(path)
            })
            .collect();
        info!(world = %world.id, collection = %collection, id, "updated document");
        Ok(OperationResult::success(document).with_warnings(warnings))
    }

    /// Removes a document.  Deleting an id that is not present is `NotFound`.
    pub async fn delete(
        &self,
        world: &World,
        document_type: &str,
        id: &str,
    ) -> Result<OperationResult, StoreError> {
        let collection = match resolve_collection(world, document_type)? {
            Ok(collection) => collection,
            Err(e) => return Ok(OperationResult::failure(e)),
        };
        let key = encode_key(&collection, id);
        let mut handle = self.backend.open(&world.collection_path(&collection)).await?;
        let removed = handle.del(&key).await;
        let closed = handle.close().await;
        let removed = removed?;
        closed?;

        if removed {
            info!(world = %world.id, collection = %collection, id, "deleted document");
            Ok(OperationResult::success(()))
        } else {
            Ok(OperationResult::failure(DocumentError::NotFound {
                collection,
                id: id.to_string(),
            }))
        }
    }

    /// Scans a collection in key order and returns the documents matching every filter.
    ///
    /// `name` and `id` are wildcard patterns (see [`WildcardPattern`]); `document_type`
    /// must match exactly.  Documents lacking a filtered field never match it.
    ///
    /// # Errors
    /// `StoreError::InvalidArgument` when a pattern does not compile.
    pub async fn search(
        &self,
        world: &World,
        document_type: &str,
        options: &SearchOptions,
    ) -> Result<OperationResult<SearchResults>, StoreError> {
        let name = compile_filter("name", options.name.as_deref())?;
        let id = compile_filter("id", options.id.as_deref())?;
        let collection = match resolve_collection(world, document_type)? {
            Ok(collection) => collection,
            Err(e) => return Ok(OperationResult::failure(e)),
        };

        let handle = self.backend.open(&world.collection_path(&collection)).await?;
        let entries = handle.scan_prefix(&collection_prefix(&collection)).await;
        handle.close().await?;

        let mut documents = Vec::new();
        for (key, value) in entries? {
            let document = match Document::from_value(value) {
                Ok(document) => document,
                Err(_) => {
                    warn!(key = %key, "skipping non-object value during search");
                    continue;
                }
            };
            if let Some(pattern) = &name
                && !document.name().is_some_and(|n| pattern.matches(n))
            {
                continue;
            }
            if let Some(wanted) = &options.document_type
                && document.document_type() != Some(wanted.as_str())
            {
                continue;
            }
            if let Some(pattern) = &id
                && !document.id().is_some_and(|i| pattern.matches(i))
            {
                continue;
            }
            documents.push(document);
        }

        let total_found = documents.len();
        if let Some(limit) = options.limit
            && limit > 0
        {
            documents.truncate(limit);
        }
        debug!(
            world = %world.id,
            collection = %collection,
            total_found,
            returned = documents.len(),
            "searched collection"
        );
        Ok(OperationResult::success(SearchResults {
            total_found,
            documents,
        }))
    }
}

fn protected_write_warning(path: &str) -> String {
    if path.is_empty() {
        "Ignored update replacing the whole document".to_string()
    } else {
        format!("Ignored write to protected field '{}'", path)
    }
}

fn resolve_collection(
    world: &World,
    document_type: &str,
) -> Result<Result<String, DocumentError>, StoreError> {
    if document_type.trim().is_empty() {
        return Err(StoreError::InvalidArgument(
            "document type must not be empty".to_string(),
        ));
    }
    let collection = collection_name_for(document_type);
    if world.has_collection(&collection) {
        Ok(Ok(collection))
    } else {
        Ok(Err(DocumentError::CollectionNotFound {
            world: world.id.clone(),
            collection,
        }))
    }
}

fn compile_filter(field: &str, pattern: Option<&str>) -> Result<Option<WildcardPattern>, StoreError> {
    pattern
        .map(|p| {
            WildcardPattern::compile(p).map_err(|e| {
                StoreError::InvalidArgument(format!("bad {} pattern '{}': {}", field, p, e))
            })
        })
        .transpose()
}

fn stored_document(key: &str, value: Value) -> Result<Document, StoreError> {
    Document::from_value(value).map_err(|e| StoreError::Corrupt {
        location: key.to_string(),
        reason: e.to_string(),
    })
}
