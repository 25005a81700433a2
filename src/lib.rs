//! # Worldkeeper: Validated Documents for Game Worlds
//!
//! Worldkeeper keeps the documents of tabletop game worlds: actors, items, scenes,
//! journal entries and the rest.  It has two halves that meet at the caller:
//!
//! - **Schema Validation**: free-form input is checked against a schema tree and
//!   normalized (numbers cast, defaults filled, unknown keys flagged) before it is stored
//! - **Document Storage**: validated documents are created, read, merged, deleted and
//!   searched inside per-world collections on an ordered key-value store
//!
//! ## Core Concepts
//!
//! ### Schemas
//! A [`SchemaNode`] describes one value: its type (or union of types), bounds, string
//! constraints, nested properties and array items.  Malformed schemas are rejected when
//! parsed, so [`validate`] itself never fails; it reports every violation it finds as
//! data in a [`ValidationResult`].
//!
//! ### Worlds and Collections
//! A [`World`] exposes named collections.  Each document type maps to one collection
//! (`Actor` → `actors`, `JournalEntry` → `journal`) and each document lives under the
//! key `!<collection>!<id>` in that collection's store.
//!
//! ### Documents
//! A [`Document`] is an open JSON object with a small envelope: a 16 character `_id`,
//! a `name`, a `type` and a store-maintained `_stats` block.  Updates deep-merge into
//! the stored document and never touch protected paths such as `_id` or
//! `_stats.createdTime`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ CLI (validate-document, worldctl)       │
//! ├─────────────────────────────────────────┤
//! │ Schema validation │ Document store      │
//! ├───────────────────┼─────────────────────┤
//! │ Schema catalog    │ Merge, keys, search │
//! │                   ├─────────────────────┤
//! │                   │ KV backends         │
//! │                   │ (memory, JSONL)     │
//! └───────────────────┴─────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Validating then Storing
//!
//! ```rust
//! # use worldkeeper::*;
//! # use serde_json::json;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = SchemaNode::parse(&json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string", "minLength": 1},
//!         "type": {"type": "string"},
//!         "system": {
//!             "type": "object",
//!             "properties": {"hp": {"type": "integer", "minimum": 0, "default": 10}}
//!         }
//!     },
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! let input = json!({"name": "Bilbo", "type": "character", "system": {}});
//! let normalized = validate(&input, &schema, &ValidateOptions::default())
//!     .into_result()
//!     .unwrap();
//! assert_eq!(normalized["system"]["hp"], 10);
//!
//! let store = DocumentStore::new(MemoryBackend::new(), StoreSettings::default());
//! let world = World::new("test-world", "/worlds/test-world", ["actors"]);
//! let created = store
//!     .create(&world, "Actor", normalized, &WriteMeta::by("gm"))
//!     .await
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//! assert_eq!(created.name(), Some("Bilbo"));
//! # });
//! ```
//!
//! ### Searching
//!
//! ```rust
//! # use worldkeeper::*;
//! # use serde_json::json;
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! # let store = DocumentStore::new(MemoryBackend::new(), StoreSettings::default());
//! # let world = World::new("test-world", "/worlds/test-world", ["actors"]);
//! for name in ["Testania", "MyTestania", "Tester"] {
//!     store
//!         .create(&world, "Actor", json!({"name": name}), &WriteMeta::default())
//!         .await
//!         .unwrap();
//! }
//! let results = store
//!     .search(&world, "Actor", &SearchOptions::new().name("Test*").limit(1))
//!     .await
//!     .unwrap()
//!     .into_result()
//!     .unwrap();
//! assert_eq!(results.total_found, 2);
//! assert_eq!(results.documents.len(), 1);
//! # });
//! ```

#![deny(missing_docs)]
mod catalog;
mod config;
mod data_operations;
mod data_store;
mod document;
mod errors;
mod jsonl;
mod keys;
mod kv;
mod merge;
mod schema;
mod validate;
mod wildcard;
mod world;

// CLI utility modules

/// Command-line interface utilities for program termination and output formatting.
///
/// This module provides the helpers shared by the worldkeeper binaries: error exits,
/// JSON output and tracing setup.
pub mod cli_utils;

/// Command-line interface command handlers.
///
/// This module contains the handlers behind `worldctl`, one submodule per command group.
pub mod commands;

pub use catalog::{FALLBACK_SUBTYPE, SchemaCatalog, SchemaSource, validate_document};
pub use config::{Config, DEFAULT_DATA_ROOT};
pub use data_operations::{OperationResult, SearchOptions, SearchResults, WriteMeta};
pub use data_store::{DocumentStore, StoreSettings};
pub use document::{
    Document, DocumentId, DocumentIdParseError, DocumentStats, ID_FIELD, ID_LENGTH, STATS_FIELD,
};
pub use errors::{ConfigError, DocumentError, SchemaError, StoreError, WorldError};
pub use jsonl::{JsonlBackend, JsonlHandle, LOG_FILE_NAME};
pub use keys::{collection_name_for, collection_prefix, decode_key, encode_key};
pub use kv::{KvBackend, KvHandle, MemoryBackend, MemoryHandle};
pub use merge::{DEFAULT_PROTECTED_PATHS, MergeOutcome, ProtectedPaths, merge};
pub use schema::{AdditionalProperties, SchemaNode, SchemaType, json_type_name};
pub use validate::{
    ValidateOptions, ValidationIssue, ValidationResult, validate, validate_at, validate_text,
};
pub use wildcard::WildcardPattern;
pub use world::{DATA_DIR, WORLDS_DIR, World, WorldLocator};
