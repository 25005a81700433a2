//! Error types for worldkeeper operations.

use thiserror::Error;

/// Errors raised while turning a raw schema description into a [`crate::SchemaNode`].
///
/// These are programmer errors: the schema source handed over something that is not a
/// schema.  Validation failures of *data* are never reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema node was not a JSON object.
    #[error("Invalid schema at '{path}': node must be an object")]
    NotAnObject {
        /// Path of the offending node within the schema tree.
        path: String,
    },
    /// A keyword held a value of the wrong shape.
    #[error("Invalid schema at '{path}': {keyword} {reason}")]
    InvalidKeyword {
        /// Path of the offending node within the schema tree.
        path: String,
        /// The schema keyword, e.g. `properties` or `minLength`.
        keyword: String,
        /// What was wrong with it.
        reason: String,
    },
    /// A `pattern` keyword did not compile as a regular expression.
    #[error("Invalid schema at '{path}': bad pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Path of the offending node within the schema tree.
        path: String,
        /// The pattern source.
        pattern: String,
        /// The compiler's complaint.
        reason: String,
    },
    /// The schema text could not be parsed.
    #[error("Invalid schema document: {0}")]
    Parse(String),
}

/// Errors raised by the underlying key-value store or by invalid use of the store API.
///
/// Anything in this enum propagates to the caller unchanged; retry policy is theirs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(String),
    /// A stored value could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The on-disk representation is damaged beyond replay.
    #[error("Corrupt store at {location}: {reason}")]
    Corrupt {
        /// Location of the damaged store.
        location: String,
        /// What was found.
        reason: String,
    },
    /// The caller passed an argument the API cannot act on.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Tagged failures of document operations.
///
/// These are returned as data inside an [`crate::OperationResult`], never as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The world does not expose the collection the document type maps to.
    #[error("Collection '{collection}' not found in world '{world}'")]
    CollectionNotFound {
        /// The world that was searched.
        world: String,
        /// The collection that was expected.
        collection: String,
    },
    /// No document with the given identifier exists in the collection.
    #[error("Document '{id}' not found in collection '{collection}'")]
    NotFound {
        /// The collection that was searched.
        collection: String,
        /// The missing identifier.
        id: String,
    },
    /// A document with the given identifier already exists.
    #[error("Document '{id}' already exists in collection '{collection}'")]
    AlreadyExists {
        /// The collection holding the existing document.
        collection: String,
        /// The conflicting identifier.
        id: String,
    },
    /// A supplied identifier is not a 16 character alphanumeric string.
    #[error("Invalid document id '{0}': expected 16 alphanumeric characters")]
    InvalidId(String),
}

/// Errors raised when resolving worlds under a data root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// No world directory with this id exists.
    #[error("World '{0}' not found")]
    NotFound(String),
    /// The world id would escape the data root.
    #[error("Invalid world id '{0}'")]
    InvalidId(String),
    /// Reading the world layout failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for WorldError {
    fn from(e: std::io::Error) -> Self {
        WorldError::Io(e.to_string())
    }
}

/// Errors raised while loading configuration or schema catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read {path}: {reason}")]
    Read {
        /// The file that was being read.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },
    /// The file was read but could not be parsed.
    #[error("Failed to parse {path}: {reason}")]
    Parse {
        /// The file that was being parsed.
        path: String,
        /// The parser's complaint.
        reason: String,
    },
    /// A schema inside a catalog was malformed.
    #[error("Invalid schema for {document_type}.{subtype}: {source}")]
    Schema {
        /// Document type the schema is registered under.
        document_type: String,
        /// Subtype the schema is registered under.
        subtype: String,
        /// The schema failure.
        source: SchemaError,
    },
}
