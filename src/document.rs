use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::StoreError;

/// Number of characters in a document identifier.
pub const ID_LENGTH: usize = 16;

/// Key of the identifier field.
pub const ID_FIELD: &str = "_id";
/// Key of the store-maintained statistics block.
pub const STATS_FIELD: &str = "_stats";

///////////////////////////////////////////// DocumentId ///////////////////////////////////////////////

/// A 16 character alphanumeric document identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Draws a fresh identifier from the thread-local random source.
    ///
    /// No uniqueness check is made; with 62^16 possible values collisions are not a
    /// practical concern, but callers needing a guarantee must check for themselves.
    pub fn generate() -> Self {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect();
        DocumentId(id)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Why a string is not a valid [`DocumentId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentIdParseError {
    /// The string does not have exactly 16 characters.
    InvalidLength(usize),
    /// The string contains a character outside `[A-Za-z0-9]`.
    InvalidCharacter(char),
}

impl Display for DocumentIdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DocumentIdParseError::InvalidLength(len) => {
                write!(f, "Document id must be {} characters, got {}", ID_LENGTH, len)
            }
            DocumentIdParseError::InvalidCharacter(c) => {
                write!(f, "Document id contains non-alphanumeric character '{}'", c)
            }
        }
    }
}

impl std::error::Error for DocumentIdParseError {}

impl FromStr for DocumentId {
    type Err = DocumentIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(c) = s.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(DocumentIdParseError::InvalidCharacter(c));
        }
        if s.len() != ID_LENGTH {
            return Err(DocumentIdParseError::InvalidLength(s.len()));
        }
        Ok(DocumentId(s.to_string()))
    }
}

impl TryFrom<String> for DocumentId {
    type Error = DocumentIdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

//////////////////////////////////////////// DocumentStats /////////////////////////////////////////////

/// The `_stats` block the store maintains on every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStats {
    /// Milliseconds since the Unix epoch when the document was inserted.
    pub created_time: i64,
    /// Milliseconds since the Unix epoch of the most recent write.
    pub modified_time: i64,
    /// Version of the host core that wrote the document.
    pub core_version: Option<String>,
    /// Game system the world runs.
    pub system_id: Option<String>,
    /// Version of that game system.
    pub system_version: Option<String>,
    /// User responsible for the most recent write.
    pub last_modified_by: Option<String>,
}

////////////////////////////////////////////// Document ////////////////////////////////////////////////

/// An open, schema-validated record with a minimal envelope.
///
/// Apart from `_id`, `name`, `type` and `_stats`, a document's shape is whatever its
/// schema allows; it is kept as a JSON map rather than a typed struct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Wraps a JSON object.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidArgument` when `value` is not an object.
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Document(map)),
            other => Err(StoreError::InvalidArgument(format!(
                "document data must be an object, got {}",
                crate::json_type_name(&other)
            ))),
        }
    }

    /// The `_id` field, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).and_then(Value::as_str)
    }

    /// The `name` field, if it is a string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// The `type` (subtype discriminator) field, if it is a string.
    pub fn document_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// The `_stats` block, if present and well formed.
    pub fn stats(&self) -> Option<DocumentStats> {
        self.0
            .get(STATS_FIELD)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Looks up a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A JSON copy of the document.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Converts into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub(crate) fn set_id(&mut self, id: &DocumentId) {
        self.0
            .insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    }

    pub(crate) fn set_stats(&mut self, stats: &DocumentStats) -> Result<(), StoreError> {
        self.0
            .insert(STATS_FIELD.to_string(), serde_json::to_value(stats)?);
        Ok(())
    }

    /// Stamps `modifiedTime` and `lastModifiedBy`, keeping the rest of `_stats`.
    pub(crate) fn touch(&mut self, now: i64, user: Option<&str>) {
        let stats = self
            .0
            .entry(STATS_FIELD)
            .or_insert_with(|| Value::Object(Map::new()));
        if !stats.is_object() {
            *stats = Value::Object(Map::new());
        }
        if let Value::Object(stats) = stats {
            stats.insert("modifiedTime".to_string(), Value::from(now));
            stats.insert(
                "lastModifiedBy".to_string(),
                user.map_or(Value::Null, |u| Value::String(u.to_string())),
            );
        }
    }
}

impl From<Document> for Value {
    fn from(document: Document) -> Self {
        document.into_value()
    }
}
