//! Schema sources.
//!
//! The validator does not know where schemas come from.  Anything implementing
//! [`SchemaSource`] can hand it a [`SchemaNode`] for a document type and subtype.
//! [`SchemaCatalog`] is the file-backed implementation: a YAML or JSON document keyed by
//! document type, then subtype, with `"*"` as the fallback subtype.
//!
//! ```yaml
//! Actor:
//!   character:
//!     type: object
//!     properties:
//!       name: {type: string, minLength: 1}
//!   "*":
//!     type: object
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::config::has_extension;
use crate::{ConfigError, SchemaNode, ValidateOptions, ValidationResult, validate};

/// Subtype key consulted when no entry matches the requested subtype.
pub const FALLBACK_SUBTYPE: &str = "*";

/// Supplies schema trees by document type and subtype.
pub trait SchemaSource {
    /// The schema for `document_type`/`subtype`, if one is known.
    fn schema_for(&self, document_type: &str, subtype: Option<&str>) -> Option<&SchemaNode>;
}

/// Schemas loaded from a catalog file or registered in code.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: BTreeMap<String, BTreeMap<String, SchemaNode>>,
}

impl SchemaCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `schema` under `document_type`/`subtype`, replacing any previous entry.
    pub fn insert(
        &mut self,
        document_type: impl Into<String>,
        subtype: impl Into<String>,
        schema: SchemaNode,
    ) {
        self.schemas
            .entry(document_type.into())
            .or_default()
            .insert(subtype.into(), schema);
    }

    /// Builds a catalog from `{DocumentType: {subtype: schema}}`.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(types) = value else {
            return Err(ConfigError::Parse {
                path: String::new(),
                reason: "catalog must map document types to subtypes".to_string(),
            });
        };
        let mut catalog = Self::new();
        for (document_type, subtypes) in types {
            let Value::Object(subtypes) = subtypes else {
                return Err(ConfigError::Parse {
                    path: document_type.clone(),
                    reason: "entry must map subtypes to schemas".to_string(),
                });
            };
            for (subtype, schema) in subtypes {
                let node = SchemaNode::parse(schema).map_err(|source| ConfigError::Schema {
                    document_type: document_type.clone(),
                    subtype: subtype.clone(),
                    source,
                })?;
                catalog.insert(document_type.clone(), subtype.clone(), node);
            }
        }
        Ok(catalog)
    }

    /// Loads a catalog file; `.json` files are parsed as JSON and anything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: display.clone(),
            reason: e.to_string(),
        })?;
        let value: Value = if has_extension(path, &["json"]) {
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                reason: e.to_string(),
            })?
        } else {
            serde_yml::from_str(&text).map_err(|e| ConfigError::Parse {
                path: display.clone(),
                reason: e.to_string(),
            })?
        };
        Self::from_value(&value).map_err(|e| match e {
            ConfigError::Parse { path, reason } if path.is_empty() => ConfigError::Parse {
                path: display,
                reason,
            },
            other => other,
        })
    }

    /// Document types with at least one schema.
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Subtypes registered for `document_type`.
    pub fn subtypes(&self, document_type: &str) -> impl Iterator<Item = &str> {
        self.schemas
            .get(document_type)
            .into_iter()
            .flat_map(|subtypes| subtypes.keys().map(String::as_str))
    }
}

impl SchemaSource for SchemaCatalog {
    fn schema_for(&self, document_type: &str, subtype: Option<&str>) -> Option<&SchemaNode> {
        let subtypes = self.schemas.get(document_type)?;
        subtype
            .and_then(|s| subtypes.get(s))
            .or_else(|| subtypes.get(FALLBACK_SUBTYPE))
    }
}

/// Validates document data against the schema its type and `type` field select.
///
/// Returns `None` when the source has no schema for the document.
pub fn validate_document<S: SchemaSource + ?Sized>(
    source: &S,
    document_type: &str,
    data: &Value,
    options: &ValidateOptions,
) -> Option<ValidationResult> {
    let subtype = data.get("type").and_then(Value::as_str);
    let schema = source.schema_for(document_type, subtype)?;
    Some(validate(data, schema, options))
}
