//! # Schema Nodes
//!
//! A schema node is the declarative description a document is validated against.  Raw
//! descriptions arrive as JSON (or YAML) values from whatever schema source the caller
//! uses; [`SchemaNode::parse`] checks their shape once, compiles any `pattern` keywords,
//! and yields an immutable tree that [`crate::validate`] can walk without failing.
//!
//! ```rust
//! use worldkeeper::{SchemaNode, SchemaType};
//! use serde_json::json;
//!
//! let node = SchemaNode::parse(&json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string", "minLength": 1},
//!         "hp": {"type": "integer", "minimum": 0}
//!     },
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! assert_eq!(node.types(), &[SchemaType::Object]);
//! assert_eq!(node.required_keys(), &["name".to_string()]);
//! ```

use std::str::FromStr;

use regex::Regex;
use serde_json::{Map, Value};

use crate::SchemaError;

pub(crate) const TYPE_KEY: &str = "type";
pub(crate) const REQUIRED_KEY: &str = "required";
pub(crate) const NULLABLE_KEY: &str = "nullable";
pub(crate) const DEFAULT_KEY: &str = "default";
pub(crate) const MINIMUM_KEY: &str = "minimum";
pub(crate) const MAXIMUM_KEY: &str = "maximum";
pub(crate) const MULTIPLE_OF_KEY: &str = "multipleOf";
pub(crate) const MIN_LENGTH_KEY: &str = "minLength";
pub(crate) const MAX_LENGTH_KEY: &str = "maxLength";
pub(crate) const PATTERN_KEY: &str = "pattern";
pub(crate) const ENUM_KEY: &str = "enum";
pub(crate) const PROPERTIES_KEY: &str = "properties";
pub(crate) const ADDITIONAL_PROPERTIES_KEY: &str = "additionalProperties";
pub(crate) const ITEMS_KEY: &str = "items";
pub(crate) const MIN_ITEMS_KEY: &str = "minItems";
pub(crate) const MAX_ITEMS_KEY: &str = "maxItems";

////////////////////////////////////////////// SchemaType //////////////////////////////////////////////

/// The value types a schema node can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    /// `true` or `false`.
    Boolean,
    /// Any finite number.
    Number,
    /// A number without a fractional part.
    Integer,
    /// A string.
    String,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// Anything at all.
    Any,
    /// A type name this validator does not know; treated as `any`.
    Other(String),
}

impl SchemaType {
    /// Returns the name used for this type in schemas and error messages.
    pub fn name(&self) -> &str {
        match self {
            SchemaType::Boolean => "boolean",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::String => "string",
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::Any => "any",
            SchemaType::Other(name) => name,
        }
    }

    /// Runtime type check used to pick a member of a union.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Number => value.is_number(),
            SchemaType::Integer => value.as_f64().is_some_and(|n| n.fract() == 0.0),
            SchemaType::String => value.is_string(),
            SchemaType::Object => value.is_object(),
            SchemaType::Array => value.is_array(),
            SchemaType::Any | SchemaType::Other(_) => true,
        }
    }
}

impl From<&str> for SchemaType {
    fn from(name: &str) -> Self {
        match name {
            "boolean" => SchemaType::Boolean,
            "number" => SchemaType::Number,
            "integer" => SchemaType::Integer,
            "string" => SchemaType::String,
            "object" => SchemaType::Object,
            "array" => SchemaType::Array,
            "any" => SchemaType::Any,
            other => SchemaType::Other(other.to_string()),
        }
    }
}

/// Returns the type name of a JSON value as it appears in "got X" messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/////////////////////////////////////////// SchemaNode /////////////////////////////////////////////////

/// How an object node treats keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    /// `additionalProperties: true`; undeclared keys are accepted but not carried over.
    Allowed,
    /// `additionalProperties: false`; undeclared keys draw a warning and are dropped.
    Forbidden,
    /// Anything else; undeclared keys pass through verbatim.
    Unspecified,
}

/// What the `type` keyword declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeSpec {
    Unspecified,
    Single(SchemaType),
    Union(Vec<SchemaType>),
}

/// A compiled `pattern` keyword, anchored to match whole strings.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    pub(crate) source: String,
    pub(crate) regex: Regex,
}

/// A checked, immutable schema node.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub(crate) type_spec: TypeSpec,
    pub(crate) required: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) minimum: Option<f64>,
    pub(crate) maximum: Option<f64>,
    pub(crate) multiple_of: Option<f64>,
    pub(crate) min_length: Option<usize>,
    pub(crate) max_length: Option<usize>,
    pub(crate) pattern: Option<Pattern>,
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) properties: Vec<(String, SchemaNode)>,
    pub(crate) required_keys: Vec<String>,
    pub(crate) additional_properties: AdditionalProperties,
    pub(crate) items: Option<Box<SchemaNode>>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
}

impl SchemaNode {
    /// Parses a raw schema description.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] naming the first malformed node or keyword.
    pub fn parse(schema: &Value) -> Result<Self, SchemaError> {
        parse_node(schema, "")
    }

    /// Parses a schema description from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::parse(&value)
    }

    /// Parses a schema description from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value =
            serde_yml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::parse(&value)
    }

    /// A node with no type and no constraints; accepts anything.
    pub fn permissive() -> Self {
        Self {
            type_spec: TypeSpec::Unspecified,
            required: false,
            nullable: false,
            default: None,
            minimum: None,
            maximum: None,
            multiple_of: None,
            min_length: None,
            max_length: None,
            pattern: None,
            enum_values: None,
            properties: Vec::new(),
            required_keys: Vec::new(),
            additional_properties: AdditionalProperties::Unspecified,
            items: None,
            min_items: None,
            max_items: None,
        }
    }

    /// The declared types: empty when `type` was absent, several for a union.
    pub fn types(&self) -> &[SchemaType] {
        match &self.type_spec {
            TypeSpec::Unspecified => &[],
            TypeSpec::Single(t) => std::slice::from_ref(t),
            TypeSpec::Union(ts) => ts,
        }
    }

    /// Whether the node carries `required: true`.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the node carries `nullable: true`.
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// The `default` value, if declared.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Declared object properties in schema order.
    pub fn properties(&self) -> &[(String, SchemaNode)] {
        &self.properties
    }

    /// Looks up a declared property by name.
    pub fn property(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }

    /// The object-level `required` key list.
    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    /// How undeclared object keys are handled.
    pub fn additional_properties(&self) -> AdditionalProperties {
        self.additional_properties
    }

    /// The element schema of an array node.
    pub fn items(&self) -> Option<&SchemaNode> {
        self.items.as_deref()
    }

    /// True when the node expects structured (object or array) input and never a string.
    pub(crate) fn expects_structured(&self) -> bool {
        let types = self.types();
        types
            .iter()
            .any(|t| matches!(t, SchemaType::Object | SchemaType::Array))
            && !types.iter().any(|t| matches!(t, SchemaType::String))
    }
}

impl FromStr for SchemaNode {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl TryFrom<&Value> for SchemaNode {
    type Error = SchemaError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

////////////////////////////////////////////// Parsing /////////////////////////////////////////////////

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn invalid(path: &str, keyword: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidKeyword {
        path: path.to_string(),
        keyword: keyword.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_node(schema: &Value, path: &str) -> Result<SchemaNode, SchemaError> {
    let obj = schema.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
    })?;

    let mut node = SchemaNode::permissive();
    node.type_spec = parse_type(obj, path)?;

    match obj.get(REQUIRED_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Bool(flag)) => node.required = *flag,
        Some(Value::Array(keys)) => {
            for key in keys {
                let key = key
                    .as_str()
                    .ok_or_else(|| invalid(path, REQUIRED_KEY, "entries must be strings"))?;
                node.required_keys.push(key.to_string());
            }
        }
        Some(_) => {
            return Err(invalid(
                path,
                REQUIRED_KEY,
                "must be a boolean or an array of property names",
            ));
        }
    }

    node.nullable = match obj.get(NULLABLE_KEY) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(invalid(path, NULLABLE_KEY, "must be a boolean")),
    };
    node.default = obj.get(DEFAULT_KEY).cloned();

    node.minimum = parse_f64(obj, MINIMUM_KEY, path)?;
    node.maximum = parse_f64(obj, MAXIMUM_KEY, path)?;
    node.multiple_of = parse_f64(obj, MULTIPLE_OF_KEY, path)?;
    if node.multiple_of.is_some_and(|m| m <= 0.0) {
        return Err(invalid(path, MULTIPLE_OF_KEY, "must be greater than zero"));
    }

    node.min_length = parse_usize(obj, MIN_LENGTH_KEY, path)?;
    node.max_length = parse_usize(obj, MAX_LENGTH_KEY, path)?;
    node.min_items = parse_usize(obj, MIN_ITEMS_KEY, path)?;
    node.max_items = parse_usize(obj, MAX_ITEMS_KEY, path)?;

    if let Some(pattern) = obj.get(PATTERN_KEY) {
        let source = pattern
            .as_str()
            .ok_or_else(|| invalid(path, PATTERN_KEY, "must be a string"))?;
        let anchored = format!("^(?:{})$", source);
        let regex = Regex::new(&anchored).map_err(|e| SchemaError::InvalidPattern {
            path: path.to_string(),
            pattern: source.to_string(),
            reason: e.to_string(),
        })?;
        node.pattern = Some(Pattern {
            source: source.to_string(),
            regex,
        });
    }

    match obj.get(ENUM_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Array(values)) => node.enum_values = Some(values.clone()),
        Some(_) => return Err(invalid(path, ENUM_KEY, "must be an array")),
    }

    match obj.get(PROPERTIES_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Object(properties)) => {
            for (key, child) in properties {
                let parsed = parse_node(child, &child_path(path, key))?;
                node.properties.push((key.clone(), parsed));
            }
        }
        Some(_) => return Err(invalid(path, PROPERTIES_KEY, "must be an object")),
    }

    node.additional_properties = match obj.get(ADDITIONAL_PROPERTIES_KEY) {
        Some(Value::Bool(true)) => AdditionalProperties::Allowed,
        Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
        _ => AdditionalProperties::Unspecified,
    };

    match obj.get(ITEMS_KEY) {
        None | Some(Value::Null) => {}
        Some(items @ Value::Object(_)) => {
            node.items = Some(Box::new(parse_node(items, &format!("{}[]", path))?));
        }
        Some(_) => return Err(invalid(path, ITEMS_KEY, "must be a schema object")),
    }

    Ok(node)
}

fn parse_type(obj: &Map<String, Value>, path: &str) -> Result<TypeSpec, SchemaError> {
    match obj.get(TYPE_KEY) {
        None | Some(Value::Null) => Ok(TypeSpec::Unspecified),
        Some(Value::String(name)) => Ok(TypeSpec::Single(SchemaType::from(name.as_str()))),
        Some(Value::Array(names)) => {
            let mut types = Vec::with_capacity(names.len());
            for name in names {
                let name = name
                    .as_str()
                    .ok_or_else(|| invalid(path, TYPE_KEY, "union members must be strings"))?;
                types.push(SchemaType::from(name));
            }
            Ok(TypeSpec::Union(types))
        }
        Some(_) => Err(invalid(
            path,
            TYPE_KEY,
            "must be a type name or an array of type names",
        )),
    }
}

fn parse_f64(obj: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| invalid(path, key, "must be a number")),
    }
}

fn parse_usize(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<usize>, SchemaError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| invalid(path, key, "must be a non-negative integer")),
    }
}
