//! # Schema Validation
//!
//! This module validates and normalizes structured input against a [`SchemaNode`] tree.
//! Validation never stops at the first problem: every violation is collected as a
//! path-qualified [`ValidationIssue`], and the caller receives a [`ValidationResult`]
//! holding errors, warnings and, when there were no errors, the normalized value.
//!
//! ## Key Features
//!
//! - **Normalization**: numbers and strings are cast, booleans optionally coerced,
//!   defaults substituted for absent values
//! - **Union Types**: `type: ["number", "string"]` picks the first member whose runtime
//!   type matches
//! - **Independent Channels**: warnings (e.g. undeclared keys) never make a value invalid
//! - **Totality**: validation failures are data; `validate` has no error path
//!
//! ## Usage Examples
//!
//! ```rust
//! use worldkeeper::{SchemaNode, ValidateOptions, validate};
//! use serde_json::json;
//!
//! let schema = SchemaNode::parse(&json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string", "minLength": 1},
//!         "hp": {"type": "integer", "minimum": 0}
//!     },
//!     "required": ["name"]
//! }))
//! .unwrap();
//!
//! let result = validate(&json!({"name": "Bilbo", "hp": "12"}), &schema, &ValidateOptions::default());
//! assert!(result.valid);
//! assert_eq!(result.normalized_data, Some(json!({"name": "Bilbo", "hp": 12})));
//!
//! let result = validate(&json!({"hp": -1}), &schema, &ValidateOptions::default());
//! assert!(!result.valid);
//! assert_eq!(result.errors.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::schema::{AdditionalProperties, SchemaNode, SchemaType, TypeSpec, json_type_name};

/// A single error or warning produced during validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Location of the offending value, e.g. `system.attributes.hp` or `items[2]`.
    pub path: String,
    /// Human-readable description of the problem.
    pub message: String,
    /// The offending value, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Outcome of one validation call.
///
/// `valid` is true exactly when `errors` is empty, and `normalized_data` is only
/// populated when `valid` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Whether the input satisfied the schema.
    pub valid: bool,
    /// Violations, in the order they were found.
    pub errors: Vec<ValidationIssue>,
    /// Non-fatal observations, in the order they were found.
    pub warnings: Vec<ValidationIssue>,
    /// The normalized value; present only when `valid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized_data: Option<Value>,
}

impl ValidationResult {
    /// Path-qualified error lines, e.g. `hp: Value -1 is less than minimum 0`.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    /// Path-qualified warning lines.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }

    /// Converts into the normalized value or the list of errors.
    pub fn into_result(self) -> Result<Value, Vec<ValidationIssue>> {
        match self.normalized_data {
            Some(data) if self.valid => Ok(data),
            _ => Err(self.errors),
        }
    }
}

/// Options controlling normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOptions {
    /// Coerce `"true"`/`"1"`/`"false"`/`"0"` and numbers into booleans.
    #[serde(default)]
    pub coerce_types: bool,
}

impl ValidateOptions {
    /// Options with boolean coercion enabled.
    pub fn coercing() -> Self {
        Self { coerce_types: true }
    }
}

/// Validates a value against a schema node rooted at the empty path.
pub fn validate(value: &Value, schema: &SchemaNode, options: &ValidateOptions) -> ValidationResult {
    validate_at(value, schema, "", options)
}

/// Validates a value against a schema node, reporting issues relative to `path`.
///
/// A string handed to a node that expects an object or array is taken to be a textual
/// encoding and parsed first; if parsing fails the result carries that single error.
pub fn validate_at(
    value: &Value,
    schema: &SchemaNode,
    path: &str,
    options: &ValidateOptions,
) -> ValidationResult {
    if let Value::String(text) = value
        && schema.expects_structured()
    {
        return match serde_json::from_str::<Value>(text) {
            Ok(parsed) => run(&parsed, schema, path, options),
            Err(e) => parse_failure(path, &e, Some(value.clone())),
        };
    }
    run(value, schema, path, options)
}

/// Parses JSON text and validates the result.
pub fn validate_text(text: &str, schema: &SchemaNode, options: &ValidateOptions) -> ValidationResult {
    match serde_json::from_str::<Value>(text) {
        Ok(parsed) => run(&parsed, schema, "", options),
        Err(e) => parse_failure("", &e, None),
    }
}

fn parse_failure(path: &str, e: &serde_json::Error, value: Option<Value>) -> ValidationResult {
    ValidationResult {
        valid: false,
        errors: vec![ValidationIssue {
            path: path.to_string(),
            message: format!("Invalid JSON input: {}", e),
            value,
        }],
        warnings: Vec::new(),
        normalized_data: None,
    }
}

fn run(value: &Value, schema: &SchemaNode, path: &str, options: &ValidateOptions) -> ValidationResult {
    let mut validator = Validator::new(options);
    let normalized = validator.node(Some(value), schema, path);
    validator.finish(normalized)
}

////////////////////////////////////////////// Validator ///////////////////////////////////////////////

struct Validator<'a> {
    options: &'a ValidateOptions,
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl<'a> Validator<'a> {
    fn new(options: &'a ValidateOptions) -> Self {
        Self {
            options,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn finish(self, normalized: Option<Value>) -> ValidationResult {
        let valid = self.errors.is_empty();
        ValidationResult {
            valid,
            errors: self.errors,
            warnings: self.warnings,
            normalized_data: if valid {
                Some(normalized.unwrap_or(Value::Null))
            } else {
                None
            },
        }
    }

    fn error(&mut self, path: &str, message: String, value: Option<&Value>) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message,
            value: value.cloned(),
        });
    }

    fn warning(&mut self, path: &str, message: String, value: Option<&Value>) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message,
            value: value.cloned(),
        });
    }

    /// Validates one node. `None` means the key was absent; the return value is the
    /// normalized value, or `None` if the key should stay absent.
    fn node(&mut self, value: Option<&Value>, node: &SchemaNode, path: &str) -> Option<Value> {
        let Some(present) = value.filter(|v| !v.is_null()) else {
            if node.required && !node.nullable {
                self.error(path, "Required field missing".to_string(), None);
                return value.cloned();
            }
            return node.default.clone().or_else(|| value.cloned());
        };

        let normalized = match &node.type_spec {
            TypeSpec::Unspecified => present.clone(),
            TypeSpec::Single(schema_type) => self.typed(present, schema_type, node, path),
            TypeSpec::Union(types) => match types.iter().find(|t| t.accepts(present)) {
                Some(schema_type) => self.typed(present, schema_type, node, path),
                None => {
                    let expected: Vec<&str> = types.iter().map(|t| t.name()).collect();
                    self.error(
                        path,
                        format!(
                            "Expected type {}, got {}",
                            expected.join(" or "),
                            json_type_name(present)
                        ),
                        Some(present),
                    );
                    present.clone()
                }
            },
        };
        Some(normalized)
    }

    fn typed(
        &mut self,
        value: &Value,
        schema_type: &SchemaType,
        node: &SchemaNode,
        path: &str,
    ) -> Value {
        match schema_type {
            SchemaType::Boolean => self.boolean(value),
            SchemaType::Number => self.numeric(value, node, path, false),
            SchemaType::Integer => self.numeric(value, node, path, true),
            SchemaType::String => self.string(value, node, path),
            SchemaType::Object => self.object(value, node, path),
            SchemaType::Array => self.array(value, node, path),
            SchemaType::Any | SchemaType::Other(_) => value.clone(),
        }
    }

    fn boolean(&mut self, value: &Value) -> Value {
        if !self.options.coerce_types {
            return value.clone();
        }
        match value {
            Value::String(s) => match s.as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => value.clone(),
            },
            Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
            _ => value.clone(),
        }
    }

    fn numeric(&mut self, value: &Value, node: &SchemaNode, path: &str, integer: bool) -> Value {
        let Some(number) = to_number(value) else {
            self.error(path, "Value must be a number".to_string(), Some(value));
            return value.clone();
        };

        if let Some(minimum) = node.minimum
            && number < minimum
        {
            self.error(
                path,
                format!(
                    "Value {} is less than minimum {}",
                    format_number(number),
                    format_number(minimum)
                ),
                Some(value),
            );
        }
        if let Some(maximum) = node.maximum
            && number > maximum
        {
            self.error(
                path,
                format!(
                    "Value {} exceeds maximum {}",
                    format_number(number),
                    format_number(maximum)
                ),
                Some(value),
            );
        }
        if let Some(multiple_of) = node.multiple_of
            && number % multiple_of != 0.0
        {
            self.error(
                path,
                format!(
                    "Value {} is not a multiple of {}",
                    format_number(number),
                    format_number(multiple_of)
                ),
                Some(value),
            );
        }

        if integer {
            if number.fract() != 0.0 {
                self.error(
                    path,
                    format!("Value {} is not an integer", format_number(number)),
                    Some(value),
                );
            }
            // Floored even when invalid; callers only see it through a valid result.
            return number_value(number.floor());
        }
        number_value(number)
    }

    fn string(&mut self, value: &Value, node: &SchemaNode, path: &str) -> Value {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let length = text.chars().count();

        if let Some(min_length) = node.min_length
            && length < min_length
        {
            self.error(
                path,
                format!(
                    "String length {} is less than minLength {}",
                    length, min_length
                ),
                Some(value),
            );
        }
        if let Some(max_length) = node.max_length
            && length > max_length
        {
            self.error(
                path,
                format!("String length {} exceeds maxLength {}", length, max_length),
                Some(value),
            );
        }
        if let Some(allowed) = &node.enum_values
            && !allowed.iter().any(|candidate| enum_matches(candidate, &text))
        {
            let listed: Vec<String> = allowed
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            self.error(
                path,
                format!("Value '{}' is not one of: {}", text, listed.join(", ")),
                Some(value),
            );
        }
        if let Some(pattern) = &node.pattern
            && !pattern.regex.is_match(&text)
        {
            self.error(
                path,
                format!("Value '{}' does not match pattern {}", text, pattern.source),
                Some(value),
            );
        }

        Value::String(text)
    }

    fn object(&mut self, value: &Value, node: &SchemaNode, path: &str) -> Value {
        let Some(raw) = value.as_object() else {
            self.error(
                path,
                format!("Expected object, got {}", json_type_name(value)),
                Some(value),
            );
            return value.clone();
        };

        let mut normalized = Map::new();
        for (key, child) in &node.properties {
            if let Some(v) = self.node(raw.get(key), child, &child_path(path, key)) {
                normalized.insert(key.clone(), v);
            }
        }

        for key in &node.required_keys {
            if !raw.contains_key(key) {
                self.error(
                    &child_path(path, key),
                    format!("Missing required property '{}'", key),
                    None,
                );
            }
        }

        for (key, v) in raw {
            if node.property(key).is_some() {
                continue;
            }
            match node.additional_properties {
                AdditionalProperties::Forbidden => {
                    self.warning(
                        &child_path(path, key),
                        format!("Unknown property '{}'", key),
                        Some(v),
                    );
                }
                AdditionalProperties::Unspecified => {
                    normalized.insert(key.clone(), v.clone());
                }
                AdditionalProperties::Allowed => {}
            }
        }

        Value::Object(normalized)
    }

    fn array(&mut self, value: &Value, node: &SchemaNode, path: &str) -> Value {
        let Some(raw) = value.as_array() else {
            self.error(
                path,
                format!("Expected array, got {}", json_type_name(value)),
                Some(value),
            );
            return value.clone();
        };

        let mut normalized = Vec::with_capacity(raw.len());
        for (index, item) in raw.iter().enumerate() {
            let item = match node.items.as_deref() {
                Some(items) => self
                    .node(Some(item), items, &format!("{}[{}]", path, index))
                    .unwrap_or(Value::Null),
                None => item.clone(),
            };
            normalized.push(item);
        }

        if let Some(min_items) = node.min_items
            && normalized.len() < min_items
        {
            self.error(
                path,
                format!(
                    "Array length {} is less than minItems {}",
                    normalized.len(),
                    min_items
                ),
                Some(value),
            );
        }
        if let Some(max_items) = node.max_items
            && normalized.len() > max_items
        {
            self.error(
                path,
                format!(
                    "Array length {} exceeds maxItems {}",
                    normalized.len(),
                    max_items
                ),
                Some(value),
            );
        }

        Value::Array(normalized)
    }
}

////////////////////////////////////////////// Helpers /////////////////////////////////////////////////

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Numeric cast: numbers as-is, numeric strings parsed (blank is zero), booleans as 0/1.
/// Returns `None` for anything that does not yield a finite number.
fn to_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        Value::from(number as i64)
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() <= MAX_SAFE_INTEGER {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

fn enum_matches(candidate: &Value, text: &str) -> bool {
    match candidate {
        Value::String(s) => s == text,
        other => other.to_string() == text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> SchemaNode {
        SchemaNode::parse(&value).unwrap()
    }

    fn check(value: Value, node: Value) -> ValidationResult {
        validate(&value, &schema(node), &ValidateOptions::default())
    }

    #[test]
    fn validate_number_bounds_single_error() {
        let result = check(json!(5), json!({"type": "number", "minimum": 0, "maximum": 3}));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Value 5 exceeds maximum 3");
        assert!(result.normalized_data.is_none());
    }

    #[test]
    fn validate_number_coerces_numeric_strings() {
        let result = check(json!("2.5"), json!({"type": "number"}));
        assert!(result.valid);
        assert_eq!(result.normalized_data, Some(json!(2.5)));
    }

    #[test]
    fn validate_number_rejects_nan() {
        let result = check(json!("abc"), json!({"type": "number"}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "Value must be a number");
        assert_eq!(result.errors[0].value, Some(json!("abc")));
    }

    #[test]
    fn validate_number_multiple_of() {
        assert!(check(json!(9), json!({"type": "number", "multipleOf": 3})).valid);
        let result = check(json!(10), json!({"type": "number", "multipleOf": 3}));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Value 10 is not a multiple of 3");
    }

    #[test]
    fn validate_integer_rejects_fraction() {
        let result = check(json!(2.5), json!({"type": "integer"}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "Value 2.5 is not an integer");
    }

    #[test]
    fn validate_integer_coerces_and_floors() {
        let result = check(json!("7"), json!({"type": "integer"}));
        assert_eq!(result.normalized_data, Some(json!(7)));
        let result = check(json!(7.0), json!({"type": "integer"}));
        assert_eq!(result.normalized_data, Some(json!(7)));
    }

    #[test]
    fn validate_boolean_passthrough_without_coercion() {
        let result = check(json!("true"), json!({"type": "boolean"}));
        assert!(result.valid);
        assert_eq!(result.normalized_data, Some(json!("true")));
    }

    #[test]
    fn validate_boolean_coercion() {
        let node = schema(json!({"type": "boolean"}));
        let options = ValidateOptions::coercing();
        let cases = [
            (json!("true"), json!(true)),
            (json!("1"), json!(true)),
            (json!("false"), json!(false)),
            (json!("0"), json!(false)),
            (json!(2), json!(true)),
            (json!(0), json!(false)),
            (json!("maybe"), json!("maybe")),
        ];
        for (input, expected) in cases {
            let result = validate(&input, &node, &options);
            assert_eq!(result.normalized_data, Some(expected), "input {}", input);
        }
    }

    #[test]
    fn validate_string_collects_every_violation() {
        let result = check(
            json!("xyzzy"),
            json!({"type": "string", "maxLength": 3, "enum": ["a", "b"], "pattern": "[a-c]+"}),
        );
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0].message, "String length 5 exceeds maxLength 3");
        assert_eq!(result.errors[1].message, "Value 'xyzzy' is not one of: a, b");
        assert_eq!(
            result.errors[2].message,
            "Value 'xyzzy' does not match pattern [a-c]+"
        );
    }

    #[test]
    fn validate_string_pattern_matches_whole_string() {
        let node = json!({"type": "string", "pattern": "ab"});
        assert!(check(json!("ab"), node.clone()).valid);
        assert!(!check(json!("xaby"), node).valid);
    }

    #[test]
    fn validate_string_casts_numbers() {
        let result = check(json!(42), json!({"type": "string", "minLength": 1}));
        assert_eq!(result.normalized_data, Some(json!("42")));
    }

    #[test]
    fn validate_required_missing() {
        let result = check(json!(null), json!({"type": "string", "required": true}));
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "Required field missing");
    }

    #[test]
    fn validate_nullable_required_passes_null() {
        let result = check(
            json!(null),
            json!({"type": "string", "required": true, "nullable": true}),
        );
        assert!(result.valid);
        assert_eq!(result.normalized_data, Some(json!(null)));
    }

    #[test]
    fn validate_default_substituted_for_absent() {
        let result = check(
            json!({}),
            json!({"type": "object", "properties": {"hp": {"type": "integer", "default": 10}}}),
        );
        assert_eq!(result.normalized_data, Some(json!({"hp": 10})));
    }

    #[test]
    fn validate_absent_without_default_stays_absent() {
        let result = check(
            json!({}),
            json!({"type": "object", "properties": {"hp": {"type": "integer"}}}),
        );
        assert_eq!(result.normalized_data, Some(json!({})));
    }

    #[test]
    fn validate_object_end_to_end() {
        let result = check(
            json!({"hp": -1}),
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "minLength": 1},
                    "hp": {"type": "integer", "minimum": 0}
                },
                "required": ["name"]
            }),
        );
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        let messages = result.error_messages();
        assert!(messages.contains(&"hp: Value -1 is less than minimum 0".to_string()));
        assert!(messages.contains(&"name: Missing required property 'name'".to_string()));
    }

    #[test]
    fn validate_required_checks_raw_presence() {
        // A declared default does not satisfy the object-level required list.
        let result = check(
            json!({}),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string", "default": "x"}},
                "required": ["name"]
            }),
        );
        assert_eq!(result.errors.len(), 1);
        // An undeclared key does.
        let result = check(
            json!({"extra": 1}),
            json!({"type": "object", "required": ["extra"]}),
        );
        assert!(result.valid);
    }

    #[test]
    fn validate_additional_properties_forbidden_warns() {
        let result = check(
            json!({"name": "a", "color": "red"}),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "additionalProperties": false
            }),
        );
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].path, "color");
        assert_eq!(result.normalized_data, Some(json!({"name": "a"})));
    }

    #[test]
    fn validate_additional_properties_unspecified_passes_through() {
        let result = check(
            json!({"name": "a", "flags": {"core": 1}}),
            json!({"type": "object", "properties": {"name": {"type": "string"}}}),
        );
        assert_eq!(
            result.normalized_data,
            Some(json!({"name": "a", "flags": {"core": 1}}))
        );
    }

    #[test]
    fn validate_additional_properties_allowed_drops_undeclared() {
        let result = check(
            json!({"name": "a", "flags": {}}),
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "additionalProperties": true
            }),
        );
        assert!(result.warnings.is_empty());
        assert_eq!(result.normalized_data, Some(json!({"name": "a"})));
    }

    #[test]
    fn validate_object_type_mismatch() {
        let result = check(json!([1]), json!({"type": "object"}));
        assert_eq!(result.errors[0].message, "Expected object, got array");
    }

    #[test]
    fn validate_array_items_and_bounds() {
        let result = check(
            json!(["1", "x", 3]),
            json!({"type": "array", "items": {"type": "number"}, "maxItems": 2}),
        );
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].path, "[1]");
        assert_eq!(result.errors[1].message, "Array length 3 exceeds maxItems 2");
    }

    #[test]
    fn validate_array_normalizes_items() {
        let result = check(
            json!(["1", 2]),
            json!({"type": "array", "items": {"type": "integer"}, "minItems": 1}),
        );
        assert_eq!(result.normalized_data, Some(json!([1, 2])));
    }

    #[test]
    fn validate_array_rejects_non_array() {
        let result = check(json!(5), json!({"type": "array"}));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Expected array, got number");

        let result = check(json!("nope"), json!({"type": "array"}));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.starts_with("Invalid JSON input"));
    }

    #[test]
    fn validate_nested_paths() {
        let result = check(
            json!({"system": {"skills": [{"rank": "high"}]}}),
            json!({
                "type": "object",
                "properties": {
                    "system": {
                        "type": "object",
                        "properties": {
                            "skills": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {"rank": {"type": "integer"}}
                                }
                            }
                        }
                    }
                }
            }),
        );
        assert_eq!(
            result.error_messages(),
            vec!["system.skills[0].rank: Value must be a number".to_string()]
        );
    }

    #[test]
    fn validate_union_first_match_wins() {
        let node = json!({"type": ["number", "string"], "minLength": 3});
        let result = check(json!(5), node.clone());
        assert!(result.valid);
        let result = check(json!("ab"), node);
        assert_eq!(result.errors[0].message, "String length 2 is less than minLength 3");
    }

    #[test]
    fn validate_union_no_match() {
        let result = check(json!(true), json!({"type": ["number", "string"]}));
        assert!(!result.valid);
        assert_eq!(
            result.errors[0].message,
            "Expected type number or string, got boolean"
        );
        assert_eq!(result.errors[0].value, Some(json!(true)));
    }

    #[test]
    fn validate_any_and_unknown_passthrough() {
        assert!(check(json!({"a": [1]}), json!({"type": "any"})).valid);
        assert!(check(json!(12), json!({"type": "DataModel"})).valid);
        assert!(check(json!("x"), json!({})).valid);
    }

    #[test]
    fn validate_text_parse_failure_single_error() {
        let node = schema(json!({"type": "object", "required": ["name"]}));
        let result = validate_text("{not json", &node, &ValidateOptions::default());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].message.starts_with("Invalid JSON input"));
    }

    #[test]
    fn validate_textual_root_is_parsed() {
        let node = schema(json!({"type": "object", "properties": {"hp": {"type": "integer"}}}));
        let result = validate(&json!("{\"hp\": \"3\"}"), &node, &ValidateOptions::default());
        assert_eq!(result.normalized_data, Some(json!({"hp": 3})));
    }

    #[test]
    fn validate_at_prefixes_paths() {
        let node = schema(json!({"type": "object", "required": ["name"]}));
        let result = validate_at(&json!({}), &node, "actor", &ValidateOptions::default());
        assert_eq!(result.errors[0].path, "actor.name");
    }

    #[test]
    fn validation_issue_display() {
        let issue = ValidationIssue {
            path: "items[0]".to_string(),
            message: "Value must be a number".to_string(),
            value: None,
        };
        assert_eq!(issue.to_string(), "items[0]: Value must be a number");
    }

    #[test]
    fn validation_result_serializes_camel_case() {
        let result = check(json!(1), json!({"type": "number"}));
        let encoded = serde_json::to_value(&result).unwrap();
        assert_eq!(encoded["normalizedData"], json!(1));
        assert_eq!(encoded["valid"], json!(true));
    }
}
