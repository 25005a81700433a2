//! # Command Error Handling
//!
//! This module maps worldkeeper errors to user-facing messages for the CLI using the
//! handled crate for consistent error property extraction.

use handled::Handle;

use crate::{ConfigError, DocumentError, SchemaError, StoreError, WorldError};

/// User-friendly error information that can be extracted from various error types
#[derive(Debug, Clone)]
pub struct UserError {
    /// The main error message to display to the user
    pub message: String,
    /// Optional usage hint to help the user correct the error
    pub usage_hint: Option<String>,
}

impl UserError {
    fn hinted(message: impl Into<String>, hint: &str) -> Option<Self> {
        Some(Self {
            message: message.into(),
            usage_hint: Some(hint.to_string()),
        })
    }
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Implements Handle<UserError> for itself to allow extraction
impl Handle<UserError> for UserError {
    fn handle(&self) -> Option<UserError> {
        Some(self.clone())
    }
}

impl Handle<UserError> for DocumentError {
    fn handle(&self) -> Option<UserError> {
        match self {
            DocumentError::CollectionNotFound { .. } => UserError::hinted(
                self.to_string(),
                "Run 'worldctl collections <world>' to see the collections this world exposes",
            ),
            DocumentError::NotFound { .. } => UserError::hinted(
                self.to_string(),
                "Use 'worldctl document search' to find document ids",
            ),
            DocumentError::AlreadyExists { .. } => UserError::hinted(
                self.to_string(),
                "Omit _id to have a fresh identifier generated",
            ),
            DocumentError::InvalidId(_) => UserError::hinted(
                self.to_string(),
                "Document ids are exactly 16 characters of A-Z, a-z and 0-9",
            ),
        }
    }
}

impl Handle<UserError> for StoreError {
    fn handle(&self) -> Option<UserError> {
        match self {
            StoreError::Io(_) => UserError::hinted(
                self.to_string(),
                "Check that the data root exists and is readable and writable",
            ),
            StoreError::Corrupt { .. } => UserError::hinted(
                self.to_string(),
                "Inspect the collection's store.jsonl for damaged records",
            ),
            StoreError::Serialization(_) | StoreError::InvalidArgument(_) => Some(UserError {
                message: self.to_string(),
                usage_hint: None,
            }),
        }
    }
}

impl Handle<UserError> for WorldError {
    fn handle(&self) -> Option<UserError> {
        match self {
            WorldError::NotFound(_) => UserError::hinted(
                self.to_string(),
                "Run 'worldctl worlds' to list worlds, or pass --data-root",
            ),
            WorldError::InvalidId(_) => UserError::hinted(
                self.to_string(),
                "World and collection names may not contain path separators or be '..'",
            ),
            WorldError::Io(_) => Some(UserError {
                message: self.to_string(),
                usage_hint: None,
            }),
        }
    }
}

impl Handle<UserError> for ConfigError {
    fn handle(&self) -> Option<UserError> {
        match self {
            ConfigError::Read { .. } => UserError::hinted(
                self.to_string(),
                "The specified file was not found or is not readable. Check the file path.",
            ),
            ConfigError::Parse { .. } => UserError::hinted(
                self.to_string(),
                "Files ending in .json are read as JSON; anything else is read as YAML",
            ),
            ConfigError::Schema { .. } => Some(UserError {
                message: self.to_string(),
                usage_hint: None,
            }),
        }
    }
}

impl Handle<UserError> for SchemaError {
    fn handle(&self) -> Option<UserError> {
        Some(UserError {
            message: self.to_string(),
            usage_hint: None,
        })
    }
}

/// Implement Handle<UserError> for serde_json::Error
impl Handle<UserError> for serde_json::Error {
    fn handle(&self) -> Option<UserError> {
        UserError::hinted(
            format!("JSON parsing error: {}", self),
            "Pass document data as a JSON object, inline or as @path/to/file.json",
        )
    }
}

/// Implement Handle<UserError> for std::io::Error
impl Handle<UserError> for std::io::Error {
    fn handle(&self) -> Option<UserError> {
        let hint = match self.kind() {
            std::io::ErrorKind::NotFound => {
                Some("The specified file was not found. Check the file path.".to_string())
            }
            std::io::ErrorKind::PermissionDenied => {
                Some("Permission denied. Check file permissions.".to_string())
            }
            _ => None,
        };

        Some(UserError {
            message: format!("File operation error: {}", self),
            usage_hint: hint,
        })
    }
}

/// Enhanced error formatting for CLI output
pub fn format_cli_error<E>(error: &E) -> String
where
    E: Handle<UserError> + std::fmt::Display,
{
    if let Some(user_error) = error.handle() {
        let mut output = user_error.message;
        if let Some(hint) = user_error.usage_hint {
            output.push_str(&format!("\nHint: {}", hint));
        }
        output
    } else {
        error.to_string()
    }
}

/// Prints a handled error and exits with status 1
pub fn exit_with_handled_error<E>(error: &E) -> !
where
    E: Handle<UserError> + std::fmt::Display,
{
    crate::cli_utils::exit_with_error(&format_cli_error(error))
}
