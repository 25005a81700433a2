//! # Operation Results
//!
//! Document operations separate *expected* failures from faults.  A missing document
//! or collection is ordinary data: it comes back inside an [`OperationResult`] tagged
//! with a [`DocumentError`].  Store I/O faults and invalid arguments are not; they
//! propagate as `Err(StoreError)` around the result.
//!
//! ```text
//! Result<OperationResult<T>, StoreError>
//!        │                   └── the store could not do its job
//!        └── success(T) | failure(DocumentError), plus warnings
//! ```
//!
//! ```rust
//! use worldkeeper::{DocumentError, OperationResult};
//!
//! let ok = OperationResult::success(42).with_warning("Ignored write to protected field '_id'");
//! assert!(ok.is_success());
//! assert_eq!(ok.data(), Some(&42));
//! assert_eq!(ok.warnings().len(), 1);
//!
//! let missing: OperationResult<u32> = OperationResult::failure(DocumentError::NotFound {
//!     collection: "actors".to_string(),
//!     id: "abcdEFGH12345678".to_string(),
//! });
//! assert!(!missing.is_success());
//! assert!(missing.into_result().is_err());
//! ```

use serde::Serialize;

use crate::{Document, DocumentError};

/// Outcome of a document operation: data on success, a tagged error on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult<T = ()> {
    outcome: Result<T, DocumentError>,
    warnings: Vec<String>,
}

impl<T> OperationResult<T> {
    /// A successful result carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            outcome: Ok(data),
            warnings: Vec::new(),
        }
    }

    /// A failed result.
    pub fn failure(error: DocumentError) -> Self {
        Self {
            outcome: Err(error),
            warnings: Vec::new(),
        }
    }

    /// Attaches a warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Attaches several warnings.
    pub fn with_warnings<I, S>(mut self, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.warnings.extend(warnings.into_iter().map(Into::into));
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The data of a successful operation.
    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The error of a failed operation.
    pub fn error(&self) -> Option<&DocumentError> {
        self.outcome.as_ref().err()
    }

    /// Warnings raised along the way, whatever the outcome.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Converts to a plain `Result`, discarding warnings.
    pub fn into_result(self) -> Result<T, DocumentError> {
        self.outcome
    }

    /// Splits into the plain `Result` and the warnings.
    pub fn into_parts(self) -> (Result<T, DocumentError>, Vec<String>) {
        (self.outcome, self.warnings)
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        OperationResult {
            outcome: self.outcome.map(f),
            warnings: self.warnings,
        }
    }
}

/// Filters for [`crate::DocumentStore::search`].  All given filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Wildcard pattern tested against the document's `name`.
    pub name: Option<String>,
    /// Wildcard pattern tested against the document's `_id`.
    pub id: Option<String>,
    /// Exact match on the document's `type`.
    pub document_type: Option<String>,
    /// Maximum number of documents returned; `None` or `0` returns every match.
    pub limit: Option<usize>,
}

impl SearchOptions {
    /// Options that match every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to names matching `pattern`.
    pub fn name(mut self, pattern: impl Into<String>) -> Self {
        self.name = Some(pattern.into());
        self
    }

    /// Restricts to ids matching `pattern`.
    pub fn id(mut self, pattern: impl Into<String>) -> Self {
        self.id = Some(pattern.into());
        self
    }

    /// Restricts to documents whose `type` equals `document_type`.
    pub fn document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Caps the number of returned documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Matches of a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    /// Number of matching documents before the limit was applied.
    pub total_found: usize,
    /// The matching documents in key order, truncated to the limit.
    pub documents: Vec<Document>,
}

/// Who is performing a write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteMeta {
    /// The user recorded as `_stats.lastModifiedBy`.
    pub user_id: Option<String>,
}

impl WriteMeta {
    /// Metadata attributing the write to `user_id`.
    pub fn by(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}
