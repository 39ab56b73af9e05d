//! Error and diagnostic types.
//!
//! Only [`LoadError`] aborts a load. Everything else the engine runs into is
//! a [`Diagnostic`]: it is logged, collected in the
//! [`LoadReport`](crate::LoadReport), and the load carries on with the next
//! field.

use serde::Serialize;
use thiserror::Error;

/// Fatal load failures, surfaced through the failure channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("no application file selected")]
    InputMissing,

    #[error("failed to read application file: {0}")]
    ReadFailure(String),

    #[error("parse error: {0}")]
    ParseFailure(String),
}

/// Errors returned when a mapping configuration has the wrong shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("failed to parse mapping configuration: {0}")]
    Parse(String),

    #[error("rule for {0:?} needs either a selector or an itemContainerPattern with an itemMapping")]
    MissingSelector(String),

    #[error("array rule for {0:?} is missing {1}")]
    IncompleteArrayRule(String, &'static str),

    #[error("itemContainerPattern {0:?} has no {{index}} placeholder")]
    MissingIndexPlaceholder(String),

    #[error("item rule {0:?} must be a scalar rule with a selector")]
    NestedArrayRule(String),
}

/// A non-fatal problem recorded while populating a form.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    #[error(
        "document format version is {}, mapping expects {expected}; some fields may not map correctly",
        .found.as_deref().unwrap_or("missing")
    )]
    VersionMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error(
        "no element for selector {selector:?} (path {path:?}{})",
        .container.as_deref().map(|c| format!(", container {c:?}")).unwrap_or_default()
    )]
    TargetNotFound {
        path: String,
        selector: String,
        container: Option<String>,
    },

    #[error("container {selector:?} for item {index} of {path:?} not found and could not be added")]
    ContainerUnavailable {
        path: String,
        index: usize,
        selector: String,
    },
}

/// Log `diagnostic` and append it to `out`.
pub(crate) fn record(out: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!("{diagnostic}");
    out.push(diagnostic);
}
