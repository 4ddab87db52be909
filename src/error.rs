//! Error types for jatzingueni operations.

use thiserror::Error;

use crate::model::NodeId;
use crate::status::TransitionError;
use crate::validate::ValidationError;

/// Errors that can occur while building, validating, or extracting from a
/// corpus document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// A tree reached a consumer that requires a certified tree.
    ///
    /// Library callers cannot hit this (extraction only accepts
    /// [`CertifiedTree`](crate::validate::CertifiedTree)); it exists for
    /// surfaces like the CLI that carry trees across an untyped boundary.
    #[error("document has not passed validation")]
    NotValidated,

    #[error("invalid document structure: {0}")]
    InvalidDocument(String),

    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not a sentence leaf")]
    NotALeaf(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
