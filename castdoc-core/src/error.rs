//! Error type shared by every marshaling entry point.
//!
//! Errors are structural: they describe a mismatch between a model and the
//! way it declares itself as a resource. Nothing here is transient, so callers
//! should map any of them to a failed response rather than retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarshalError {
    /// An annotation string does not follow
    /// `primary,<type> | client-id | attr,<name>[,omit-if-empty] | relation,<name>`.
    #[error("malformed jsonapi annotation: {annotation:?}")]
    MalformedAnnotation { annotation: String },

    /// The primary field holds something other than a string or an integer.
    #[error("id should be either string or integer, found {found}")]
    InvalidIdentityType { found: String },

    /// A relationship leads back to a resource that is still being built.
    #[error("cyclic relationship graph through {resource_type}/{id}")]
    CyclicGraph { resource_type: String, id: String },

    /// A resource schema cannot describe a valid node.
    #[error("invalid resource schema {schema:?}: {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("unknown resource schema {name:?}")]
    UnknownSchema { name: String },

    /// A JSON record does not fit the schema it is bound to.
    #[error("record for schema {schema:?} has an invalid {field:?} field: {reason}")]
    InvalidRecord {
        schema: String,
        field: String,
        reason: String,
    },

    /// The document sink failed to encode or write the payload.
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl MarshalError {
    pub(crate) fn malformed(annotation: &str) -> Self {
        MarshalError::MalformedAnnotation {
            annotation: annotation.to_string(),
        }
    }
}
