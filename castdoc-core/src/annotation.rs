//! Field metadata resolver for the `jsonapi` annotation mini-language.
//!
//! ```text
//! primary,<resource-type>
//! client-id
//! attr,<field-name>[,omit-if-empty]
//! relation,<field-name>
//! ```

use crate::error::MarshalError;

const OMIT_IF_EMPTY: &str = "omit-if-empty";
// Spelling used by older model definitions.
const OMIT_IF_EMPTY_LEGACY: &str = "omitempty";

/// Role a field plays in the resource document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    Primary { resource_type: String },
    ClientId,
    Attr { name: String, omit_if_empty: bool },
    Relation { name: String },
}

/// A parsed field annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAnnotation {
    pub role: FieldRole,
}

impl FieldAnnotation {
    /// Parses one annotation. Tokens past the name are flags; only the
    /// first flag of an `attr` is read and unknown flags are ignored.
    /// Tokens are not trimmed.
    pub fn parse(raw: &str) -> Result<Self, MarshalError> {
        let args: Vec<&str> = raw.split(',').collect();

        let role = match args.as_slice() {
            ["client-id"] => FieldRole::ClientId,
            ["primary", resource_type, ..] if !resource_type.is_empty() => FieldRole::Primary {
                resource_type: resource_type.to_string(),
            },
            ["attr", name, flags @ ..] if !name.is_empty() => FieldRole::Attr {
                name: name.to_string(),
                omit_if_empty: flags
                    .first()
                    .is_some_and(|f| *f == OMIT_IF_EMPTY || *f == OMIT_IF_EMPTY_LEGACY),
            },
            ["relation", name, ..] if !name.is_empty() => FieldRole::Relation {
                name: name.to_string(),
            },
            _ => return Err(MarshalError::malformed(raw)),
        };

        Ok(FieldAnnotation { role })
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.role, FieldRole::Primary { .. })
    }
}
