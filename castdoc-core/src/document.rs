//! Document assembly: the entry points that turn models into documents.
//!
//! - [`marshal_one`] / [`marshal_many`] side-load every related resource into
//!   a flat `included` list and reference it through shallow nodes.
//! - [`marshal_embedded`] nests related resources in full and hands the
//!   payload straight to a [`DocumentSink`].
//!
//! Any failure aborts the call; no partial document is returned.

use std::io::Write;

use serde::Serialize;
use tracing::{error, info};

use crate::contract::{DocumentSink, JsonSink};
use crate::error::MarshalError;
use crate::node::{Node, NodeBuilder};
use crate::registry::IncludedRegistry;
use crate::resource::Resource;

/// Document whose primary data is a single resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnePayload {
    pub data: Node,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Node>,
}

/// Document whose primary data is a collection. `data` is always encoded,
/// as `[]` when the collection is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManyPayload {
    pub data: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    One(OnePayload),
    Many(ManyPayload),
}

impl From<OnePayload> for Document {
    fn from(payload: OnePayload) -> Self {
        Document::One(payload)
    }
}

impl From<ManyPayload> for Document {
    fn from(payload: ManyPayload) -> Self {
        Document::Many(payload)
    }
}

impl Document {
    pub fn included(&self) -> &[Node] {
        match self {
            Document::One(p) => &p.included,
            Document::Many(p) => &p.included,
        }
    }
}

/// Marshals a single resource, side-loading its relationships.
pub fn marshal_one(resource: &dyn Resource) -> Result<OnePayload, MarshalError> {
    let mut included = IncludedRegistry::new();
    let data = NodeBuilder::sideloading(&mut included)
        .build(resource)
        .map_err(|e| {
            error!(error = %e, "Failed to marshal resource");
            e
        })?;

    info!(
        resource_type = %data.resource_type,
        id = %data.id,
        included = included.len(),
        "Marshaled single resource document"
    );
    Ok(OnePayload {
        data,
        included: included.drain(),
    })
}

/// Marshals a collection in input order, side-loading relationships across
/// all of its members into one shared `included` list.
pub fn marshal_many<R: Resource>(resources: &[R]) -> Result<ManyPayload, MarshalError> {
    let mut included = IncludedRegistry::new();

    let data = {
        let mut builder = NodeBuilder::sideloading(&mut included);
        resources
            .iter()
            .map(|r| builder.build(r))
            .collect::<Result<Vec<_>, _>>()
    }
    .map_err(|e| {
        error!(error = %e, count = resources.len(), "Failed to marshal collection");
        e
    })?;

    info!(
        count = data.len(),
        included = included.len(),
        "Marshaled collection document"
    );
    Ok(ManyPayload {
        data,
        included: included.drain(),
    })
}

/// Builds a single-resource payload with every relationship embedded in full.
/// No registry takes part, so `included` is always empty.
pub fn embed_one(resource: &dyn Resource) -> Result<OnePayload, MarshalError> {
    let data = NodeBuilder::embedding().build(resource).map_err(|e| {
        error!(error = %e, "Failed to marshal embedded resource");
        e
    })?;

    info!(
        resource_type = %data.resource_type,
        id = %data.id,
        "Marshaled embedded resource document"
    );
    Ok(OnePayload {
        data,
        included: Vec::new(),
    })
}

/// Marshals `resource` in embedded mode and passes the payload to `sink`.
pub fn marshal_embedded<S>(sink: &mut S, resource: &dyn Resource) -> Result<(), MarshalError>
where
    S: DocumentSink + ?Sized,
{
    let payload = embed_one(resource)?;
    sink.write_document(&payload)
}

/// Marshals `resource` in embedded mode and writes it to `writer` as JSON.
pub fn marshal_embedded_json<W: Write>(
    writer: W,
    resource: &dyn Resource,
) -> Result<(), MarshalError> {
    marshal_embedded(&mut JsonSink::new(writer), resource)
}
