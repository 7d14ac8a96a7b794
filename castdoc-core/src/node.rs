//! Resource nodes and the builder that produces them from a [`Resource`].

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::MarshalError;
use crate::registry::IncludedRegistry;
use crate::resource::{AttrValue, Attribute, Resource, ZERO_TIMESTAMP};

/// One resource in the document graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(rename = "client-id", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub relationships: IndexMap<String, Relationship>,
}

impl Node {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            client_id: None,
            attributes: IndexMap::new(),
            relationships: IndexMap::new(),
        }
    }

    pub fn to_shallow(&self) -> ShallowNode {
        ShallowNode {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
        }
    }
}

/// Reference to a resource carrying only its type and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ShallowNode {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
}

/// What a relationship points at: a shallow reference when the resource is
/// side-loaded, or the full node when it is embedded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Linkage {
    Shallow(ShallowNode),
    Full(Box<Node>),
}

impl Linkage {
    pub fn id(&self) -> &str {
        match self {
            Linkage::Shallow(s) => &s.id,
            Linkage::Full(n) => &n.id,
        }
    }

    pub fn resource_type(&self) -> &str {
        match self {
            Linkage::Shallow(s) => &s.resource_type,
            Linkage::Full(n) => &n.resource_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationshipData {
    ToOne(Linkage),
    ToMany(Vec<Linkage>),
}

/// A relationship member, encoded as `{"data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

/// Builds nodes for one marshaling call.
///
/// With a registry the builder side-loads: related nodes are registered and
/// relationships keep shallow references. Without one it embeds full nodes.
/// `path` holds the `(type, id)` of every resource currently being built.
pub(crate) struct NodeBuilder<'r> {
    pub(crate) included: Option<&'r mut IncludedRegistry>,
    path: Vec<(String, String)>,
}

impl<'r> NodeBuilder<'r> {
    pub(crate) fn sideloading(registry: &'r mut IncludedRegistry) -> Self {
        Self {
            included: Some(registry),
            path: Vec::new(),
        }
    }

    pub(crate) fn embedding() -> Self {
        Self {
            included: None,
            path: Vec::new(),
        }
    }

    pub(crate) fn build(&mut self, resource: &dyn Resource) -> Result<Node, MarshalError> {
        let resource_type = resource.resource_type();
        let id = resource.primary_key().into_id().map_err(|e| {
            error!(resource_type, error = %e, "Resource has an unusable primary key");
            e
        })?;

        if self
            .path
            .iter()
            .any(|(t, i)| t == resource_type && *i == id)
        {
            error!(resource_type, id = %id, "Relationship graph loops back on itself");
            return Err(MarshalError::CyclicGraph {
                resource_type: resource_type.to_string(),
                id,
            });
        }

        let mut node = Node::new(resource_type, id);

        if let Some(client_id) = resource.client_id().filter(|c| !c.is_empty()) {
            node.client_id = Some(client_id.to_string());
        }

        for attr in resource.attributes() {
            let name = attr.name.to_string();
            if let Some(value) = attribute_value(attr) {
                node.attributes.insert(name, value);
            }
        }

        self.path
            .push((node.resource_type.clone(), node.id.clone()));
        let related = self.build_relationships(resource, &mut node);
        self.path.pop();
        related?;

        debug!(
            resource_type = %node.resource_type,
            id = %node.id,
            attributes = node.attributes.len(),
            relationships = node.relationships.len(),
            "Built node"
        );
        Ok(node)
    }
}

fn is_zero(t: &DateTime<Utc>) -> bool {
    *t == ZERO_TIMESTAMP
}

/// Resolves the stored value of an attribute, or `None` when it is skipped.
fn attribute_value(attr: Attribute<'_>) -> Option<Value> {
    let omit = attr.omit_if_empty;
    match attr.value {
        AttrValue::Timestamp(t) if is_zero(&t) => None,
        AttrValue::Timestamp(t) => Some(Value::from(t.timestamp())),
        AttrValue::OptionalTimestamp(None) if omit => None,
        AttrValue::OptionalTimestamp(None) => Some(Value::Null),
        AttrValue::OptionalTimestamp(Some(t)) if omit && is_zero(&t) => None,
        AttrValue::OptionalTimestamp(Some(t)) => Some(Value::from(t.timestamp())),
        AttrValue::Str(s) if omit && s.is_empty() => None,
        AttrValue::Str(s) => Some(Value::String(s)),
        AttrValue::Json(v) => Some(v),
    }
}
