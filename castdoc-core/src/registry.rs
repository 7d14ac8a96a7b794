use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use crate::node::Node;

/// Side-loaded resources collected during one marshaling call.
///
/// Keyed by `(type, id)`. The first node registered under a key is kept and
/// later registrations of the same resource are ignored, whatever path
/// reached them. Nodes come back out in registration order.
#[derive(Debug, Default)]
pub struct IncludedRegistry {
    nodes: IndexMap<(String, String), Node>,
}

impl IncludedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node` unless a node with the same type and id is already
    /// present. Returns whether the node was inserted.
    pub fn register(&mut self, node: Node) -> bool {
        match self.nodes.entry((node.resource_type.clone(), node.id.clone())) {
            Entry::Occupied(_) => {
                debug!(
                    resource_type = %node.resource_type,
                    id = %node.id,
                    "Resource already included, keeping first registration"
                );
                false
            }
            Entry::Vacant(slot) => {
                debug!(resource_type = %node.resource_type, id = %node.id, "Included resource");
                slot.insert(node);
                true
            }
        }
    }

    pub fn contains(&self, resource_type: &str, id: &str) -> bool {
        self.nodes
            .contains_key(&(resource_type.to_string(), id.to_string()))
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&Node> {
        self.nodes.get(&(resource_type.to_string(), id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the registry, returning every included node in the order it
    /// was first registered.
    pub fn drain(self) -> Vec<Node> {
        self.nodes.into_values().collect()
    }
}
