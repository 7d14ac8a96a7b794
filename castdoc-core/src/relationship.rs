//! Relationship traversal and the sideload projection.

use tracing::debug;

use crate::error::MarshalError;
use crate::node::{Linkage, Node, NodeBuilder, Relationship, RelationshipData};
use crate::resource::{Related, Resource};

impl NodeBuilder<'_> {
    /// Adds every non-empty relationship of `resource` to `node`.
    pub(crate) fn build_relationships(
        &mut self,
        resource: &dyn Resource,
        node: &mut Node,
    ) -> Result<(), MarshalError> {
        for field in resource.relationships() {
            let data = match field.related {
                Related::One(None) => continue,
                Related::Many(related) if related.is_empty() => continue,
                Related::One(Some(related)) => {
                    let child = self.build(&*related)?;
                    RelationshipData::ToOne(self.project(child))
                }
                Related::Many(related) => {
                    let children = self.visit_many(field.name, &related)?;
                    RelationshipData::ToMany(
                        children.into_iter().map(|c| self.project(c)).collect(),
                    )
                }
            };

            node.relationships
                .insert(field.name.to_string(), Relationship { data });
        }
        Ok(())
    }

    /// Builds one node per related resource, in order. The first failure
    /// stops the walk.
    pub(crate) fn visit_many(
        &mut self,
        name: &str,
        related: &[Box<dyn Resource + '_>],
    ) -> Result<Vec<Node>, MarshalError> {
        debug!(relationship = name, count = related.len(), "Visiting to-many relationship");
        related.iter().map(|r| self.build(&**r)).collect()
    }

    /// Registers `node` and returns a shallow reference when side-loading,
    /// otherwise keeps the full node in place.
    fn project(&mut self, node: Node) -> Linkage {
        match self.included.as_deref_mut() {
            Some(registry) => {
                let shallow = node.to_shallow();
                registry.register(node);
                Linkage::Shallow(shallow)
            }
            None => Linkage::Full(Box::new(node)),
        }
    }
}
