#![doc = "castdoc-core: JSON:API resource document marshaling."]

//! Converts models into JSON:API documents: a primary resource or collection,
//! its relationships, and a deduplicated list of side-loaded resources.
//!
//! # Usage
//! Implement [`resource::Resource`] for each model (or bind JSON records to a
//! [`schema::SchemaRegistry`]) and call one of the entry points in
//! [`document`]: `marshal_one`, `marshal_many` or `marshal_embedded`.

pub mod annotation;
pub mod contract;
pub mod document;
pub mod error;
pub mod models;
pub mod node;
pub mod registry;
mod relationship;
pub mod resource;
pub mod schema;

pub use document::{
    embed_one, marshal_embedded, marshal_embedded_json, marshal_many, marshal_one, Document,
    ManyPayload, OnePayload,
};
pub use error::MarshalError;
pub use node::{Linkage, Node, Relationship, RelationshipData, ShallowNode};
pub use resource::{
    AttrValue, Attribute, PrimaryKey, RelationField, Related, Resource, ZERO_TIMESTAMP,
};
