//! Schema-driven resources for JSON records whose shape is only known at
//! run time.
//!
//! A schema is a list of field specs, each naming a record field and the
//! `jsonapi` annotation describing its role. Annotations are resolved once
//! when the registry is compiled; records are then bound to a schema and
//! marshaled like any typed [`Resource`].

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::annotation::{FieldAnnotation, FieldRole};
use crate::error::MarshalError;
use crate::resource::{
    AttrValue, Attribute, PrimaryKey, RelationField, Related, Resource, ZERO_TIMESTAMP,
};

/// How a record field's JSON value is interpreted as an attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    #[default]
    Value,
    /// Epoch seconds or an RFC 3339 string; missing or null means zero.
    Timestamp,
    /// Epoch seconds or an RFC 3339 string; missing or null means absent.
    OptionalTimestamp,
}

/// One field of a schema as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: String,
    pub jsonapi: String,
    #[serde(default)]
    pub kind: FieldKind,
    /// Schema of the related records, for `relation` fields.
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Clone)]
struct AttrSpec {
    field: String,
    name: String,
    omit_if_empty: bool,
    kind: FieldKind,
}

#[derive(Debug, Clone)]
struct RelationSpec {
    field: String,
    name: String,
    target: String,
}

/// A compiled schema.
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    name: String,
    resource_type: String,
    primary_field: String,
    client_id_field: Option<String>,
    attributes: Vec<AttrSpec>,
    relations: Vec<RelationSpec>,
}

impl ResourceSchema {
    pub fn compile(name: &str, fields: &[FieldSpec]) -> Result<Self, MarshalError> {
        let mut primary: Option<(String, String)> = None;
        let mut client_id_field = None;
        let mut attributes = Vec::new();
        let mut relations = Vec::new();

        for spec in fields {
            let annotation = FieldAnnotation::parse(&spec.jsonapi).map_err(|e| {
                error!(schema = name, field = %spec.field, error = %e, "Bad field annotation");
                e
            })?;

            match annotation.role {
                // A later primary field replaces an earlier one.
                FieldRole::Primary { resource_type } => {
                    primary = Some((spec.field.clone(), resource_type));
                }
                FieldRole::ClientId => client_id_field = Some(spec.field.clone()),
                FieldRole::Attr {
                    name: attr_name,
                    omit_if_empty,
                } => attributes.push(AttrSpec {
                    field: spec.field.clone(),
                    name: attr_name,
                    omit_if_empty,
                    kind: spec.kind,
                }),
                FieldRole::Relation { name: rel_name } => {
                    let target = spec.target.clone().ok_or_else(|| MarshalError::InvalidSchema {
                        schema: name.to_string(),
                        reason: format!("relation field {:?} has no target schema", spec.field),
                    })?;
                    relations.push(RelationSpec {
                        field: spec.field.clone(),
                        name: rel_name,
                        target,
                    });
                }
            }
        }

        let (primary_field, resource_type) = primary.ok_or_else(|| {
            error!(schema = name, "Schema has no primary field");
            MarshalError::InvalidSchema {
                schema: name.to_string(),
                reason: "no primary field".to_string(),
            }
        })?;

        Ok(ResourceSchema {
            name: name.to_string(),
            resource_type,
            primary_field,
            client_id_field,
            attributes,
            relations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn invalid_record(&self, field: &str, reason: impl Into<String>) -> MarshalError {
        MarshalError::InvalidRecord {
            schema: self.name.clone(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// All schemas known to one configuration, by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, ResourceSchema>,
}

impl SchemaRegistry {
    /// Compiles every schema and checks that relation targets exist.
    pub fn compile(definitions: &IndexMap<String, Vec<FieldSpec>>) -> Result<Self, MarshalError> {
        let mut schemas = IndexMap::new();
        for (name, fields) in definitions {
            schemas.insert(name.clone(), ResourceSchema::compile(name, fields)?);
        }

        for schema in schemas.values() {
            for rel in &schema.relations {
                if !schemas.contains_key(&rel.target) {
                    error!(schema = %schema.name, target = %rel.target, "Relation targets an unknown schema");
                    return Err(MarshalError::InvalidSchema {
                        schema: schema.name.clone(),
                        reason: format!("relation {:?} targets unknown schema {:?}", rel.name, rel.target),
                    });
                }
            }
        }

        debug!(schemas = schemas.len(), "Compiled resource schemas");
        Ok(SchemaRegistry { schemas })
    }

    pub fn get(&self, name: &str) -> Result<&ResourceSchema, MarshalError> {
        self.schemas.get(name).ok_or_else(|| MarshalError::UnknownSchema {
            name: name.to_string(),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Binds `record` to the named schema after checking that it, and every
    /// record nested under its relations, fits.
    pub fn bind<'a>(&'a self, name: &str, record: &'a Value) -> Result<DynamicResource<'a>, MarshalError> {
        let schema = self.get(name)?;
        self.validate(schema, record)?;
        Ok(DynamicResource {
            registry: self,
            schema,
            record,
        })
    }

    /// Binds each element of `records`; a single object binds as a
    /// one-element list.
    pub fn bind_all<'a>(&'a self, name: &str, records: &'a Value) -> Result<Vec<DynamicResource<'a>>, MarshalError> {
        match records {
            Value::Array(items) => items.iter().map(|r| self.bind(name, r)).collect(),
            other => Ok(vec![self.bind(name, other)?]),
        }
    }

    fn validate(&self, schema: &ResourceSchema, record: &Value) -> Result<(), MarshalError> {
        if !record.is_object() {
            return Err(schema.invalid_record("", "record is not an object"));
        }

        for attr in &schema.attributes {
            if attr.kind != FieldKind::Value {
                parse_timestamp(schema, &attr.field, record.get(&attr.field))?;
            }
        }

        for rel in &schema.relations {
            let target = self.get(&rel.target)?;
            match record.get(&rel.field) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    for item in items {
                        self.validate(target, item)?;
                    }
                }
                Some(item @ Value::Object(_)) => self.validate(target, item)?,
                Some(_) => {
                    return Err(schema.invalid_record(&rel.field, "relation must be an object, an array or null"));
                }
            }
        }
        Ok(())
    }
}

fn parse_timestamp(
    schema: &ResourceSchema,
    field: &str,
    value: Option<&Value>,
) -> Result<Option<DateTime<Utc>>, MarshalError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Some)
            .ok_or_else(|| schema.invalid_record(field, format!("{n} is not a timestamp"))),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| schema.invalid_record(field, format!("{s:?}: {e}"))),
        Some(other) => Err(schema.invalid_record(field, format!("{other} is not a timestamp"))),
    }
}

/// A JSON record bound to a schema.
#[derive(Debug, Clone, Copy)]
pub struct DynamicResource<'a> {
    registry: &'a SchemaRegistry,
    schema: &'a ResourceSchema,
    record: &'a Value,
}

impl<'a> DynamicResource<'a> {
    pub fn schema(&self) -> &'a ResourceSchema {
        self.schema
    }

    pub fn record(&self) -> &'a Value {
        self.record
    }

    fn attr_value(&self, attr: &AttrSpec) -> AttrValue {
        let raw = self.record.get(&attr.field);
        // Records are validated on bind, so timestamps parse here.
        let timestamp = || parse_timestamp(self.schema, &attr.field, raw).ok().flatten();
        match attr.kind {
            FieldKind::Timestamp => AttrValue::Timestamp(timestamp().unwrap_or(ZERO_TIMESTAMP)),
            FieldKind::OptionalTimestamp => AttrValue::OptionalTimestamp(timestamp()),
            FieldKind::Value => match raw {
                None => AttrValue::Str(String::new()),
                Some(Value::String(s)) => AttrValue::Str(s.clone()),
                Some(other) => AttrValue::Json(other.clone()),
            },
        }
    }
}

impl<'a> Resource for DynamicResource<'a> {
    fn resource_type(&self) -> &str {
        &self.schema.resource_type
    }

    fn primary_key(&self) -> PrimaryKey {
        match self.record.get(&self.schema.primary_field) {
            Some(value) => PrimaryKey::from_json(value),
            None => PrimaryKey::unsupported("missing"),
        }
    }

    fn client_id(&self) -> Option<&str> {
        self.schema
            .client_id_field
            .as_ref()
            .and_then(|field| self.record.get(field))
            .and_then(Value::as_str)
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        self.schema
            .attributes
            .iter()
            .map(|attr| Attribute {
                name: &attr.name,
                value: self.attr_value(attr),
                omit_if_empty: attr.omit_if_empty,
            })
            .collect()
    }

    fn relationships(&self) -> Vec<RelationField<'_>> {
        self.schema
            .relations
            .iter()
            .filter_map(|rel| {
                let target = self.registry.schemas.get(&rel.target)?;
                let registry = self.registry;
                let bind = |record: &'a Value| {
                    Box::new(DynamicResource {
                        registry,
                        schema: target,
                        record,
                    }) as Box<dyn Resource + '_>
                };
                let related = match self.record.get(&rel.field) {
                    Some(Value::Array(items)) => Related::Many(items.iter().map(bind).collect()),
                    Some(item @ Value::Object(_)) => Related::One(Some(bind(item))),
                    _ => Related::One(None),
                };
                Some(RelationField {
                    name: &rel.name,
                    related,
                })
            })
            .collect()
    }
}
