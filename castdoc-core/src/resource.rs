//! The `Resource` contract: how a model describes itself to the node builder.
//!
//! A model implements [`Resource`] once and lists its identity, attributes and
//! relationships in declaration order. The builder never inspects the model
//! in any other way.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::MarshalError;

/// Raw value of a resource's primary field, before it is coerced to an id.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryKey {
    Str(String),
    Signed(i128),
    Unsigned(u128),
    /// Any other kind of value, named by its type. Always rejected.
    Unsupported(String),
}

impl PrimaryKey {
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        PrimaryKey::Unsupported(type_name.into())
    }

    /// Reads a primary key out of a JSON value. Only strings and integral
    /// numbers are usable as ids.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => PrimaryKey::Str(s.clone()),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PrimaryKey::Signed(i as i128)
                } else if let Some(u) = n.as_u64() {
                    PrimaryKey::Unsigned(u as u128)
                } else {
                    PrimaryKey::unsupported("float")
                }
            }
            Value::Null => PrimaryKey::unsupported("null"),
            Value::Bool(_) => PrimaryKey::unsupported("boolean"),
            Value::Array(_) => PrimaryKey::unsupported("array"),
            Value::Object(_) => PrimaryKey::unsupported("object"),
        }
    }

    /// Coerces the key into the decimal string used as the node id.
    pub fn into_id(self) -> Result<String, MarshalError> {
        match self {
            PrimaryKey::Str(s) => Ok(s),
            PrimaryKey::Signed(i) => Ok(i.to_string()),
            PrimaryKey::Unsigned(u) => Ok(u.to_string()),
            PrimaryKey::Unsupported(found) => Err(MarshalError::InvalidIdentityType { found }),
        }
    }
}

impl From<String> for PrimaryKey {
    fn from(s: String) -> Self {
        PrimaryKey::Str(s)
    }
}

impl From<&str> for PrimaryKey {
    fn from(s: &str) -> Self {
        PrimaryKey::Str(s.to_string())
    }
}

macro_rules! primary_key_from_int {
    ($variant:ident, $wide:ty; $($t:ty),*) => {
        $(
            impl From<$t> for PrimaryKey {
                fn from(v: $t) -> Self {
                    PrimaryKey::$variant(v as $wide)
                }
            }
        )*
    };
}

primary_key_from_int!(Signed, i128; i8, i16, i32, i64, i128, isize);
primary_key_from_int!(Unsigned, u128; u8, u16, u32, u64, u128, usize);

macro_rules! primary_key_unsupported {
    ($($t:ty),*) => {
        $(
            impl From<$t> for PrimaryKey {
                fn from(_: $t) -> Self {
                    PrimaryKey::unsupported(stringify!($t))
                }
            }
        )*
    };
}

primary_key_unsupported!(f32, f64, bool);

/// The unset timestamp. It lies before any instant a record can carry, so
/// the Unix epoch stays a real value.
pub const ZERO_TIMESTAMP: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// Value of one attribute field.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Skipped when [`ZERO_TIMESTAMP`], otherwise rendered as epoch seconds.
    Timestamp(DateTime<Utc>),
    /// Rendered as `null` when absent unless the attribute omits empties.
    OptionalTimestamp(Option<DateTime<Utc>>),
    Str(String),
    /// Stored as-is.
    Json(Value),
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<&String> for AttrValue {
    fn from(s: &String) -> Self {
        AttrValue::Str(s.clone())
    }
}

impl From<DateTime<Utc>> for AttrValue {
    fn from(t: DateTime<Utc>) -> Self {
        AttrValue::Timestamp(t)
    }
}

impl From<Option<DateTime<Utc>>> for AttrValue {
    fn from(t: Option<DateTime<Utc>>) -> Self {
        AttrValue::OptionalTimestamp(t)
    }
}

impl From<Value> for AttrValue {
    fn from(v: Value) -> Self {
        AttrValue::Json(v)
    }
}

macro_rules! attr_value_from_json {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AttrValue {
                fn from(v: $t) -> Self {
                    AttrValue::Json(Value::from(v))
                }
            }
        )*
    };
}

attr_value_from_json!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

/// One attribute entry, in the order the model declares it.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: AttrValue,
    pub omit_if_empty: bool,
}

impl<'a> Attribute<'a> {
    pub fn new(name: &'a str, value: impl Into<AttrValue>) -> Self {
        Self {
            name,
            value: value.into(),
            omit_if_empty: false,
        }
    }

    pub fn omit_if_empty(mut self) -> Self {
        self.omit_if_empty = true;
        self
    }
}

/// Related resources behind one relationship field.
pub enum Related<'a> {
    One(Option<Box<dyn Resource + 'a>>),
    Many(Vec<Box<dyn Resource + 'a>>),
}

/// One relationship entry, in the order the model declares it.
pub struct RelationField<'a> {
    pub name: &'a str,
    pub related: Related<'a>,
}

impl<'a> RelationField<'a> {
    pub fn to_one<T: Resource + 'a>(name: &'a str, related: Option<&'a T>) -> Self {
        Self {
            name,
            related: Related::One(related.map(|r| Box::new(r) as Box<dyn Resource + 'a>)),
        }
    }

    pub fn to_many<T, I>(name: &'a str, related: I) -> Self
    where
        T: Resource + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        Self {
            name,
            related: Related::Many(
                related
                    .into_iter()
                    .map(|r| Box::new(r) as Box<dyn Resource + 'a>)
                    .collect(),
            ),
        }
    }
}

/// A model that can be marshaled into a resource node.
///
/// `resource_type` and `primary_key` play the role of the `primary` field;
/// `client_id` of the `client-id` field. Attributes and relationships are
/// visited in the order returned.
pub trait Resource {
    fn resource_type(&self) -> &str;

    fn primary_key(&self) -> PrimaryKey;

    fn client_id(&self) -> Option<&str> {
        None
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        Vec::new()
    }

    fn relationships(&self) -> Vec<RelationField<'_>> {
        Vec::new()
    }
}

impl<T: Resource + ?Sized> Resource for &T {
    fn resource_type(&self) -> &str {
        (**self).resource_type()
    }

    fn primary_key(&self) -> PrimaryKey {
        (**self).primary_key()
    }

    fn client_id(&self) -> Option<&str> {
        (**self).client_id()
    }

    fn attributes(&self) -> Vec<Attribute<'_>> {
        (**self).attributes()
    }

    fn relationships(&self) -> Vec<RelationField<'_>> {
        (**self).relationships()
    }
}
