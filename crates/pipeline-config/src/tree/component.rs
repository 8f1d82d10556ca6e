//! Leaf component declarations.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{into_object, take_type, TYPE_FIELD};
use crate::errors::TreeError;
use crate::identifiers::TypeName;

/// A type-tagged declaration without nested structure the mutator cares
/// about: a plain input or output, a processor, a condition, a cache or a
/// rate limit.
///
/// `fields` holds every key of the declaration except `type`. The
/// type-specific payload lives under the key named after the type; any other
/// keys are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    type_name: TypeName,
    fields: Map<String, Value>,
}

impl Component {
    /// Creates a declaration of `type_name` with `payload` as its config.
    pub fn new(type_name: TypeName, payload: Value) -> Self {
        let mut fields = Map::new();
        fields.insert(type_name.to_string(), payload);
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// The type-specific payload, if the declaration has one.
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(self.type_name.as_str())
    }

    /// All keys other than `type`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Decodes a declaration; `declaration` labels errors.
    pub fn from_value(declaration: &'static str, value: Value) -> Result<Self, TreeError> {
        let mut fields = into_object(declaration, value)?;
        let type_name = take_type(declaration, &mut fields)?;
        Ok(Self::from_parts(type_name, fields))
    }

    pub(crate) fn from_parts(type_name: TypeName, fields: Map<String, Value>) -> Self {
        Self { type_name, fields }
    }

    pub(crate) fn into_parts(self) -> (TypeName, Map<String, Value>) {
        (self.type_name, self.fields)
    }

    /// Encodes the declaration back to its JSON object form.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.fields.len() + 1);
        map.insert(TYPE_FIELD.to_string(), Value::String(self.type_name.to_string()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(TYPE_FIELD, &self.type_name)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Component::from_value("component", value).map_err(D::Error::custom)
    }
}
