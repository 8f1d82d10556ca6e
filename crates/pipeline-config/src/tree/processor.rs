//! Pipeline processor declarations.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{declaration_value, into_object, take_type, Component, TYPE_FIELD};
use crate::errors::TreeError;
use crate::identifiers::TypeName;
use crate::types::FILTER_PARTS_TYPE;

const DECLARATION: &str = "processor";

/// One step of the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Processor {
    /// A processor that drops message parts failing an embedded condition.
    FilterParts(FilterParts),
    /// Any other processor.
    Component(Component),
}

impl Processor {
    pub fn type_name(&self) -> &str {
        match self {
            Processor::FilterParts(_) => FILTER_PARTS_TYPE,
            Processor::Component(component) => component.type_name().as_str(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        let mut fields = into_object(DECLARATION, value)?;
        let type_name = take_type(DECLARATION, &mut fields)?;
        Self::from_parts(type_name, fields)
    }

    fn from_parts(type_name: TypeName, fields: Map<String, Value>) -> Result<Self, TreeError> {
        if type_name.as_str() == FILTER_PARTS_TYPE {
            FilterParts::from_fields(fields).map(Processor::FilterParts)
        } else {
            Ok(Processor::Component(Component::from_parts(type_name, fields)))
        }
    }

    /// Builds a fresh processor of `type_name` from a default payload.
    pub(crate) fn from_default(type_name: &TypeName, payload: Value) -> Result<Self, TreeError> {
        Self::from_value(declaration_value(type_name, payload))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Processor::FilterParts(filter) => filter.to_value(),
            Processor::Component(component) => component.to_value(),
        }
    }
}

/// Routes a `filter_parts` declaration through [`FilterParts`], so its
/// condition is checked.
impl TryFrom<Component> for Processor {
    type Error = TreeError;

    fn try_from(component: Component) -> Result<Self, Self::Error> {
        let (type_name, fields) = component.into_parts();
        Self::from_parts(type_name, fields)
    }
}

impl Serialize for Processor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Processor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Processor::from_value(value).map_err(D::Error::custom)
    }
}

/// A `filter_parts` processor. Its payload is a condition declaration, which
/// is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParts {
    condition: Component,
    siblings: Map<String, Value>,
}

impl FilterParts {
    pub fn new(condition: Component) -> Self {
        Self {
            condition,
            siblings: Map::new(),
        }
    }

    pub fn condition(&self) -> &Component {
        &self.condition
    }

    fn from_fields(mut siblings: Map<String, Value>) -> Result<Self, TreeError> {
        let payload = siblings.remove(FILTER_PARTS_TYPE).ok_or_else(|| {
            TreeError::invalid_field(DECLARATION, FILTER_PARTS_TYPE, "a condition declaration")
        })?;
        let condition = Component::from_value("condition", payload)?;
        Ok(Self {
            condition,
            siblings,
        })
    }

    fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.siblings.len() + 2);
        map.insert(TYPE_FIELD.to_string(), Value::String(FILTER_PARTS_TYPE.to_string()));
        map.insert(FILTER_PARTS_TYPE.to_string(), self.condition.to_value());
        for (key, value) in &self.siblings {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_parts_decodes_embedded_condition() {
        let raw = json!({
            "type": "filter_parts",
            "filter_parts": { "type": "text", "text": { "operator": "contains", "arg": "x" } }
        });

        let processor = Processor::from_value(raw.clone()).unwrap();

        let Processor::FilterParts(filter) = &processor else {
            panic!("expected filter_parts");
        };
        assert_eq!(filter.condition().type_name().as_str(), "text");
        assert_eq!(processor.to_value(), raw);
    }

    #[test]
    fn test_filter_parts_without_condition_is_rejected() {
        assert_eq!(
            Processor::from_value(json!({ "type": "filter_parts" })),
            Err(TreeError::invalid_field(
                "processor",
                "filter_parts",
                "a condition declaration"
            ))
        );
        assert_eq!(
            Processor::from_value(json!({ "type": "filter_parts", "filter_parts": {} })),
            Err(TreeError::MissingType { declaration: "condition" })
        );
    }

    #[test]
    fn test_filter_parts_component_is_checked_on_conversion() {
        let condition = Component::from_value("condition", json!({ "type": "text" })).unwrap();
        let wrapped = Component::new(
            TypeName::new(FILTER_PARTS_TYPE).unwrap(),
            condition.to_value(),
        );
        let empty = Component::from_value("processor", json!({ "type": "filter_parts" })).unwrap();

        assert_eq!(
            Processor::try_from(wrapped),
            Ok(Processor::FilterParts(FilterParts::new(condition)))
        );
        assert!(Processor::try_from(empty).is_err());
    }

    #[test]
    fn test_other_processors_stay_opaque() {
        let processor = Processor::from_value(json!({
            "type": "sleep",
            "sleep": { "duration": "100ms" }
        }))
        .unwrap();
        assert_eq!(processor.type_name(), "sleep");
        assert!(matches!(processor, Processor::Component(_)));
    }
}
