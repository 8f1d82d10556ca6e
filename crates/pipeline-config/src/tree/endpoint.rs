//! Input and output slots, and the broker that lets a slot hold several
//! endpoints.

use std::marker::PhantomData;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{declaration_value, into_object, take_type, Component, TYPE_FIELD};
use crate::errors::TreeError;
use crate::identifiers::TypeName;
use crate::types::{BrokerPattern, ComponentCategory, BROKER_TYPE};

const COPIES_FIELD: &str = "copies";
const PATTERN_FIELD: &str = "pattern";

// ---------------------------------------------------------------------------
// Slot markers
// ---------------------------------------------------------------------------

/// Distinguishes the input slot from the output slot at the type level.
///
/// Input and output brokers share their structure but differ in the name of
/// the child list and in their default routing.
pub trait Slot: std::fmt::Debug + Clone + Copy + PartialEq + Default + 'static {
    /// Category of every endpoint held by this slot.
    const CATEGORY: ComponentCategory;
    /// Field of the broker payload listing nested endpoints.
    const ENDPOINTS_FIELD: &'static str;
    /// Pattern given to newly created brokers.
    const DEFAULT_PATTERN: Option<BrokerPattern>;
}

/// Marker for the input slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSlot;

impl Slot for InputSlot {
    const CATEGORY: ComponentCategory = ComponentCategory::Input;
    const ENDPOINTS_FIELD: &'static str = "inputs";
    const DEFAULT_PATTERN: Option<BrokerPattern> = None;
}

/// Marker for the output slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputSlot;

impl Slot for OutputSlot {
    const CATEGORY: ComponentCategory = ComponentCategory::Output;
    const ENDPOINTS_FIELD: &'static str = "outputs";
    const DEFAULT_PATTERN: Option<BrokerPattern> = Some(BrokerPattern::FanOut);
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// The content of an input or output slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint<S: Slot> {
    /// Several endpoints combined into one.
    Broker(Broker<S>),
    /// A single endpoint.
    Component(Component),
}

impl<S: Slot> Endpoint<S> {
    /// The declared type name (`"broker"` for brokers).
    pub fn type_name(&self) -> &str {
        match self {
            Endpoint::Broker(_) => BROKER_TYPE,
            Endpoint::Component(component) => component.type_name().as_str(),
        }
    }

    pub fn is_broker(&self) -> bool {
        matches!(self, Endpoint::Broker(_))
    }

    /// Decodes an endpoint declaration, recursing into broker children.
    pub fn from_value(value: Value) -> Result<Self, TreeError> {
        let declaration = S::CATEGORY.as_str();
        let mut fields = into_object(declaration, value)?;
        let type_name = take_type(declaration, &mut fields)?;
        Self::from_parts(type_name, fields)
    }

    fn from_parts(type_name: TypeName, fields: Map<String, Value>) -> Result<Self, TreeError> {
        if type_name.as_str() == BROKER_TYPE {
            Broker::from_fields(fields).map(Endpoint::Broker)
        } else {
            Ok(Endpoint::Component(Component::from_parts(type_name, fields)))
        }
    }

    /// Re-decodes a `broker`-typed [`Endpoint::Component`] into a
    /// [`Broker`]. Leaves every other endpoint alone.
    pub fn normalize(&mut self) -> Result<(), TreeError> {
        let Endpoint::Component(component) = self else {
            return Ok(());
        };
        if component.type_name().as_str() != BROKER_TYPE {
            return Ok(());
        }
        let decoded = Self::try_from(component.clone())?;
        *self = decoded;
        Ok(())
    }

    /// Builds a fresh endpoint of `type_name` from a default payload.
    pub(crate) fn from_default(type_name: &TypeName, payload: Value) -> Result<Self, TreeError> {
        Self::from_value(declaration_value(type_name, payload))
    }

    pub fn to_value(&self) -> Value {
        match self {
            Endpoint::Broker(broker) => broker.to_value(),
            Endpoint::Component(component) => component.to_value(),
        }
    }
}

/// Routes a `broker` declaration through [`Broker`], so a slot's type name
/// and its variant always agree.
impl<S: Slot> TryFrom<Component> for Endpoint<S> {
    type Error = TreeError;

    fn try_from(component: Component) -> Result<Self, Self::Error> {
        let (type_name, fields) = component.into_parts();
        Self::from_parts(type_name, fields)
    }
}

impl<S: Slot> Serialize for Endpoint<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de, S: Slot> Deserialize<'de> for Endpoint<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Endpoint::from_value(value).map_err(D::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Broker
// ---------------------------------------------------------------------------

/// A fan-in (inputs) or fan-out (outputs) combination of endpoints.
///
/// Nested endpoints keep the order they were added in; the broker only ever
/// grows through [`Broker::push`].
#[derive(Debug, Clone, PartialEq)]
pub struct Broker<S: Slot> {
    /// How many parallel copies of each nested endpoint to run. `None` when
    /// a stored broker leaves it unset.
    pub copies: Option<u64>,
    /// Routing between outputs; input brokers normally carry none.
    pub pattern: Option<BrokerPattern>,
    endpoints: Vec<Endpoint<S>>,
    /// Broker payload keys this model does not interpret (batching, ...).
    settings: Map<String, Value>,
    /// Declaration keys next to `type` and `broker`.
    siblings: Map<String, Value>,
    _slot: PhantomData<S>,
}

impl<S: Slot> Default for Broker<S> {
    fn default() -> Self {
        Self {
            copies: Some(1),
            pattern: S::DEFAULT_PATTERN,
            endpoints: Vec::new(),
            settings: Map::new(),
            siblings: Map::new(),
            _slot: PhantomData,
        }
    }
}

impl<S: Slot> Broker<S> {
    /// Creates a broker with default settings and no endpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default broker whose only endpoint is `first`.
    pub fn wrapping(first: Endpoint<S>) -> Self {
        let mut broker = Self::new();
        broker.endpoints.push(first);
        broker
    }

    /// Nested endpoints in the order they were added.
    pub fn endpoints(&self) -> &[Endpoint<S>] {
        &self.endpoints
    }

    /// Appends `endpoint` after the existing ones and returns its position.
    pub fn push(&mut self, endpoint: Endpoint<S>) -> usize {
        self.endpoints.push(endpoint);
        self.endpoints.len() - 1
    }

    fn from_fields(mut siblings: Map<String, Value>) -> Result<Self, TreeError> {
        let declaration = S::CATEGORY.as_str();
        let mut settings = match siblings.remove(BROKER_TYPE) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(TreeError::invalid_field(declaration, BROKER_TYPE, "an object")),
        };

        let copies = match settings.remove(COPIES_FIELD) {
            None => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .ok_or_else(|| TreeError::invalid_field(declaration, COPIES_FIELD, "a non-negative integer"))?,
            ),
        };

        let pattern = match settings.remove(PATTERN_FIELD) {
            None => None,
            Some(value) => Some(
                serde_json::from_value(value)
                    .map_err(|_| TreeError::invalid_field(declaration, PATTERN_FIELD, "a broker pattern"))?,
            ),
        };

        let endpoints = match settings.remove(S::ENDPOINTS_FIELD) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(Endpoint::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(TreeError::invalid_field(declaration, S::ENDPOINTS_FIELD, "an array"))
            }
        };

        Ok(Self {
            copies,
            pattern,
            endpoints,
            settings,
            siblings,
            _slot: PhantomData,
        })
    }

    fn to_value(&self) -> Value {
        let mut payload = Map::new();
        if let Some(copies) = self.copies {
            payload.insert(COPIES_FIELD.to_string(), Value::from(copies));
        }
        if let Some(pattern) = self.pattern {
            // Unit variants always encode as strings.
            if let Ok(value) = serde_json::to_value(pattern) {
                payload.insert(PATTERN_FIELD.to_string(), value);
            }
        }
        payload.insert(
            S::ENDPOINTS_FIELD.to_string(),
            Value::Array(self.endpoints.iter().map(Endpoint::to_value).collect()),
        );
        for (key, value) in &self.settings {
            payload.insert(key.clone(), value.clone());
        }

        let mut declaration = Map::new();
        declaration.insert(TYPE_FIELD.to_string(), Value::String(BROKER_TYPE.to_string()));
        declaration.insert(BROKER_TYPE.to_string(), Value::Object(payload));
        for (key, value) in &self.siblings {
            declaration.insert(key.clone(), value.clone());
        }
        Value::Object(declaration)
    }
}
