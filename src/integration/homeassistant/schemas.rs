//! Home Assistant API Schemas
//! Body of `POST /api/states/<entity_id>`.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorState {
    pub state: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl SensorState {
    pub fn new(state: impl Into<String>) -> Self {
        SensorState {
            state: state.into(),
            attributes: Map::new(),
        }
    }

    /// Add an attribute, skipping absent values.
    pub fn with_attribute(mut self, name: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.attributes.insert(name.to_string(), value.into());
        }
        self
    }
}
