//! TalentMonitor entities.
//! Power stations and inverters share the same shape: a stable identifier, a display name
//! and the schema-less data document returned by the detail endpoint.
use serde_json::{Map, Value};
use strum_macros::Display;

/// Manufacturer reported when the device does not name one.
pub const MANUFACTURER: &str = "TalentMonitor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    #[strum(serialize = "powerstation")]
    PowerStation,
    #[strum(serialize = "inverter")]
    Inverter,
}

/// Data document of an entity.
/// Fields vary per device type and firmware, so values are kept as JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityData(Map<String, Value>);

impl EntityData {
    /// Build the data from a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(EntityData(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Get an unsigned integer, accepting numeric strings as well.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match self.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Data of the `index`-th element of the list stored at `key`, e.g. a single panel.
    pub fn nested(&self, key: &str, index: usize) -> Option<EntityData> {
        self.get_list(key)?
            .get(index)
            .cloned()
            .and_then(EntityData::from_value)
    }
}

impl From<Map<String, Value>> for EntityData {
    fn from(map: Map<String, Value>) -> Self {
        EntityData(map)
    }
}

/// Device metadata exposed alongside the sensors of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub sw_version: Option<String>,
}

/// A monitored device, either a power station or an inverter.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    kind: EntityKind,
    entity_id: String,
    name: String,
    data: EntityData,
}

impl Entity {
    pub fn new(kind: EntityKind, entity_id: impl Into<String>, name: impl Into<String>) -> Self {
        Entity {
            kind,
            entity_id: entity_id.into(),
            name: name.into(),
            data: EntityData::default(),
        }
    }

    /// Entity carrying `data` from the start.
    pub fn with_data(mut self, data: EntityData) -> Self {
        self.data = data;
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }

    /// Replace the whole data document.
    pub(super) fn set_data(&mut self, data: EntityData) {
        self.data = data;
    }

    /// Device metadata. Manufacturer, model, serial and firmware are only reported by inverters.
    pub fn device_info(&self) -> DeviceInfo {
        let mut info = DeviceInfo {
            identifier: self.entity_id.clone(),
            name: self.name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: None,
            serial_number: None,
            sw_version: None,
        };
        if self.kind == EntityKind::Inverter {
            let field = |key: &str| self.data.get_str(key).map(str::to_string);
            if let Some(manufacturer) = field("nameOfManufacturer") {
                info.manufacturer = manufacturer;
            }
            info.model = field("model");
            info.serial_number = field("serialNumber");
            info.sw_version = field("firmwareVersion1");
        }
        info
    }
}
