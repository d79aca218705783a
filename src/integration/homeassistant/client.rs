//! Home Assistant Client.
//! This client is the higher level API client for Home Assistant.

use super::Result;
use super::http_client::HttpClient;
use super::schemas::SensorState;
use crate::integration::talentmonitor::Entity;
use crate::sensor::SensorDescriptor;
use reqwest::Url;

static OBJECT_ID_PREFIX: &str = "talentmonitor_";
static UNKNOWN_STATE: &str = "unknown";

pub struct Client {
    http: HttpClient,
}

impl Client {
    /// Creates a new instance of `Client` on top of a shared HTTP client.
    pub fn new(http: reqwest::Client, url: Url, token: String) -> Self {
        Client {
            http: HttpClient::new(http, url, token),
        }
    }

    /// Set the state of `sensor.<object_id>`.
    pub async fn set_sensor_state(&self, object_id: &str, state: &SensorState) -> Result<()> {
        self.http
            .post_state(&format!("sensor.{object_id}"), state)
            .await
    }

    /// Object id of a sensor: its unique id in lowercase with every other character
    /// than ASCII letters and digits replaced by `_`.
    pub fn object_id(sensor: &SensorDescriptor) -> String {
        let sanitized: String = sensor
            .unique_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{OBJECT_ID_PREFIX}{sanitized}")
    }

    /// Create the state of a sensor from the current data of its entity.
    pub fn create_sensor_state(entity: &Entity, sensor: &SensorDescriptor) -> SensorState {
        let projection = sensor.read(entity);
        let description = sensor.description;
        let device = entity.device_info();
        let state = projection
            .value
            .map(|value| value.to_string())
            .unwrap_or_else(|| UNKNOWN_STATE.to_string());

        SensorState::new(state)
            .with_attribute("friendly_name", Some(sensor.friendly_name(entity)))
            .with_attribute("unique_id", Some(sensor.unique_id.clone()))
            .with_attribute("device_class", Some(description.device_class.to_string()))
            .with_attribute(
                "state_class",
                description.state_class.map(|c| c.to_string()),
            )
            .with_attribute(
                "unit_of_measurement",
                projection.unit.map(|u| u.to_string()),
            )
            .with_attribute("device_name", Some(device.name))
            .with_attribute("manufacturer", Some(device.manufacturer))
            .with_attribute("model", device.model)
            .with_attribute("serial_number", device.serial_number)
            .with_attribute("sw_version", device.sw_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::talentmonitor::{EntityData, EntityKind};
    use crate::sensor::discover;
    use serde_json::{Value, json};

    fn inverter(data: Value) -> Entity {
        Entity::new(EntityKind::Inverter, "A1-b2", "Inverter 1")
            .with_data(EntityData::from_value(data).unwrap())
    }

    #[tokio::test]
    async fn test_new() {
        let url = Url::parse("http://localhost:8123").unwrap();
        Client::new(reqwest::Client::new(), url, String::from("test_token"));
    }

    #[test]
    fn test_object_id() {
        let entity = inverter(json!({"pvCount": 2, "pv": [{"voltage": 30}]}));
        let sensors = discover(&entity);

        assert_eq!(
            Client::object_id(&sensors[0]),
            "talentmonitor_a1_b2panel0voltage"
        );
    }

    #[test]
    fn test_create_sensor_state() {
        let entity = inverter(json!({
            "dayEnergy": 5,
            "dayEnergyNamed": "5.00 kWh",
            "nameOfManufacturer": "TSUN",
            "model": "TSOL-MS800"
        }));
        let sensors = discover(&entity);

        let state = Client::create_sensor_state(&entity, &sensors[0]);

        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "state": "5.00",
                "attributes": {
                    "friendly_name": "Inverter 1 Day Energy",
                    "unique_id": "A1-b2dayEnergy",
                    "device_class": "energy",
                    "state_class": "total_increasing",
                    "unit_of_measurement": "kWh",
                    "device_name": "Inverter 1",
                    "manufacturer": "TSUN",
                    "model": "TSOL-MS800"
                }
            })
        );
    }

    #[test]
    fn test_create_sensor_state_without_value() {
        let entity = inverter(json!({"lastDataUpdateTime": "not a date"}));
        let sensors = discover(&entity);

        let state = Client::create_sensor_state(&entity, &sensors[0]);

        assert_eq!(state.state, "unknown");
        assert_eq!(state.attributes.get("device_class"), Some(&json!("timestamp")));
        assert!(!state.attributes.contains_key("state_class"));
        assert!(!state.attributes.contains_key("unit_of_measurement"));
    }
}
