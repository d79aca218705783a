//! Entity registries.
//! A data provider lists the devices of one kind, fetches the details of every listed
//! device and merges them into a registry that keeps the order of first discovery.
use serde_json::Value;
use std::collections::HashMap;

use super::Result;
use super::entity::{Entity, EntityData, EntityKind};
use super::session::{NO_QUERY, Session};

/// Timezone offset sent with power station detail requests.
pub const DEFAULT_TIMEZONE: &str = "+02:00";

/// Describes where and how the entities of one kind are fetched.
pub trait EntitySource {
    fn kind(&self) -> EntityKind;
    fn list_endpoint(&self) -> &'static str;
    fn detail_endpoint(&self) -> &'static str;
    /// Field of a listing row holding the stable identifier.
    fn id_field(&self) -> &'static str;
    /// Display name for a listing row; `position` is 1-based.
    fn name(&self, row: &Value, id: &str, position: usize) -> String;
    fn detail_query(&self, id: &str) -> Vec<(&'static str, String)>;
}

pub struct PowerStationSource {
    timezone: String,
}

impl PowerStationSource {
    pub fn new(timezone: impl Into<String>) -> Self {
        PowerStationSource {
            timezone: timezone.into(),
        }
    }
}

impl Default for PowerStationSource {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl EntitySource for PowerStationSource {
    fn kind(&self) -> EntityKind {
        EntityKind::PowerStation
    }

    fn list_endpoint(&self) -> &'static str {
        "system/station/list"
    }

    fn detail_endpoint(&self) -> &'static str {
        "system/station/getPowerStationByGuid"
    }

    fn id_field(&self) -> &'static str {
        "powerStationGuid"
    }

    fn name(&self, row: &Value, id: &str, _position: usize) -> String {
        row.get("stationName")
            .and_then(Value::as_str)
            .unwrap_or(id)
            .to_string()
    }

    fn detail_query(&self, id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("powerStationGuid", id.to_string()),
            ("timezone", self.timezone.clone()),
        ]
    }
}

#[derive(Default)]
pub struct InverterSource;

impl EntitySource for InverterSource {
    fn kind(&self) -> EntityKind {
        EntityKind::Inverter
    }

    fn list_endpoint(&self) -> &'static str {
        "tools/device/selectDeviceInverter"
    }

    fn detail_endpoint(&self) -> &'static str {
        "tools/device/selectDeviceInverterInfo"
    }

    fn id_field(&self) -> &'static str {
        "deviceGuid"
    }

    // TODO: use the device name once the inverter listing exposes a reliable one
    fn name(&self, _row: &Value, _id: &str, position: usize) -> String {
        format!("Inverter {position}")
    }

    fn detail_query(&self, id: &str) -> Vec<(&'static str, String)> {
        vec![("deviceGuid", id.to_string())]
    }
}

pub type PowerStationDataProvider = DataProvider<PowerStationSource>;
pub type InverterDataProvider = DataProvider<InverterSource>;

/// Registry of the entities of one kind.
/// Entities are never removed: a device missing from a listing keeps its last known data.
pub struct DataProvider<S: EntitySource> {
    source: S,
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl<S: EntitySource> DataProvider<S> {
    pub fn new(source: S) -> Self {
        DataProvider {
            source,
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Snapshot of the known entities in order of first discovery.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    pub fn get(&self, entity_id: &str) -> Option<&Entity> {
        self.index.get(entity_id).map(|&i| &self.entities[i])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Fetch the listing and the details of every listed entity.
    /// Missing or failed responses keep the previous state; only fatal errors are returned.
    pub async fn fetch_data(&mut self, session: &mut Session) -> Result<()> {
        let kind = self.source.kind();
        let listing = session
            .get_data(self.source.list_endpoint(), NO_QUERY)
            .await?;
        let Some(rows) = listing
            .as_ref()
            .and_then(|l| l.get("rows"))
            .and_then(Value::as_array)
        else {
            log::warn!("No {kind} listing available");
            return Ok(());
        };

        for (position, row) in rows.iter().enumerate() {
            let Some(id) = Self::extract_id(row, self.source.id_field()) else {
                log::debug!("Skipping {kind} row without {}", self.source.id_field());
                continue;
            };
            log::debug!("Data for {kind} GUID {id}: {row}");

            let name = self.source.name(row, &id, position + 1);
            let index = self.upsert(&id, name);

            let detail = session
                .get_data(self.source.detail_endpoint(), &self.source.detail_query(&id))
                .await?;
            log::debug!("Details for {kind} GUID {id}: {detail:?}");

            match detail.and_then(Self::extract_data) {
                Some(data) => self.entities[index].set_data(data),
                None => log::warn!("No details available for {kind} GUID {id}"),
            }
        }
        Ok(())
    }

    /// Index of the entity with `id`, created if not known yet.
    fn upsert(&mut self, id: &str, name: String) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }
        let index = self.entities.len();
        self.entities.push(Entity::new(self.source.kind(), id, name));
        self.index.insert(id.to_string(), index);
        index
    }

    fn extract_id(row: &Value, field: &str) -> Option<String> {
        match row.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn extract_data(mut detail: Value) -> Option<EntityData> {
        detail
            .get_mut("data")
            .map(Value::take)
            .and_then(EntityData::from_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({"deviceGuid": "abc"}), Some("abc"))]
    #[case(json!({"deviceGuid": 1234}), Some("1234"))]
    #[case(json!({"deviceGuid": ""}), None)]
    #[case(json!({"deviceGuid": null}), None)]
    #[case(json!({"powerStationGuid": "abc"}), None)]
    fn test_extract_id(#[case] row: Value, #[case] expected: Option<&str>) {
        assert_eq!(
            InverterDataProvider::extract_id(&row, "deviceGuid").as_deref(),
            expected
        );
    }

    #[test]
    fn test_extract_data() {
        let detail = json!({"code": 200, "data": {"dayEnergy": 5}});
        let data = InverterDataProvider::extract_data(detail).expect("data expected");
        assert_eq!(data.get("dayEnergy"), Some(&json!(5)));

        assert!(InverterDataProvider::extract_data(json!({"code": 500})).is_none());
        assert!(InverterDataProvider::extract_data(json!({"data": null})).is_none());
    }

    #[test]
    fn test_power_station_name() {
        let source = PowerStationSource::default();
        assert_eq!(
            source.name(&json!({"stationName": "Home"}), "guid", 1),
            "Home"
        );
        assert_eq!(source.name(&json!({}), "guid", 1), "guid");
    }

    #[test]
    fn test_inverter_name_uses_position() {
        assert_eq!(InverterSource.name(&json!({}), "guid", 2), "Inverter 2");
    }

    #[test]
    fn test_power_station_detail_query() {
        let source = PowerStationSource::new("+01:00");
        assert_eq!(
            source.detail_query("guid"),
            vec![
                ("powerStationGuid", "guid".to_string()),
                ("timezone", "+01:00".to_string())
            ]
        );
    }

    #[test]
    fn test_upsert_keeps_first_entity() {
        let mut provider = InverterDataProvider::new(InverterSource);

        let first = provider.upsert("a", "Inverter 1".into());
        let second = provider.upsert("b", "Inverter 2".into());
        let again = provider.upsert("a", "Inverter 3".into());

        assert_eq!((first, second, again), (0, 1, 0));
        assert_eq!(provider.len(), 2);
        assert_eq!(provider.get("a").map(Entity::name), Some("Inverter 1"));
        let ids: Vec<_> = provider
            .entities()
            .iter()
            .map(|e| e.entity_id().to_string())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }
}
