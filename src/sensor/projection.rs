//! Projection of entity data onto sensors.
//!
//! Most keys `K` come with a formatted sibling `KNamed` such as `"5.00 kWh"`. When present,
//! the value and unit are taken from it; otherwise the raw value at `K` is used with the
//! default unit of the catalog.
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::fmt;

use super::catalog::{SensorDescription, Unit, lookup};
use crate::integration::talentmonitor::{Entity, EntityData};

/// Per-panel readings of an inverter.
pub const PANELS_KEY: &str = "pv";
/// Per-phase AC readings of an inverter.
pub const PHASES_KEY: &str = "phase";

static PANEL_COUNT_KEY: &str = "pvCount";
static PHASE_COUNT_KEY: &str = "acPhaseCount";
static PHASE_NAMES_KEY: &str = "acPhaseExpress";
static NAMED_SUFFIX: &str = "Named";
static TIMESTAMP_KEY: &str = "lastDataUpdateTime";

/// Value of a sensor as exposed to Home Assistant.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// Value token of a formatted "value unit" field.
    Text(String),
    /// Raw value of the data document.
    Json(Value),
    Timestamp(DateTime<FixedOffset>),
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Text(text) => f.write_str(text),
            NativeValue::Json(Value::String(text)) => f.write_str(text),
            NativeValue::Json(value) => write!(f, "{value}"),
            NativeValue::Timestamp(timestamp) => f.write_str(&timestamp.to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub value: Option<NativeValue>,
    pub unit: Option<Unit>,
}

/// Resolve the value and unit of `description` in `data`.
pub fn resolve(data: &EntityData, description: &SensorDescription) -> Projection {
    let key = description.key;
    if key == TIMESTAMP_KEY {
        return Projection {
            value: data
                .get_str(key)
                .and_then(parse_timestamp)
                .map(NativeValue::Timestamp),
            unit: description.unit,
        };
    }
    match named_value(data, key) {
        Some((value, unit)) => Projection {
            value: Some(NativeValue::Text(value)),
            unit: Some(unit),
        },
        None => Projection {
            value: data
                .get(key)
                .filter(|value| !value.is_null())
                .cloned()
                .map(NativeValue::Json),
            unit: description.unit,
        },
    }
}

/// Value and unit of the formatted `<key>Named` field, if usable.
fn named_value(data: &EntityData, key: &str) -> Option<(String, Unit)> {
    let named = data
        .get_str(&format!("{key}{NAMED_SUFFIX}"))
        .filter(|named| !named.is_empty())?;
    let mut tokens = named.split(' ');
    let (Some(value), Some(symbol), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };
    let Some(unit) = Unit::from_symbol(symbol) else {
        log::debug!("Unknown unit '{symbol}' for key {key}");
        return None;
    };
    Some((value.to_string(), unit))
}

/// Parse an ISO-8601 timestamp. Timestamps without offset are taken as UTC.
fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp);
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        });
    match naive {
        Some(naive) => Some(naive.and_utc().fixed_offset()),
        None => {
            log::debug!("Invalid timestamp '{text}'");
            None
        }
    }
}

/// Where the data of a sensor lives within its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSource {
    Entity,
    Panel(usize),
    Phase(usize),
}

/// A sensor discovered on an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDescriptor {
    pub entity_id: String,
    pub description: &'static SensorDescription,
    pub source: SensorSource,
    pub unique_id: String,
    pub translation_key: String,
    /// Display label of the panel or phase.
    pub label: Option<String>,
}

impl SensorDescriptor {
    fn new(entity: &Entity, description: &'static SensorDescription, source: SensorSource) -> Self {
        let key = description.key;
        let (suffix, sub_kind, label) = match source {
            SensorSource::Entity => (key.to_string(), "", None),
            SensorSource::Panel(index) => (
                format!("panel{index}{key}"),
                "_panel",
                Some(format!("Panel {index}")),
            ),
            SensorSource::Phase(index) => (
                format!("phase{index}{key}"),
                "_phase",
                Some(format!("Phase {}", phase_name(entity.data(), index))),
            ),
        };
        SensorDescriptor {
            entity_id: entity.entity_id().to_string(),
            description,
            source,
            unique_id: format!("{}{suffix}", entity.entity_id()),
            translation_key: format!(
                "talentmonitor_{}{sub_kind}_{}",
                entity.kind(),
                description.snake_key()
            ),
            label,
        }
    }

    /// Read the current projection of this sensor from `entity`.
    pub fn read(&self, entity: &Entity) -> Projection {
        let data = match self.source {
            SensorSource::Entity => return resolve(entity.data(), self.description),
            SensorSource::Panel(index) => entity.data().nested(PANELS_KEY, index),
            SensorSource::Phase(index) => entity.data().nested(PHASES_KEY, index),
        };
        data.map(|data| resolve(&data, self.description))
            .unwrap_or_default()
    }

    /// Display name, e.g. `Inverter 1 Phase L1 Voltage`.
    pub fn friendly_name(&self, entity: &Entity) -> String {
        match &self.label {
            Some(label) => format!("{} {label} {}", entity.name(), self.description.name()),
            None => format!("{} {}", entity.name(), self.description.name()),
        }
    }
}

/// Name of a phase from the comma separated phase names, or its index.
fn phase_name(data: &EntityData, index: usize) -> String {
    data.get_str(PHASE_NAMES_KEY)
        .and_then(|names| names.split(',').nth(index))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| index.to_string())
}

/// Discover the sensors of an entity: recognized top-level keys, then panels and phases.
pub fn discover(entity: &Entity) -> Vec<SensorDescriptor> {
    let data = entity.data();
    let mut sensors: Vec<SensorDescriptor> = data
        .keys()
        .filter_map(lookup)
        .map(|description| SensorDescriptor::new(entity, description, SensorSource::Entity))
        .collect();

    // pvCount is reported one too high
    if let Some(count) = data.get_u64(PANEL_COUNT_KEY) {
        let count = count.saturating_sub(1) as usize;
        sensors.extend(discover_indexed(entity, PANELS_KEY, count, SensorSource::Panel));
    }
    if let Some(count) = data.get_u64(PHASE_COUNT_KEY) {
        sensors.extend(discover_indexed(
            entity,
            PHASES_KEY,
            count as usize,
            SensorSource::Phase,
        ));
    }
    sensors
}

fn discover_indexed(
    entity: &Entity,
    key: &str,
    count: usize,
    source: fn(usize) -> SensorSource,
) -> Vec<SensorDescriptor> {
    let len = entity.data().get_list(key).map_or(0, Vec::len);
    (0..count.min(len))
        .filter_map(|index| Some((index, entity.data().nested(key, index)?)))
        .flat_map(|(index, data)| {
            data.keys()
                .filter_map(lookup)
                .map(|description| SensorDescriptor::new(entity, description, source(index)))
                .collect::<Vec<_>>()
        })
        .collect()
}
