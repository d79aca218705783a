//! Catalog of the recognized TalentMonitor measurement keys.
use regex::Regex;
use std::sync::LazyLock;
use strum_macros::{Display, EnumString};

static CAMEL_CASE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("invalid camel case regex"));

/// Home Assistant sensor device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeviceClass {
    Power,
    Energy,
    Timestamp,
    Temperature,
    Current,
    Voltage,
    Frequency,
}

/// Home Assistant sensor state class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum StateClass {
    Measurement,
    TotalIncreasing,
}

/// Unit of measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum Unit {
    #[strum(serialize = "Wh")]
    WattHour,
    #[strum(serialize = "kWh")]
    KiloWattHour,
    #[strum(serialize = "W")]
    Watt,
    #[strum(serialize = "kW")]
    KiloWatt,
    #[strum(serialize = "°C")]
    Celsius,
    #[strum(serialize = "A")]
    Ampere,
    #[strum(serialize = "V")]
    Volt,
    #[strum(serialize = "Hz")]
    Hertz,
}

impl Unit {
    /// Unit of a symbol used in the formatted "value unit" fields of the API.
    /// Only power and energy symbols are recognized there.
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        match symbol.parse::<Unit>() {
            Ok(unit @ (Unit::WattHour | Unit::KiloWattHour | Unit::Watt | Unit::KiloWatt)) => {
                Some(unit)
            }
            _ => None,
        }
    }
}

/// Expected measurement for a raw data key.
#[derive(Debug, PartialEq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub device_class: DeviceClass,
    pub state_class: Option<StateClass>,
    pub unit: Option<Unit>,
}

impl SensorDescription {
    const fn new(
        key: &'static str,
        device_class: DeviceClass,
        state_class: Option<StateClass>,
        unit: Option<Unit>,
    ) -> Self {
        SensorDescription {
            key,
            device_class,
            state_class,
            unit,
        }
    }

    /// Key in snake case, e.g. `total_active_power`.
    pub fn snake_key(&self) -> String {
        CAMEL_CASE_BOUNDARY
            .replace_all(self.key, "${1}_${2}")
            .to_lowercase()
    }

    /// Human readable name, e.g. `Total Active Power`.
    pub fn name(&self) -> String {
        self.snake_key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

use DeviceClass as D;
use StateClass::{Measurement, TotalIncreasing};

pub static SENSOR_TYPES: &[SensorDescription] = &[
    SensorDescription::new("totalActivePower", D::Power, Some(Measurement), None),
    SensorDescription::new("ratedPower", D::Power, Some(Measurement), None),
    SensorDescription::new("dayEnergy", D::Energy, Some(TotalIncreasing), None),
    SensorDescription::new("monthEnergy", D::Energy, Some(TotalIncreasing), None),
    SensorDescription::new("yearEnergy", D::Energy, Some(TotalIncreasing), None),
    SensorDescription::new("lastDataUpdateTime", D::Timestamp, None, None),
    SensorDescription::new(
        "inverterTemp",
        D::Temperature,
        Some(Measurement),
        Some(Unit::Celsius),
    ),
    SensorDescription::new("activePower", D::Power, Some(Measurement), None),
    SensorDescription::new("power", D::Power, Some(Measurement), None),
    SensorDescription::new("current", D::Current, Some(Measurement), Some(Unit::Ampere)),
    SensorDescription::new("voltage", D::Voltage, Some(Measurement), Some(Unit::Volt)),
    SensorDescription::new(
        "frequency",
        D::Frequency,
        Some(Measurement),
        Some(Unit::Hertz),
    ),
];

/// Description of a recognized key.
pub fn lookup(key: &str) -> Option<&'static SensorDescription> {
    SENSOR_TYPES.iter().find(|description| description.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("totalActivePower", "total_active_power", "Total Active Power")]
    #[case("inverterTemp", "inverter_temp", "Inverter Temp")]
    #[case("power", "power", "Power")]
    #[case("lastDataUpdateTime", "last_data_update_time", "Last Data Update Time")]
    fn test_key_names(#[case] key: &str, #[case] snake: &str, #[case] name: &str) {
        let description = lookup(key).expect("key not in catalog");
        assert_eq!(description.snake_key(), snake);
        assert_eq!(description.name(), name);
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert!(lookup("powerStationGuid").is_none());
        assert!(lookup("dayEnergyNamed").is_none());
    }

    #[test]
    fn test_catalog_classes() {
        let day_energy = lookup("dayEnergy").unwrap();
        assert_eq!(day_energy.device_class, DeviceClass::Energy);
        assert_eq!(day_energy.state_class, Some(StateClass::TotalIncreasing));
        assert_eq!(day_energy.unit, None);

        let temperature = lookup("inverterTemp").unwrap();
        assert_eq!(temperature.unit, Some(Unit::Celsius));
    }

    #[rstest]
    #[case("Wh", Some(Unit::WattHour))]
    #[case("kWh", Some(Unit::KiloWattHour))]
    #[case("kW", Some(Unit::KiloWatt))]
    #[case("W", Some(Unit::Watt))]
    #[case("MWh", None)]
    #[case("kwh", None)]
    #[case("°C", None)]
    #[case("V", None)]
    fn test_unit_from_symbol(#[case] symbol: &str, #[case] expected: Option<Unit>) {
        assert_eq!(Unit::from_symbol(symbol), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceClass::Power.to_string(), "power");
        assert_eq!(StateClass::TotalIncreasing.to_string(), "total_increasing");
        assert_eq!(Unit::KiloWattHour.to_string(), "kWh");
        assert_eq!(Unit::Celsius.to_string(), "°C");
    }
}
