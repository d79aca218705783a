//! Sensor Module
//! Maps the raw data of TalentMonitor entities to individually addressable sensors.
mod catalog;
mod projection;

pub use catalog::{DeviceClass, SENSOR_TYPES, SensorDescription, StateClass, Unit, lookup};
pub use projection::{
    NativeValue, PANELS_KEY, PHASES_KEY, Projection, SensorDescriptor, SensorSource, discover,
    resolve,
};
