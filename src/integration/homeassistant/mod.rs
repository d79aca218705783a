//! Home Assistant Integration Module
//! Sensors are published through the Home Assistant REST states API.
mod client;
mod error;
mod http_client;
mod schemas;

pub use client::Client;
pub use error::{Error, Result};
pub use schemas::SensorState;
