//! TalentMonitor Integration Module
//! The integration is done via the TalentMonitor cloud HTTP JSON API.
mod client;
mod entity;
mod error;
mod provider;
mod session;

pub use client::Client;
pub use entity::{DeviceInfo, Entity, EntityData, EntityKind, MANUFACTURER};
pub use error::{Error, Result};
pub use provider::{
    DEFAULT_TIMEZONE, DataProvider, EntitySource, InverterDataProvider, InverterSource,
    PowerStationDataProvider, PowerStationSource,
};
pub use session::{Credentials, DEFAULT_BASE_URL, NO_QUERY, Session};
