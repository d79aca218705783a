//! Integration Module
pub mod homeassistant;
pub mod talentmonitor;
