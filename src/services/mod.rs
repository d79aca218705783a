//! Services Module
pub mod coordinator;
pub mod talentbridge;

pub use coordinator::{Coordinator, UpdateFailed};
pub use talentbridge::TalentBridgeBackgroundService;
