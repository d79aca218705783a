//! Update coordinator.
//! Refreshes the TalentMonitor client and reports every failure the same way.

use crate::integration::talentmonitor::{self, Entity};

#[derive(Debug, thiserror::Error)]
#[error("Error communicating with API: {0}")]
pub struct UpdateFailed(#[from] talentmonitor::Error);

pub struct Coordinator {
    client: talentmonitor::Client,
    last_update_success: bool,
}

impl Coordinator {
    pub fn new(client: talentmonitor::Client) -> Self {
        Coordinator {
            client,
            last_update_success: false,
        }
    }

    /// Fetch the latest data. On failure the previously fetched entities are kept.
    pub async fn refresh(&mut self) -> Result<(), UpdateFailed> {
        let result = self.client.fetch_data().await.map_err(UpdateFailed::from);
        self.last_update_success = result.is_ok();
        if let Err(e) = &result {
            log::warn!("{e}");
        }
        result
    }

    /// Outcome of the last refresh. False until the first refresh succeeds.
    pub fn last_update_success(&self) -> bool {
        self.last_update_success
    }

    pub fn get_power_stations(&self) -> Vec<Entity> {
        self.client.get_power_stations()
    }

    pub fn get_inverters(&self) -> Vec<Entity> {
        self.client.get_inverters()
    }

    /// Every known entity, power stations first.
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities = self.get_power_stations();
        entities.extend(self.get_inverters());
        entities
    }

    pub fn logout(&mut self) {
        self.client.logout();
    }
}
