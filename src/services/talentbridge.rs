//! Talent Bridge Background Service.
//! This service mirrors the sensors of every TalentMonitor power station and inverter into
//! Home Assistant, refreshing at a fixed scan interval.

use async_lock::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::coordinator::Coordinator;
use crate::integration::homeassistant::{self, SensorState};
use crate::sensor::discover;

pub struct TalentBridgeBackgroundService {
    coordinator: Mutex<Coordinator>,
    homeassistant: Arc<homeassistant::Client>,
    scan_interval: Duration,
    /// Last state published per object id.
    published: Mutex<HashMap<String, SensorState>>,
}

impl TalentBridgeBackgroundService {
    /// Creates a new instance of `TalentBridgeBackgroundService`.
    pub fn new(
        coordinator: Coordinator,
        homeassistant: Arc<homeassistant::Client>,
        scan_interval: Duration,
    ) -> Self {
        TalentBridgeBackgroundService {
            coordinator: Mutex::new(coordinator),
            homeassistant,
            scan_interval,
            published: Mutex::new(HashMap::new()),
        }
    }

    /// Run the background service until `shutdown` is cancelled.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = interval(self.scan_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    match self.sync().await {
                        Ok(count) => log::debug!("Published {count} sensor state(s)"),
                        Err(e) => log::error!("Error syncing TalentMonitor sensors: {e}"),
                    }
                }
            }
        }
    }

    /// Refresh the TalentMonitor data and publish the sensor states that changed.
    /// Returns the number of published states. Nothing is published when the refresh fails.
    pub async fn sync(&self) -> Result<usize, anyhow::Error> {
        let entities = {
            let mut coordinator = self.coordinator.lock().await;
            coordinator.refresh().await?;
            coordinator.entities()
        };

        let mut published = self.published.lock().await;
        let mut count = 0;
        let mut failures = 0;
        for entity in &entities {
            for sensor in discover(entity) {
                let object_id = homeassistant::Client::object_id(&sensor);
                let state = homeassistant::Client::create_sensor_state(entity, &sensor);
                if published.get(&object_id) == Some(&state) {
                    continue;
                }
                match self
                    .homeassistant
                    .set_sensor_state(&object_id, &state)
                    .await
                {
                    Ok(()) => {
                        published.insert(object_id, state);
                        count += 1;
                    }
                    Err(e) => {
                        log::warn!("Cannot publish sensor.{object_id}: {e}");
                        failures += 1;
                    }
                }
            }
        }

        if failures > 0 {
            anyhow::bail!("{failures} sensor state(s) not published");
        }
        Ok(count)
    }

    /// Outcome of the last refresh.
    pub async fn last_update_success(&self) -> bool {
        self.coordinator.lock().await.last_update_success()
    }

    /// Drop the TalentMonitor session.
    pub async fn shutdown(&self) {
        self.coordinator.lock().await.logout();
    }
}
