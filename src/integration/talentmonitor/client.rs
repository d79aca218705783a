//! TalentMonitor Client.
//! This client is the higher level API client for TalentMonitor: it owns the session and
//! the power station and inverter registries.
use reqwest::Url;

use super::Result;
use super::entity::Entity;
use super::provider::{
    InverterDataProvider, InverterSource, PowerStationDataProvider, PowerStationSource,
};
use super::session::{Credentials, Session};

pub struct Client {
    session: Session,
    inverters: InverterDataProvider,
    power_stations: PowerStationDataProvider,
}

impl Client {
    /// Creates a new instance of `Client` on top of a shared HTTP client.
    pub fn new(http: reqwest::Client, url: Url, credentials: Credentials) -> Self {
        Self::with_timezone(http, url, credentials, PowerStationSource::default())
    }

    /// Creates a new instance of `Client` sending power station requests for another timezone.
    pub fn with_timezone(
        http: reqwest::Client,
        url: Url,
        credentials: Credentials,
        power_station_source: PowerStationSource,
    ) -> Self {
        Client {
            session: Session::new(http, url, credentials),
            inverters: InverterDataProvider::new(InverterSource),
            power_stations: PowerStationDataProvider::new(power_station_source),
        }
    }

    /// Login to TalentMonitor.
    pub async fn login(&mut self) -> Result<()> {
        self.session.login().await
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Forget the session token.
    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Fetch inverters then power stations.
    /// Unavailable data keeps the previous state; authentication and transport errors are returned.
    pub async fn fetch_data(&mut self) -> Result<()> {
        self.inverters.fetch_data(&mut self.session).await?;
        self.power_stations.fetch_data(&mut self.session).await?;
        log::debug!(
            "Fetched {} inverter(s) and {} power station(s)",
            self.inverters.len(),
            self.power_stations.len()
        );
        Ok(())
    }

    /// Snapshot of the known power stations.
    pub fn get_power_stations(&self) -> Vec<Entity> {
        self.power_stations.entities()
    }

    /// Snapshot of the known inverters.
    pub fn get_inverters(&self) -> Vec<Entity> {
        self.inverters.entities()
    }
}
