//! Dependency injection container for talentsolar.

use std::sync::Arc;

use super::config::Config;
use crate::integration::homeassistant;
use crate::integration::talentmonitor::{self, Credentials, PowerStationSource};
use crate::services::{self, Coordinator};

/// Container for application dependencies.
pub struct Container {
    config: Arc<Config>,
    homeassistant: Arc<homeassistant::Client>,
    talent_service: Arc<services::TalentBridgeBackgroundService>,
}

impl Container {
    /// Creates a new instance of the dependency injection container.
    /// Fails when no TalentMonitor credentials are configured.
    pub fn new(config: Config) -> talentmonitor::Result<Self> {
        let config = Arc::new(config);

        // Both integrations share one connection pool.
        let http = reqwest::Client::builder()
            .build()
            .expect("cannot build HTTP client");

        let credentials = Credentials::resolve(
            config.talentmonitor_username.clone(),
            config.talentmonitor_password.clone(),
        )?;
        let talentmonitor = talentmonitor::Client::with_timezone(
            http.clone(),
            config.talentmonitor_url.clone(),
            credentials,
            PowerStationSource::new(config.talentmonitor_timezone.clone()),
        );

        let homeassistant = Arc::new(homeassistant::Client::new(
            http,
            config.homeassistant_url.clone(),
            config.homeassistant_token.clone(),
        ));

        let talent_service = Arc::new(services::TalentBridgeBackgroundService::new(
            Coordinator::new(talentmonitor),
            Arc::clone(&homeassistant),
            config.scan_interval.into(),
        ));

        Ok(Self {
            config,
            homeassistant,
            talent_service,
        })
    }

    /// Returns a reference to the application config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a reference to the TalentMonitor bridge service.
    pub fn talent_service(&self) -> Arc<services::TalentBridgeBackgroundService> {
        Arc::clone(&self.talent_service)
    }

    /// Returns a reference to the HomeAssistant client.
    pub fn homeassistant_client(&self) -> Arc<homeassistant::Client> {
        Arc::clone(&self.homeassistant)
    }

    /// Shutdown the container and clean up resources.
    pub async fn shutdown(&self) {
        self.talent_service.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use humantime::Duration;

    fn config(username: Option<&str>) -> Config {
        Config {
            app_log: "info".into(),
            app_log_style: "auto".into(),
            talentmonitor_url: reqwest::Url::parse("http://localhost:1234").unwrap(),
            talentmonitor_username: username.map(str::to_string),
            talentmonitor_password: Some("pw".into()),
            talentmonitor_timezone: "+02:00".into(),
            homeassistant_url: reqwest::Url::parse("http://localhost:2222").unwrap(),
            homeassistant_token: "token2".into(),
            scan_interval: Duration::from(std::time::Duration::from_secs(10)),
        }
    }

    #[tokio::test]
    async fn test_container_init() {
        let container = Container::new(config(Some("user"))).unwrap();

        container.shutdown().await;

        assert_eq!(container.config().app_log, "info");
        assert!(Arc::ptr_eq(
            &container.homeassistant_client(),
            &container.homeassistant_client()
        ));
        assert!(Arc::ptr_eq(
            &container.talent_service(),
            &container.talent_service()
        ));

        assert!(Arc::strong_count(&container.homeassistant_client()) >= 2);
        assert!(Arc::strong_count(&container.talent_service()) >= 1);
    }

    #[tokio::test]
    async fn test_container_without_credentials() {
        temp_env::async_with_vars([("PYTALENT_USERNAME", None::<&str>)], async {
            let result = Container::new(config(None));
            assert!(matches!(
                result,
                Err(talentmonitor::Error::MissingCredentials)
            ));
        })
        .await;
    }
}
