//! Server
use crate::core::config::{APP_NAME, APP_VERSION, Config};
use crate::core::container::Container;
use crate::integration::talentmonitor;
use tokio_util::sync::CancellationToken;

/// Run the server with the given configuration and shutdown token
pub async fn server(
    config: Config,
    shutdown_token: CancellationToken,
) -> talentmonitor::Result<()> {
    let container = Container::new(config)?;
    log::info!("{APP_NAME} v{APP_VERSION} started");
    container.talent_service().run(shutdown_token).await;
    container.shutdown().await;
    Ok(())
}
