//! talentsolar - Mirror TalentMonitor solar data into Home Assistant
//! The application is small enough to run on a single worker thread,
//! making it suitable for low-resource environments.
use envconfig::Envconfig;
use talentsolar::core::config::{Config, configure_logger};
use talentsolar::integration::talentmonitor;
use talentsolar::server::server;
use tokio::signal;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

enum ExitCode {
    Success = 0,
    RuntimeError = 1,
    ConfigError = 2,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 1)]
async fn main() {
    dotenvy::dotenv().ok();
    configure_logger();

    let config = match Config::init_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            std::process::exit(ExitCode::ConfigError as i32);
        }
    };

    let shutdown_token = CancellationToken::new();
    let server_shutdown_token = shutdown_token.clone();

    let mut app = tokio::spawn(async move { server(config, server_shutdown_token).await });

    // Wait for either Ctrl+C or SIGTERM, then trigger shutdown.
    // The server may also stop on its own when it cannot start.
    let result = tokio::select! {
        result = &mut app => Some(result),
        _ = signal::ctrl_c() => {
            log::info!("Received Ctrl+C, initiating graceful shutdown...");
            None
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to create terminate signal");
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            log::info!("Received SIGTERM, initiating graceful shutdown...");
            None
        }
    };
    let result = match result {
        Some(result) => result,
        None => {
            shutdown_token.cancel();
            app.await
        }
    };

    std::process::exit(exit_code(result) as i32);
}

fn exit_code(result: Result<talentmonitor::Result<()>, JoinError>) -> ExitCode {
    match result {
        Ok(Ok(())) => {
            log::info!("Graceful shutdown completed");
            ExitCode::Success
        }
        Ok(Err(e)) => {
            log::error!("Failed to start: {e}");
            ExitCode::ConfigError
        }
        Err(e) => {
            log::error!("Application crashed: {e}");
            ExitCode::RuntimeError
        }
    }
}
