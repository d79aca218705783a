//! Error handling for the TalentMonitor API client.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),
    #[error("Credentials not provided via arguments or environment variables")]
    MissingCredentials,

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
