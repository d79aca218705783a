//! TalentMonitor session.
//! This is the lower level client: it owns the credentials and the bearer token
//! and issues authenticated requests against the TalentMonitor API.
use reqwest::{Client, Response, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::fmt;

use super::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://www.talent-monitoring.com/prod-api";

/// Empty query string for endpoints without parameters.
pub const NO_QUERY: &[(&str, &str)] = &[];

static USERNAME_ENV: &str = "PYTALENT_USERNAME";
static PASSWORD_ENV: &str = "PYTALENT_PASSWORD";

/// Login credentials for the TalentMonitor portal.
#[derive(Clone, PartialEq, Serialize)]
pub struct Credentials {
    username: String,
    password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Resolve the credentials from explicit values, falling back to the
    /// `PYTALENT_USERNAME` and `PYTALENT_PASSWORD` environment variables.
    pub fn resolve(username: Option<String>, password: Option<String>) -> Result<Self> {
        let username = Self::or_env(username, USERNAME_ENV).ok_or(Error::MissingCredentials)?;
        let password = Self::or_env(password, PASSWORD_ENV).ok_or(Error::MissingCredentials)?;
        Ok(Credentials { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    fn or_env(value: Option<String>, name: &str) -> Option<String> {
        value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }
}

/// Authenticated session against the TalentMonitor API.
/// The token is acquired lazily and refreshed by logging in again when the API answers 401.
pub struct Session {
    http: Client,
    base_url: Url,
    credentials: Credentials,
    token: Option<String>,
}

impl Session {
    /// Creates a new session using a shared HTTP client.
    pub fn new(http: Client, base_url: Url, credentials: Credentials) -> Self {
        Session {
            http,
            base_url,
            credentials,
            token: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Login with the stored credentials and keep the received token.
    pub async fn login(&mut self) -> Result<()> {
        log::debug!("Sending login request for user '{}'", self.credentials.username);
        let response = self
            .http
            .post(self.endpoint_url("login"))
            .json(&self.credentials)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        match Self::extract_token(&text) {
            Some(token) => {
                log::debug!("Login successful");
                self.token = Some(token);
                Ok(())
            }
            None => {
                log::error!("Login failed: token missing in response (status {status})");
                Err(Error::AuthenticationFailed(format!(
                    "token missing in login response (status {status})"
                )))
            }
        }
    }

    /// Forget the current token. The API has no logout endpoint.
    pub fn logout(&mut self) {
        self.token = None;
    }

    /// Get the JSON document served at `endpoint`.
    /// Returns `None` when the API answers with anything else than 200 or an unreadable body.
    /// A 401 answer triggers exactly one re-login and retry.
    pub async fn get_data<Q>(&mut self, endpoint: &str, query: &Q) -> Result<Option<Value>>
    where
        Q: Serialize + ?Sized,
    {
        if self.token.is_none() {
            self.login().await?;
        }
        let mut response = self.request_get(endpoint, query).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            log::debug!("Token expired, refreshing token");
            self.login().await?;
            response = self.request_get(endpoint, query).await?;
        }

        let status = response.status();
        if status != StatusCode::OK {
            log::error!("Failed to fetch data from '{endpoint}': status code {status}");
            return Ok(None);
        }
        let text = response.text().await?;
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::error!("Failed to parse data from '{endpoint}': {e}");
                Ok(None)
            }
        }
    }

    async fn request_get<Q>(&self, endpoint: &str, query: &Q) -> Result<Response>
    where
        Q: Serialize + ?Sized,
    {
        log::debug!("Sending GET request: {endpoint}");
        let token = self.token.as_deref().unwrap_or_default();
        let response = self
            .http
            .get(self.endpoint_url(endpoint))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(response)
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    fn extract_token(text: &str) -> Option<String> {
        serde_json::from_str::<Value>(text)
            .ok()?
            .get("token")?
            .as_str()
            .map(str::to_string)
    }
}
