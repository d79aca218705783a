//! Home Assistant HTTP client.
//! This is the lower level client for Home Assistant: every request is retried with
//! backoff and guarded by a circuit breaker.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use failsafe::{
    backoff::{self, Constant},
    failure_policy::{self, ConsecutiveFailures},
    futures::CircuitBreaker,
};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use super::schemas::SensorState;
use super::{Error, Result};

type Breaker = failsafe::StateMachine<ConsecutiveFailures<Constant>, ()>;

pub struct HttpClient {
    client: Client,
    token: String,
    base_url: Url,
    circuit_breaker: Breaker,
}

impl HttpClient {
    /// Creates a new instance of `HttpClient` on top of a shared HTTP client.
    pub fn new(client: Client, url: Url, token: String) -> Self {
        HttpClient {
            client,
            token,
            base_url: url,
            circuit_breaker: Self::circuit_breaker(),
        }
    }

    /// Creates or updates the state of `entity_id`.
    pub async fn post_state(&self, entity_id: &str, state: &SensorState) -> Result<()> {
        let body = serde_json::to_string(state)?;
        RetryIf::spawn(
            Self::retry_strategy(),
            || async {
                self.circuit_breaker
                    .call_with(
                        Self::is_recorded_error,
                        self.request_post_state(entity_id, &body),
                    )
                    .await
                    .map_err(|err| match err {
                        failsafe::Error::Rejected => Error::RequestRejected,
                        failsafe::Error::Inner(e) => e,
                    })
            },
            Self::is_retryable_error,
        )
        .await
    }

    async fn request_post_state(&self, entity_id: &str, body: &str) -> Result<()> {
        log::debug!("Sending post state request for entity '{entity_id}': {body}");
        let url = self
            .base_url
            .join(&format!("api/states/{entity_id}"))
            .expect("cannot build post state URL");
        self.client
            .post(url)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Opens after 5 consecutive failures and tries again after 60 seconds.
    fn circuit_breaker() -> Breaker {
        let backoff = backoff::constant(Duration::from_secs(60));
        let policy = failure_policy::consecutive_failures(5, backoff);
        failsafe::Config::new().failure_policy(policy).build()
    }

    /// Exponential backoff from 10 milliseconds with jitter, at most 3 retries.
    fn retry_strategy() -> impl Iterator<Item = Duration> {
        ExponentialBackoff::from_millis(10).map(jitter).take(3)
    }

    fn is_client_error(error: &reqwest::Error) -> bool {
        error
            .status()
            .map(|status_code| StatusCode::is_client_error(&status_code))
            .unwrap_or(false)
    }

    // Client errors will not get better by retrying.
    fn is_retryable_error(error: &Error) -> bool {
        match error {
            Error::RequestFailed(err) => !HttpClient::is_client_error(err),
            Error::RequestRejected => false,
            Error::JsonSerializationFailed(_) => false,
        }
    }

    /// Only server and transport failures count towards opening the circuit.
    fn is_recorded_error(error: &Error) -> bool {
        match error {
            Error::RequestFailed(err) => !HttpClient::is_client_error(err),
            Error::RequestRejected => false,
            Error::JsonSerializationFailed(_) => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use rstest::rstest;

    fn reqwest_error_with_status(status: StatusCode) -> reqwest::Error {
        let response = http::Response::builder()
            .status(status)
            .body(Vec::new())
            .unwrap();
        reqwest::Response::from(response)
            .error_for_status()
            .unwrap_err()
    }

    fn json_serialization_error() -> Error {
        Error::JsonSerializationFailed(serde_json::Error::io(std::io::Error::other("fail")))
    }

    #[rstest]
    #[case(StatusCode::BAD_REQUEST, true)]
    #[case(StatusCode::UNAUTHORIZED, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    #[case(StatusCode::BAD_GATEWAY, false)]
    fn test_is_client_error(#[case] status: StatusCode, #[case] expected: bool) {
        assert_eq!(
            HttpClient::is_client_error(&reqwest_error_with_status(status)),
            expected
        );
    }

    #[rstest]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    fn test_request_errors_are_retried_and_recorded_on_server_errors(
        #[case] status: StatusCode,
        #[case] expected: bool,
    ) {
        let error = Error::RequestFailed(reqwest_error_with_status(status));
        assert_eq!(HttpClient::is_retryable_error(&error), expected);
        assert_eq!(HttpClient::is_recorded_error(&error), expected);
    }

    #[test]
    fn test_other_errors_are_neither_retried_nor_recorded() {
        for error in [Error::RequestRejected, json_serialization_error()] {
            assert!(!HttpClient::is_retryable_error(&error));
            assert!(!HttpClient::is_recorded_error(&error));
        }
    }
}
