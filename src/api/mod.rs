pub mod exchange_rate_client;
pub mod rest_countries_client;

pub use exchange_rate_client::ExchangeRateClient;
pub use rest_countries_client::RestCountriesClient;

use crate::error::{RefreshError, Result};
use crate::models::RateTable;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Provider of raw country elements. Each element is a JSON object that is
/// decoded into a `RawCountry` on its own during reconciliation.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<Value>>;
}

/// Provider of currency exchange rates
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
}

/// GET `url` and decode the JSON body, classifying failures for `source_name`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    source_name: &'static str,
) -> Result<T> {
    debug!(source = source_name, url, "sending request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| transport_error(source_name, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RefreshError::UpstreamUnavailable {
            source_name,
            message: format!("API request failed with status: {}", status),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|e| transport_error(source_name, e))?;

    serde_json::from_str(&text).map_err(|e| RefreshError::UpstreamInvalidResponse {
        source_name,
        message: e.to_string(),
    })
}

fn transport_error(source_name: &'static str, error: reqwest::Error) -> RefreshError {
    if error.is_timeout() {
        RefreshError::UpstreamTimeout { source_name }
    } else {
        RefreshError::UpstreamUnavailable {
            source_name,
            message: error.to_string(),
        }
    }
}
