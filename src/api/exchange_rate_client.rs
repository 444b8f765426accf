use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::{get_json, RateSource};
use crate::error::Result;
use crate::models::{RateTable, RatesResponse};

pub const SOURCE_NAME: &str = "Exchange Rates API";

/// Client for an open.er-api.com style `{"rates": {...}}` endpoint
#[derive(Clone)]
pub struct ExchangeRateClient {
    client: Client,
    url: String,
}

impl ExchangeRateClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rates(&self) -> Result<RateTable> {
        let response: RatesResponse = get_json(&self.client, &self.url, SOURCE_NAME).await?;
        let base = response.base_code.clone().unwrap_or_else(|| "?".to_string());
        let table = RateTable::from(response);
        info!(base = %base, rates = table.len(), "fetched exchange rates");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefreshError;
    use approx::assert_relative_eq;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer, timeout: Duration) -> ExchangeRateClient {
        ExchangeRateClient::new(format!("{}/v6/latest/USD", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_rates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v6/latest/USD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": "success",
                "base_code": "USD",
                "rates": { "USD": 1, "EUR": 0.92, "NGN": 1600.25 }
            })))
            .mount(&server)
            .await;

        let table = client_for(&server, Duration::from_secs(10))
            .await
            .fetch_rates()
            .await
            .unwrap();
        assert_eq!(table.len(), 3);
        assert_relative_eq!(table.get("eur").unwrap(), 0.92);
        assert_relative_eq!(table.get("NGN").unwrap(), 1600.25);
    }

    #[tokio::test]
    async fn test_missing_rates_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "error" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, Duration::from_secs(10))
            .await
            .fetch_rates()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RefreshError::UpstreamInvalidResponse { source_name: SOURCE_NAME, .. }
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server, Duration::from_secs(10))
            .await
            .fetch_rates()
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::UpstreamUnavailable { .. }));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "rates": { "USD": 1 } }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server, Duration::from_millis(50))
            .await
            .fetch_rates()
            .await
            .unwrap_err();
        assert!(matches!(err, RefreshError::UpstreamTimeout { .. }));
    }
}
