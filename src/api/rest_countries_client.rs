use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::{get_json, CountrySource};
use crate::error::{RefreshError, Result};
use serde_json::Value;

pub const SOURCE_NAME: &str = "Countries API";

/// Client for the restcountries.com v2 `all` endpoint
#[derive(Clone)]
pub struct RestCountriesClient {
    client: Client,
    url: String,
}

impl RestCountriesClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<Value>> {
        let countries: Vec<Value> = get_json(&self.client, &self.url, SOURCE_NAME).await?;
        if let Some(index) = countries.iter().position(|element| !element.is_object()) {
            return Err(RefreshError::UpstreamInvalidResponse {
                source_name: SOURCE_NAME,
                message: format!("element {} is not an object", index),
            });
        }
        info!(count = countries.len(), "fetched countries");
        Ok(countries)
    }
}
