//! HTTP client for the Eco server's store and recipe endpoints.

use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::config::Config;
use crate::error::{AppError, FetchError};
use crate::metrics;

use super::recipes::{RecipeSource, RecipesPayload};
use super::types::StoresPayload;
use super::MarketSource;

/// Client for the EcoPriceCalculator plugin endpoints.
#[derive(Debug, Clone)]
pub struct EcoClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Full store listing URL.
    stores_url: url::Url,
    /// Full recipe URL.
    recipes_url: url::Url,
}

impl EcoClient {
    /// Create a client from config.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(FetchError::from)?;

        Ok(Self {
            http,
            stores_url: config.stores_url()?,
            recipes_url: config.recipes_url()?,
        })
    }

    /// Get the store listing URL.
    pub fn stores_url(&self) -> &url::Url {
        &self.stores_url
    }

    /// Get the recipe URL.
    pub fn recipes_url(&self) -> &url::Url {
        &self.recipes_url
    }

    /// Fetch the raw store document without interpreting it.
    pub async fn fetch_raw(&self) -> Result<serde_json::Value, FetchError> {
        self.fetch_json(&self.stores_url).await
    }

    /// Fetch the raw recipe document without interpreting it.
    pub async fn fetch_recipes_raw(&self) -> Result<serde_json::Value, FetchError> {
        self.fetch_json(&self.recipes_url).await
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn fetch_json(&self, url: &url::Url) -> Result<serde_json::Value, FetchError> {
        let start = Instant::now();
        let result = self.request(url).await;
        metrics::record_fetch_latency(start);

        match &result {
            Ok(_) => metrics::inc_fetches(),
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                metrics::inc_fetch_failures();
            }
        }

        result
    }

    async fn request(&self, url: &url::Url) -> Result<serde_json::Value, FetchError> {
        let response = self.http.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(format!("response is not JSON: {}", e)))?;

        debug!("Received payload");
        Ok(body)
    }
}

impl MarketSource for EcoClient {
    async fn fetch_stores(&self) -> Result<StoresPayload, FetchError> {
        let raw = self.fetch_raw().await?;
        StoresPayload::from_value(raw)
    }
}

impl RecipeSource for EcoClient {
    async fn fetch_recipes(&self) -> Result<RecipesPayload, FetchError> {
        let raw = self.fetch_recipes_raw().await?;
        RecipesPayload::from_value(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_works() {
        let config = Config {
            eco_server_url: "http://127.0.0.1:3001".to_string(),
            ..Config::default()
        };
        let client = EcoClient::new(&config).unwrap();
        assert_eq!(
            client.stores_url().as_str(),
            "http://127.0.0.1:3001/api/v1/plugins/EcoPriceCalculator/stores"
        );
        assert_eq!(
            client.recipes_url().as_str(),
            "http://127.0.0.1:3001/api/v1/plugins/EcoPriceCalculator/recipes"
        );
    }

    #[test]
    fn client_creation_rejects_bad_url() {
        let config = Config {
            eco_server_url: "::".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            EcoClient::new(&config),
            Err(AppError::InvalidConfig(_))
        ));
    }
}
