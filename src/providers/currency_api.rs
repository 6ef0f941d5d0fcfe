use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::config::UpstreamConfig;
use crate::core::rates::{
    ConversionRequest, ExchangeRateProvider, HistoricalRequest, RateMap, UpstreamRates,
};

const LATEST_PATH: &str = "latest?apikey=";
const CONVERT_PATH: &str = "convert?api=";
const HISTORICAL_PATH: &str = "historical?api=";
const REDACTED_KEY: &str = "***";

pub fn latest_url(base_url: &str, api_key: &str) -> String {
    format!("{base_url}{LATEST_PATH}{api_key}")
}

pub fn convert_url(base_url: &str, api_key: &str, request: &ConversionRequest) -> String {
    format!(
        "{base_url}{CONVERT_PATH}{api_key}&value={}&base_currency={}&currencies={}",
        request.amount, request.base_currency, request.target_currency
    )
}

pub fn historical_url(base_url: &str, api_key: &str, request: &HistoricalRequest) -> String {
    format!(
        "{base_url}{HISTORICAL_PATH}{api_key}&date={}&base_currency={}&currencies={}",
        request.rates_date.format("%Y-%m-%d"),
        request.base_currency,
        request.target_currency
    )
}

/// Client for the upstream exchange rate REST API.
pub struct CurrencyApiProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl CurrencyApiProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fxgate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build upstream HTTP client")?;

        Ok(CurrencyApiProvider {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    /// Issues a single GET and reshapes the `data` records of the response.
    ///
    /// `url` carries the API key and is never logged; `redacted` is logged instead.
    async fn fetch_rates(&self, url: &str, redacted: &str) -> Result<RateMap> {
        debug!("Requesting rates from {}", redacted);

        let response = self.client.get(url).send().await.map_err(|e| {
            anyhow!(
                "Request error: {} for URL: {}",
                e.without_url(),
                redacted
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for URL: {}", status, redacted));
        }

        let text = response
            .text()
            .await
            .context("Failed to read upstream response body")?;

        let upstream: UpstreamRates = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse upstream response"
                );
                return Err(anyhow!(
                    "Failed to parse upstream response for URL: {}: {}",
                    redacted,
                    e
                ));
            }
        };

        let rates = upstream.into_rate_map();
        debug!(count = rates.len(), "Reshaped upstream rates");
        Ok(rates)
    }
}

#[async_trait]
impl ExchangeRateProvider for CurrencyApiProvider {
    #[instrument(name = "LatestRatesFetch", skip(self))]
    async fn latest(&self) -> Result<RateMap> {
        let url = latest_url(&self.base_url, &self.api_key);
        let redacted = latest_url(&self.base_url, REDACTED_KEY);
        self.fetch_rates(&url, &redacted).await
    }

    #[instrument(
        name = "ConvertFetch",
        skip(self, request),
        fields(amount = request.amount, base = %request.base_currency, target = %request.target_currency)
    )]
    async fn convert(&self, request: &ConversionRequest) -> Result<RateMap> {
        let url = convert_url(&self.base_url, &self.api_key, request);
        let redacted = convert_url(&self.base_url, REDACTED_KEY, request);
        self.fetch_rates(&url, &redacted).await
    }

    #[instrument(
        name = "HistoricalFetch",
        skip(self, request),
        fields(date = %request.rates_date, base = %request.base_currency, target = %request.target_currency)
    )]
    async fn historical(&self, request: &HistoricalRequest) -> Result<RateMap> {
        let url = historical_url(&self.base_url, &self.api_key, request);
        let redacted = historical_url(&self.base_url, REDACTED_KEY, request);
        self.fetch_rates(&url, &redacted).await
    }
}
