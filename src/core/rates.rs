//! Exchange rate abstractions and the upstream payload reshaping

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_BASE_CURRENCY: &str = "USD";

/// Flat mapping from currency code to rate.
pub type RateMap = HashMap<String, f64>;

/// One entry of the upstream `data` object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateRecord {
    pub code: String,
    pub value: f64,
}

/// Upstream response body. The keys of `data` are opaque and discarded.
#[derive(Debug, Deserialize)]
pub struct UpstreamRates {
    pub data: HashMap<String, RateRecord>,
}

impl UpstreamRates {
    pub fn into_rate_map(self) -> RateMap {
        reshape(self.data.into_values())
    }
}

/// Re-keys upstream records by their currency code.
///
/// A code repeated by the upstream keeps the last value seen.
pub fn reshape<I>(records: I) -> RateMap
where
    I: IntoIterator<Item = RateRecord>,
{
    records
        .into_iter()
        .fold(RateMap::new(), |mut rates, record| {
            rates.insert(record.code, record.value);
            rates
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub base_currency: String,
    /// Empty means all supported currencies.
    pub target_currency: String,
}

impl ConversionRequest {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            target_currency: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRequest {
    pub rates_date: NaiveDate,
    pub base_currency: String,
    /// Empty means all supported currencies.
    pub target_currency: String,
}

impl HistoricalRequest {
    pub fn new(rates_date: NaiveDate) -> Self {
        Self {
            rates_date,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            target_currency: String::new(),
        }
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Latest rates for every supported currency.
    async fn latest(&self) -> Result<RateMap>;

    async fn convert(&self, request: &ConversionRequest) -> Result<RateMap>;

    async fn historical(&self, request: &HistoricalRequest) -> Result<RateMap>;
}
