//! Core business logic abstractions

pub mod log;
pub mod rates;

// Re-export main types for cleaner imports
pub use rates::{
    ConversionRequest, ExchangeRateProvider, HistoricalRequest, RateMap, RateRecord, UpstreamRates,
};
