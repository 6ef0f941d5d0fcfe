use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Html,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;
use utoipa::IntoParams;

use super::docs::{
    ConversionRateResponse, ErrorResponse, HistoricalRateResponse, REDOC_PATH, SWAGGER_PATH,
    SupportedRatesResponse,
};
use super::{AppState, CONVERTER_ROOT, error::ApiError};
use crate::core::rates::{ConversionRequest, DEFAULT_BASE_CURRENCY, HistoricalRequest};

pub const AMOUNT_REQUIRED: &str = "Amount is a required field.";
pub const RATES_DATE_REQUIRED: &str = "rates_date is a required field.";

fn default_base_currency() -> String {
    DEFAULT_BASE_CURRENCY.to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertParams {
    /// Amount to convert. Missing or zero yields an error payload.
    #[param(example = "10")]
    amount: Option<String>,
    /// Currency the amount is expressed in.
    #[serde(default = "default_base_currency")]
    #[param(default = "USD")]
    base_currency: String,
    /// Currency to convert to. Empty converts to every supported currency.
    #[serde(default)]
    target_currency: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoricalParams {
    /// Date of the rates, formatted as YYYY-MM-DD.
    #[param(example = "2022-03-29")]
    rates_date: Option<String>,
    /// Currency the rates are expressed in.
    #[serde(default = "default_base_currency")]
    #[param(default = "USD")]
    base_currency: String,
    /// Currency to return. Empty returns every supported currency.
    #[serde(default)]
    target_currency: String,
}

fn required_field_error(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

/// Parses `amount`, treating a missing, empty or zero value as absent.
fn parse_amount(raw: Option<&str>) -> Result<Option<f64>, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };
    let amount: f64 = raw
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite())
        .ok_or_else(|| ApiError::InvalidParameter("amount must be a number.".to_string()))?;
    Ok((amount != 0.0).then_some(amount))
}

fn parse_rates_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                ApiError::InvalidParameter(
                    "rates_date must be a date formatted as YYYY-MM-DD.".to_string(),
                )
            }),
    }
}

pub async fn home() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Currency Converter API</title>
</head>
<body>
  <h1>Currency Converter API</h1>
  <ul>
    <li><a href="{swagger_docs}">Swagger documentation</a></li>
    <li><a href="{open_api_docs}">ReDoc documentation</a></li>
    <li><a href="{supported_currencies}">Supported currencies</a></li>
  </ul>
</body>
</html>
"#,
        swagger_docs = SWAGGER_PATH,
        open_api_docs = REDOC_PATH,
        supported_currencies = CONVERTER_ROOT,
    ))
}

/// Latest rates for every supported currency.
#[utoipa::path(
    get,
    path = "/api/converter/v1/",
    tag = "converter",
    responses(
        (status = 200, description = "Supported currency rates", body = SupportedRatesResponse),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse)
    )
)]
pub async fn supported_rates(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let rates = state.provider.latest().await?;
    Ok(Json(json!({ "supported_currency_rates": rates })))
}

/// Converts an amount from the base currency to the target currency.
#[utoipa::path(
    get,
    path = "/api/converter/v1/convert",
    tag = "converter",
    params(ConvertParams),
    responses(
        (status = 200, description = "Conversion rates, or an error payload when amount is missing", body = ConversionRateResponse),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 422, description = "Amount is not a number", body = ErrorResponse),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse)
    )
)]
pub async fn convert(
    State(state): State<AppState>,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let Some(amount) = parse_amount(params.amount.as_deref())? else {
        debug!("Rejecting conversion without an amount");
        return Ok(required_field_error(AMOUNT_REQUIRED));
    };

    let request = ConversionRequest {
        amount,
        base_currency: params.base_currency,
        target_currency: params.target_currency,
    };
    let rates = state.provider.convert(&request).await?;
    Ok(Json(json!({ "conversion_rate": rates })))
}

/// Historical rates for the given date.
#[utoipa::path(
    get,
    path = "/api/converter/v1/historical-data",
    tag = "converter",
    params(HistoricalParams),
    responses(
        (status = 200, description = "Historical rates, or an error payload when rates_date is missing", body = HistoricalRateResponse),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 422, description = "rates_date is not a YYYY-MM-DD date", body = ErrorResponse),
        (status = 502, description = "Upstream provider failed", body = ErrorResponse)
    )
)]
pub async fn historical_data(
    State(state): State<AppState>,
    params: Result<Query<HistoricalParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let Some(rates_date) = parse_rates_date(params.rates_date.as_deref())? else {
        debug!("Rejecting historical lookup without a date");
        return Ok(required_field_error(RATES_DATE_REQUIRED));
    };

    let request = HistoricalRequest {
        rates_date,
        base_currency: params.base_currency,
        target_currency: params.target_currency,
    };
    let rates = state.provider.historical(&request).await?;
    Ok(Json(json!({ "historical_rate": rates })))
}
