//! OpenAPI description of the converter routes and the pages rendering it

use axum::{Json, response::Html};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::{OpenApi, ToSchema};

use super::handlers;

pub const OPENAPI_PATH: &str = "/openapi.json";
pub const SWAGGER_PATH: &str = "/docs/";
pub const REDOC_PATH: &str = "/redoc/";

#[derive(Debug, Serialize, ToSchema)]
pub struct SupportedRatesResponse {
    /// Rate per currency code.
    pub supported_currency_rates: HashMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionRateResponse {
    /// Converted value per currency code.
    pub conversion_rate: HashMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoricalRateResponse {
    /// Rate per currency code on the requested date.
    pub historical_rate: HashMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Currency Converter API",
        description = "Exchange rates, conversions and historical rates from an upstream provider"
    ),
    paths(
        handlers::supported_rates,
        handlers::convert,
        handlers::historical_data
    ),
    components(schemas(
        SupportedRatesResponse,
        ConversionRateResponse,
        HistoricalRateResponse,
        ErrorResponse
    )),
    tags((name = "converter", description = "Currency conversion endpoints"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn swagger_ui() -> Html<String> {
    Html(format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Currency Converter API - Swagger UI</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({{ url: "{OPENAPI_PATH}", dom_id: "#swagger-ui" }});
  </script>
</body>
</html>
"##
    ))
}

pub async fn redoc() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Currency Converter API - ReDoc</title>
</head>
<body>
  <redoc spec-url="{OPENAPI_PATH}"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>
"#
    ))
}
