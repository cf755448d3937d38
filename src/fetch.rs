use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde::Deserialize;

use crate::model::Crypto;

const LISTINGS_URL: &str = "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

#[derive(Debug, Deserialize)]
struct ListingsResponse {
    #[serde(default)]
    data: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    name: String,
    symbol: String,
    circulating_supply: f64,
    quote: Quote,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(rename = "USD")]
    usd: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: f64,
    market_cap: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    status: ApiStatus,
}

#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    error_message: Option<String>,
}

/// Fetches up to `limit` listings from the CoinMarketCap API and returns the
/// parsed batch. The caller decides what to do with it; nothing is appended
/// anywhere until the whole response has parsed, so a failure here never
/// leaves partial results behind.
///
/// Fails immediately, without touching the network, when no API key is set.
/// One attempt per call: no retry, no timeout.
pub async fn fetch_listings(api_key: Option<&str>, limit: u32) -> Result<Vec<Crypto>> {
    let key = match api_key {
        Some(key) if !key.trim().is_empty() => key,
        _ => bail!("API key is not set"),
    };

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        API_KEY_HEADER,
        HeaderValue::from_str(key).context("API key is not a valid header value")?,
    );

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    tracing::debug!(limit, url = LISTINGS_URL, "requesting listings");
    let limit = limit.to_string();
    let response = client
        .get(LISTINGS_URL)
        .query(&[("start", "1"), ("limit", limit.as_str()), ("convert", "USD")])
        .send()
        .await
        .context("request to CoinMarketCap failed")?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("failed to read response body")?;

    if !status.is_success() {
        let message = remote_error_message(&body).unwrap_or_else(|| status.to_string());
        bail!("CoinMarketCap API error: {message}");
    }

    let records = parse_listings(&body)?;
    tracing::debug!(count = records.len(), "parsed listings");
    Ok(records)
}

/// Pulls the service-supplied message out of an error body, if there is one.
fn remote_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.status.error_message)
}

fn parse_listings(body: &str) -> Result<Vec<Crypto>> {
    let parsed: ListingsResponse =
        serde_json::from_str(body).context("malformed listings response")?;
    Ok(parsed
        .data
        .into_iter()
        .map(|entry| Crypto {
            name: entry.name,
            symbol: entry.symbol,
            price: entry.quote.usd.price,
            market_cap: entry.quote.usd.market_cap,
            circulating_supply: entry.circulating_supply,
        })
        .collect())
}
