// =============================================================================
// Yahoo Finance REST Client — daily bars and symbol metadata
// =============================================================================
//
// Public endpoints only; no credentials are involved.  Yahoo answers unknown
// symbols with a JSON error envelope (often alongside a 404), so the body is
// always parsed before the status code is judged.
//
// The client owns the engine's input precondition: bars come back sorted by
// date with duplicates collapsed, and rows with missing fields are dropped.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use super::info::SymbolInfo;
use crate::types::{Bar, Period};

/// Yahoo rejects requests without a browser-like agent.
const BROWSER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                             (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Modules requested from the quote-summary endpoint.
const SUMMARY_MODULES: &str = "price,summaryProfile,summaryDetail";

/// Market-data client for daily history and symbol metadata.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` — e.g. `https://query1.finance.yahoo.com` (no trailing slash).
    /// * `timeout`  — per-request timeout; the engine itself never waits.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        debug!(base_url = %base_url, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    // -------------------------------------------------------------------------
    // Daily history
    // -------------------------------------------------------------------------

    /// GET /v8/finance/chart/{symbol}?range={period}&interval=1d
    ///
    /// Returns bars in ascending date order with unique dates.  An empty vec
    /// means the provider knows the symbol but has no bars for the period.
    #[instrument(skip(self), name = "yahoo::fetch_bars")]
    pub async fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<Bar>> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, symbol, period
        );

        let body = self.get_json(&url, "chart").await?;
        let bars = parse_chart_response(&body)?;

        debug!(symbol = %symbol, period = %period, count = bars.len(), "bars fetched");
        Ok(bars)
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    /// GET /v10/finance/quoteSummary/{symbol}?modules=price,summaryProfile,summaryDetail
    #[instrument(skip(self), name = "yahoo::fetch_symbol_info")]
    pub async fn fetch_symbol_info(&self, symbol: &str) -> Result<SymbolInfo> {
        let symbol = symbol.trim().to_uppercase();
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules={}",
            self.base_url, symbol, SUMMARY_MODULES
        );

        let body = self.get_json(&url, "quoteSummary").await?;
        let info = parse_quote_summary(&body)?;

        debug!(symbol = %symbol, company = ?info.company_name, "symbol info retrieved");
        Ok(info)
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    async fn get_json(&self, url: &str, envelope: &str) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {envelope} request failed"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {envelope} response"))?;

        // A provider error description beats a bare status code.
        if let Some(msg) = provider_error(&body, envelope) {
            anyhow::bail!("Yahoo {envelope} returned {status}: {msg}");
        }
        if !status.is_success() {
            anyhow::bail!("Yahoo {envelope} returned {status}: {body}");
        }

        Ok(body)
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Extract `{envelope}.error.description` (or `.code`) when present.
fn provider_error(body: &serde_json::Value, envelope: &str) -> Option<String> {
    let err = body.get(envelope)?.get("error")?;
    if err.is_null() {
        return None;
    }
    let text = err["description"]
        .as_str()
        .or_else(|| err["code"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    Some(text)
}

/// Parse a chart response into ascending, date-unique bars.
///
/// Expected shape:
/// ```json
/// { "chart": { "result": [ {
///     "meta": { "gmtoffset": -14400 },
///     "timestamp": [1700000000, ...],
///     "indicators": { "quote": [ { "open": [...], "high": [...], "low": [...],
///                                   "close": [...], "volume": [...] } ] }
/// } ], "error": null } }
/// ```
pub fn parse_chart_response(body: &serde_json::Value) -> Result<Vec<Bar>> {
    if let Some(msg) = provider_error(body, "chart") {
        anyhow::bail!("chart error: {msg}");
    }

    let result = body["chart"]["result"]
        .as_array()
        .and_then(|arr| arr.first())
        .context("chart response has no result")?;

    let gmt_offset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);

    // Symbols with no trades in the range come back without a timestamp array.
    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(Vec::new());
    };

    let quote = result["indicators"]["quote"]
        .as_array()
        .and_then(|arr| arr.first())
        .context("chart result missing indicators.quote")?;

    let (open, high, low, close) = (
        quote_column(quote, "open")?,
        quote_column(quote, "high")?,
        quote_column(quote, "low")?,
        quote_column(quote, "close")?,
    );
    // Funds and indices often report null volume; no indicator reads it.
    let volume = quote["volume"].as_array();

    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    let mut dropped = 0usize;

    for (i, ts) in timestamps.iter().enumerate() {
        let row = (|| {
            let date = DateTime::from_timestamp(ts.as_i64()? + gmt_offset, 0)?.date_naive();
            let bar = Bar::new(
                date,
                open.get(i)?.as_f64()?,
                high.get(i)?.as_f64()?,
                low.get(i)?.as_f64()?,
                close.get(i)?.as_f64()?,
                volume
                    .and_then(|v| v.get(i))
                    .and_then(serde_json::Value::as_u64)
                    .unwrap_or(0),
            );
            let prices = [bar.open, bar.high, bar.low, bar.close];
            prices
                .iter()
                .all(|p| p.is_finite() && *p > 0.0)
                .then_some(bar)
        })();

        match row {
            // Later rows win: Yahoo may append a live row for the current day.
            Some(bar) => {
                by_date.insert(bar.date, bar);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = by_date.len(), "skipped incomplete chart rows");
    }

    Ok(by_date.into_values().collect())
}

fn quote_column<'a>(quote: &'a serde_json::Value, name: &str) -> Result<&'a Vec<serde_json::Value>> {
    quote[name]
        .as_array()
        .with_context(|| format!("chart quote missing '{name}' column"))
}

/// Parse a quote-summary response.  Every field is optional.
pub fn parse_quote_summary(body: &serde_json::Value) -> Result<SymbolInfo> {
    if let Some(msg) = provider_error(body, "quoteSummary") {
        anyhow::bail!("quoteSummary error: {msg}");
    }

    let result = body["quoteSummary"]["result"]
        .as_array()
        .and_then(|arr| arr.first())
        .context("quoteSummary response has no result")?;

    let price = &result["price"];
    let profile = &result["summaryProfile"];
    let detail = &result["summaryDetail"];

    let text = |v: &serde_json::Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(SymbolInfo {
        company_name: text(&price["longName"]).or_else(|| text(&price["shortName"])),
        sector: text(&profile["sector"]),
        market_cap: raw_number(&price["marketCap"]).or_else(|| raw_number(&detail["marketCap"])),
        trailing_pe: raw_number(&detail["trailingPE"]),
        dividend_yield: raw_number(&detail["dividendYield"]),
    })
}

/// Yahoo wraps numbers as `{ "raw": 1.23, "fmt": "1.23" }`; plain numbers are
/// accepted too.  Empty objects mean "not available".
fn raw_number(val: &serde_json::Value) -> Option<f64> {
    val.get("raw")
        .and_then(serde_json::Value::as_f64)
        .or_else(|| val.as_f64())
        .filter(|v| v.is_finite())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart(timestamps: serde_json::Value, quote: serde_json::Value) -> serde_json::Value {
        json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "gmtoffset": -18000 },
                    "timestamp": timestamps,
                    "indicators": { "quote": [quote] }
                }],
                "error": null
            }
        })
    }

    // 2024-01-02 14:30 UTC, 2024-01-03 14:30 UTC, 2024-01-04 14:30 UTC
    const T1: i64 = 1_704_205_800;
    const T2: i64 = 1_704_292_200;
    const T3: i64 = 1_704_378_600;

    #[test]
    fn parses_daily_bars() {
        let body = chart(
            json!([T1, T2]),
            json!({
                "open": [185.0, 184.2], "high": [186.1, 185.9],
                "low": [183.4, 183.0], "close": [185.6, 184.25],
                "volume": [82_488_700u64, 58_414_500u64]
            }),
        );
        let bars = parse_chart_response(&body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 184.25);
        assert_eq!(bars[1].volume, 58_414_500);
    }

    #[test]
    fn gmt_offset_shifts_date() {
        // 2024-01-03 02:00 UTC is still 2024-01-02 in New York.
        let ts = 1_704_247_200;
        let body = chart(
            json!([ts]),
            json!({ "open": [1.0], "high": [1.0], "low": [1.0], "close": [1.0], "volume": [1] }),
        );
        let bars = parse_chart_response(&body).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn sorts_and_deduplicates() {
        let body = chart(
            json!([T3, T1, T2, T3 + 60]),
            json!({
                "open": [3.0, 1.0, 2.0, 3.5], "high": [3.0, 1.0, 2.0, 3.5],
                "low": [3.0, 1.0, 2.0, 3.5], "close": [3.0, 1.0, 2.0, 3.5],
                "volume": [10, 10, 10, 20]
            }),
        );
        let bars = parse_chart_response(&body).unwrap();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.5]);
        assert!(bars.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn drops_incomplete_rows() {
        let body = chart(
            json!([T1, T2, T3]),
            json!({
                "open": [1.0, null, 3.0], "high": [1.0, 2.0, 3.0],
                "low": [1.0, 2.0, 0.0], "close": [1.0, 2.0, 3.0],
                "volume": [5, 5, 5]
            }),
        );
        let bars = parse_chart_response(&body).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 1.0);
    }

    #[test]
    fn null_volume_keeps_the_bar() {
        let body = chart(
            json!([T1, T2, T3]),
            json!({
                "open": [1.0, 2.0, 3.0], "high": [1.0, 2.0, 3.0],
                "low": [1.0, 2.0, 3.0], "close": [1.0, 2.0, 3.0],
                "volume": [5, null, null]
            }),
        );
        let bars = parse_chart_response(&body).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].volume, 5);
        assert_eq!(bars[1].volume, 0);
        assert_eq!(bars[2].close, 3.0);
    }

    #[test]
    fn missing_volume_column_keeps_bars() {
        let body = chart(
            json!([T1, T2]),
            json!({
                "open": [1.0, 2.0], "high": [1.0, 2.0],
                "low": [1.0, 2.0], "close": [1.0, 2.0]
            }),
        );
        let bars = parse_chart_response(&body).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(bars.iter().all(|b| b.volume == 0));
    }

    #[test]
    fn missing_timestamps_is_empty() {
        let body = json!({
            "chart": { "result": [{ "meta": {}, "indicators": { "quote": [{}] } }], "error": null }
        });
        assert!(parse_chart_response(&body).unwrap().is_empty());
    }

    #[test]
    fn provider_error_surfaces() {
        let body = json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        });
        let err = parse_chart_response(&body).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[test]
    fn parses_quote_summary() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "price": { "longName": "Apple Inc.", "marketCap": { "raw": 2_890_000_000_000.0, "fmt": "2.89T" } },
                    "summaryProfile": { "sector": "Technology" },
                    "summaryDetail": { "trailingPE": { "raw": 29.41 }, "dividendYield": { "raw": 0.0052 } }
                }],
                "error": null
            }
        });
        let info = parse_quote_summary(&body).unwrap();
        assert_eq!(info.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.market_cap, Some(2_890_000_000_000.0));
        assert_eq!(info.trailing_pe, Some(29.41));
        assert_eq!(info.dividend_yield, Some(0.0052));
    }

    #[test]
    fn quote_summary_missing_fields_are_none() {
        let body = json!({
            "quoteSummary": {
                "result": [{ "price": { "shortName": "SPDR S&P 500" }, "summaryDetail": { "trailingPE": {} } }],
                "error": null
            }
        });
        let info = parse_quote_summary(&body).unwrap();
        assert_eq!(info.company_name.as_deref(), Some("SPDR S&P 500"));
        assert!(info.sector.is_none());
        assert!(info.market_cap.is_none());
        assert!(info.trailing_pe.is_none());
        assert!(info.dividend_yield.is_none());
    }

    #[test]
    fn quote_summary_error_surfaces() {
        let body = json!({
            "quoteSummary": { "result": null, "error": { "code": "Not Found", "description": "Quote not found for ticker symbol: ZZZZ" } }
        });
        assert!(parse_quote_summary(&body).is_err());
    }
}
