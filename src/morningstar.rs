//! Client for the Morningstar time-series API.
//!
//! Replays the four calls the AIC chart page makes for a security: NAV
//! and share-price cumulative returns, and NAV and share-price levels.
//! The query shape (currency, frequency, decimal places, token segment)
//! mirrors the page's own requests and is not configurable.

use crate::capture::ChartQuery;
use crate::http_client::HttpClient;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Deserializer};

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://lt.morningstar.com/api/rest.svc";

/// Access token path segment used by the chart pages.
const TOKEN: &str = "fav18yujpm";

/// Per-request timeout in milliseconds.
const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// One observation in a time series.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HistoryPoint {
    /// Observation date, `YYYY-MM-DD`.
    #[serde(rename = "EndDate")]
    pub end_date: String,
    /// Observation value. The API serializes numbers as strings;
    /// unparseable values become `None`.
    #[serde(rename = "Value", deserialize_with = "flexible_value", default)]
    pub value: Option<f64>,
}

/// The four series needed for one company's report.
#[derive(Debug, Clone)]
pub struct SeriesBundle {
    /// NAV cumulative return (the chart's blue line).
    pub nav_return: Vec<HistoryPoint>,
    /// Share-price cumulative return (the chart's red line).
    pub price_return: Vec<HistoryPoint>,
    /// NAV level, forward-filled.
    pub nav: Vec<HistoryPoint>,
    /// Share-price level, forward-filled.
    pub price: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "TimeSeries")]
    time_series: TimeSeriesNode,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesNode {
    #[serde(rename = "Security")]
    security: Vec<SecurityNode>,
}

#[derive(Debug, Deserialize)]
struct SecurityNode {
    #[serde(rename = "CumulativeReturnSeries", default)]
    cumulative_return_series: Vec<ReturnSeriesNode>,
    #[serde(rename = "HistoryDetail", default)]
    history_detail: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
struct ReturnSeriesNode {
    #[serde(rename = "HistoryDetail", default)]
    history_detail: Vec<HistoryPoint>,
}

/// Accept `"12.3"`, `12.3`, or anything else (→ `None`).
fn flexible_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Morningstar time-series client.
#[derive(Clone)]
pub struct MorningstarClient {
    http: HttpClient,
    base_url: String,
}

impl MorningstarClient {
    /// Client against the production API.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an alternate base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(REQUEST_TIMEOUT_MS),
            base_url: base_url.into(),
        }
    }

    /// URL for a cumulative-return series.
    ///
    /// `performance_type` is `"nav-cf"` for NAV or empty for share price —
    /// the empty value is meaningful to the API and must stay in the query.
    pub fn cumulative_return_url(&self, query: &ChartQuery, performance_type: &str) -> String {
        format!(
            "{base}/timeseries_cumulativereturn/{TOKEN}?applyTrackRecordExtension=true\
             &currencyId=GBP&decPlaces=8&endDate={end}&frequency=daily&id={id}\
             &idType=Morningstar&outputType=json&performanceType={performance_type}\
             &restructureDateOptions=ignore&startDate={start}",
            base = self.base_url,
            end = query.end_date,
            id = query.id,
            start = query.start_date,
        )
    }

    /// URL for a price-level series (`price_type` is `"nav-cf"` or `"price"`).
    pub fn price_url(&self, query: &ChartQuery, price_type: &str) -> String {
        format!(
            "{base}/timeseries_price/{TOKEN}?applyTrackRecordExtension=true\
             &currencyId=GBP&decPlaces=8&endDate={end}&forwardFill=true&frequency=daily\
             &id={id}&idType=Morningstar&outputType=json&priceType={price_type}\
             &startDate={start}",
            base = self.base_url,
            end = query.end_date,
            id = query.id,
            start = query.start_date,
        )
    }

    /// Fetch all four series for one security.
    pub async fn fetch_bundle(&self, query: &ChartQuery) -> Result<SeriesBundle> {
        let nav_return = self
            .fetch_return_series(&self.cumulative_return_url(query, "nav-cf"))
            .await
            .context("fetching NAV cumulative return")?;
        let price_return = self
            .fetch_return_series(&self.cumulative_return_url(query, ""))
            .await
            .context("fetching share-price cumulative return")?;
        let nav = self
            .fetch_price_series(&self.price_url(query, "nav-cf"))
            .await
            .context("fetching NAV series")?;
        let price = self
            .fetch_price_series(&self.price_url(query, "price"))
            .await
            .context("fetching share-price series")?;

        Ok(SeriesBundle {
            nav_return,
            price_return,
            nav,
            price,
        })
    }

    async fn fetch_envelope(&self, url: &str) -> Result<Envelope> {
        let resp = self.http.get(url, REQUEST_TIMEOUT_MS).await?;
        if resp.status >= 400 {
            bail!("API returned HTTP {} for {}", resp.status, resp.url);
        }
        serde_json::from_str(&resp.body).context("unexpected time-series payload")
    }

    async fn fetch_return_series(&self, url: &str) -> Result<Vec<HistoryPoint>> {
        let env = self.fetch_envelope(url).await?;
        let security = env
            .time_series
            .security
            .into_iter()
            .next()
            .context("response carried no securities")?;
        let series = security
            .cumulative_return_series
            .into_iter()
            .next()
            .context("response carried no cumulative-return series")?;
        Ok(series.history_detail)
    }

    async fn fetch_price_series(&self, url: &str) -> Result<Vec<HistoryPoint>> {
        let env = self.fetch_envelope(url).await?;
        let security = env
            .time_series
            .security
            .into_iter()
            .next()
            .context("response carried no securities")?;
        Ok(security.history_detail)
    }
}

impl Default for MorningstarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> ChartQuery {
        ChartQuery {
            id: "F00000ABCD".to_string(),
            start_date: "2016-08-29".to_string(),
            end_date: "2026-08-29".to_string(),
        }
    }

    #[test]
    fn cumulative_return_url_shape() {
        let client = MorningstarClient::new();
        let url = client.cumulative_return_url(&query(), "nav-cf");

        assert!(url.starts_with(
            "https://lt.morningstar.com/api/rest.svc/timeseries_cumulativereturn/fav18yujpm?"
        ));
        assert!(url.contains("performanceType=nav-cf"));
        assert!(url.contains("id=F00000ABCD"));
        assert!(url.contains("startDate=2016-08-29"));
        assert!(url.contains("endDate=2026-08-29"));
        assert!(url.contains("restructureDateOptions=ignore"));
        assert!(!url.contains("forwardFill"));
    }

    #[test]
    fn share_price_return_keeps_empty_performance_type() {
        let client = MorningstarClient::new();
        let url = client.cumulative_return_url(&query(), "");
        assert!(url.contains("&performanceType=&"));
    }

    #[test]
    fn price_url_shape() {
        let client = MorningstarClient::new();
        let url = client.price_url(&query(), "price");

        assert!(url
            .starts_with("https://lt.morningstar.com/api/rest.svc/timeseries_price/fav18yujpm?"));
        assert!(url.contains("priceType=price"));
        assert!(url.contains("forwardFill=true"));
        assert!(!url.contains("restructureDateOptions"));
    }

    #[test]
    fn parses_return_envelope_with_string_values() {
        let body = r#"{
            "TimeSeries": {
                "Security": [{
                    "CumulativeReturnSeries": [{
                        "HistoryDetail": [
                            {"EndDate": "2016-08-29", "Value": "0.0"},
                            {"EndDate": "2016-08-30", "Value": "1.25"},
                            {"EndDate": "2016-08-31", "Value": null}
                        ]
                    }]
                }]
            }
        }"#;

        let env: Envelope = serde_json::from_str(body).unwrap();
        let points = &env.time_series.security[0].cumulative_return_series[0].history_detail;
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].value, Some(1.25));
        assert_eq!(points[2].value, None);
    }

    #[test]
    fn parses_price_envelope_with_extra_fields() {
        // Price payloads carry an OriginalDate alongside EndDate/Value.
        let body = r#"{
            "TimeSeries": {
                "Security": [{
                    "HistoryDetail": [
                        {"EndDate": "2016-08-29", "OriginalDate": "2016-08-27", "Value": 431.5}
                    ]
                }]
            }
        }"#;

        let env: Envelope = serde_json::from_str(body).unwrap();
        let points = &env.time_series.security[0].history_detail;
        assert_eq!(points[0].end_date, "2016-08-29");
        assert_eq!(points[0].value, Some(431.5));
    }
}
