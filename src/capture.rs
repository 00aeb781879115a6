//! Chart request recovery from recorded network traffic.
//!
//! The AIC chart pages fetch their data from the Morningstar time-series
//! API. Rather than scrape the rendered chart, we scan the responses the
//! page itself received and lift the `id`, `startDate`, and `endDate`
//! query parameters so the same call can be replayed directly.

use crate::renderer::CapturedResponse;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Failure to recover a chart request from the recorded traffic.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No JSON response carried a ten-year chart query.
    #[error("no chart request with a ten-year window was captured")]
    NoChartRequest,
}

/// Query parameters of the chart's time-series call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    /// Morningstar security identifier.
    pub id: String,
    /// Series start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Series end date, `YYYY-MM-DD`.
    pub end_date: String,
}

/// Scan recorded responses for the ten-year chart query.
///
/// Only JSON responses are considered. A response qualifies when its URL
/// carries `id`, `startDate`, and `endDate` parameters and the start date
/// falls exactly ten calendar years before `today`. Pages fire several
/// chart calls as the range buttons are pressed; the last qualifying one
/// reflects the final UI state and wins.
pub fn chart_query_from_responses(
    responses: &[CapturedResponse],
    today: NaiveDate,
) -> Result<ChartQuery, CaptureError> {
    let target_year = today.year() - 10;
    let mut found = None;

    for resp in responses {
        if !resp.mime_type.contains("application/json") {
            continue;
        }
        let Ok(parsed) = url::Url::parse(&resp.url) else {
            continue;
        };

        let mut id = None;
        let mut start_date = None;
        let mut end_date = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "id" => id = Some(value.into_owned()),
                "startDate" => start_date = Some(value.into_owned()),
                "endDate" => end_date = Some(value.into_owned()),
                _ => {}
            }
        }
        let (Some(id), Some(start_date), Some(end_date)) = (id, start_date, end_date) else {
            continue;
        };

        let Ok(start) = NaiveDate::parse_from_str(&start_date, "%Y-%m-%d") else {
            continue;
        };
        if start.year() != target_year {
            continue;
        }

        found = Some(ChartQuery {
            id,
            start_date,
            end_date,
        });
    }

    found.ok_or(CaptureError::NoChartRequest)
}
