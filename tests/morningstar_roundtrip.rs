//! End-to-end test of the API replay path: serve the four Morningstar
//! endpoints from a mock server, fetch the bundle, merge, and write the
//! workbook to disk. The browser stage is covered by unit tests against
//! a scripted renderer and an `#[ignore]`d live-Chromium test.

use navscope::capture::ChartQuery;
use navscope::morningstar::MorningstarClient;
use navscope::report;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn query() -> ChartQuery {
    ChartQuery {
        id: "F00000TEST".to_string(),
        start_date: "2016-08-29".to_string(),
        end_date: "2026-08-29".to_string(),
    }
}

fn return_body(values: &[(&str, &str)]) -> serde_json::Value {
    json!({
        "TimeSeries": {
            "Security": [{
                "CumulativeReturnSeries": [{
                    "HistoryDetail": values.iter()
                        .map(|(d, v)| json!({"EndDate": d, "Value": v}))
                        .collect::<Vec<_>>()
                }]
            }]
        }
    })
}

fn price_body(values: &[(&str, &str)]) -> serde_json::Value {
    json!({
        "TimeSeries": {
            "Security": [{
                "HistoryDetail": values.iter()
                    .map(|(d, v)| json!({
                        "EndDate": d,
                        "OriginalDate": d,
                        "Value": v
                    }))
                    .collect::<Vec<_>>()
            }]
        }
    })
}

async fn mount_all_four(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/timeseries_cumulativereturn/fav18yujpm"))
        .and(query_param("performanceType", "nav-cf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(return_body(&[
            ("2016-08-29", "0.0"),
            ("2016-08-30", "0.5"),
            ("2016-08-31", "1.1"),
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timeseries_cumulativereturn/fav18yujpm"))
        .and(query_param("performanceType", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(return_body(&[
            ("2016-08-29", "0.0"),
            ("2016-08-30", "0.7"),
            ("2016-08-31", "1.4"),
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timeseries_price/fav18yujpm"))
        .and(query_param("priceType", "nav-cf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(price_body(&[
            ("2016-08-29", "400.0"),
            ("2016-08-30", "402.0"),
            ("2016-08-31", "404.0"),
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/timeseries_price/fav18yujpm"))
        .and(query_param("priceType", "price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(price_body(&[
            ("2016-08-29", "380.0"),
            ("2016-08-30", "402.0"),
            ("2016-08-31", "412.08"),
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetches_merges_and_writes_workbook() {
    let server = MockServer::start().await;
    mount_all_four(&server).await;

    let client = MorningstarClient::with_base_url(server.uri());
    let bundle = client.fetch_bundle(&query()).await.expect("fetch failed");

    assert_eq!(bundle.nav_return.len(), 3);
    assert_eq!(bundle.price_return.len(), 3);
    assert_eq!(bundle.nav.len(), 3);
    assert_eq!(bundle.price.len(), 3);

    let rows = report::build_rows(&bundle);
    assert_eq!(rows.len(), 3);

    // (380 − 400) / 400 × 100 = −5%
    assert_eq!(rows[0].discount, Some(-5.0));
    // Price at NAV
    assert_eq!(rows[1].discount, Some(0.0));
    // (412.08 − 404) / 404 × 100 = 2%
    assert!((rows[2].discount.unwrap() - 2.0).abs() < 1e-9);

    let dir = TempDir::new().unwrap();
    let path = report::write_workbook(dir.path(), "test-trust", &rows).expect("write failed");
    assert!(path.ends_with("test-trust.xlsx"));
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[tokio::test]
async fn missing_endpoint_fails_the_fetch() {
    let server = MockServer::start().await;

    // Only the NAV return endpoint exists; the rest 404.
    Mock::given(method("GET"))
        .and(path("/timeseries_cumulativereturn/fav18yujpm"))
        .and(query_param("performanceType", "nav-cf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(return_body(&[(
            "2016-08-29",
            "0.0",
        )])))
        .mount(&server)
        .await;

    let client = MorningstarClient::with_base_url(server.uri());
    let err = client.fetch_bundle(&query()).await.unwrap_err();
    assert!(format!("{err:#}").contains("share-price cumulative return"));
}

#[tokio::test]
async fn malformed_payload_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = MorningstarClient::with_base_url(server.uri());
    let err = client.fetch_bundle(&query()).await.unwrap_err();
    assert!(format!("{err:#}").contains("unexpected time-series payload"));
}
