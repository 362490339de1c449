//! Yahoo chart client tests against a mocked API

use market_data::{MarketDataError, WeeklySource, YahooChartClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHART_BODY: &str = r#"{
  "chart": {
    "result": [
      {
        "meta": { "symbol": "RELIANCE.NS" },
        "timestamp": [1704412800, 1705017600, 1705622400],
        "indicators": {
          "quote": [
            {
              "open":   [2400.0, null, 2460.0],
              "high":   [2455.5, null, 2512.0],
              "low":    [2390.0, null, 2441.0],
              "close":  [2450.25, null, 2500.75],
              "volume": [1250000.0, null, 1340000.0]
            }
          ]
        }
      }
    ],
    "error": null
  }
}"#;

const NOT_FOUND_BODY: &str = r#"{
  "chart": {
    "result": null,
    "error": {
      "code": "Not Found",
      "description": "No data found, symbol may be delisted"
    }
  }
}"#;

#[tokio::test]
async fn parses_weekly_bars_and_drops_null_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RELIANCE.NS"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CHART_BODY, "application/json"))
        .mount(&server)
        .await;

    let client = YahooChartClient::new().with_base_url(server.uri());
    let bars = client
        .fetch_weekly_series("RELIANCE.NS", 2)
        .await
        .expect("chart request should succeed");

    // The null middle row is dropped, the rest survive in date order
    assert_eq!(bars.len(), 2);
    assert!(bars[0].timestamp < bars[1].timestamp);
    assert_eq!(bars[0].close, 2450.25);
    assert_eq!(bars[1].close, 2500.75);
    assert_eq!(bars[1].volume, 1340000.0);
}

#[tokio::test]
async fn missing_symbol_maps_to_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/GHOST.NS"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(NOT_FOUND_BODY, "application/json"))
        .mount(&server)
        .await;

    let client = YahooChartClient::new().with_base_url(server.uri());
    let err = client
        .fetch_weekly_series("GHOST.NS", 2)
        .await
        .expect_err("delisted symbol should not yield bars");

    assert!(matches!(err, MarketDataError::NoData(_)));
}

#[tokio::test]
async fn health_reflects_request_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/RELIANCE.NS"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CHART_BODY, "application/json"))
        .mount(&server)
        .await;

    let client = YahooChartClient::new().with_base_url(server.uri());

    client
        .fetch_weekly_series("RELIANCE.NS", 2)
        .await
        .unwrap();

    let health = client.health().await;
    assert_eq!(health.source, "yahoo");
    assert!(health.is_healthy);
    assert!(health.last_success.is_some());
    assert_eq!(health.success_rate, 1.0);
}
