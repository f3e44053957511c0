//! Интеграционные тесты клиента трендов на wiremock.

use std::time::Duration;

use serde_json::{json, Value};
use trend_momentum::{
    AppConfig, ErrorKind, SignalSource, TrendAnalysisError, TrendFetcherService, TrendSignal,
    TrendsClient,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "APP6_UEAAAAAZtest";

fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        trends_base_url: format!("{}/trends", server.uri()),
        pacing_ms: Some(0),
        max_attempts: Some(2),
        retry_delay_ms: Some(0),
        retry_jitter_ms: Some(0),
        transport_retries: Some(2),
        transport_backoff_ms: Some(0),
        request_timeout_secs: Some(5),
        fetch_timeout_secs: Some(10),
        ..AppConfig::default()
    }
}

fn guarded(body: Value) -> String {
    format!(")]}}',\n{}", body)
}

fn explore_body() -> String {
    guarded(json!({
        "widgets": [
            { "id": "RELATED_QUERIES", "token": "other", "request": { "restriction": {} } },
            {
                "id": "TIMESERIES",
                "token": TOKEN,
                "request": { "time": "2026-09-16 2026-10-16", "resolution": "DAY", "locale": "en-IN" }
            }
        ]
    }))
}

fn timeline_body(values: &[u32]) -> String {
    let points: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(i, v)| json!({ "time": (1_757_980_800 + i * 86_400).to_string(), "value": [v], "hasData": [true] }))
        .collect();
    guarded(json!({ "default": { "timelineData": points, "averages": [] } }))
}

async fn mount_warmup(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/trends/explore"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "NID=warmup; Path=/")
                .set_body_string("<html></html>"),
        )
        .mount(server)
        .await;
}

async fn mount_explore(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .and(query_param("hl", "en-IN"))
        .and(query_param("tz", "-330"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_multiline(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_live_runs_two_step_protocol() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[60, 60, 80])).await;

    let client = TrendsClient::new(test_config(&server));
    let signal = client.fetch_live("oversized linen shirt").await.expect("live signal");

    assert_eq!(signal.current_interest, 80.0);
    assert_eq!(signal.four_week_avg, 66.7);
    assert_eq!(signal.growth_pct, 20.0);
    assert_eq!(signal.normalized_score, 80.0);
    assert_eq!(signal.source, SignalSource::Live);
}

#[tokio::test]
async fn explore_request_carries_comparison_payload() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[42])).await;

    let client = TrendsClient::new(test_config(&server));
    client.fetch_live("cargo pants men").await.expect("live signal");

    let requests = server.received_requests().await.expect("recording enabled");
    let explore = requests
        .iter()
        .find(|r| r.url.path() == "/trends/api/explore")
        .expect("explore request sent");
    let req = explore
        .url
        .query_pairs()
        .find(|(k, _)| k == "req")
        .map(|(_, v)| v.into_owned())
        .expect("req param");
    let payload: Value = serde_json::from_str(&req).unwrap();

    assert_eq!(payload["comparisonItem"][0]["keyword"], "cargo pants men");
    assert_eq!(payload["comparisonItem"][0]["geo"], "IN");
    assert_eq!(payload["comparisonItem"][0]["time"], "today 1-m");

    let multiline = requests
        .iter()
        .find(|r| r.url.path() == "/trends/api/widgetdata/multiline")
        .expect("multiline request sent");
    let forwarded = multiline
        .url
        .query_pairs()
        .find(|(k, _)| k == "req")
        .map(|(_, v)| v.into_owned())
        .expect("req param");
    let forwarded: Value = serde_json::from_str(&forwarded).unwrap();
    assert_eq!(forwarded["resolution"], "DAY");

    // cookie из warm-up уходит в следующие шаги
    let cookie = explore.headers.get("cookie").map(|v| v.to_str().unwrap().to_string());
    assert_eq!(cookie.as_deref(), Some("NID=warmup"));
}

#[tokio::test]
async fn single_point_timeline_has_zero_growth() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[42])).await;

    let signal = TrendsClient::new(test_config(&server))
        .fetch_live("men polo shirt")
        .await
        .unwrap();

    assert_eq!(signal.current_interest, 42.0);
    assert_eq!(signal.four_week_avg, 42.0);
    assert_eq!(signal.growth_pct, 0.0);
}

#[tokio::test]
async fn missing_widget_token_is_protocol_error() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(
        &server,
        guarded(json!({ "widgets": [{ "id": "TIMESERIES", "request": { "time": "x" } }] })),
    )
    .await;

    let err = TrendsClient::new(test_config(&server))
        .fetch_live("men polo shirt")
        .await
        .unwrap_err();

    assert!(matches!(err, TrendAnalysisError::ProtocolError(_)), "got {:?}", err);
}

#[tokio::test]
async fn empty_timeline_is_protocol_error() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[])).await;

    let err = TrendsClient::new(test_config(&server))
        .fetch_live("men polo shirt")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn warmup_failure_status_is_tolerated() {
    let server = MockServer::start().await;
    // warm-up не смонтирован: wiremock отвечает 404
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[10, 30])).await;

    let signal = TrendsClient::new(test_config(&server))
        .fetch_live("men track pants")
        .await
        .unwrap();

    assert_eq!(signal.current_interest, 30.0);
}

#[tokio::test]
async fn transient_status_is_retried_at_transport_level() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .respond_with(ResponseTemplate::new(200).set_body_string(timeline_body(&[50, 70])))
        .expect(1)
        .mount(&server)
        .await;

    let signal = TrendsClient::new(test_config(&server))
        .fetch_live("men denim jacket")
        .await
        .expect("transient 429 should be absorbed");

    assert_eq!(signal.current_interest, 70.0);
}

#[tokio::test]
async fn persistent_server_error_is_transport_error() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(503))
        // первая попытка + 2 повтора на транспорте
        .expect(3)
        .mount(&server)
        .await;

    let err = TrendsClient::new(test_config(&server))
        .fetch_live("men waffle tee")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn fetcher_falls_back_after_exhausting_attempts() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(explore_body()))
        .expect(2)
        .mount(&server)
        .await;
    mount_multiline(&server, timeline_body(&[])).await;

    let fetcher = TrendFetcherService::new(test_config(&server));
    let signal = fetcher.fetch("men kurta casual").await;

    assert_eq!(signal, TrendSignal::neutral_fallback());
    assert_eq!(signal.source, SignalSource::Fallback);
    assert_eq!(fetcher.cache_size().await, 0);
}

#[tokio::test]
async fn fetcher_retries_then_succeeds() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_explore(&server, explore_body()).await;
    mount_multiline(&server, timeline_body(&[20, 40])).await;

    let signal = TrendFetcherService::new(test_config(&server))
        .fetch("men jogger pants")
        .await;

    assert_eq!(signal.source, SignalSource::Live);
    assert_eq!(signal.current_interest, 40.0);
}

#[tokio::test]
async fn fetcher_caches_live_signal() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(explore_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount_multiline(&server, timeline_body(&[30, 50])).await;

    let fetcher = TrendFetcherService::new(test_config(&server));
    let first = fetcher.fetch("neon graphic tee").await;
    let second = fetcher.fetch("neon graphic tee").await;

    assert_eq!(first.source, SignalSource::Live);
    assert_eq!(first, second);
    assert_eq!(fetcher.cache_size().await, 1);
}

#[tokio::test]
async fn fetcher_times_out_slow_upstream() {
    let server = MockServer::start().await;
    mount_warmup(&server).await;
    mount_explore(&server, explore_body()).await;

    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(timeline_body(&[90]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = TrendFetcherService::new(AppConfig {
        max_attempts: Some(1),
        fetch_timeout_secs: Some(1),
        request_timeout_secs: Some(30),
        ..test_config(&server)
    });

    let started = std::time::Instant::now();
    let signal = fetcher.fetch("men terry shorts").await;

    assert_eq!(signal, TrendSignal::neutral_fallback());
    assert!(started.elapsed() < Duration::from_secs(4));
}
