use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::AppConfig;
use crate::errors::{Result, TrendAnalysisError};
use crate::models::TrendSignal;

/// Префикс, которым источник защищает JSON от подключения через <script>
pub const ANTI_HIJACK_PREFIX: &str = ")]}'";

const TIMESERIES_WIDGET_ID: &str = "TIMESERIES";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Диапазоны пауз между шагами, в долях от pacing_ms
const WARMUP_PAUSE: (f64, f64) = (0.5, 1.5);
const TOKEN_PAUSE: (f64, f64) = (1.0, 2.0);

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    #[serde(default)]
    default: TimelineEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct TimelineEnvelope {
    #[serde(default, rename = "timelineData")]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<f64>,
}

/// Токен виджета и его запрос, выданные шагом explore
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetToken {
    pub token: String,
    pub request: Value,
}

/// Клиент внутреннего API временных рядов.
///
/// Протокол двухшаговый: `explore` выдаёт токен виджета TIMESERIES,
/// без которого запрос `multiline` за самими данными невозможен.
/// Каждый вызов [`TrendsClient::fetch_live`] открывает свою сессию с cookie.
#[derive(Clone)]
pub struct TrendsClient {
    config: AppConfig,
}

impl TrendsClient {
    pub fn new(config: AppConfig) -> Self {
        TrendsClient { config }
    }

    fn base_url(&self) -> &str {
        self.config.trends_base_url.trim_end_matches('/')
    }

    pub async fn fetch_live(&self, keyword: &str) -> Result<TrendSignal> {
        let session = self.open_session()?;

        // Шаг 0: заходим на страницу explore, чтобы получить исходные cookie
        let warmup_url = format!("{}/explore", self.base_url());
        let warmup = self.send_with_retry(&session, &warmup_url).await?;
        if !warmup.status().is_success() {
            tracing::warn!(keyword, status = %warmup.status(), "Warm-up запрос вернул ошибку, продолжаем без cookie");
        }
        self.pause(WARMUP_PAUSE).await;

        // Шаг 1: explore -> токен виджета TIMESERIES
        let explore: ExploreResponse = self
            .get_guarded_json(&session, &self.explore_url(keyword))
            .await?;
        let widget = extract_timeseries_widget(explore)?;
        tracing::debug!(keyword, "Получен токен виджета TIMESERIES");
        self.pause(TOKEN_PAUSE).await;

        // Шаг 2: multiline -> точки временного ряда
        let multiline_url = self.multiline_url(&widget)?;
        let multiline: MultilineResponse = self.get_guarded_json(&session, &multiline_url).await?;
        let values = extract_timeline_values(multiline)?;

        let signal = TrendSignal::from_values(&values).ok_or_else(|| {
            TrendAnalysisError::ProtocolError("Нет значений во временном ряду".to_string())
        })?;

        tracing::info!(
            keyword,
            current = signal.current_interest,
            avg = signal.four_week_avg,
            growth = signal.growth_pct,
            "Получены живые данные трендов"
        );
        Ok(signal)
    }

    fn open_session(&self) -> Result<Client> {
        let referer = HeaderValue::from_str(&format!("{}/explore", self.base_url()))
            .map_err(|e| TrendAnalysisError::InvalidConfig(format!("trends_base_url: {}", e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(REFERER, referer);

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(self.config.request_timeout_secs()))
            .build()?;
        Ok(client)
    }

    fn explore_url(&self, keyword: &str) -> String {
        let payload = json!({
            "comparisonItem": [{
                "keyword": keyword,
                "geo": self.config.trends_geo,
                "time": self.config.trends_timeframe,
            }],
            "category": 0,
            "property": "",
        });

        format!(
            "{}/api/explore?hl={}&tz={}&req={}",
            self.base_url(),
            urlencoding::encode(&self.config.trends_hl),
            urlencoding::encode(&self.config.trends_tz),
            urlencoding::encode(&payload.to_string()),
        )
    }

    fn multiline_url(&self, widget: &WidgetToken) -> Result<String> {
        let request = serde_json::to_string(&widget.request)?;
        Ok(format!(
            "{}/api/widgetdata/multiline?hl={}&tz={}&req={}&token={}",
            self.base_url(),
            urlencoding::encode(&self.config.trends_hl),
            urlencoding::encode(&self.config.trends_tz),
            urlencoding::encode(&request),
            urlencoding::encode(&widget.token),
        ))
    }

    /// GET с повтором на уровне транспорта: 429 и 5xx повторяются с экспоненциальной
    /// задержкой внутри одного шага, не запуская протокол заново.
    async fn send_with_retry(&self, session: &Client, url: &str) -> Result<Response> {
        let max_retries = self.config.transport_retries();
        let backoff_ms = self.config.transport_backoff_ms();
        let mut attempt = 0u32;

        loop {
            let response = session.get(url).send().await?;
            let status = response.status();
            if !is_transient_status(status) || attempt >= max_retries {
                return Ok(response);
            }

            attempt += 1;
            let delay_ms = backoff_ms.saturating_mul(1u64 << (attempt - 1).min(10));
            tracing::warn!(
                attempt,
                max_retries,
                delay_ms,
                status = %status,
                "Временная ошибка источника трендов, повторяем запрос"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    async fn get_guarded_json<T: DeserializeOwned>(&self, session: &Client, url: &str) -> Result<T> {
        let response = self.send_with_retry(session, url).await?.error_for_status()?;
        let body = response.text().await?;
        decode_guarded_json(&body)
    }

    async fn pause(&self, (low, high): (f64, f64)) {
        let unit = self.config.pacing_ms();
        if unit == 0 {
            return;
        }
        let factor = rand::rng().random_range(low..high);
        tokio::time::sleep(Duration::from_millis((unit as f64 * factor) as u64)).await;
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Срезает анти-hijack префикс и следующие за ним `,` и пробелы
pub fn strip_anti_hijack_prefix(body: &str) -> &str {
    match body.strip_prefix(ANTI_HIJACK_PREFIX) {
        Some(rest) => rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace()),
        None => body,
    }
}

fn decode_guarded_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(strip_anti_hijack_prefix(body))?)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn extract_timeseries_widget(explore: ExploreResponse) -> Result<WidgetToken> {
    let widget = explore
        .widgets
        .into_iter()
        .find(|w| w.id.as_deref() == Some(TIMESERIES_WIDGET_ID))
        .ok_or_else(|| {
            TrendAnalysisError::ProtocolError("В ответе explore нет виджета TIMESERIES".to_string())
        })?;

    let token = widget.token.filter(|t| !t.is_empty()).ok_or_else(|| {
        TrendAnalysisError::ProtocolError("У виджета TIMESERIES нет токена".to_string())
    })?;
    let request = widget.request.filter(|r| !is_blank(r)).ok_or_else(|| {
        TrendAnalysisError::ProtocolError("У виджета TIMESERIES нет запроса".to_string())
    })?;

    Ok(WidgetToken { token, request })
}

fn extract_timeline_values(multiline: MultilineResponse) -> Result<Vec<f64>> {
    let timeline = multiline.default.timeline_data;
    if timeline.is_empty() {
        return Err(TrendAnalysisError::ProtocolError(
            "Источник вернул пустой timeline".to_string(),
        ));
    }

    let values: Vec<f64> = timeline
        .iter()
        .filter_map(|point| point.value.first().copied())
        .collect();

    if values.is_empty() {
        return Err(TrendAnalysisError::ProtocolError(
            "Нет значений во временном ряду".to_string(),
        ));
    }
    Ok(values)
}
