use std::time::Duration;

use rand::Rng;

use crate::config::AppConfig;
use crate::errors::{Result, TrendAnalysisError};
use crate::holders::TtlCache;
use crate::models::TrendSignal;
use crate::services::trends::TrendsClient;

/// Обёртка над [`TrendsClient`]: короткий кэш, жёсткий таймаут на попытку,
/// ограниченные повторы и нейтральный сигнал вместо ошибки.
#[derive(Clone)]
pub struct TrendFetcherService {
    client: TrendsClient,
    cache: TtlCache<TrendSignal>,
    config: AppConfig,
}

impl TrendFetcherService {
    pub fn new(config: AppConfig) -> Self {
        let cache = TtlCache::new(Duration::from_secs(config.trends_cache_ttl_secs()));
        TrendFetcherService {
            client: TrendsClient::new(config.clone()),
            cache,
            config,
        }
    }

    /// Всегда возвращает сигнал: живой, из кэша или нейтральный fallback
    pub async fn fetch(&self, keyword: &str) -> TrendSignal {
        if let Some(signal) = self.cache.get(keyword).await {
            tracing::debug!(keyword, "Сигнал трендов взят из кэша");
            return signal;
        }

        let max_attempts = self.config.max_attempts();
        for attempt in 1..=max_attempts {
            match self.fetch_with_timeout(keyword).await {
                Ok(signal) => {
                    self.cache.set(keyword, signal.clone()).await;
                    return signal;
                }
                Err(e) => {
                    tracing::warn!(
                        keyword,
                        attempt,
                        max_attempts,
                        kind = ?e.kind(),
                        "Попытка получения трендов не удалась: {}",
                        e
                    );
                    if attempt < max_attempts {
                        let delay = self.retry_delay(attempt);
                        tracing::info!(keyword, delay_ms = delay.as_millis() as u64, "Повтор через паузу");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        tracing::warn!(keyword, reason = "all_retries_exhausted", "Используем нейтральный сигнал трендов");
        TrendSignal::neutral_fallback()
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.size().await
    }

    /// Одна попытка в отдельной задаче. По таймауту задача прерывается,
    /// а её результат отбрасывается.
    async fn fetch_with_timeout(&self, keyword: &str) -> Result<TrendSignal> {
        let limit = Duration::from_secs(self.config.fetch_timeout_secs());
        let client = self.client.clone();
        let keyword = keyword.to_string();
        let mut task = tokio::spawn(async move { client.fetch_live(&keyword).await });

        match tokio::time::timeout(limit, &mut task).await {
            Ok(joined) => joined?,
            Err(_) => {
                task.abort();
                Err(TrendAnalysisError::Timeout(limit))
            }
        }
    }

    // base × номер попытки + случайный jitter из [0, retry_jitter_ms]
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self.config.retry_delay_ms().saturating_mul(u64::from(attempt));
        let jitter_max = self.config.retry_jitter_ms();
        let jitter = if jitter_max == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_max)
        };
        Duration::from_millis(base + jitter)
    }
}
