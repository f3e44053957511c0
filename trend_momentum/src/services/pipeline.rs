use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::config::AppConfig;
use crate::holders::TtlCache;
use crate::models::{CompositeResult, Signals};
use crate::services::fetcher::TrendFetcherService;
use crate::services::scoring;
use crate::services::signals::SignalGatewayService;

#[derive(Clone)]
pub struct AnalysisService {
    fetcher: TrendFetcherService,
    gateway: SignalGatewayService,
    cache: TtlCache<CompositeResult>,
    max_concurrent: usize,
}

impl AnalysisService {
    pub fn new(fetcher: TrendFetcherService, gateway: SignalGatewayService, config: &AppConfig) -> Self {
        AnalysisService {
            fetcher,
            gateway,
            cache: TtlCache::new(Duration::from_secs(config.result_cache_ttl_secs())),
            max_concurrent: config.max_concurrent_requests().max(1),
        }
    }

    /// Полный анализ одного ключевого слова: кэш, либо сбор сигналов и расчёт
    pub async fn analyze(&self, keyword: &str) -> CompositeResult {
        let cache_key = format!("analysis:{}", keyword);
        if let Some(mut cached) = self.cache.get(&cache_key).await {
            tracing::debug!(keyword, "Результат анализа взят из кэша");
            cached.cached = true;
            return cached;
        }

        let google = self.fetcher.fetch(keyword).await;
        let marketplace = self.gateway.marketplace_signal(keyword);
        let pinterest = self.gateway.pinterest_signal(keyword);

        let trend_score = scoring::compute_trend_score(&google, &marketplace, &pinterest);
        let classification = scoring::classify(trend_score, google.growth_pct);
        let recommendation = scoring::recommend(classification, trend_score);
        let explanation = scoring::build_explanation(&google, &marketplace, &pinterest);

        tracing::info!(
            keyword,
            trend_score,
            classification = ?classification,
            action = ?recommendation.action,
            source = ?google.source,
            "Ключевое слово проанализировано"
        );

        let result = CompositeResult {
            keyword: keyword.to_string(),
            trend_score,
            classification,
            recommendation,
            explanation,
            signals: Signals {
                google_trends: google,
                marketplace,
                pinterest,
            },
            generated_at: Utc::now(),
            cached: false,
        };

        self.cache.set(cache_key, result.clone()).await;
        result
    }

    /// Анализ списка ключевых слов в исходном порядке; параллельность ограничена
    /// `max_concurrent_requests` (по умолчанию 1, то есть последовательно).
    pub async fn summary(&self, keywords: &[String]) -> Vec<CompositeResult> {
        stream::iter(keywords.iter().cloned())
            .map(|keyword| async move { self.analyze(&keyword).await })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    pub async fn cache_size(&self) -> usize {
        self.cache.size().await
    }
}
