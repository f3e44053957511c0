use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalizer::{clamp, growth_pct, round1};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Live,
    Fallback,
}

/// Сигнал поискового интереса за последние ~4 недели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    pub current_interest: f64,
    pub four_week_avg: f64,
    pub growth_pct: f64,
    pub normalized_score: f64, // 0..100
    pub source: SignalSource,
}

impl TrendSignal {
    /// Строит живой сигнал из точек временного ряда (последняя точка = текущее значение).
    /// Возвращает `None` для пустого ряда.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let current = *values.last()?;
        let four_week_avg = values.iter().sum::<f64>() / values.len() as f64;

        Some(TrendSignal {
            current_interest: round1(current),
            four_week_avg: round1(four_week_avg),
            growth_pct: round1(growth_pct(current, four_week_avg)),
            // Источник уже отдаёт шкалу 0-100
            normalized_score: clamp(current, 0.0, 100.0),
            source: SignalSource::Live,
        })
    }

    pub fn neutral_fallback() -> Self {
        TrendSignal {
            current_interest: 50.0,
            four_week_avg: 50.0,
            growth_pct: 0.0,
            normalized_score: 50.0,
            source: SignalSource::Fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceSignal {
    pub current_rank: i64,
    pub rank_7d_ago: i64,
    pub rank_velocity: f64, // > 0 = позиция улучшилась
    pub sales_growth_pct: f64,
    pub normalized_score: f64,
}

impl MarketplaceSignal {
    pub fn neutral_fallback() -> Self {
        MarketplaceSignal {
            current_rank: 50,
            rank_7d_ago: 50,
            rank_velocity: 0.0,
            sales_growth_pct: 0.0,
            normalized_score: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinterestSignal {
    pub weekly_saves: i64,
    pub save_growth_pct: f64,
    pub board_count: i64,
    pub board_growth_pct: f64,
    pub normalized_score: f64,
}

impl PinterestSignal {
    pub fn neutral_fallback() -> Self {
        PinterestSignal {
            weekly_saves: 0,
            save_growth_pct: 0.0,
            board_count: 0,
            board_growth_pct: 0.0,
            normalized_score: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Accelerating,
    Emerging,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Increase,
    Maintain,
    Reduce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "recommendation")]
    pub action: Action,
    pub adjustment_pct: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub google_trends: TrendSignal,
    pub marketplace: MarketplaceSignal,
    pub pinterest: PinterestSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub keyword: String,
    pub trend_score: f64,
    pub classification: Classification,
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub explanation: String,
    pub signals: Signals,
    pub generated_at: DateTime<Utc>,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct SignalScores {
    pub google_trends_score: f64,
    pub marketplace_score: f64,
    pub pinterest_score: f64,
}

/// Облегчённая строка для списка на дашборде
#[derive(Debug, Serialize)]
pub struct SummaryItem {
    pub keyword: String,
    pub trend_score: f64,
    pub classification: Classification,
    pub recommendation: Action,
    pub adjustment_pct: i32,
    pub signals: SignalScores,
}

impl From<&CompositeResult> for SummaryItem {
    fn from(result: &CompositeResult) -> Self {
        SummaryItem {
            keyword: result.keyword.clone(),
            trend_score: result.trend_score,
            classification: result.classification,
            recommendation: result.recommendation.action,
            adjustment_pct: result.recommendation.adjustment_pct,
            signals: SignalScores {
                google_trends_score: result.signals.google_trends.normalized_score,
                marketplace_score: result.signals.marketplace.normalized_score,
                pinterest_score: result.signals.pinterest.normalized_score,
            },
        }
    }
}
