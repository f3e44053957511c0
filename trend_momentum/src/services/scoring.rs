//! Чистые функции расчёта Trend Momentum Score: без I/O, детерминированы.

use crate::models::{
    Action, Classification, MarketplaceSignal, PinterestSignal, Recommendation, TrendSignal,
};
use crate::normalizer::round1;

pub const GOOGLE_WEIGHT: f64 = 0.45;
pub const MARKETPLACE_WEIGHT: f64 = 0.35;
pub const PINTEREST_WEIGHT: f64 = 0.20;

pub const MIXED_SIGNALS: &str = "Mixed signals across all channels.";

/// TMS = Google × 0.45 + Marketplace × 0.35 + Pinterest × 0.20
pub fn compute_trend_score(
    google: &TrendSignal,
    marketplace: &MarketplaceSignal,
    pinterest: &PinterestSignal,
) -> f64 {
    round1(
        google.normalized_score * GOOGLE_WEIGHT
            + marketplace.normalized_score * MARKETPLACE_WEIGHT
            + pinterest.normalized_score * PINTEREST_WEIGHT,
    )
}

/// Лестница порогов сверху вниз, срабатывает первое совпадение.
/// Рост в Google отсекает ключи с высоким, но плоским счётом от Accelerating.
pub fn classify(trend_score: f64, google_growth_pct: f64) -> Classification {
    if trend_score >= 70.0 && google_growth_pct >= 15.0 {
        Classification::Accelerating
    } else if trend_score >= 55.0 && google_growth_pct >= 5.0 {
        Classification::Emerging
    } else if trend_score >= 35.0 {
        Classification::Stable
    } else {
        Classification::Declining
    }
}

pub fn recommend(classification: Classification, trend_score: f64) -> Recommendation {
    let (action, adjustment_pct) = match classification {
        Classification::Accelerating => (Action::Increase, if trend_score >= 80.0 { 30 } else { 20 }),
        Classification::Emerging => (Action::Increase, 10),
        Classification::Stable => (Action::Maintain, 0),
        Classification::Declining => (Action::Reduce, if trend_score < 25.0 { -20 } else { -10 }),
    };
    Recommendation {
        action,
        adjustment_pct,
    }
}

/// Человекочитаемое объяснение: независимые фразы по каждому сигналу
pub fn build_explanation(
    google: &TrendSignal,
    marketplace: &MarketplaceSignal,
    pinterest: &PinterestSignal,
) -> String {
    let mut parts = Vec::new();

    let g_growth = google.growth_pct;
    if g_growth >= 15.0 {
        parts.push(format!("Strong Google search surge (+{:.0}% vs 4-week avg)", g_growth));
    } else if g_growth >= 5.0 {
        parts.push(format!("Moderate Google search growth (+{:.0}%)", g_growth));
    } else if g_growth < 0.0 {
        parts.push(format!("Declining Google search interest ({:.0}%)", g_growth));
    }

    let rv = marketplace.rank_velocity;
    if rv >= 10.0 {
        parts.push(format!("rising marketplace rank (+{:.0} positions in 7 days)", rv));
    } else if rv < 0.0 {
        parts.push(format!("falling marketplace rank ({:.0} positions in 7 days)", rv));
    }

    let sg = pinterest.save_growth_pct;
    if sg >= 15.0 {
        parts.push(format!("high Pinterest save rate (+{:.0}%)", sg));
    } else if sg < 0.0 {
        parts.push(format!("declining Pinterest engagement ({:.0}%)", sg));
    }

    if parts.is_empty() {
        return MIXED_SIGNALS.to_string();
    }

    format!("{}.", capitalize_first(&parts.join(". ")))
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
