use crate::config::AppConfig;
use crate::holders::{MarketplaceRow, PinterestRow, SignalTable};
use crate::models::{MarketplaceSignal, PinterestSignal};
use crate::normalizer::{bound, growth_pct, percent_of_range, round1};

// Улучшение на 50 позиций за неделю считаем максимальным
const MAX_RANK_VELOCITY: f64 = 50.0;

/// Сигналы маркетплейса и Pinterest из статичных таблиц.
/// Никогда не возвращает ошибку: нет строки или таблицы -> нейтральные значения.
#[derive(Clone)]
pub struct SignalGatewayService {
    marketplace: SignalTable<MarketplaceRow>,
    pinterest: SignalTable<PinterestRow>,
}

impl SignalGatewayService {
    pub fn new(marketplace: SignalTable<MarketplaceRow>, pinterest: SignalTable<PinterestRow>) -> Self {
        SignalGatewayService {
            marketplace,
            pinterest,
        }
    }

    pub fn load(config: &AppConfig) -> Self {
        Self::new(
            SignalTable::load(&config.marketplace_csv, "marketplace"),
            SignalTable::load(&config.pinterest_csv, "pinterest"),
        )
    }

    pub fn marketplace_signal(&self, keyword: &str) -> MarketplaceSignal {
        let Some(row) = self.marketplace.get(keyword) else {
            tracing::warn!(keyword, "Ключевое слово не найдено в данных маркетплейса");
            return MarketplaceSignal::neutral_fallback();
        };

        // > 0: позиция выросла (было 30-е место, стало 12-е = +18)
        let rank_velocity = (row.rank_7d_ago - row.rank_today) as f64;
        let sales_growth = growth_pct(row.weekly_sales_units, row.sales_4w_avg);

        // Округляется только итоговая сумма
        let velocity_norm = percent_of_range(rank_velocity, 0.0, MAX_RANK_VELOCITY);
        let sales_norm = bound(sales_growth, 0.0, 100.0);

        MarketplaceSignal {
            current_rank: row.rank_today,
            rank_7d_ago: row.rank_7d_ago,
            rank_velocity: round1(rank_velocity),
            sales_growth_pct: round1(sales_growth),
            normalized_score: round1(velocity_norm * 0.6 + sales_norm * 0.4),
        }
    }

    pub fn pinterest_signal(&self, keyword: &str) -> PinterestSignal {
        let Some(row) = self.pinterest.get(keyword) else {
            tracing::warn!(keyword, "Ключевое слово не найдено в данных Pinterest");
            return PinterestSignal::neutral_fallback();
        };

        let save_growth = growth_pct(row.weekly_saves, row.saves_4w_avg);
        let board_growth = growth_pct(row.board_count, row.boards_4w_avg);

        // Сохранения - более сильный сигнал, чем доски
        let save_norm = bound(save_growth, 0.0, 100.0);
        let board_norm = bound(board_growth, 0.0, 100.0);

        PinterestSignal {
            weekly_saves: row.weekly_saves as i64,
            save_growth_pct: round1(save_growth),
            board_count: row.board_count as i64,
            board_growth_pct: round1(board_growth),
            normalized_score: round1(save_norm * 0.7 + board_norm * 0.3),
        }
    }
}
