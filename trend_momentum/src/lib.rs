use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod holders;
pub mod models;
pub mod normalizer;
pub mod routers;
pub mod services;

pub use config::{load_config, AppConfig};
pub use errors::{ErrorKind, Result, TrendAnalysisError};
pub use holders::{MarketplaceRow, PinterestRow, SignalTable, TtlCache};
pub use models::{
    Action, Classification, CompositeResult, MarketplaceSignal, PinterestSignal, Recommendation,
    SignalSource, Signals, SummaryItem, TrendSignal,
};
pub use services::{AnalysisService, SignalGatewayService, TrendFetcherService, TrendsClient};

#[derive(Clone)]
pub struct AppState {
    pub analysis: AnalysisService,
    pub keywords: Arc<Vec<String>>,
}

impl AppState {
    /// Собирает все сервисы из конфигурации; CSV-таблицы читаются здесь один раз
    pub fn from_config(config: &AppConfig) -> Self {
        let gateway = SignalGatewayService::load(config);
        Self::with_gateway(config, gateway)
    }

    pub fn with_gateway(config: &AppConfig, gateway: SignalGatewayService) -> Self {
        let fetcher = TrendFetcherService::new(config.clone());
        AppState {
            analysis: AnalysisService::new(fetcher, gateway, config),
            keywords: Arc::new(config.keywords.clone()),
        }
    }
}
