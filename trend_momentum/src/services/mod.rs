pub mod fetcher;
pub mod pipeline;
pub mod scoring;
pub mod signals;
pub mod trends;

pub use fetcher::TrendFetcherService;
pub use pipeline::AnalysisService;
pub use signals::SignalGatewayService;
pub use trends::TrendsClient;
