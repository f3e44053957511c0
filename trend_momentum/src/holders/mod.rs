pub mod cache;
pub mod signal_table;

pub use cache::TtlCache;
pub use signal_table::{KeywordRow, MarketplaceRow, PinterestRow, SignalTable};
