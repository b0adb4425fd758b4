pub mod bar;
pub mod live_feed;
pub mod provider;
pub mod yahoo;

// Re-export the core records for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{Bar, Tick};
pub use live_feed::TickBuffer;
pub use provider::MarketDataProvider;
pub use yahoo::YahooFinanceProvider;
