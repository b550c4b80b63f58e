pub mod info;
pub mod yahoo;

// Re-export for convenient access (e.g. `use crate::market_data::YahooClient`).
pub use info::{SymbolInfo, SymbolInfoDisplay};
pub use yahoo::YahooClient;
