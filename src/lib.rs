// =============================================================================
// StockScope — technical-indicator analysis for daily equity bars
// =============================================================================

pub mod api;
pub mod app_state;
pub mod error;
pub mod indicators;
pub mod market_data;
pub mod report;
pub mod runtime_config;
pub mod types;
