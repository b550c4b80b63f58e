// =============================================================================
// Central Application State — StockScope server
// =============================================================================
//
// Shared by every request handler through `Arc<AppState>`.  The indicator
// engine is stateless, so nothing derived from a price series is stored here:
// each analysis request fetches and derives afresh.
//
// Thread safety:
//   - Atomic counters for lock-free request accounting.
//   - parking_lot::RwLock for the config and the notice log.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;

use crate::indicators::IndicatorEngine;
use crate::market_data::YahooClient;
use crate::runtime_config::AppConfig;

// =============================================================================
// Notice Record
// =============================================================================

/// A user-visible failure notice (e.g. a symbol the provider could not serve).
#[derive(Debug, Clone, Serialize)]
pub struct NoticeRecord {
    pub symbol: String,
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

/// Maximum number of recent notices to retain.
const MAX_RECENT_NOTICES: usize = 50;

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    pub config: RwLock<AppConfig>,
    /// Where watchlist edits are persisted.
    pub config_path: PathBuf,

    pub market_data: YahooClient,
    pub engine: IndicatorEngine,

    pub analyses_served: AtomicU64,
    pub recent_notices: RwLock<Vec<NoticeRecord>>,

    /// Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct the state and the market-data client described by `config`.
    pub fn new(config: AppConfig, config_path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let market_data = YahooClient::new(
            config.provider_base_url.clone(),
            std::time::Duration::from_secs(config.request_timeout_secs),
        )?;

        Ok(Self {
            config: RwLock::new(config),
            config_path: config_path.into(),
            market_data,
            engine: IndicatorEngine::new(),
            analyses_served: AtomicU64::new(0),
            recent_notices: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        })
    }

    /// Count a completed analysis and return the new total.
    pub fn record_analysis(&self) -> u64 {
        self.analyses_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn analyses_served(&self) -> u64 {
        self.analyses_served.load(Ordering::Relaxed)
    }

    /// Record a failure notice.  Oldest entries are evicted past
    /// [`MAX_RECENT_NOTICES`].
    pub fn push_notice(&self, symbol: &str, message: String) {
        let record = NoticeRecord {
            symbol: symbol.to_string(),
            message,
            at: Utc::now().to_rfc3339(),
        };

        let mut notices = self.recent_notices.write();
        notices.push(record);
        while notices.len() > MAX_RECENT_NOTICES {
            notices.remove(0);
        }
    }

    /// Replace the popular-symbol list and persist the config.
    ///
    /// The write guard is held across the save so concurrent updates land on
    /// disk in the same order as in memory.  A failed save leaves the
    /// in-memory update in place.
    pub fn replace_watchlist(&self, symbols: Vec<String>) -> anyhow::Result<()> {
        let mut config = self.config.write();
        config.popular_symbols = symbols;
        config.save(&self.config_path)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(AppConfig::default(), "unused.json").unwrap()
    }

    #[test]
    fn analysis_counter_increments() {
        let s = state();
        assert_eq!(s.analyses_served(), 0);
        assert_eq!(s.record_analysis(), 1);
        assert_eq!(s.record_analysis(), 2);
        assert_eq!(s.analyses_served(), 2);
    }

    #[test]
    fn concurrent_watchlist_updates_persist_last_write() {
        let dir = std::env::temp_dir().join(format!("stockscope-state-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stockscope_config.json");
        let s = std::sync::Arc::new(AppState::new(AppConfig::default(), &path).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = s.clone();
                std::thread::spawn(move || s.replace_watchlist(vec![format!("SYM{i}")]))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }

        let on_disk = AppConfig::load(&path).unwrap();
        assert_eq!(on_disk.popular_symbols, s.config.read().popular_symbols);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_save_keeps_in_memory_update() {
        let s = AppState::new(AppConfig::default(), "/definitely/not/here/cfg.json").unwrap();
        assert!(s.replace_watchlist(vec!["IBM".into()]).is_err());
        assert_eq!(s.config.read().popular_symbols, vec!["IBM"]);
    }

    #[test]
    fn notice_log_is_capped() {
        let s = state();
        for i in 0..(MAX_RECENT_NOTICES + 5) {
            s.push_notice("ZZZZ", format!("failure {i}"));
        }
        let notices = s.recent_notices.read();
        assert_eq!(notices.len(), MAX_RECENT_NOTICES);
        assert_eq!(notices[0].message, "failure 5");
    }
}
