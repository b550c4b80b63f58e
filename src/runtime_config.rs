// =============================================================================
// Runtime Configuration — dashboard settings with atomic save
// =============================================================================
//
// Every tunable setting of the dashboard server lives here.  All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an older
// config file, and a partial file only overrides what it names.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::Period;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_symbol() -> String {
    "AAPL".to_string()
}

fn default_popular_symbols() -> Vec<String> {
    ["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "NVDA", "META", "NFLX"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_recent_rows() -> usize {
    10
}

fn default_display_decimals() -> u32 {
    2
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration for the StockScope server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the REST API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Symbol analysed when the dashboard opens.
    #[serde(default = "default_symbol")]
    pub default_symbol: String,

    /// Lookback used when a request does not name one.
    #[serde(default)]
    pub default_period: Period,

    /// Quick-select symbols offered by the dashboard.
    #[serde(default = "default_popular_symbols")]
    pub popular_symbols: Vec<String>,

    /// Number of trailing rows in the recent-data table.
    #[serde(default = "default_recent_rows")]
    pub recent_rows: usize,

    /// Decimal places used when displaying table values.  Never applied to
    /// the computation itself.
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,

    /// Timeout for each market-data request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Market-data provider root URL.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            default_symbol: default_symbol(),
            default_period: Period::default(),
            popular_symbols: default_popular_symbols(),
            recent_rows: default_recent_rows(),
            display_decimals: default_display_decimals(),
            request_timeout_secs: default_request_timeout_secs(),
            provider_base_url: default_provider_base_url(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            popular_symbols = ?config.popular_symbols,
            default_period = %config.default_period,
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }

    /// Apply `STOCKSCOPE_BIND_ADDR` / `STOCKSCOPE_SYMBOLS` style overrides.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("STOCKSCOPE_BIND_ADDR").filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(syms) = lookup("STOCKSCOPE_SYMBOLS") {
            let parsed = normalise_symbols(syms.split(','));
            if !parsed.is_empty() {
                self.popular_symbols = parsed;
            }
        }
    }
}

/// Trim, uppercase and drop empty / repeated symbols, keeping first-seen order.
pub fn normalise_symbols<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for s in raw {
        let s = s.trim().to_uppercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
        assert_eq!(cfg.default_symbol, "AAPL");
        assert_eq!(cfg.default_period, Period::OneYear);
        assert_eq!(cfg.popular_symbols.len(), 8);
        assert_eq!(cfg.popular_symbols[0], "AAPL");
        assert_eq!(cfg.popular_symbols[7], "NFLX");
        assert_eq!(cfg.recent_rows, 10);
        assert_eq!(cfg.display_decimals, 2);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "default_period": "6mo", "popular_symbols": ["IBM"] }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.default_period, Period::SixMonths);
        assert_eq!(cfg.popular_symbols, vec!["IBM"]);
        assert_eq!(cfg.recent_rows, 10);
    }

    #[test]
    fn invalid_period_is_rejected() {
        let json = r#"{ "default_period": "3w" }"#;
        assert!(serde_json::from_str::<AppConfig>(json).is_err());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("stockscope-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stockscope_config.json");

        let mut cfg = AppConfig::default();
        cfg.popular_symbols = vec!["IBM".into(), "ORCL".into()];
        cfg.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(AppConfig::load("/definitely/not/here.json").is_err());
    }

    #[test]
    fn overrides_apply() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|key| match key {
            "STOCKSCOPE_BIND_ADDR" => Some("127.0.0.1:9000".into()),
            "STOCKSCOPE_SYMBOLS" => Some(" msft, ,ibm,MSFT ".into()),
            _ => None,
        });
        assert_eq!(cfg.bind_addr, "127.0.0.1:9000");
        assert_eq!(cfg.popular_symbols, vec!["MSFT", "IBM"]);
    }

    #[test]
    fn empty_symbol_override_keeps_defaults() {
        let mut cfg = AppConfig::default();
        cfg.apply_overrides(|key| (key == "STOCKSCOPE_SYMBOLS").then(|| " , ".to_string()));
        assert_eq!(cfg.popular_symbols, default_popular_symbols());
    }
}
