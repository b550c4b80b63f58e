// =============================================================================
// Shared types used across StockScope
// =============================================================================

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PeriodParseError;

/// One daily OHLCV observation for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Collect the close prices of `bars` in order.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Lookback window requested from the market-data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Period {
    /// Every recognised period, shortest first.
    pub const ALL: [Period; 8] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    /// Wire code understood by the provider (`range=` query value).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::OneYear
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| PeriodParseError {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Period {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parses_every_code() {
        for p in Period::ALL {
            assert_eq!(p.as_str().parse::<Period>().unwrap(), p);
        }
    }

    #[test]
    fn period_parse_is_case_insensitive() {
        assert_eq!("1MO".parse::<Period>().unwrap(), Period::OneMonth);
        assert_eq!(" 5y ".parse::<Period>().unwrap(), Period::FiveYears);
    }

    #[test]
    fn period_rejects_unknown_code() {
        let err = "10y".parse::<Period>().unwrap_err();
        assert_eq!(err.value, "10y");
    }

    #[test]
    fn period_default_is_one_year() {
        assert_eq!(Period::default(), Period::OneYear);
    }

    #[test]
    fn period_serde_uses_wire_code() {
        let json = serde_json::to_string(&Period::ThreeMonths).unwrap();
        assert_eq!(json, "\"3mo\"");
        let back: Period = serde_json::from_str("\"6mo\"").unwrap();
        assert_eq!(back, Period::SixMonths);
        assert!(serde_json::from_str::<Period>("\"2w\"").is_err());
    }

    #[test]
    fn closes_preserves_order() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bars = vec![
            Bar::new(d, 1.0, 1.0, 1.0, 3.0, 0),
            Bar::new(d.succ_opt().unwrap(), 1.0, 1.0, 1.0, 4.0, 0),
        ];
        assert_eq!(closes(&bars), vec![3.0, 4.0]);
    }
}
