// =============================================================================
// Symbol metadata passthrough
// =============================================================================
//
// A plain lookup result from the provider.  Nothing here is computed from the
// price series; the display form only formats what the provider sent.

use serde::{Deserialize, Serialize};

/// Placeholder shown for any field the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Raw metadata for one symbol.  Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    /// Fraction, e.g. `0.0052` for 0.52 %.
    pub dividend_yield: Option<f64>,
}

/// Display strings for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolInfoDisplay {
    pub company: String,
    pub sector: String,
    pub market_cap: String,
    pub pe_ratio: String,
    pub dividend_yield: String,
}

impl SymbolInfo {
    /// Format every field, substituting [`NOT_AVAILABLE`].
    ///
    /// Numeric zeros are treated as missing: providers report 0 for "no
    /// dividend" or "no earnings" as often as they omit the field.
    pub fn display(&self) -> SymbolInfoDisplay {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let number = |v: Option<f64>, fmt: fn(f64) -> String| {
            v.filter(|x| *x != 0.0)
                .map(fmt)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        SymbolInfoDisplay {
            company: text(&self.company_name),
            sector: text(&self.sector),
            market_cap: number(self.market_cap, |v| format!("${}", group_thousands(v))),
            pe_ratio: number(self.trailing_pe, |v| format!("{v:.2}")),
            dividend_yield: number(self.dividend_yield, |v| format!("{:.2}%", v * 100.0)),
        }
    }
}

/// Round to a whole number and insert `,` every three digits.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3 + 1);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_info_formats() {
        let info = SymbolInfo {
            company_name: Some("Apple Inc.".into()),
            sector: Some("Technology".into()),
            market_cap: Some(2_890_123_456_789.4),
            trailing_pe: Some(29.4123),
            dividend_yield: Some(0.0052),
        };
        let d = info.display();
        assert_eq!(d.company, "Apple Inc.");
        assert_eq!(d.sector, "Technology");
        assert_eq!(d.market_cap, "$2,890,123,456,789");
        assert_eq!(d.pe_ratio, "29.41");
        assert_eq!(d.dividend_yield, "0.52%");
    }

    #[test]
    fn missing_fields_show_placeholder() {
        let d = SymbolInfo::default().display();
        assert_eq!(d.company, NOT_AVAILABLE);
        assert_eq!(d.sector, NOT_AVAILABLE);
        assert_eq!(d.market_cap, NOT_AVAILABLE);
        assert_eq!(d.pe_ratio, NOT_AVAILABLE);
        assert_eq!(d.dividend_yield, NOT_AVAILABLE);
    }

    #[test]
    fn zero_numbers_show_placeholder() {
        let info = SymbolInfo {
            dividend_yield: Some(0.0),
            trailing_pe: Some(0.0),
            ..SymbolInfo::default()
        };
        let d = info.display();
        assert_eq!(d.dividend_yield, NOT_AVAILABLE);
        assert_eq!(d.pe_ratio, NOT_AVAILABLE);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(1_234_567.6), "1,234,568");
        assert_eq!(group_thousands(-12_345.0), "-12,345");
    }
}
