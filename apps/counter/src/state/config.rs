//! # Configuration State
//!
//! Counter configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SARI_*`)
//! 2. Defaults (this file)
//!
//! Read-only after initialization.

use serde::{Deserialize, Serialize};

use sari_core::DEFAULT_REORDER_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (printed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Reorder threshold for products added at the counter
    pub default_reorder_threshold: i64,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Sari-Sari Store".to_string(),
            currency_symbol: "₱".to_string(),
            default_reorder_threshold: DEFAULT_REORDER_THRESHOLD,
        }
    }
}

impl ConfigState {
    /// Creates a ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `SARI_STORE_NAME`: store name
    /// - `SARI_CURRENCY_SYMBOL`: currency symbol (default `₱`)
    /// - `SARI_DEFAULT_REORDER_THRESHOLD`: non-negative integer
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("SARI_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("SARI_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("SARI_DEFAULT_REORDER_THRESHOLD") {
            match raw.trim().parse::<i64>() {
                Ok(n) if n >= 0 => config.default_reorder_threshold = n,
                _ => tracing::warn!(value = %raw, "Ignoring invalid SARI_DEFAULT_REORDER_THRESHOLD"),
            }
        }

        config
    }

    /// Formats a cent amount as a currency string with thousands separators.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(123456), "₱1,234.56");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let abs = cents.unsigned_abs();
        let whole = (abs / 100).to_string();
        let frac = abs % 100;

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        format!(
            "{}{}{}.{:02}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped,
            frac
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234), "₱12.34");
        assert_eq!(config.format_currency(100), "₱1.00");
        assert_eq!(config.format_currency(1), "₱0.01");
        assert_eq!(config.format_currency(0), "₱0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(-1234), "-₱12.34");
    }

    #[test]
    fn test_format_currency_thousands() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(123_456_789), "₱1,234,567.89");
        assert_eq!(config.format_currency(100_000), "₱1,000.00");
        assert_eq!(config.format_currency(99_999), "₱999.99");
    }

    #[test]
    fn test_from_lookup() {
        let config = ConfigState::from_lookup(|key| match key {
            "SARI_CURRENCY_SYMBOL" => Some("$".to_string()),
            "SARI_DEFAULT_REORDER_THRESHOLD" => Some("12".to_string()),
            _ => None,
        });
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.default_reorder_threshold, 12);
        assert_eq!(config.store_name, "Sari-Sari Store");

        let config = ConfigState::from_lookup(|key| {
            (key == "SARI_DEFAULT_REORDER_THRESHOLD").then(|| "-3".to_string())
        });
        assert_eq!(config.default_reorder_threshold, DEFAULT_REORDER_THRESHOLD);
    }
}
