//! Runtime configuration for the warehouse agents.

/// Quantity below which an item counts as low on stock.
pub const LOW_STOCK_THRESHOLD: i64 = 3;

/// Environment variable overriding [`WarehouseConfig::low_stock_threshold`].
pub const LOW_STOCK_THRESHOLD_ENV: &str = "WAREHOUSE_LOW_STOCK_THRESHOLD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarehouseConfig {
    /// Items whose quantity is strictly below this value raise a "Low Stock" alert.
    pub low_stock_threshold: i64,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }
}

impl WarehouseConfig {
    /// Build a config from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(LOW_STOCK_THRESHOLD_ENV) {
            match raw.trim().parse::<i64>() {
                Ok(threshold) => config.low_stock_threshold = threshold,
                Err(_) => tracing::warn!(
                    value = %raw,
                    "{LOW_STOCK_THRESHOLD_ENV} is not an integer; using default {LOW_STOCK_THRESHOLD}"
                ),
            }
        }

        config
    }
}
