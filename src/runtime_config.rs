// =============================================================================
// Runtime Configuration: JSON settings with env overrides and atomic save
// =============================================================================
//
// Every tunable lives here: instrument, order size, polling cadence, feed
// endpoint, and the signal / risk parameters.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file.  Persistence uses an atomic tmp + rename.
//
// The account mode is never read from or written to the file: Live trading is
// only enabled by SCALPER_ACCOUNT_MODE for the current process.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::risk::RiskParams;
use crate::strategy::SignalParams;
use crate::types::AccountMode;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "RELIANCE".to_string()
}

fn default_instrument_key() -> String {
    "NSE_EQ|INE002A01018".to_string()
}

fn default_quantity() -> u32 {
    10
}

fn default_poll_interval_secs() -> u64 {
    1
}

fn default_min_candles() -> usize {
    25
}

fn default_candle_interval_secs() -> u64 {
    60
}

fn default_max_ticks() -> usize {
    100_000
}

fn default_feed_url() -> String {
    "ws://127.0.0.1:8765/ticks".to_string()
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

fn default_broker_base_url() -> String {
    "https://api.upstox.com/v2".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the scalper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Demo fills orders locally; Live sends them to the broker.
    #[serde(skip)]
    pub account_mode: AccountMode,

    // --- Instrument ----------------------------------------------------------

    /// Trading symbol, e.g. "RELIANCE".
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Broker instrument key used for both the feed and order placement.
    #[serde(default = "default_instrument_key")]
    pub instrument_key: String,

    /// Fixed order quantity.
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    // --- Loop & feed ---------------------------------------------------------

    /// Seconds between trading-loop polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// The trader is only consulted once more than this many bars exist.
    #[serde(default = "default_min_candles")]
    pub min_candles: usize,

    /// Bar width for tick resampling.
    #[serde(default = "default_candle_interval_secs")]
    pub candle_interval_secs: u64,

    /// Capacity of the tick ring buffer.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,

    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,

    #[serde(default = "default_broker_base_url")]
    pub broker_base_url: String,

    // --- Strategy ------------------------------------------------------------

    #[serde(default)]
    pub signal: SignalParams,

    #[serde(default)]
    pub risk: RiskParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            account_mode: AccountMode::Demo,
            symbol: default_symbol(),
            instrument_key: default_instrument_key(),
            quantity: default_quantity(),
            poll_interval_secs: default_poll_interval_secs(),
            min_candles: default_min_candles(),
            candle_interval_secs: default_candle_interval_secs(),
            max_ticks: default_max_ticks(),
            feed_url: default_feed_url(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
            broker_base_url: default_broker_base_url(),
            signal: SignalParams::default(),
            risk: RiskParams::default(),
        }
    }
}

impl RuntimeConfig {
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
            symbol = %config.symbol,
            "config loaded"
        );

        Ok(config)
    }

    /// Load `path`, or write the defaults there on first run.
    ///
    /// Must be called before `apply_env` so that overrides stay out of the
    /// file.
    pub fn load_or_init(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let config = Self::default();
        config.save(path)?;
        info!(path = %path.display(), "default config written");
        Ok(config)
    }

    /// Persist the configuration to `path` (write `.tmp`, then rename).
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

    /// Apply `SCALPER_*` environment overrides through `lookup` (normally
    /// `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(sym) = lookup("SCALPER_SYMBOL") {
            let sym = sym.trim().to_uppercase();
            if !sym.is_empty() {
                self.symbol = sym;
            }
        }
        if let Some(key) = lookup("SCALPER_INSTRUMENT_KEY") {
            self.instrument_key = key.trim().to_string();
        }
        if let Some(url) = lookup("SCALPER_FEED_URL") {
            self.feed_url = url.trim().to_string();
        }
        if let Some(mode) = lookup("SCALPER_ACCOUNT_MODE") {
            self.account_mode = mode.parse()?;
        }
        if let Some(qty) = lookup("SCALPER_QUANTITY") {
            self.quantity = qty
                .trim()
                .parse()
                .with_context(|| format!("invalid SCALPER_QUANTITY: {qty}"))?;
        }
        Ok(())
    }
}
