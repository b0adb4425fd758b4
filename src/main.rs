// =============================================================================
// VWAP Scalper: Main Entry Point
// =============================================================================
//
//   vwap-scalper [live]                         stream ticks and trade
//   vwap-scalper report [SYMBOL] [INTERVAL] [START]
//
// Live mode starts in Demo (paper) account mode unless SCALPER_ACCOUNT_MODE=Live
// is set for this process.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod broker;
mod indicators;
mod market_data;
mod report;
mod risk;
mod runtime_config;
mod strategy;
mod trader;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::broker::{Broker, PaperBroker, UpstoxBroker};
use crate::market_data::{TickBuffer, YahooFinanceProvider};
use crate::report::ReportArgs;
use crate::runtime_config::RuntimeConfig;
use crate::trader::{Trader, TraderSettings};
use crate::types::AccountMode;

const CONFIG_PATH: &str = "scalper_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "live".to_string());

    match mode.as_str() {
        "report" => {
            let report_args = ReportArgs::from_args(args)?;
            let provider = YahooFinanceProvider::new()?;
            report::run(&provider, &report_args).await?;
            Ok(())
        }
        "live" => run_live().await,
        other => anyhow::bail!("unknown mode {other:?}, expected `live` or `report`"),
    }
}

async fn run_live() -> anyhow::Result<()> {
    let mut config = RuntimeConfig::load_or_init(CONFIG_PATH).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok())?;

    info!(
        symbol = %config.symbol,
        instrument_key = %config.instrument_key,
        account_mode = %config.account_mode,
        quantity = config.quantity,
        "VWAP scalper starting"
    );

    // ── 2. Broker ────────────────────────────────────────────────────────
    let broker: Arc<dyn Broker> = match config.account_mode {
        AccountMode::Demo => Arc::new(PaperBroker::new()),
        AccountMode::Live => {
            let token = std::env::var("UPSTOX_ACCESS_TOKEN")
                .context("UPSTOX_ACCESS_TOKEN must be set in Live mode")?;
            Arc::new(UpstoxBroker::new(config.broker_base_url.clone(), &token)?)
        }
    };

    // ── 3. Tick stream ───────────────────────────────────────────────────
    let ticks = Arc::new(TickBuffer::new(config.max_ticks, config.candle_interval_secs));

    let feed_buffer = ticks.clone();
    let feed_url = config.feed_url.clone();
    let instrument = config.instrument_key.clone();
    let reconnect = tokio::time::Duration::from_secs(config.reconnect_delay_secs);
    tokio::spawn(async move {
        loop {
            if let Err(e) =
                market_data::live_feed::run_tick_stream(&feed_url, &instrument, &feed_buffer).await
            {
                error!(instrument = %instrument, error = %e, "Tick stream error — reconnecting");
            }
            if feed_buffer.is_empty() {
                warn!(url = %feed_url, "no ticks received yet");
            }
            tokio::time::sleep(reconnect).await;
        }
    });

    // ── 4. Trading loop ──────────────────────────────────────────────────
    let mut trader = Trader::new(
        broker,
        TraderSettings {
            symbol: config.symbol.clone(),
            instrument_key: config.instrument_key.clone(),
            quantity: config.quantity,
            signal: config.signal.clone(),
            risk: config.risk.clone(),
        },
    );
    let loop_buffer = ticks.clone();
    let min_candles = config.min_candles;
    let poll = tokio::time::Duration::from_secs(config.poll_interval_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll);
        loop {
            interval.tick().await;

            let candles = match loop_buffer.get_candles() {
                Some(c) if c.len() > min_candles => c,
                _ => continue,
            };

            match trader.on_new_candle(&candles).await {
                Ok(Some(entry)) => {
                    info!(
                        side = %entry.side,
                        order_id = %entry.confirmation.order_id,
                        state = ?trader.state(),
                        "position entered"
                    );
                }
                Ok(None) => {}
                Err(e) => error!(error = %e, "trading step failed"),
            }
        }
    });

    info!("Feed and trading loop running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!(buffered_ticks = ticks.len(), "Shutdown signal received — stopping");

    info!("VWAP scalper shut down complete.");
    Ok(())
}
