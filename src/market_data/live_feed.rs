use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::{Bar, Tick};

// ---------------------------------------------------------------------------
// TickBuffer -- bounded ring of raw ticks, resampled into bars on demand
// ---------------------------------------------------------------------------

/// Thread-safe ring buffer holding the most recent `max_ticks` ticks for one
/// instrument.  The feed task appends; the trading loop reads bars through
/// [`TickBuffer::get_candles`].
pub struct TickBuffer {
    ticks: RwLock<VecDeque<Tick>>,
    max_ticks: usize,
    interval_secs: i64,
}

impl TickBuffer {
    /// `interval_secs` is the bar width used by `get_candles` (60 for
    /// one-minute bars).
    pub fn new(max_ticks: usize, interval_secs: u64) -> Self {
        let max_ticks = max_ticks.max(1);
        Self {
            ticks: RwLock::new(VecDeque::with_capacity(max_ticks.min(65_536))),
            max_ticks,
            interval_secs: i64::try_from(interval_secs).unwrap_or(i64::MAX).max(1),
        }
    }

    /// Append ticks in arrival order, evicting the oldest beyond capacity.
    pub fn push_ticks(&self, ticks: impl IntoIterator<Item = Tick>) {
        let mut ring = self.ticks.write();
        ring.extend(ticks);
        let excess = ring.len().saturating_sub(self.max_ticks);
        if excess > 0 {
            ring.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.ticks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.read().is_empty()
    }

    /// Resample buffered ticks into fixed-interval bars, oldest first.
    ///
    /// `None` until the first tick has arrived.  The newest bar is still
    /// forming and changes on every call until its interval elapses.
    pub fn get_candles(&self) -> Option<Vec<Bar>> {
        let ring = self.ticks.read();
        if ring.is_empty() {
            return None;
        }
        Some(resample(ring.iter(), self.interval_secs))
    }
}

/// Group ticks into `interval_secs` buckets labelled by their start time.
///
/// open / close are the first / last tick of the bucket in arrival order,
/// volume is the sum of tick volumes.  Intervals without ticks produce no bar.
fn resample<'a>(ticks: impl Iterator<Item = &'a Tick>, interval_secs: i64) -> Vec<Bar> {
    let mut buckets: BTreeMap<i64, Bar> = BTreeMap::new();

    for tick in ticks {
        if !tick.ltp.is_finite() {
            continue;
        }
        let start = tick.timestamp.timestamp().div_euclid(interval_secs) * interval_secs;
        buckets
            .entry(start)
            .and_modify(|bar| {
                bar.high = bar.high.max(tick.ltp);
                bar.low = bar.low.min(tick.ltp);
                bar.close = tick.ltp;
                bar.volume += tick.volume;
            })
            .or_insert_with(|| {
                let ts = DateTime::<Utc>::from_timestamp(start, 0).unwrap_or(tick.timestamp);
                Bar::new(ts, tick.ltp, tick.ltp, tick.ltp, tick.ltp, tick.volume)
            });
    }

    buckets.into_values().collect()
}

// ---------------------------------------------------------------------------
// Tick WebSocket stream
// ---------------------------------------------------------------------------

/// Connect to the tick feed at `url`, subscribe to `instrument` and append
/// every tick to `buffer`.
///
/// Runs until the stream disconnects or an error occurs, then returns so that
/// the caller (main.rs) can handle reconnection.
pub async fn run_tick_stream(url: &str, instrument: &str, buffer: &Arc<TickBuffer>) -> Result<()> {
    info!(url = %url, instrument = %instrument, "connecting to tick WebSocket");

    let (ws_stream, _response) = connect_async(url)
        .await
        .context("failed to connect to tick WebSocket")?;

    let (mut write, mut read) = ws_stream.split();

    let subscribe = serde_json::json!({
        "action": "subscribe",
        "mode": "full",
        "instruments": [instrument],
    });
    write
        .send(Message::Text(subscribe.to_string()))
        .await
        .context("failed to send subscribe frame")?;

    info!(instrument = %instrument, "tick WebSocket connected and subscribed");

    loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => match parse_tick_message(&text) {
                Ok(ticks) if !ticks.is_empty() => {
                    debug!(count = ticks.len(), "ticks received");
                    buffer.push_ticks(ticks);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to parse tick message"),
            },
            Some(Ok(Message::Close(frame))) => {
                warn!(?frame, "tick WebSocket closed by server");
                return Ok(());
            }
            // Ping / Pong / Binary frames are ignored; tungstenite answers
            // pings itself.
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                error!(error = %e, "tick WebSocket read error");
                return Err(e.into());
            }
            None => {
                warn!(instrument = %instrument, "tick WebSocket stream ended");
                return Ok(());
            }
        }
    }
}

/// Parse one text frame into ticks.
///
/// Accepted shapes: a single tick object or an array of them.
/// ```json
/// { "timestamp": "2024-03-01T09:15:02Z", "ltp": "2931.5", "volume": 12 }
/// ```
/// `timestamp` may also be epoch milliseconds.  Objects without an `ltp`
/// (subscription acks, heartbeats) are skipped, and so are ticks with an
/// unparseable price or timestamp.  Only a frame that is not JSON is an error.
pub fn parse_tick_message(text: &str) -> Result<Vec<Tick>> {
    let root: serde_json::Value = serde_json::from_str(text).context("failed to parse tick JSON")?;

    let items = match root {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    let mut ticks = Vec::with_capacity(items.len());
    for item in &items {
        if item.get("ltp").is_none() {
            continue;
        }
        match parse_tick(item) {
            Ok(tick) => ticks.push(tick),
            Err(e) => warn!(error = %e, "skipping malformed tick"),
        }
    }
    Ok(ticks)
}

fn parse_tick(item: &serde_json::Value) -> Result<Tick> {
    let timestamp = parse_timestamp(&item["timestamp"])?;
    let ltp = parse_f64(&item["ltp"], "ltp")?;
    let volume = match item.get("volume") {
        Some(v) if !v.is_null() => parse_f64(v, "volume")?,
        _ => 0.0,
    };
    Ok(Tick {
        timestamp,
        ltp,
        volume,
    })
}

/// Numeric fields may arrive as JSON numbers or as strings.
fn parse_f64(val: &serde_json::Value, name: &str) -> Result<f64> {
    match val {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .with_context(|| format!("failed to parse {name} as f64: {s}")),
        serde_json::Value::Number(n) => n
            .as_f64()
            .with_context(|| format!("field {name} is not a valid f64")),
        _ => anyhow::bail!("field {name} has unexpected JSON type"),
    }
}

fn parse_timestamp(val: &serde_json::Value) -> Result<DateTime<Utc>> {
    match val {
        serde_json::Value::String(s) => {
            if let Ok(ms) = s.parse::<i64>() {
                return DateTime::<Utc>::from_timestamp_millis(ms)
                    .with_context(|| format!("timestamp out of range: {s}"));
            }
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("failed to parse timestamp: {s}"))
        }
        serde_json::Value::Number(n) => {
            let ms = n.as_i64().context("timestamp is not an integer")?;
            DateTime::<Utc>::from_timestamp_millis(ms)
                .with_context(|| format!("timestamp out of range: {ms}"))
        }
        _ => anyhow::bail!("missing or invalid field timestamp"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
