//! Candle and time series models for historical bar data.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

/// Half-open time span `[start, start + length)` covered by one candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePeriod {
    pub start: DateTime<Utc>,
    pub length: Duration,
}

impl TimePeriod {
    pub fn new(start: DateTime<Utc>, length: Duration) -> Self {
        Self { start, length }
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + self.length
    }
}

/// OHLCV summary of price action over a period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candle {
    pub period: TimePeriod,
    pub open_price: Decimal,
    pub max_price: Decimal,
    pub min_price: Decimal,
    pub close_price: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Create an empty candle covering the given period.
    pub fn new(period: TimePeriod) -> Self {
        Self {
            period,
            open_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            min_price: Decimal::ZERO,
            close_price: Decimal::ZERO,
            volume: Decimal::ZERO,
        }
    }

    /// Close minus open.
    pub fn change(&self) -> Decimal {
        self.close_price - self.open_price
    }
}

/// Candles in the order they were added, one per bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeries {
    pub candles: Vec<Candle>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candle. No reordering is done; callers feed bars oldest first.
    pub fn add_candle(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// True when every candle starts strictly after the one before it.
    pub fn is_ordered(&self) -> bool {
        self.candles
            .windows(2)
            .all(|w| w[0].period.start < w[1].period.start)
    }
}
