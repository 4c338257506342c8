//! Candle series from the market data history endpoint.

use chrono::{Duration, TimeZone, Utc};
use tracing::debug;

use crate::api::{BrokerApi, ConId, HistoryResponse};
use crate::error::{ApiError, Result};
use crate::models::{Candle, TimePeriod, TimeSeries};

use super::IbkrAdapter;

/// Length given to every candle.
///
/// The requested bar size is not parsed yet, so sub-daily bars are labelled
/// as daily candles.
pub fn bar_length() -> Duration {
    Duration::hours(24)
}

impl<B: BrokerApi> IbkrAdapter<B> {
    /// Historical bars for a contract. `period` and `bar` are passed to the
    /// broker as-is (e.g. "1y", "1d").
    pub async fn get_timeseries(&self, con_id: ConId, period: &str, bar: &str) -> Result<TimeSeries> {
        let history = self
            .call(self.config.history, "market data history", || {
                self.broker.market_data_history(con_id, period, bar)
            })
            .await?;

        let series = build_timeseries(&history)?;
        debug!(con_id, period, bar, candles = series.len(), "Fetched timeseries");
        Ok(series)
    }
}

/// One candle per bar, in the order the broker sent them.
pub fn build_timeseries(history: &HistoryResponse) -> Result<TimeSeries> {
    let mut series = TimeSeries::new();

    for bar in &history.data {
        let start = Utc
            .timestamp_opt(bar.t, 0)
            .single()
            .ok_or_else(|| ApiError::InvalidField {
                endpoint: "/iserver/marketdata/history".to_string(),
                field: "t",
                value: bar.t.to_string(),
            })?;

        let mut candle = Candle::new(TimePeriod::new(start, bar_length()));
        candle.open_price = bar.o;
        candle.max_price = bar.h;
        candle.min_price = bar.l;
        candle.close_price = bar.c;
        candle.volume = bar.v;

        series.add_candle(candle);
    }

    Ok(series)
}
