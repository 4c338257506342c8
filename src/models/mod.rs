//! Domain models for accounts, market snapshots, candles, and orders.

mod account;
mod candle;
mod market;
mod order;
mod position;

pub use account::Account;
pub use candle::{Candle, TimePeriod, TimeSeries};
pub use market::{MarketSnapshot, Pricing, TradingState};
pub use order::{Order, OrderSide, OrderStatus, OrderType, TimeInForce};
pub use position::Position;
