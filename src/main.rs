//! IBKR bridge CLI
//!
//! Prints accounts, snapshots, history, and orders from a running Client
//! Portal gateway, translated into the domain models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ibkr_bridge::adapter::ContractMap;
use ibkr_bridge::api::ConId;
use ibkr_bridge::models::{Order, OrderSide, OrderType, TimeInForce};
use ibkr_bridge::{AdapterConfig, ClientConfig, IbkrAdapter, IbkrClient};

/// Interactive Brokers Web API bridge CLI.
#[derive(Parser)]
#[command(name = "ibkr-bridge")]
#[command(about = "Query and trade through the IBKR Client Portal gateway", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cash and positions for an account
    Account {
        /// Brokerage account id
        #[arg(short, long, env = "IBKR_ACCOUNT_ID")]
        account: String,
    },

    /// Show last prices and trading states
    Snapshot {
        /// SYMBOL=CONID pairs, e.g. AAPL=265598
        #[arg(required = true, value_parser = parse_contract)]
        contracts: Vec<(String, ConId)>,
    },

    /// Show historical candles for a contract
    History {
        /// Contract id
        conid: ConId,

        /// Lookback period (e.g. 1d, 1w, 1m, 1y)
        #[arg(short, long, default_value = "1m")]
        period: String,

        /// Bar size (e.g. 1d); candles are always labelled as daily
        #[arg(short, long, default_value = "1d")]
        bar: String,
    },

    /// Submit an order
    Order {
        /// Brokerage account id
        #[arg(short, long, env = "IBKR_ACCOUNT_ID")]
        account: String,

        /// Ticker to trade
        ticker: String,

        /// Contract id of the ticker; without it the gateway resolves the ticker itself
        #[arg(short, long)]
        conid: Option<ConId>,

        /// BUY or SELL
        #[arg(short, long)]
        side: OrderSide,

        /// Quantity to trade
        #[arg(short, long)]
        quantity: Decimal,

        /// Order type literal (MKT, LMT, ...)
        #[arg(short = 't', long, default_value = "MKT")]
        order_type: String,

        /// Time-in-force literal (DAY, GTC, ...)
        #[arg(long, default_value = "DAY")]
        tif: String,
    },

    /// List live orders
    Orders,
}

fn parse_contract(s: &str) -> Result<(String, ConId), String> {
    let (symbol, conid) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=CONID, got {s}"))?;
    let conid = conid
        .parse()
        .map_err(|_| format!("invalid conid in {s}"))?;
    Ok((symbol.to_string(), conid))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client_config = ClientConfig::from_env()?;
    info!(base_url = %client_config.base_url, "Connecting to gateway");

    let client = IbkrClient::new(&client_config).context("Failed to create IBKR client")?;
    let adapter = IbkrAdapter::with_config(client, AdapterConfig::default());

    match cli.command {
        Commands::Account { account } => {
            let state = adapter
                .get_account_state(&account)
                .await
                .context("Failed to fetch account state")?;

            println!("\n=== Account {} ===", account);
            println!("Cash:    ${:.2}", state.cash);
            println!("Equity:  ${:.2}", state.equity());

            println!("\n{:<12} {:>12} {:>12} {:>14}", "SECURITY", "AMOUNT", "PRICE", "VALUE");
            println!("{}", "-".repeat(53));

            let mut positions: Vec<_> = state.positions.values().collect();
            positions.sort_by(|a, b| a.security.cmp(&b.security));
            for pos in positions {
                println!(
                    "{:<12} {:>12} {:>12.2} {:>14.2}",
                    truncate(&pos.security, 12),
                    pos.amount,
                    pos.price,
                    pos.market_value()
                );
            }
        }

        Commands::Snapshot { contracts } => {
            let contracts = ContractMap::from_pairs(contracts)?;
            let snapshot = adapter
                .get_market_snapshot(&contracts)
                .await
                .context("Failed to fetch market snapshot")?;

            println!("\n{:<12} {:>12} {:>8}", "SYMBOL", "LAST", "STATE");
            println!("{}", "-".repeat(34));

            let mut symbols: Vec<_> = snapshot.pricing.keys().collect();
            symbols.sort();
            for symbol in symbols {
                let state = snapshot
                    .state_for(symbol)
                    .map(|s| s.as_str())
                    .unwrap_or("-");
                println!(
                    "{:<12} {:>12} {:>8}",
                    symbol,
                    snapshot.pricing[symbol],
                    state
                );
            }
        }

        Commands::History { conid, period, bar } => {
            let series = adapter
                .get_timeseries(conid, &period, &bar)
                .await
                .context("Failed to fetch history")?;

            println!(
                "\n{:<20} {:>10} {:>10} {:>10} {:>10} {:>14}",
                "START", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
            );
            println!("{}", "-".repeat(79));

            for candle in &series.candles {
                println!(
                    "{:<20} {:>10} {:>10} {:>10} {:>10} {:>14}",
                    candle.period.start.format("%Y-%m-%d %H:%M"),
                    candle.open_price,
                    candle.max_price,
                    candle.min_price,
                    candle.close_price,
                    candle.volume
                );
            }
        }

        Commands::Order {
            account,
            ticker,
            conid,
            side,
            quantity,
            order_type,
            tif,
        } => {
            let order = Order::new(
                side,
                ticker,
                OrderType(order_type),
                quantity,
                TimeInForce(tif),
            );

            let order_id = match conid {
                Some(conid) => {
                    let contracts = ContractMap::from_pairs([(order.security.clone(), conid)])?;
                    adapter.execute_contract_order(&account, &order, &contracts).await
                }
                None => adapter.execute_order(&account, &order).await,
            }
            .context("Order placement failed")?;

            println!(
                "Submitted {} {} {} ({} {}): order id {}",
                order.side, order.amount, order.security, order.order_type, order.time_in_force, order_id
            );
        }

        Commands::Orders => {
            let orders = adapter.get_orders().await.context("Failed to fetch orders")?;

            if orders.is_empty() {
                println!("No live orders.");
                return Ok(());
            }

            println!(
                "\n{:<12} {:<12} {:<5} {:>10} {:<6} {:<5} {:<10}",
                "ID", "SECURITY", "SIDE", "AMOUNT", "TYPE", "TIF", "STATUS"
            );
            println!("{}", "-".repeat(66));

            for order in orders {
                println!(
                    "{:<12} {:<12} {:<5} {:>10} {:<6} {:<5} {:<10}",
                    order.id.as_deref().unwrap_or("-"),
                    truncate(&order.security, 12),
                    order.side,
                    order.amount,
                    order.order_type,
                    order.time_in_force,
                    order.status.map(|s| s.as_str()).unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

/// Truncate a string with ellipsis if it has more than `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
