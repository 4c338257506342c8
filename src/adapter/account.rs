//! Account state from the ledger and position endpoints.

use rust_decimal::Decimal;
use tracing::debug;

use crate::api::{BrokerApi, PositionResponse, POSITIONS_PAGE_SIZE};
use crate::error::{AdapterError, ApiError, Result};
use crate::models::{Account, Position};

use super::IbkrAdapter;

impl<B: BrokerApi> IbkrAdapter<B> {
    /// Session bootstrap required before any portfolio endpoint answers.
    pub async fn bootstrap(&self) -> Result<()> {
        let policy = self.config.bootstrap;

        if self.config.bootstrap_accounts {
            self.call(policy, "accounts", || self.broker.get_accounts())
                .await?;
        }
        self.call(policy, "portfolio subaccounts", || {
            self.broker.get_portfolio_subaccounts()
        })
        .await?;

        Ok(())
    }

    /// Fetch cash and positions for an account.
    pub async fn get_account_state(&self, account_id: &str) -> Result<Account> {
        self.bootstrap().await?;

        let ledger = self
            .call(self.config.ledger, "account ledger", || {
                self.broker.get_account_ledger(account_id)
            })
            .await?;

        let cash = ledger
            .base()
            .map(|entry| entry.cash_balance)
            .ok_or_else(|| ApiError::InvalidField {
                endpoint: format!("/portfolio/{}/ledger", account_id),
                field: "BASE",
                value: String::new(),
            })?;

        let positions = self.fetch_positions(account_id).await?;

        debug!(
            account_id,
            cash = %cash,
            positions = positions.len(),
            "Fetched account state"
        );

        Ok(build_account(cash, positions))
    }

    /// Read position pages until one comes back short, at most
    /// `max_position_pages` of them.
    async fn fetch_positions(&self, account_id: &str) -> Result<Vec<PositionResponse>> {
        let max_pages = self.config.max_position_pages.max(1);
        let mut positions = Vec::new();
        let mut page = 0u32;

        loop {
            if page >= max_pages {
                return Err(AdapterError::PageLimitExceeded {
                    operation: "positions",
                    pages: page,
                });
            }

            let batch = self
                .call(self.config.positions, "positions", || {
                    self.broker.get_positions(account_id, page)
                })
                .await?;

            let full_page = batch.len() >= POSITIONS_PAGE_SIZE;
            positions.extend(batch);

            if !full_page {
                return Ok(positions);
            }
            page += 1;
        }
    }
}

/// Deposit the cash, then add one position per holding keyed by security.
/// A later holding for the same security replaces an earlier one.
pub fn build_account(cash: Decimal, positions: Vec<PositionResponse>) -> Account {
    let mut account = Account::new();
    account.deposit(cash);

    for p in positions {
        let security = p.security().to_string();
        account.set_position(Position::new(security, p.position, p.market_price));
    }

    account
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::testing::{position, RecordingSleeper, StubBroker};
    use crate::config::AdapterConfig;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn adapter(broker: StubBroker) -> (IbkrAdapter<StubBroker>, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let adapter = IbkrAdapter::new(broker).with_sleeper(sleeper.clone());
        (adapter, sleeper)
    }

    #[tokio::test]
    async fn test_single_position_account() {
        let (adapter, _) = adapter(StubBroker {
            base_cash: Some(dec!(1000.50)),
            positions: vec![position("AAPL", dec!(10), dec!(150.25))],
            ..Default::default()
        });

        let account = adapter.get_account_state("U123").await.unwrap();

        assert_eq!(account.cash, dec!(1000.50));
        assert_eq!(account.positions.len(), 1);
        assert_eq!(
            account.position("AAPL"),
            Some(&Position::new("AAPL", dec!(10), dec!(150.25)))
        );
    }

    #[tokio::test]
    async fn test_bootstrap_runs_before_portfolio_calls() {
        let (adapter, _) = adapter(StubBroker {
            base_cash: Some(dec!(1)),
            ..Default::default()
        });

        adapter.get_account_state("U123").await.unwrap();

        assert_eq!(
            adapter.broker().call_log(),
            vec!["accounts", "subaccounts", "ledger", "positions"]
        );
    }

    #[tokio::test]
    async fn test_bootstrap_accounts_can_be_skipped() {
        let config = AdapterConfig {
            bootstrap_accounts: false,
            ..Default::default()
        };
        let broker = StubBroker {
            base_cash: Some(dec!(1)),
            ..Default::default()
        };
        let adapter = IbkrAdapter::with_config(broker, config)
            .with_sleeper(Arc::new(RecordingSleeper::default()));

        adapter.get_account_state("U123").await.unwrap();
        assert_eq!(adapter.broker().call_count("accounts"), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_retries_transient_failures() {
        let (adapter, sleeper) = adapter(StubBroker {
            subaccounts_failures: 2,
            base_cash: Some(dec!(5)),
            ..Default::default()
        });

        let account = adapter.get_account_state("U123").await.unwrap();

        assert_eq!(account.cash, dec!(5));
        assert_eq!(adapter.broker().call_count("subaccounts"), 3);
        assert_eq!(sleeper.count(), 2);
    }

    #[tokio::test]
    async fn test_bootstrap_gives_up_after_three_attempts() {
        let (adapter, sleeper) = adapter(StubBroker {
            accounts_failures: u32::MAX,
            base_cash: Some(dec!(5)),
            ..Default::default()
        });

        let err = adapter.get_account_state("U123").await.unwrap_err();

        assert!(matches!(
            err,
            AdapterError::MaxRetriesExceeded {
                operation: "accounts",
                attempts: 3,
                ..
            }
        ));
        assert_eq!(adapter.broker().call_count("ledger"), 0);
        assert_eq!(sleeper.count(), 2);
    }

    #[tokio::test]
    async fn test_ledger_failure_passes_through() {
        let (adapter, _) = adapter(StubBroker {
            fail_ledger: true,
            ..Default::default()
        });

        let err = adapter.get_account_state("U123").await.unwrap_err();
        assert!(matches!(err, AdapterError::Broker(ApiError::Status { .. })));
        assert_eq!(adapter.broker().call_count("ledger"), 1);
    }

    #[tokio::test]
    async fn test_missing_base_ledger_row() {
        let (adapter, _) = adapter(StubBroker::default());

        let err = adapter.get_account_state("U123").await.unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Broker(ApiError::InvalidField { field: "BASE", .. })
        ));
    }

    #[tokio::test]
    async fn test_positions_failure_passes_through() {
        let (adapter, _) = adapter(StubBroker {
            base_cash: Some(dec!(1)),
            fail_positions: true,
            ..Default::default()
        });

        let err = adapter.get_account_state("U123").await.unwrap_err();
        assert!(matches!(err, AdapterError::Broker(ApiError::Status { .. })));
    }

    #[tokio::test]
    async fn test_positions_read_across_pages() {
        let positions = (0..150)
            .map(|i| position(&format!("SYM{i}"), dec!(1), dec!(2)))
            .collect();
        let (adapter, _) = adapter(StubBroker {
            base_cash: Some(dec!(0)),
            positions,
            ..Default::default()
        });

        let account = adapter.get_account_state("U123").await.unwrap();

        assert_eq!(account.positions.len(), 150);
        assert_eq!(adapter.broker().call_count("positions"), 2);
    }

    #[tokio::test]
    async fn test_exactly_one_full_page_reads_an_empty_second_page() {
        let positions = (0..100)
            .map(|i| position(&format!("SYM{i}"), dec!(1), dec!(2)))
            .collect();
        let (adapter, _) = adapter(StubBroker {
            base_cash: Some(dec!(0)),
            positions,
            ..Default::default()
        });

        let account = adapter.get_account_state("U123").await.unwrap();

        assert_eq!(account.positions.len(), 100);
        assert_eq!(adapter.broker().call_count("positions"), 2);
    }

    #[tokio::test]
    async fn test_endless_full_pages_stop_at_ceiling() {
        let config = AdapterConfig {
            max_position_pages: 3,
            ..Default::default()
        };
        let broker = StubBroker {
            base_cash: Some(dec!(0)),
            positions: vec![position("AAPL", dec!(1), dec!(2)); 100],
            repeat_positions_page: true,
            ..Default::default()
        };
        let adapter = IbkrAdapter::with_config(broker, config)
            .with_sleeper(Arc::new(RecordingSleeper::default()));

        let err = adapter.get_account_state("U123").await.unwrap_err();

        assert!(matches!(
            err,
            AdapterError::PageLimitExceeded {
                operation: "positions",
                pages: 3
            }
        ));
        assert_eq!(adapter.broker().call_count("positions"), 3);
    }

    #[test]
    fn test_build_account_last_write_wins() {
        let account = build_account(
            dec!(10),
            vec![
                position("AAPL", dec!(1), dec!(100)),
                position("AAPL", dec!(3), dec!(101)),
            ],
        );

        assert_eq!(account.positions.len(), 1);
        assert_eq!(account.position("AAPL").map(|p| p.amount), Some(dec!(3)));
    }
}
