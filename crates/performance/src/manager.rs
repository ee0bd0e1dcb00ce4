use crate::error::PerformanceError;
use analytics::{TradeAggregator, TradeStatistics};
use core_types::{BrokerageAccountSnapshot, ManagerProfile, PoolId, TradeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summed balances of a group of brokerage accounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountTotals {
    pub account_ids: Vec<String>,
    pub allocation: Decimal,
    pub current_equity: Decimal,
    pub withdrawals: Decimal,
    /// Sum of the P&L figures reported by the brokerage, kept for cross-checking.
    pub reported_profit_loss: Decimal,
}

impl AccountTotals {
    pub fn from_accounts<'a, I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = &'a BrokerageAccountSnapshot>,
    {
        accounts.into_iter().fold(Self::default(), |mut totals, account| {
            totals.account_ids.push(account.account_id.clone());
            totals.allocation += account.initial_allocation;
            totals.current_equity += account.current_equity;
            totals.withdrawals += account.withdrawals;
            totals.reported_profit_loss += account.profit_loss;
            totals
        })
    }

    /// Equity plus withdrawn profit, less what was allocated.
    ///
    /// Profit that has already been withdrawn still counts as performance.
    pub fn profit_loss(&self) -> Decimal {
        self.current_equity + self.withdrawals - self.allocation
    }

    pub fn return_pct(&self) -> Decimal {
        percentage_of(self.profit_loss(), self.allocation)
    }
}

/// The performance record of one manager across all of their accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerPerformance {
    pub manager_id: String,
    pub name: String,
    pub pool: PoolId,
    pub active: bool,
    pub account_ids: Vec<String>,
    pub allocation: Decimal,
    pub current_equity: Decimal,
    pub withdrawals: Decimal,
    pub profit_loss: Decimal,
    pub return_pct: Decimal,
    /// Share of the fund's P&L, filled in by fund aggregation.
    pub contribution_pct: Decimal,
    #[serde(flatten)]
    pub statistics: TradeStatistics,
    /// 1-based position in the manager ranking, once ranked.
    pub rank: Option<usize>,
}

/// Builds a manager's record from the accounts they trade and the trades on those accounts.
///
/// `accounts` are expected to belong to the manager already; `trades` may contain
/// trades of other accounts, which are ignored.
pub fn manager_performance(
    aggregator: &TradeAggregator,
    manager: &ManagerProfile,
    accounts: &[&BrokerageAccountSnapshot],
    trades: &[TradeRecord],
) -> Result<ManagerPerformance, PerformanceError> {
    let totals = AccountTotals::from_accounts(accounts.iter().copied());
    let owned: HashSet<&str> = totals.account_ids.iter().map(String::as_str).collect();
    let manager_trades: Vec<TradeRecord> = trades
        .iter()
        .filter(|trade| owned.contains(trade.account_id.as_str()))
        .cloned()
        .collect();

    let statistics = aggregator
        .aggregate(&manager_trades, totals.allocation, totals.current_equity)
        .map_err(|source| PerformanceError::Analytics {
            manager_id: manager.manager_id.clone(),
            source,
        })?;

    let profit_loss = totals.profit_loss();
    let return_pct = totals.return_pct();

    Ok(ManagerPerformance {
        manager_id: manager.manager_id.clone(),
        name: manager.name.clone(),
        pool: manager.pool,
        active: manager.active,
        account_ids: totals.account_ids,
        allocation: totals.allocation,
        current_equity: totals.current_equity,
        withdrawals: totals.withdrawals,
        profit_loss,
        return_pct,
        contribution_pct: Decimal::ZERO,
        statistics,
        rank: None,
    })
}

/// `part / whole` in percent, rounded to four places. Zero when `whole` is zero.
pub(crate) fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp(4)
}
