use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trading statistics and risk-adjusted ratios for one account or a group of accounts.
///
/// This struct is the final output of the `TradeAggregator`. Undefined ratios are never
/// left empty: they carry either zero or [`core_types::SENTINEL_RATIO`], as documented
/// on each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeStatistics {
    // I. Trade-Level Statistics
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    /// Trades closed at exactly zero. Counted in `trade_count` only.
    pub breakeven_count: usize,
    /// Zero when there are no trades.
    pub win_rate_pct: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal,

    // II. Core Profitability Metrics
    pub gross_profit: Decimal,
    /// Absolute sum of losing trades.
    pub gross_loss: Decimal,
    pub net_profit: Decimal,
    /// Sentinel when there are no losses.
    pub profit_factor: Decimal,
    /// Net trade profit over the allocation, or the balance change when there are no trades.
    pub return_pct: Decimal,

    // III. Risk and Drawdown
    /// Mean over population standard deviation of per-trade returns. Zero with fewer
    /// than two trades or no variance.
    pub sharpe_ratio: Decimal,
    /// Sentinel when no trade lost money.
    pub sortino_ratio: Decimal,
    pub max_drawdown_pct: Decimal,
    /// Sentinel with no drawdown and a positive return, zero with no drawdown otherwise.
    pub calmar_ratio: Decimal,
}

impl TradeStatistics {
    /// Creates a new, zeroed-out report.
    /// This is the starting point before calculations.
    pub fn new() -> Self {
        Self {
            trade_count: 0,
            win_count: 0,
            loss_count: 0,
            breakeven_count: 0,
            win_rate_pct: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            net_profit: Decimal::ZERO,
            profit_factor: Decimal::ZERO,
            return_pct: Decimal::ZERO,
            sharpe_ratio: Decimal::ZERO,
            sortino_ratio: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            calmar_ratio: Decimal::ZERO,
        }
    }
}

impl Default for TradeStatistics {
    fn default() -> Self {
        Self::new()
    }
}
