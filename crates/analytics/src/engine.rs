use crate::error::AnalyticsError;
use crate::report::TradeStatistics;
use core_types::{SENTINEL_RATIO, TradeRecord};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

const DAYS_PER_YEAR: Decimal = dec!(365);
/// Decimal places kept on reported ratios and percentages.
const REPORT_DP: u32 = 4;

/// A stateless calculator for deriving trading statistics from closed trades.
#[derive(Debug, Clone)]
pub struct TradeAggregator {
    /// Length of the analysis window the trades were drawn from.
    window_days: u32,
}

impl TradeAggregator {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    /// The main entry point for calculating trading statistics.
    ///
    /// # Arguments
    ///
    /// * `trades` - Closed trades of one account (or of all accounts of one manager), in any order.
    /// * `initial_allocation` - The capital the trades were made with.
    /// * `current_equity` - The live balance, used for drawdown and return when there are no trades.
    pub fn aggregate(
        &self,
        trades: &[TradeRecord],
        initial_allocation: Decimal,
        current_equity: Decimal,
    ) -> Result<TradeStatistics, AnalyticsError> {
        if initial_allocation < Decimal::ZERO {
            return Err(AnalyticsError::InvalidAllocation(initial_allocation));
        }

        // The equity curve has to be walked in the order trades were closed.
        let mut ordered: Vec<&TradeRecord> = trades.iter().collect();
        ordered.sort_by_key(|trade| trade.close_time);

        let mut report = TradeStatistics::new();
        self.calculate_profitability(&ordered, initial_allocation, current_equity, &mut report);
        self.calculate_drawdown(&ordered, initial_allocation, current_equity, &mut report);
        self.calculate_ratios(&ordered, initial_allocation, &mut report)?;
        round_for_reporting(&mut report);

        tracing::debug!(
            trades = report.trade_count,
            win_rate = %report.win_rate_pct,
            profit_factor = %report.profit_factor,
            max_drawdown = %report.max_drawdown_pct,
            "Aggregated trade statistics."
        );
        Ok(report)
    }

    /// Calculates all profitability-related metrics.
    fn calculate_profitability(
        &self,
        trades: &[&TradeRecord],
        initial_allocation: Decimal,
        current_equity: Decimal,
        report: &mut TradeStatistics,
    ) {
        report.trade_count = trades.len();

        for trade in trades {
            report.net_profit += trade.profit;

            if trade.profit > Decimal::ZERO {
                report.gross_profit += trade.profit;
                report.win_count += 1;
            } else if trade.profit < Decimal::ZERO {
                report.gross_loss += trade.profit.abs();
                report.loss_count += 1;
            } else {
                report.breakeven_count += 1;
            }
        }

        // --- Ratios ---
        report.profit_factor = if report.gross_loss > Decimal::ZERO {
            report.gross_profit / report.gross_loss
        } else {
            SENTINEL_RATIO
        };

        if report.trade_count > 0 {
            report.win_rate_pct = Decimal::from(report.win_count)
                / Decimal::from(report.trade_count)
                * Decimal::ONE_HUNDRED;
        }

        if report.win_count > 0 {
            report.average_win = (report.gross_profit / Decimal::from(report.win_count)).round_dp(2);
        }

        if report.loss_count > 0 {
            report.average_loss = (report.gross_loss / Decimal::from(report.loss_count)).round_dp(2);
        }

        if initial_allocation > Decimal::ZERO {
            let gain = if trades.is_empty() {
                current_equity - initial_allocation
            } else {
                report.net_profit
            };
            report.return_pct = gain / initial_allocation * Decimal::ONE_HUNDRED;
        }
    }

    /// Calculates maximum drawdown from the equity curve implied by the trades.
    ///
    /// Without trades the curve is just the allocation and the current balance.
    fn calculate_drawdown(
        &self,
        trades: &[&TradeRecord],
        initial_allocation: Decimal,
        current_equity: Decimal,
        report: &mut TradeStatistics,
    ) {
        if trades.is_empty() {
            if initial_allocation > Decimal::ZERO && current_equity < initial_allocation {
                report.max_drawdown_pct = (initial_allocation - current_equity) / initial_allocation
                    * Decimal::ONE_HUNDRED;
            }
            return;
        }

        let mut equity = initial_allocation;
        let mut peak_equity = initial_allocation;
        let mut max_drawdown_pct = Decimal::ZERO;

        for trade in trades {
            equity += trade.profit;
            if equity > peak_equity {
                peak_equity = equity;
            }
            if peak_equity > Decimal::ZERO {
                let drawdown_pct = (peak_equity - equity) / peak_equity * Decimal::ONE_HUNDRED;
                if drawdown_pct > max_drawdown_pct {
                    max_drawdown_pct = drawdown_pct;
                }
            }
        }

        report.max_drawdown_pct = max_drawdown_pct;
    }

    /// Calculates the risk-adjusted ratios: Sharpe, Sortino and Calmar.
    ///
    /// The risk-free rate is fixed at zero.
    fn calculate_ratios(
        &self,
        trades: &[&TradeRecord],
        initial_allocation: Decimal,
        report: &mut TradeStatistics,
    ) -> Result<(), AnalyticsError> {
        // --- Calmar Ratio ---
        report.calmar_ratio = if report.max_drawdown_pct > Decimal::ZERO {
            self.annualized_return(report.return_pct).abs() / report.max_drawdown_pct
        } else if report.return_pct > Decimal::ZERO {
            SENTINEL_RATIO
        } else {
            Decimal::ZERO
        };

        // 1. Per-trade returns on the allocation.
        let returns: Vec<Decimal> = if initial_allocation > Decimal::ZERO {
            trades.iter().map(|t| t.profit / initial_allocation).collect()
        } else {
            Vec::new()
        };
        let mean_return = mean(&returns);

        // --- Sortino Ratio ---
        let downside: Vec<Decimal> = returns.iter().copied().filter(|r| *r < Decimal::ZERO).collect();
        report.sortino_ratio = if downside.is_empty() {
            SENTINEL_RATIO
        } else {
            let downside_variance =
                downside.iter().map(|r| *r * *r).sum::<Decimal>() / Decimal::from(downside.len());
            let downside_deviation = sqrt(downside_variance)?;
            if downside_deviation > Decimal::ZERO {
                mean_return / downside_deviation
            } else {
                SENTINEL_RATIO
            }
        };

        // --- Sharpe Ratio ---
        if returns.len() < 2 {
            return Ok(());
        }

        // Population variance of the returns.
        let variance: Decimal = returns
            .iter()
            .map(|r| (*r - mean_return) * (*r - mean_return))
            .sum::<Decimal>()
            / Decimal::from(returns.len());

        if variance <= Decimal::ZERO {
            return Ok(());
        }

        let std_dev = sqrt(variance)?;
        if std_dev > Decimal::ZERO {
            report.sharpe_ratio = mean_return / std_dev;
        }

        Ok(())
    }

    /// (return % / window days) × 365. Zero for an empty window.
    fn annualized_return(&self, return_pct: Decimal) -> Decimal {
        if self.window_days == 0 {
            return Decimal::ZERO;
        }
        return_pct / Decimal::from(self.window_days) * DAYS_PER_YEAR
    }
}

/// Ratios are computed at full precision and only rounded once everything that
/// depends on them has been derived.
fn round_for_reporting(report: &mut TradeStatistics) {
    for value in [
        &mut report.win_rate_pct,
        &mut report.profit_factor,
        &mut report.return_pct,
        &mut report.sharpe_ratio,
        &mut report.sortino_ratio,
        &mut report.max_drawdown_pct,
        &mut report.calmar_ratio,
    ] {
        *value = value.round_dp(REPORT_DP);
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

fn sqrt(value: Decimal) -> Result<Decimal, AnalyticsError> {
    value.sqrt().ok_or_else(|| {
        AnalyticsError::InternalError(format!("Failed to calculate square root of {}", value))
    })
}
