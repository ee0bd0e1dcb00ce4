use crate::error::PerformanceError;
use crate::fund::{FundPerformance, ManagerFailure};
use crate::manager::{self, AccountTotals, ManagerPerformance};
use crate::ranking::{ManagerRankings, rank_managers};
use analytics::TradeAggregator;
use core_types::{BrokerageAccountSnapshot, ManagerProfile, PoolId, TradeRecord};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// The top of the aggregation: every pool plus the client-facing blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPerformance {
    pub funds: Vec<FundPerformance>,
    /// Allocation of client-funded pools only.
    pub client_aum: Decimal,
    pub client_equity: Decimal,
    pub client_profit_loss: Decimal,
    /// AUM-weighted return over client-funded pools.
    pub blended_return_pct: Decimal,
    /// P&L of the extracted-profit pool. Not client capital, so it stays out of
    /// `client_aum` and `blended_return_pct`.
    pub extracted_profit_pnl: Decimal,
    /// Client P&L plus extracted-profit P&L.
    pub total_profit_loss: Decimal,
    pub rankings: Vec<ManagerPerformance>,
}

/// Computes the manager → fund → portfolio aggregates from a brokerage snapshot.
#[derive(Debug, Clone)]
pub struct PerformanceAnalyzer {
    aggregator: TradeAggregator,
}

impl PerformanceAnalyzer {
    pub fn new(aggregator: TradeAggregator) -> Self {
        Self { aggregator }
    }

    /// One manager's record over every account whose `manager_id` points at them.
    pub fn manager_performance(
        &self,
        manager: &ManagerProfile,
        accounts: &[BrokerageAccountSnapshot],
        trades: &[TradeRecord],
    ) -> Result<ManagerPerformance, PerformanceError> {
        let owned: Vec<&BrokerageAccountSnapshot> = accounts
            .iter()
            .filter(|a| a.manager_id.as_deref() == Some(manager.manager_id.as_str()))
            .collect();
        manager::manager_performance(&self.aggregator, manager, &owned, trades)
    }

    /// Aggregates one pool: its managers and the accounts of that pool no known manager trades.
    ///
    /// A manager whose statistics fail is reported under `failures` and left out of the totals.
    pub fn fund_performance(
        &self,
        pool: PoolId,
        managers: &[ManagerProfile],
        accounts: &[BrokerageAccountSnapshot],
        trades: &[TradeRecord],
    ) -> FundPerformance {
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for profile in managers.iter().filter(|m| m.pool == pool) {
            match self.manager_performance(profile, accounts, trades) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(manager_id = %profile.manager_id, pool = %pool, error = %e, "Manager performance failed.");
                    failures.push(ManagerFailure {
                        manager_id: profile.manager_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let known: HashSet<&str> = managers.iter().map(|m| m.manager_id.as_str()).collect();
        let unassigned = AccountTotals::from_accounts(accounts.iter().filter(|a| {
            a.pool == Some(pool)
                && a.manager_id.as_deref().is_none_or(|id| !known.contains(id))
        }));

        let fund = FundPerformance::assemble(pool, records, unassigned, failures);
        tracing::debug!(
            pool = %pool,
            managers = fund.manager_count,
            profit_loss = %fund.profit_loss,
            return_pct = %fund.return_pct,
            "Aggregated fund performance."
        );
        fund
    }

    /// Aggregates every pool seen in the snapshot and blends the client-funded ones.
    pub fn portfolio_performance(
        &self,
        managers: &[ManagerProfile],
        accounts: &[BrokerageAccountSnapshot],
        trades: &[TradeRecord],
    ) -> PortfolioPerformance {
        let pools: BTreeSet<PoolId> = managers
            .iter()
            .map(|m| m.pool)
            .chain(accounts.iter().filter_map(|a| a.pool))
            .collect();
        let pools: Vec<PoolId> = pools.into_iter().collect();

        let funds: Vec<FundPerformance> = pools
            .par_iter()
            .map(|pool| self.fund_performance(*pool, managers, accounts, trades))
            .collect();

        let mut client_aum = Decimal::ZERO;
        let mut client_equity = Decimal::ZERO;
        let mut client_profit_loss = Decimal::ZERO;
        let mut extracted_profit_pnl = Decimal::ZERO;
        for fund in &funds {
            if fund.pool.is_client_funded() {
                client_aum += fund.allocation;
                client_equity += fund.current_equity;
                client_profit_loss += fund.profit_loss;
            } else {
                extracted_profit_pnl += fund.profit_loss;
            }
        }

        let all_managers: Vec<ManagerPerformance> =
            funds.iter().flat_map(|f| f.managers.iter().cloned()).collect();
        let rankings = rank_managers(&all_managers);

        let portfolio = PortfolioPerformance {
            blended_return_pct: blended_return(client_profit_loss, client_aum),
            client_aum,
            client_equity,
            client_profit_loss,
            extracted_profit_pnl,
            total_profit_loss: client_profit_loss + extracted_profit_pnl,
            rankings,
            funds,
        };

        tracing::info!(
            funds = portfolio.funds.len(),
            client_aum = %portfolio.client_aum,
            blended_return = %portfolio.blended_return_pct,
            "Portfolio performance computed."
        );
        portfolio
    }

    /// Ranks every active manager of the snapshot. Managers whose record fails are
    /// listed under `failures` instead.
    pub fn rankings(
        &self,
        managers: &[ManagerProfile],
        accounts: &[BrokerageAccountSnapshot],
        trades: &[TradeRecord],
    ) -> ManagerRankings {
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for profile in managers {
            match self.manager_performance(profile, accounts, trades) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(manager_id = %profile.manager_id, error = %e, "Manager left out of the rankings.");
                    failures.push(ManagerFailure {
                        manager_id: profile.manager_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        ManagerRankings {
            rankings: rank_managers(&records),
            failures,
        }
    }
}

/// Client P&L over client AUM. Equal to the allocation-weighted fund returns, but taken
/// from the unrounded totals.
fn blended_return(client_profit_loss: Decimal, client_aum: Decimal) -> Decimal {
    if client_aum.is_zero() {
        return Decimal::ZERO;
    }
    (client_profit_loss / client_aum * Decimal::ONE_HUNDRED).round_dp(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::FundCode;
    use rust_decimal_macros::dec;

    fn profile(id: &str, pool: PoolId, active: bool) -> ManagerProfile {
        ManagerProfile {
            manager_id: id.to_string(),
            name: id.to_string(),
            pool,
            active,
        }
    }

    fn account(id: &str, manager: Option<&str>, pool: PoolId, allocation: Decimal, equity: Decimal) -> BrokerageAccountSnapshot {
        BrokerageAccountSnapshot {
            account_id: id.to_string(),
            position_id: None,
            manager_id: manager.map(str::to_string),
            pool: Some(pool),
            initial_allocation: allocation,
            current_equity: equity,
            profit_loss: equity - allocation,
            withdrawals: Decimal::ZERO,
            last_sync: None,
        }
    }

    fn analyzer() -> PerformanceAnalyzer {
        PerformanceAnalyzer::new(TradeAggregator::new(30))
    }

    const CORE: PoolId = PoolId::Fund(FundCode::Core);
    const BALANCED: PoolId = PoolId::Fund(FundCode::Balanced);

    #[test]
    fn extracted_profit_is_kept_out_of_client_figures() {
        let managers = vec![
            profile("M1", CORE, true),
            profile("M2", BALANCED, true),
            profile("X1", PoolId::ExtractedProfit, true),
        ];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10200)),
            account("A2", Some("M2"), BALANCED, dec!(30000), dec!(31200)),
            account("A3", Some("X1"), PoolId::ExtractedProfit, dec!(5000), dec!(6000)),
        ];

        let portfolio = analyzer().portfolio_performance(&managers, &accounts, &[]);

        assert_eq!(portfolio.funds.len(), 3);
        assert_eq!(portfolio.client_aum, dec!(40000));
        assert_eq!(portfolio.client_profit_loss, dec!(1400));
        // (2% × 10,000 + 4% × 30,000) / 40,000
        assert_eq!(portfolio.blended_return_pct, dec!(3.5));
        assert_eq!(portfolio.extracted_profit_pnl, dec!(1000));
        assert_eq!(portfolio.total_profit_loss, dec!(2400));
    }

    #[test]
    fn unassigned_accounts_count_toward_their_pool() {
        let managers = vec![profile("M1", CORE, true)];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10100)),
            account("U1", None, CORE, dec!(5000), dec!(5400)),
            account("U2", Some("ghost"), CORE, dec!(5000), dec!(5000)),
        ];

        let fund = analyzer().fund_performance(CORE, &managers, &accounts, &[]);

        assert_eq!(fund.allocation, dec!(20000));
        assert_eq!(fund.profit_loss, dec!(500));
        assert_eq!(fund.unassigned_account_ids, vec!["U1".to_string(), "U2".to_string()]);
        assert_eq!(fund.managers[0].account_ids, vec!["A1".to_string()]);
    }

    #[test]
    fn failing_manager_is_isolated() {
        let managers = vec![profile("M1", CORE, true), profile("BAD", CORE, true)];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10300)),
            account("A2", Some("BAD"), CORE, dec!(-1), dec!(0)),
        ];

        let fund = analyzer().fund_performance(CORE, &managers, &accounts, &[]);

        assert_eq!(fund.manager_count, 1);
        assert_eq!(fund.failures.len(), 1);
        assert_eq!(fund.failures[0].manager_id, "BAD");
        assert_eq!(fund.profit_loss, dec!(300));
    }

    #[test]
    fn portfolio_rankings_exclude_inactive_managers() {
        let managers = vec![
            profile("M1", CORE, true),
            profile("M2", BALANCED, false),
            profile("M3", BALANCED, true),
        ];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10100)),
            account("A2", Some("M2"), BALANCED, dec!(10000), dec!(15000)),
            account("A3", Some("M3"), BALANCED, dec!(10000), dec!(10900)),
        ];

        let portfolio = analyzer().portfolio_performance(&managers, &accounts, &[]);
        let ids: Vec<&str> = portfolio.rankings.iter().map(|m| m.manager_id.as_str()).collect();

        assert_eq!(ids, vec!["M3", "M1"]);
        assert_eq!(portfolio.rankings[0].rank, Some(1));

        let standalone = analyzer().rankings(&managers, &accounts, &[]);
        let standalone_ids: Vec<&str> =
            standalone.rankings.iter().map(|m| m.manager_id.as_str()).collect();
        assert_eq!(standalone_ids, ids);
        assert!(standalone.failures.is_empty());
    }

    #[test]
    fn rankings_report_failed_managers() {
        let managers = vec![profile("M1", CORE, true), profile("BAD", CORE, true)];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10300)),
            account("A2", Some("BAD"), CORE, dec!(-1), dec!(0)),
        ];

        let ranked = analyzer().rankings(&managers, &accounts, &[]);

        assert_eq!(ranked.rankings.len(), 1);
        assert_eq!(ranked.rankings[0].manager_id, "M1");
        assert_eq!(ranked.failures.len(), 1);
        assert_eq!(ranked.failures[0].manager_id, "BAD");
        assert!(!ranked.failures[0].error.is_empty());
    }

    #[test]
    fn blended_return_is_rounded_once() {
        let managers = vec![profile("M1", CORE, true), profile("M2", BALANCED, true)];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10000.0045)),
            account("A2", Some("M2"), BALANCED, dec!(10000), dec!(10000.007)),
        ];

        let portfolio = analyzer().portfolio_performance(&managers, &accounts, &[]);

        // 0.000045% and 0.00007% report as 0.0000 and 0.0001; the true blend is 0.0000575%.
        let fund_return = |pool: PoolId| portfolio.funds.iter().find(|f| f.pool == pool).map(|f| f.return_pct);
        assert_eq!(fund_return(CORE), Some(dec!(0.0000)));
        assert_eq!(fund_return(BALANCED), Some(dec!(0.0001)));
        assert_eq!(portfolio.blended_return_pct, dec!(0.0001));
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let managers = vec![profile("M1", CORE, true), profile("M2", BALANCED, true)];
        let accounts = vec![
            account("A1", Some("M1"), CORE, dec!(10000), dec!(10123.45)),
            account("A2", Some("M2"), BALANCED, dec!(25000), dec!(24870.10)),
        ];
        let first = analyzer().portfolio_performance(&managers, &accounts, &[]);
        let second = analyzer().portfolio_performance(&managers, &accounts, &[]);
        assert_eq!(first, second);
    }
}
