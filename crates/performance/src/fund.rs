use crate::manager::{AccountTotals, ManagerPerformance, percentage_of};
use core_types::PoolId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A manager whose record could not be computed. The rest of the fund is still reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerFailure {
    pub manager_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundPerformance {
    pub pool: PoolId,
    pub manager_count: usize,
    pub allocation: Decimal,
    pub current_equity: Decimal,
    pub withdrawals: Decimal,
    pub profit_loss: Decimal,
    /// Allocation-weighted return of the whole pool: its P&L over its allocation.
    pub return_pct: Decimal,
    pub best_performer: Option<String>,
    pub worst_performer: Option<String>,
    pub managers: Vec<ManagerPerformance>,
    /// Accounts of this pool that no known manager trades. They count toward the totals.
    pub unassigned_account_ids: Vec<String>,
    pub failures: Vec<ManagerFailure>,
}

impl FundPerformance {
    /// Sums the managers and unassigned accounts of one pool into a fund record.
    ///
    /// Fills in each manager's contribution to the fund's P&L.
    pub fn assemble(
        pool: PoolId,
        mut managers: Vec<ManagerPerformance>,
        unassigned: AccountTotals,
        failures: Vec<ManagerFailure>,
    ) -> Self {
        let mut allocation = unassigned.allocation;
        let mut current_equity = unassigned.current_equity;
        let mut withdrawals = unassigned.withdrawals;
        for manager in &managers {
            allocation += manager.allocation;
            current_equity += manager.current_equity;
            withdrawals += manager.withdrawals;
        }
        let profit_loss = current_equity + withdrawals - allocation;

        for manager in managers.iter_mut() {
            manager.contribution_pct = percentage_of(manager.profit_loss, profit_loss);
        }

        let (best_performer, worst_performer) = extremes(&managers);

        Self {
            pool,
            manager_count: managers.len(),
            allocation,
            current_equity,
            withdrawals,
            profit_loss,
            return_pct: percentage_of(profit_loss, allocation),
            best_performer,
            worst_performer,
            managers,
            unassigned_account_ids: unassigned.account_ids,
            failures,
        }
    }
}

/// Highest and lowest return. The first manager encountered wins a tie.
fn extremes(managers: &[ManagerPerformance]) -> (Option<String>, Option<String>) {
    let mut best: Option<&ManagerPerformance> = None;
    let mut worst: Option<&ManagerPerformance> = None;

    for manager in managers {
        if best.is_none_or(|b| manager.return_pct > b.return_pct) {
            best = Some(manager);
        }
        if worst.is_none_or(|w| manager.return_pct < w.return_pct) {
            worst = Some(manager);
        }
    }

    (
        best.map(|m| m.manager_id.clone()),
        worst.map(|m| m.manager_id.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::TradeStatistics;
    use core_types::FundCode;
    use rust_decimal_macros::dec;

    fn manager(id: &str, allocation: Decimal, equity: Decimal) -> ManagerPerformance {
        let profit_loss = equity - allocation;
        ManagerPerformance {
            manager_id: id.to_string(),
            name: id.to_string(),
            pool: PoolId::Fund(FundCode::Balanced),
            active: true,
            account_ids: vec![format!("{}-acc", id)],
            allocation,
            current_equity: equity,
            withdrawals: Decimal::ZERO,
            profit_loss,
            return_pct: percentage_of(profit_loss, allocation),
            contribution_pct: Decimal::ZERO,
            statistics: TradeStatistics::new(),
            rank: None,
        }
    }

    #[test]
    fn sums_managers_and_unassigned_accounts() {
        let managers = vec![
            manager("M1", dec!(10000), dec!(11000)),
            manager("M2", dec!(30000), dec!(30600)),
        ];
        let unassigned = AccountTotals {
            account_ids: vec!["U1".to_string()],
            allocation: dec!(10000),
            current_equity: dec!(9900),
            withdrawals: dec!(300),
            reported_profit_loss: dec!(200),
        };

        let fund = FundPerformance::assemble(PoolId::Fund(FundCode::Balanced), managers, unassigned, vec![]);

        assert_eq!(fund.allocation, dec!(50000));
        assert_eq!(fund.profit_loss, dec!(1800));
        assert_eq!(fund.return_pct, dec!(3.6));
        assert_eq!(fund.manager_count, 2);
        assert_eq!(fund.unassigned_account_ids, vec!["U1".to_string()]);
        assert_eq!(fund.managers[0].contribution_pct, dec!(55.5556));
        assert_eq!(fund.managers[1].contribution_pct, dec!(33.3333));
        assert_eq!(fund.best_performer.as_deref(), Some("M1"));
        assert_eq!(fund.worst_performer.as_deref(), Some("M2"));
    }

    #[test]
    fn ties_go_to_the_first_manager() {
        let managers = vec![
            manager("M1", dec!(10000), dec!(10500)),
            manager("M2", dec!(20000), dec!(21000)),
        ];
        let fund = FundPerformance::assemble(
            PoolId::Fund(FundCode::Balanced),
            managers,
            AccountTotals::default(),
            vec![],
        );

        assert_eq!(fund.best_performer.as_deref(), Some("M1"));
        assert_eq!(fund.worst_performer.as_deref(), Some("M1"));
    }

    #[test]
    fn empty_pool_reports_zeroes() {
        let fund = FundPerformance::assemble(
            PoolId::ExtractedProfit,
            vec![],
            AccountTotals::default(),
            vec![],
        );
        assert_eq!(fund.return_pct, Decimal::ZERO);
        assert_eq!(fund.best_performer, None);
        assert_eq!(fund.worst_performer, None);
    }

    #[test]
    fn zero_fund_profit_gives_zero_contribution() {
        let managers = vec![
            manager("M1", dec!(10000), dec!(10500)),
            manager("M2", dec!(10000), dec!(9500)),
        ];
        let fund = FundPerformance::assemble(
            PoolId::Fund(FundCode::Balanced),
            managers,
            AccountTotals::default(),
            vec![],
        );
        assert_eq!(fund.profit_loss, Decimal::ZERO);
        assert!(fund.managers.iter().all(|m| m.contribution_pct.is_zero()));
    }
}
