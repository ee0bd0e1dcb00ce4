#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use configuration::{AnalyticsSettings, LoggingSettings, ReconciliationSettings, Settings};
use core_types::{BrokerageAccountSnapshot, FundCode, FundProduct, ManagerProfile, PoolId, Position, TradeRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fund(code: FundCode, rate: Decimal, minimum: Decimal, every: u32, invitation_only: bool) -> FundProduct {
    FundProduct {
        code,
        name: format!("{} Fund", code),
        monthly_rate_pct: rate,
        minimum_investment: minimum,
        incubation_months: 2,
        hold_months: 12,
        redemption_frequency_months: every,
        invitation_only,
        guaranteed: false,
    }
}

pub fn settings() -> Settings {
    Settings {
        funds: vec![
            fund(FundCode::Core, dec!(1.5), dec!(10000), 1, false),
            fund(FundCode::Balanced, dec!(2.5), dec!(50000), 3, false),
            fund(FundCode::Dynamic, dec!(3.5), dec!(250000), 6, false),
            fund(FundCode::Unlimited, dec!(0), dec!(250000), 3, true),
        ],
        reconciliation: ReconciliationSettings::default(),
        analytics: AnalyticsSettings::default(),
        logging: LoggingSettings::default(),
    }
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

pub fn position(id: &str, fund_code: &str, principal: Decimal, deposit_date: &str) -> Position {
    Position {
        position_id: id.to_string(),
        investor_id: format!("INV-{}", id),
        fund_code: fund_code.to_string(),
        principal,
        deposit_date: deposit_date.to_string(),
    }
}

pub fn linked_account(id: &str, position_id: &str, allocation: Decimal, equity: Decimal, withdrawals: Decimal) -> BrokerageAccountSnapshot {
    BrokerageAccountSnapshot {
        account_id: id.to_string(),
        position_id: Some(position_id.to_string()),
        manager_id: None,
        pool: None,
        initial_allocation: allocation,
        current_equity: equity,
        profit_loss: equity + withdrawals - allocation,
        withdrawals,
        last_sync: None,
    }
}

pub fn managed_account(id: &str, manager_id: &str, pool: PoolId, allocation: Decimal, equity: Decimal, withdrawals: Decimal) -> BrokerageAccountSnapshot {
    BrokerageAccountSnapshot {
        account_id: id.to_string(),
        position_id: None,
        manager_id: Some(manager_id.to_string()),
        pool: Some(pool),
        initial_allocation: allocation,
        current_equity: equity,
        profit_loss: equity + withdrawals - allocation,
        withdrawals,
        last_sync: None,
    }
}

pub fn manager(id: &str, pool: PoolId, active: bool) -> ManagerProfile {
    ManagerProfile {
        manager_id: id.to_string(),
        name: format!("Manager {}", id),
        pool,
        active,
    }
}

pub fn trades(account_id: &str, profits: &[Decimal]) -> Vec<TradeRecord> {
    profits
        .iter()
        .enumerate()
        .map(|(i, profit)| TradeRecord {
            trade_id: format!("{}-T{}", account_id, i),
            account_id: account_id.to_string(),
            symbol: "EURUSD".to_string(),
            profit: *profit,
            close_time: day(2024, 6, 1) + chrono::Duration::hours(i as i64),
        })
        .collect()
}
