use crate::enums::{FundCode, PoolId};
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Static definition of a fund product's accrual and redemption rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundProduct {
    pub code: FundCode,
    pub name: String,
    /// Monthly accrual rate in percent (1.5 = 1.5% per month). Zero for performance-share funds.
    pub monthly_rate_pct: Decimal,
    pub minimum_investment: Decimal,
    pub incubation_months: u32,
    /// Measured from the end of incubation.
    pub hold_months: u32,
    pub redemption_frequency_months: u32,
    #[serde(default)]
    pub invitation_only: bool,
    /// No fund on the platform offers a guarantee; the catalog rejects `true`.
    #[serde(default)]
    pub guaranteed: bool,
}

impl FundProduct {
    /// The monthly rate as a fraction (0.015 for 1.5%).
    pub fn monthly_rate(&self) -> Decimal {
        self.monthly_rate_pct / Decimal::ONE_HUNDRED
    }

    pub fn is_performance_share(&self) -> bool {
        self.monthly_rate_pct.is_zero()
    }
}

/// An investor's stake in a fund, as handed over by the position snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: String,
    pub investor_id: String,
    /// Raw fund code from the snapshot, resolved with [`Position::fund`].
    pub fund_code: String,
    pub principal: Decimal,
    /// ISO-8601 date or date-time. Kept raw so that an unparsable value can be reported.
    pub deposit_date: String,
}

impl Position {
    pub fn fund(&self) -> Result<FundCode, CoreError> {
        self.fund_code.parse()
    }
}

/// Point-in-time state of a brokerage account. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerageAccountSnapshot {
    pub account_id: String,
    /// The investor position this account delivers performance for, if any.
    #[serde(default)]
    pub position_id: Option<String>,
    /// The manager trading this account, if assigned.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// The pool the account belongs to. Needed for accounts without a manager.
    #[serde(default)]
    pub pool: Option<PoolId>,
    pub initial_allocation: Decimal,
    pub current_equity: Decimal,
    #[serde(default)]
    pub profit_loss: Decimal,
    #[serde(default)]
    pub withdrawals: Decimal,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl BrokerageAccountSnapshot {
    /// Everything the account has paid out or still holds.
    pub fn delivered_value(&self) -> Decimal {
        self.withdrawals + self.current_equity
    }
}

/// A closed trade reported by the brokerage bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: String,
    pub account_id: String,
    pub symbol: String,
    /// Signed realized profit or loss.
    pub profit: Decimal,
    pub close_time: DateTime<Utc>,
}

/// A human or algorithmic manager driving one or more brokerage accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub manager_id: String,
    pub name: String,
    pub pool: PoolId,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn account_snapshot_deserializes_with_defaults() {
        let json = r#"{
            "account_id": "ACC-1",
            "position_id": "POS-1",
            "initial_allocation": 10000,
            "current_equity": 10250.5
        }"#;
        let account: BrokerageAccountSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(account.position_id.as_deref(), Some("POS-1"));
        assert_eq!(account.manager_id, None);
        assert_eq!(account.withdrawals, Decimal::ZERO);
        assert_eq!(account.delivered_value(), dec!(10250.5));
    }

    #[test]
    fn manager_defaults_to_active() {
        let manager: ManagerProfile =
            serde_json::from_str(r#"{"manager_id":"M1","name":"Atlas","pool":"CORE"}"#).unwrap();
        assert!(manager.active);
        assert_eq!(manager.pool, PoolId::Fund(FundCode::Core));
    }

    #[test]
    fn position_resolves_its_fund_code() {
        let mut position = Position {
            position_id: "POS-1".into(),
            investor_id: "INV-1".into(),
            fund_code: "balanced".into(),
            principal: dec!(50000),
            deposit_date: "2024-01-15".into(),
        };
        assert_eq!(position.fund().unwrap(), FundCode::Balanced);

        position.fund_code = "GOLD".into();
        assert!(matches!(position.fund(), Err(CoreError::UnknownFund(_))));
    }
}
