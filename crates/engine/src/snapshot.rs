use crate::error::EngineError;
use core_types::{BrokerageAccountSnapshot, ManagerProfile, Position, TradeRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One internally consistent set of inputs, gathered for a single as-of instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub positions: Vec<Position>,
    #[serde(default)]
    pub accounts: Vec<BrokerageAccountSnapshot>,
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    #[serde(default)]
    pub managers: Vec<ManagerProfile>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Accounts grouped by the position they are linked to, in input order.
    pub fn accounts_by_position(&self) -> HashMap<&str, Vec<&BrokerageAccountSnapshot>> {
        let mut index: HashMap<&str, Vec<&BrokerageAccountSnapshot>> = HashMap::new();
        for account in &self.accounts {
            if let Some(position_id) = account.position_id.as_deref() {
                index.entry(position_id).or_default().push(account);
            }
        }
        index
    }
}
