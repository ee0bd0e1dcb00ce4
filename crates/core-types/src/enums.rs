use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of fund products offered on the platform.
///
/// Fund codes arrive from snapshots as strings and are resolved into this enum once,
/// at the boundary. Anything else is a `CoreError::UnknownFund`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundCode {
    Core,
    Balanced,
    Dynamic,
    Unlimited,
}

impl FundCode {
    pub const ALL: [FundCode; 4] = [
        FundCode::Core,
        FundCode::Balanced,
        FundCode::Dynamic,
        FundCode::Unlimited,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FundCode::Core => "CORE",
            FundCode::Balanced => "BALANCED",
            FundCode::Dynamic => "DYNAMIC",
            FundCode::Unlimited => "UNLIMITED",
        }
    }
}

impl fmt::Display for FundCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        FundCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownFund(s.to_string()))
    }
}

/// A pool of trading capital that managers and accounts are mapped to.
///
/// Every fund product has a pool. The extracted-profit pool holds profit taken out of
/// the client pools; it counts toward total P&L but is not client AUM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PoolId {
    Fund(FundCode),
    ExtractedProfit,
}

impl PoolId {
    const EXTRACTED_PROFIT: &'static str = "EXTRACTED_PROFIT";

    /// Whether the pool holds capital the platform owes to investors.
    pub fn is_client_funded(&self) -> bool {
        matches!(self, PoolId::Fund(_))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolId::Fund(code) => f.write_str(code.as_str()),
            PoolId::ExtractedProfit => f.write_str(Self::EXTRACTED_PROFIT),
        }
    }
}

impl FromStr for PoolId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Self::EXTRACTED_PROFIT) {
            return Ok(PoolId::ExtractedProfit);
        }
        s.parse::<FundCode>()
            .map(PoolId::Fund)
            .map_err(|_| CoreError::UnknownPool(s.to_string()))
    }
}

impl TryFrom<String> for PoolId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PoolId> for String {
    fn from(pool: PoolId) -> Self {
        pool.to_string()
    }
}

impl From<FundCode> for PoolId {
    fn from(code: FundCode) -> Self {
        PoolId::Fund(code)
    }
}

/// Redemption eligibility of a position, driven purely by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityState {
    /// Before incubation end. No interest, no redemptions.
    Incubating,
    /// Interest accrues and may be redeemed on the fund's cadence; principal is locked.
    InterestEligible,
    /// The minimum hold has elapsed. Interest and principal may be redeemed.
    FullyRedeemable,
}

/// Severity of the gap between promised and delivered performance.
///
/// Variants are declared in severity order, so sorting a list of levels puts
/// `Error` (data unavailable) last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Error,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
        RiskLevel::Error,
    ];

    /// Whether an operator has to act on a gap of this level.
    pub fn requires_action(&self) -> bool {
        matches!(self, RiskLevel::High | RiskLevel::Critical | RiskLevel::Error)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
            RiskLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Priority of a dashboard action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionPriority {
    High,
    Medium,
}

impl From<RiskLevel> for ActionPriority {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => ActionPriority::High,
            _ => ActionPriority::Medium,
        }
    }
}

impl fmt::Display for ActionPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionPriority::High => f.write_str("HIGH"),
            ActionPriority::Medium => f.write_str("MEDIUM"),
        }
    }
}
