use chrono::{DateTime, Utc};
use core_types::{ActionPriority, RiskLevel};
use reconciler::PerformanceGap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One position an operator has to act on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub position_id: String,
    pub investor_id: String,
    pub fund_code: String,
    pub risk_level: RiskLevel,
    pub priority: ActionPriority,
    pub gap_amount: Decimal,
    pub gap_pct: Decimal,
    pub recommendation: String,
}

impl ActionItem {
    fn from_gap(gap: &PerformanceGap) -> Self {
        Self {
            position_id: gap.position_id.clone(),
            investor_id: gap.investor_id.clone(),
            fund_code: gap.fund_code.clone(),
            risk_level: gap.risk_level,
            priority: ActionPriority::from(gap.risk_level),
            gap_amount: gap.gap_amount,
            gap_pct: gap.gap_pct,
            recommendation: gap.recommendation.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub positions: usize,
    /// Number of positions at each level. Every level is present, possibly with zero.
    pub counts: BTreeMap<RiskLevel, usize>,
    /// Totals over reconciled positions only. ERROR records carry no figures.
    pub total_expected: Decimal,
    pub total_actual: Decimal,
    pub total_gap: Decimal,
    /// Records computed from a defaulted deposit date.
    pub degraded: usize,
    pub action_required: usize,
}

/// Reconciliation of every known position at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub as_of: DateTime<Utc>,
    pub by_risk: BTreeMap<RiskLevel, Vec<PerformanceGap>>,
    pub action_items: Vec<ActionItem>,
    pub summary: DashboardSummary,
}

impl Dashboard {
    /// Groups gaps by level and extracts the action items. Input order is kept within
    /// each group and in the action list.
    pub fn assemble(as_of: DateTime<Utc>, gaps: Vec<PerformanceGap>) -> Self {
        let mut counts: BTreeMap<RiskLevel, usize> = RiskLevel::ALL.iter().map(|level| (*level, 0)).collect();
        let mut total_expected = Decimal::ZERO;
        let mut total_actual = Decimal::ZERO;
        let mut degraded = 0;

        for gap in &gaps {
            *counts.entry(gap.risk_level).or_default() += 1;
            if gap.risk_level != RiskLevel::Error {
                total_expected += gap.expected_value;
                total_actual += gap.actual_value;
            }
            if gap.deposit_date_fallback {
                degraded += 1;
            }
        }

        let action_items: Vec<ActionItem> = gaps
            .iter()
            .filter(|gap| gap.action_required)
            .map(ActionItem::from_gap)
            .collect();

        let summary = DashboardSummary {
            positions: gaps.len(),
            counts,
            total_expected,
            total_actual,
            total_gap: total_actual - total_expected,
            degraded,
            action_required: action_items.len(),
        };

        let mut by_risk: BTreeMap<RiskLevel, Vec<PerformanceGap>> = BTreeMap::new();
        for gap in gaps {
            by_risk.entry(gap.risk_level).or_default().push(gap);
        }

        Self {
            as_of,
            by_risk,
            action_items,
            summary,
        }
    }

    /// Every gap record, grouped in severity order.
    pub fn gaps(&self) -> impl Iterator<Item = &PerformanceGap> {
        self.by_risk.values().flatten()
    }

    pub fn gaps_at(&self, level: RiskLevel) -> &[PerformanceGap] {
        self.by_risk.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }
}
