use crate::error::ReconcileError;
use chrono::{DateTime, Utc};
use commitment::{AccrualCalculator, ExpectedPerformance, timeline};
use configuration::ReconciliationSettings;
use core_types::{BrokerageAccountSnapshot, Position, RiskLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The signed difference between what a position was promised and what its accounts delivered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceGap {
    pub position_id: String,
    pub investor_id: String,
    pub fund_code: String,
    pub account_ids: Vec<String>,
    pub expected_value: Decimal,
    /// Withdrawals plus current equity, summed over every linked account.
    pub actual_value: Decimal,
    /// `actual_value - expected_value`. Positive means the accounts are ahead of the commitment.
    pub gap_amount: Decimal,
    /// Gap over expected value, in percent. Zero when nothing is expected.
    pub gap_pct: Decimal,
    pub risk_level: RiskLevel,
    pub action_required: bool,
    pub recommendation: String,
    /// Set when the deposit date could not be parsed and "now" was used instead.
    pub deposit_date_fallback: bool,
    /// Why the record is an ERROR record, if it is one.
    pub error: Option<String>,
    pub as_of: DateTime<Utc>,
}

/// Compares expected performance against brokerage snapshots and classifies the gap.
#[derive(Debug, Clone)]
pub struct GapReconciler {
    thresholds: ReconciliationSettings,
}

impl GapReconciler {
    pub fn new(thresholds: ReconciliationSettings) -> Self {
        Self { thresholds }
    }

    /// Maps a gap percentage onto a risk level. Each threshold is inclusive.
    pub fn classify(&self, gap_pct: Decimal) -> RiskLevel {
        let magnitude = gap_pct.abs();
        if magnitude >= self.thresholds.critical_threshold_pct {
            RiskLevel::Critical
        } else if magnitude >= self.thresholds.high_threshold_pct {
            RiskLevel::High
        } else if magnitude >= self.thresholds.medium_threshold_pct {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Builds the gap record for a position whose expected performance is known.
    ///
    /// Fails with [`ReconcileError::AccountNotFound`] when `accounts` is empty.
    pub fn compare(
        &self,
        expected: &ExpectedPerformance,
        accounts: &[&BrokerageAccountSnapshot],
    ) -> Result<PerformanceGap, ReconcileError> {
        if accounts.is_empty() {
            return Err(ReconcileError::AccountNotFound(expected.position_id.clone()));
        }

        let actual_value: Decimal = accounts.iter().map(|a| a.delivered_value()).sum();
        let gap_amount = actual_value - expected.expected_value;
        let exact_pct = if expected.expected_value.is_zero() {
            Decimal::ZERO
        } else {
            gap_amount / expected.expected_value * Decimal::ONE_HUNDRED
        };
        // Classified at full precision; only the reported figure is rounded.
        let risk_level = self.classify(exact_pct);
        let gap_pct = exact_pct.round_dp(4);

        tracing::debug!(
            position_id = %expected.position_id,
            expected = %expected.expected_value,
            actual = %actual_value,
            gap_pct = %gap_pct,
            risk = %risk_level,
            "Reconciled position."
        );

        Ok(PerformanceGap {
            position_id: expected.position_id.clone(),
            investor_id: expected.investor_id.clone(),
            fund_code: expected.fund_code.to_string(),
            account_ids: accounts.iter().map(|a| a.account_id.clone()).collect(),
            expected_value: expected.expected_value,
            actual_value,
            gap_amount,
            gap_pct,
            risk_level,
            action_required: risk_level.requires_action(),
            recommendation: recommendation(risk_level, gap_pct),
            deposit_date_fallback: expected.deposit_date_fallback,
            error: None,
            as_of: expected.as_of,
        })
    }

    /// Reconciles one position end to end. Never fails: any problem becomes an ERROR record.
    pub fn reconcile(
        &self,
        calculator: &AccrualCalculator<'_>,
        position: &Position,
        accounts: &[&BrokerageAccountSnapshot],
        as_of: DateTime<Utc>,
    ) -> PerformanceGap {
        let result = match calculator.expected_performance(position, as_of) {
            Ok(expected) => self
                .compare(&expected, accounts)
                .map_err(|e| (e, expected.deposit_date_fallback)),
            Err(e) => {
                // No timeline was computed, so the flag comes from the raw date alone.
                let fallback = timeline::parse_timestamp(&position.deposit_date).is_none();
                Err((ReconcileError::from(e), fallback))
            }
        };

        match result {
            Ok(gap) => gap,
            Err((e, deposit_date_fallback)) => {
                tracing::warn!(position_id = %position.position_id, error = %e, "Position could not be reconciled.");
                error_gap(position, accounts, as_of, &e, deposit_date_fallback)
            }
        }
    }
}

/// An ERROR record for a position that could not be reconciled.
///
/// Carries no figures, only the position identity, the reason and whether the deposit
/// date had to be defaulted.
pub fn error_gap(
    position: &Position,
    accounts: &[&BrokerageAccountSnapshot],
    as_of: DateTime<Utc>,
    error: &ReconcileError,
    deposit_date_fallback: bool,
) -> PerformanceGap {
    PerformanceGap {
        position_id: position.position_id.clone(),
        investor_id: position.investor_id.clone(),
        fund_code: position.fund_code.clone(),
        account_ids: accounts.iter().map(|a| a.account_id.clone()).collect(),
        expected_value: Decimal::ZERO,
        actual_value: Decimal::ZERO,
        gap_amount: Decimal::ZERO,
        gap_pct: Decimal::ZERO,
        risk_level: RiskLevel::Error,
        action_required: true,
        recommendation: format!("Data unavailable ({}). Verify the position's fund and brokerage link.", error),
        deposit_date_fallback,
        error: Some(error.to_string()),
        as_of,
    }
}

/// Human-readable advice from the gap's direction and risk level.
pub fn recommendation(risk_level: RiskLevel, gap_pct: Decimal) -> String {
    let magnitude = gap_pct.abs().round_dp(1);
    let behind = gap_pct < Decimal::ZERO;

    match (risk_level, behind) {
        (RiskLevel::Low, _) => "Within tolerance. No action required.".to_string(),
        (RiskLevel::Medium, true) => {
            format!("Underperforming the commitment by {}%. Monitor the position.", magnitude)
        }
        (RiskLevel::Medium, false) => {
            format!("Ahead of the commitment by {}%. Monitor the position.", magnitude)
        }
        (RiskLevel::High, true) => format!(
            "Underperforming the commitment by {}%. Review the manager's strategy.",
            magnitude
        ),
        (RiskLevel::High, false) => format!(
            "Ahead of the commitment by {}%. Review the strategy's risk exposure.",
            magnitude
        ),
        (RiskLevel::Critical, true) => format!(
            "Shortfall of {}% against the commitment. Immediate action required.",
            magnitude
        ),
        (RiskLevel::Critical, false) => format!(
            "Returns {}% above the commitment. Immediate review of risk taken is required.",
            magnitude
        ),
        (RiskLevel::Error, _) => "Data unavailable. Verify the brokerage link.".to_string(),
    }
}
