use crate::error::CommitmentError;
use crate::timeline::{self, Timeline};
use chrono::{DateTime, Utc};
use configuration::FundCatalog;
use core_types::{EligibilityState, FundCode, FundProduct, Position};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// What the platform contractually owes on a position at `as_of`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedPerformance {
    pub position_id: String,
    pub investor_id: String,
    pub fund_code: FundCode,
    pub principal: Decimal,
    pub monthly_rate_pct: Decimal,
    pub state: EligibilityState,
    /// Fractional months since interest start, rounded to six places.
    pub months_elapsed: Decimal,
    pub expected_interest: Decimal,
    pub expected_value: Decimal,
    pub interest_start: DateTime<Utc>,
    pub minimum_hold_end: DateTime<Utc>,
    pub next_redemption_date: DateTime<Utc>,
    pub next_principal_redemption_date: DateTime<Utc>,
    pub as_of: DateTime<Utc>,
    pub deposit_date_fallback: bool,
}

/// A stateless calculator for the contractual value of positions.
///
/// Borrows the immutable fund catalog; every call takes an explicit `as_of`.
#[derive(Debug, Clone, Copy)]
pub struct AccrualCalculator<'a> {
    catalog: &'a FundCatalog,
}

impl<'a> AccrualCalculator<'a> {
    pub fn new(catalog: &'a FundCatalog) -> Self {
        Self { catalog }
    }

    /// Resolves the position's fund against the catalog.
    pub fn product_for(&self, position: &Position) -> Result<&'a FundProduct, CommitmentError> {
        self.catalog
            .resolve(&position.fund_code)
            .map_err(|_| CommitmentError::UnknownFund(position.fund_code.clone()))
    }

    pub fn timeline(
        &self,
        position: &Position,
        as_of: DateTime<Utc>,
    ) -> Result<Timeline, CommitmentError> {
        let product = self.product_for(position)?;
        timeline::compute(product, &position.deposit_date, as_of)
    }

    /// Computes the expected value of a position using simple, non-compounding interest.
    ///
    /// While the position is incubating the expected value is exactly the principal.
    pub fn expected_performance(
        &self,
        position: &Position,
        as_of: DateTime<Utc>,
    ) -> Result<ExpectedPerformance, CommitmentError> {
        let product = self.product_for(position)?;
        if position.principal < Decimal::ZERO {
            return Err(CommitmentError::InvalidPrincipal(
                position.position_id.clone(),
                position.principal,
            ));
        }

        let timeline = timeline::compute(product, &position.deposit_date, as_of)?;
        let expected_interest = match timeline.state {
            EligibilityState::Incubating => Decimal::ZERO,
            _ => expected_interest(position.principal, product, timeline.months_since_interest_start),
        };

        tracing::debug!(
            position_id = %position.position_id,
            fund = %product.code,
            state = ?timeline.state,
            months = %timeline.months_since_interest_start,
            interest = %expected_interest,
            "Computed expected performance."
        );

        Ok(ExpectedPerformance {
            position_id: position.position_id.clone(),
            investor_id: position.investor_id.clone(),
            fund_code: product.code,
            principal: position.principal,
            monthly_rate_pct: product.monthly_rate_pct,
            state: timeline.state,
            months_elapsed: timeline.months_since_interest_start.round_dp(6),
            expected_interest,
            expected_value: position.principal + expected_interest,
            interest_start: timeline.interest_start,
            minimum_hold_end: timeline.minimum_hold_end,
            next_redemption_date: timeline::next_redemption_date(product, &timeline)?,
            next_principal_redemption_date: timeline::next_principal_redemption_date(
                product, &timeline,
            )?,
            as_of,
            deposit_date_fallback: timeline.deposit_date_fallback,
        })
    }

    /// Same as [`expected_performance`](Self::expected_performance) at the current wall-clock time.
    pub fn expected_performance_now(
        &self,
        position: &Position,
    ) -> Result<ExpectedPerformance, CommitmentError> {
        self.expected_performance(position, Utc::now())
    }
}

/// principal × monthly rate × months, rounded to cents.
pub fn expected_interest(principal: Decimal, product: &FundProduct, months: Decimal) -> Decimal {
    (principal * product.monthly_rate() * months)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Checks a principal against the fund's minimum investment.
pub fn validate_principal(product: &FundProduct, principal: Decimal) -> Result<(), CommitmentError> {
    if principal < product.minimum_investment {
        return Err(CommitmentError::BelowMinimum {
            fund: product.code,
            principal,
            minimum: product.minimum_investment,
        });
    }
    Ok(())
}
