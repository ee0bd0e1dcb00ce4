use crate::error::CommitmentError;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use core_types::{AVERAGE_MONTH_DAYS, EligibilityState, FundProduct};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// The milestone dates of a position and where `as_of` falls between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub deposit_date: DateTime<Utc>,
    pub incubation_end: DateTime<Utc>,
    /// Always equal to `incubation_end`: accrual starts the instant incubation ends.
    pub interest_start: DateTime<Utc>,
    pub minimum_hold_end: DateTime<Utc>,
    pub as_of: DateTime<Utc>,
    pub state: EligibilityState,
    /// Fractional months of accrual. Zero while incubating.
    pub months_since_interest_start: Decimal,
    pub interest_redemption_allowed: bool,
    pub principal_redemption_allowed: bool,
    /// Set when the deposit date could not be parsed and `as_of` was used instead.
    pub deposit_date_fallback: bool,
}

/// Parses an ISO-8601 date or date-time. Date-only values are taken as midnight UTC,
/// date-times without an offset as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Derives the timeline of a position from its raw deposit date.
///
/// An unparsable deposit date does not fail the computation: `as_of` is used as the
/// deposit date and the result is flagged with `deposit_date_fallback`.
pub fn compute(
    product: &FundProduct,
    deposit_date: &str,
    as_of: DateTime<Utc>,
) -> Result<Timeline, CommitmentError> {
    match parse_timestamp(deposit_date) {
        Some(deposit) => compute_from(product, deposit, as_of),
        None => {
            tracing::warn!(
                deposit_date,
                %as_of,
                "Unparsable deposit date, falling back to the as-of timestamp."
            );
            let mut timeline = compute_from(product, as_of, as_of)?;
            timeline.deposit_date_fallback = true;
            Ok(timeline)
        }
    }
}

/// Derives the timeline of a position from an already parsed deposit timestamp.
pub fn compute_from(
    product: &FundProduct,
    deposit: DateTime<Utc>,
    as_of: DateTime<Utc>,
) -> Result<Timeline, CommitmentError> {
    let incubation_end = add_months(deposit, product.incubation_months)?;
    let interest_start = incubation_end;
    let minimum_hold_end = add_months(incubation_end, product.hold_months)?;

    let state = if as_of < incubation_end {
        EligibilityState::Incubating
    } else if as_of < minimum_hold_end {
        EligibilityState::InterestEligible
    } else {
        EligibilityState::FullyRedeemable
    };

    let months_since_interest_start = match state {
        EligibilityState::Incubating => Decimal::ZERO,
        _ => months_between(interest_start, as_of),
    };

    Ok(Timeline {
        deposit_date: deposit,
        incubation_end,
        interest_start,
        minimum_hold_end,
        as_of,
        state,
        months_since_interest_start,
        interest_redemption_allowed: state != EligibilityState::Incubating,
        principal_redemption_allowed: state == EligibilityState::FullyRedeemable,
        deposit_date_fallback: false,
    })
}

/// Elapsed months from `from` to `to`: whole calendar months, plus the remaining days
/// divided by the average month length. Zero when `to` is not after `from`.
///
/// The fractional part is capped at one month so that the result never decreases
/// as `to` moves forward across a short calendar month.
pub fn months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    if to <= from {
        return Decimal::ZERO;
    }
    let (whole, anchor) = whole_months_between(from, to);
    let remainder_days =
        Decimal::from((to - anchor).num_seconds()) / Decimal::from(SECONDS_PER_DAY);
    let fraction = (remainder_days / AVERAGE_MONTH_DAYS).min(Decimal::ONE);
    Decimal::from(whole) + fraction
}

/// The date of the next interest-redemption window on or after `as_of`.
///
/// Windows fall every `redemption_frequency_months` after interest start. While the
/// position is still incubating this is the first window.
pub fn next_redemption_date(
    product: &FundProduct,
    timeline: &Timeline,
) -> Result<DateTime<Utc>, CommitmentError> {
    Ok(redemption_schedule(product, timeline, 1)?
        .into_iter()
        .next()
        .unwrap_or(timeline.interest_start))
}

/// The next `count` interest-redemption windows on or after `as_of`.
pub fn redemption_schedule(
    product: &FundProduct,
    timeline: &Timeline,
    count: usize,
) -> Result<Vec<DateTime<Utc>>, CommitmentError> {
    let frequency = product.redemption_frequency_months.max(1);
    let elapsed = if timeline.as_of > timeline.interest_start {
        whole_months_between(timeline.interest_start, timeline.as_of).0
    } else {
        0
    };

    let mut index = (elapsed / frequency).max(1);
    let mut windows = Vec::with_capacity(count);
    while windows.len() < count {
        let offset = index.checked_mul(frequency).ok_or_else(|| {
            CommitmentError::DateOverflow(format!("redemption window {} of {}", index, product.code))
        })?;
        let window = add_months(timeline.interest_start, offset)?;
        if window >= timeline.as_of {
            windows.push(window);
        }
        index += 1;
    }
    Ok(windows)
}

/// When principal can next be redeemed: the end of the minimum hold if it lies ahead,
/// otherwise the next redemption window.
pub fn next_principal_redemption_date(
    product: &FundProduct,
    timeline: &Timeline,
) -> Result<DateTime<Utc>, CommitmentError> {
    if timeline.as_of < timeline.minimum_hold_end {
        Ok(timeline.minimum_hold_end)
    } else {
        next_redemption_date(product, timeline)
    }
}

fn add_months(start: DateTime<Utc>, months: u32) -> Result<DateTime<Utc>, CommitmentError> {
    start
        .checked_add_months(Months::new(months))
        .ok_or_else(|| CommitmentError::DateOverflow(format!("{} + {} months", start, months)))
}

/// The largest number of calendar months that fits between `from` and `to`, and the
/// instant it lands on. Requires `from <= to`.
fn whole_months_between(from: DateTime<Utc>, to: DateTime<Utc>) -> (u32, DateTime<Utc>) {
    let estimate = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    let mut whole = u32::try_from(estimate.max(0)).unwrap_or(0);
    loop {
        match from.checked_add_months(Months::new(whole)) {
            Some(anchor) if anchor <= to => return (whole, anchor),
            _ if whole == 0 => return (0, from),
            _ => whole -= 1,
        }
    }
}
