use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Format of reference dates handed over by the UI collaborator.
pub const REFERENCE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WaitingPeriodError {
    #[error("reference date '{value}' is not a valid YYYY-MM-DD calendar date")]
    InvalidDate { value: String },
    #[error("coverage start {days} days after {reference} is outside the supported calendar")]
    OutOfRange { reference: NaiveDate, days: u32 },
}

/// Derived coverage timeline. Recomputed whenever it is needed because
/// `days_remaining` depends on the evaluation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingPeriodResult {
    pub reference_date: NaiveDate,
    pub coverage_start_date: NaiveDate,
    pub days_remaining: u32,
    pub is_eligible_now: bool,
}

impl WaitingPeriodResult {
    pub fn waiting_period_days(&self) -> i64 {
        (self.coverage_start_date - self.reference_date).num_days()
    }
}

/// Parse a `YYYY-MM-DD` string into a calendar date with no time-of-day or
/// timezone component, so the day can never shift.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, WaitingPeriodError> {
    let invalid = || WaitingPeriodError::InvalidDate {
        value: raw.to_string(),
    };

    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(3, '-');
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    if year.len() != 4 || month.len() != 2 || day.len() != 2 {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(trimmed, REFERENCE_DATE_FORMAT).map_err(|_| invalid())
}

/// Compute the coverage timeline relative to the current local date.
pub fn compute(
    reference_date: &str,
    waiting_period_days: u32,
) -> Result<WaitingPeriodResult, WaitingPeriodError> {
    compute_on(reference_date, waiting_period_days, Local::now().date_naive())
}

/// Compute the coverage timeline as seen on `today`.
///
/// A reference date in the future is accepted: the remaining days then include
/// the gap until that date, which supports planning before arrival.
pub fn compute_on(
    reference_date: &str,
    waiting_period_days: u32,
    today: NaiveDate,
) -> Result<WaitingPeriodResult, WaitingPeriodError> {
    let reference = parse_reference_date(reference_date)?;
    let coverage_start_date = reference
        .checked_add_days(Days::new(u64::from(waiting_period_days)))
        .ok_or(WaitingPeriodError::OutOfRange {
            reference,
            days: waiting_period_days,
        })?;

    let remaining = (coverage_start_date - today).num_days().max(0);
    let days_remaining = u32::try_from(remaining).unwrap_or(u32::MAX);

    Ok(WaitingPeriodResult {
        reference_date: reference,
        coverage_start_date,
        days_remaining,
        is_eligible_now: days_remaining == 0,
    })
}
