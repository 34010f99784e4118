//! Age Verification - date of birth to whole-year age
//!
//! All functions take "now" as an argument. Nothing here reads the clock.

use chrono::{Datelike, NaiveDate};

use halo_core::{AdultModeConfig, HaloError, HaloResult, DEFAULT_MINIMUM_AGE};

/// Age required to pass verification
pub const VERIFICATION_AGE: u32 = DEFAULT_MINIMUM_AGE;

/// Result of a date-of-birth check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeVerification {
    pub verified: bool,
    /// Whole years between date of birth and the reference date
    pub age: u32,
}

/// Whole years from `date_of_birth` to `as_of`.
///
/// Birth year is subtracted from the current year, minus one if this year's
/// birthday has not happened yet. A Feb 29 birthday is reached on Mar 1 in
/// non-leap years. Dates of birth after `as_of` yield 0.
pub fn age_on(date_of_birth: NaiveDate, as_of: NaiveDate) -> u32 {
    let mut years = as_of.year() - date_of_birth.year();
    if (as_of.month(), as_of.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Verify against the standard threshold of 18
pub fn verify_age(date_of_birth: NaiveDate, as_of: NaiveDate) -> AgeVerification {
    verify_age_against(date_of_birth, as_of, VERIFICATION_AGE)
}

/// Verify against an explicit threshold
pub fn verify_age_against(date_of_birth: NaiveDate, as_of: NaiveDate, min_age: u32) -> AgeVerification {
    let age = age_on(date_of_birth, as_of);
    AgeVerification {
        verified: age >= min_age,
        age,
    }
}

/// Reject dates of birth that cannot belong to a real viewer
pub fn validate_date_of_birth(
    date_of_birth: NaiveDate,
    as_of: NaiveDate,
    max_plausible_age: u32,
) -> HaloResult<NaiveDate> {
    if date_of_birth > as_of {
        return Err(HaloError::invalid_input("date of birth is in the future"));
    }
    if age_on(date_of_birth, as_of) > max_plausible_age {
        return Err(HaloError::invalid_input(format!(
            "date of birth implies an age above {}",
            max_plausible_age
        )));
    }
    Ok(date_of_birth)
}

/// Validate, then verify against the configured threshold (never below 18)
pub fn checked_verify_age(
    date_of_birth: NaiveDate,
    as_of: NaiveDate,
    config: &AdultModeConfig,
) -> HaloResult<AgeVerification> {
    let date_of_birth = validate_date_of_birth(date_of_birth, as_of, config.max_plausible_age)?;
    Ok(verify_age_against(
        date_of_birth,
        as_of,
        config.min_age.max(VERIFICATION_AGE),
    ))
}

/// Parse an ISO `YYYY-MM-DD` date of birth
pub fn parse_date_of_birth(input: &str) -> HaloResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| HaloError::invalid_input(format!("date of birth: {}", e)))
}

/// Parse a four-digit birth year, read as January 1 of that year.
///
/// This is the coarse age gate: someone born later in the year is treated
/// as older than they are, so hosts should prefer full dates where they
/// can collect them.
pub fn parse_birth_year(input: &str) -> HaloResult<NaiveDate> {
    let input = input.trim();
    if input.len() != 4 || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HaloError::invalid_input("please enter a valid 4-digit year"));
    }
    let year: i32 = input
        .parse()
        .map_err(|_| HaloError::invalid_input("please enter a valid 4-digit year"))?;
    NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| HaloError::invalid_input("please enter a valid 4-digit year"))
}
