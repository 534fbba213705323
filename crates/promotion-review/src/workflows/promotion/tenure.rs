use chrono::{Datelike, NaiveDate};

use super::domain::EmployeeProfile;
use super::fallback::FallbackChain;

/// Whole calendar years between `date` and `target_year`, never negative.
pub(crate) fn years_since(date: NaiveDate, target_year: i32) -> u32 {
    target_year
        .checked_sub(date.year())
        .and_then(|years| u32::try_from(years).ok())
        .unwrap_or(0)
}

pub(crate) fn from_level_start(profile: &EmployeeProfile, target_year: i32) -> Option<u32> {
    profile
        .level_start_date
        .map(|date| years_since(date, target_year))
}

pub(crate) fn from_service_field(profile: &EmployeeProfile) -> Option<u32> {
    profile.years_of_service
}

pub(crate) fn from_hire_date(profile: &EmployeeProfile, target_year: i32) -> Option<u32> {
    profile.hire_date.map(|date| years_since(date, target_year))
}

/// Tenure used against `min_tenure`: level start date, service field, hire date, then 0.
pub fn level_tenure(profile: &EmployeeProfile, target_year: i32) -> u32 {
    FallbackChain::<EmployeeProfile, u32>::new()
        .then("level_start_date", |p| from_level_start(p, target_year))
        .then("years_of_service", from_service_field)
        .then("hire_date", |p| from_hire_date(p, target_year))
        .resolve_or(profile, 0)
}

/// Years of service that bound the grade lookback: the service field is authoritative,
/// then level start date, then hire date, then 0.
pub fn service_years(profile: &EmployeeProfile, target_year: i32) -> u32 {
    FallbackChain::<EmployeeProfile, u32>::new()
        .then("years_of_service", from_service_field)
        .then("level_start_date", |p| from_level_start(p, target_year))
        .then("hire_date", |p| from_hire_date(p, target_year))
        .resolve_or(profile, 0)
}
