use serde::{Deserialize, Serialize};

use super::super::domain::{CreditRecord, GradeRecord, MeritLedger};
use super::super::selection::SelectionPolicy;
use super::grades::GradeTable;

/// Points awarded for one year inside the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPoints {
    pub year: i32,
    pub grade: Option<String>,
    pub points: f64,
}

/// The credit score that contributed to a total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditUsed {
    pub year: i32,
    pub score: f64,
}

/// Audit trail for a point total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointBreakdown {
    pub base_year: i32,
    pub window: Vec<YearPoints>,
    pub window_total: f64,
    pub credit: Option<CreditUsed>,
    pub merit: f64,
    pub penalty: f64,
    pub adjustment: f64,
    pub total: f64,
}

/// Per-employee raw records feeding a point total.
#[derive(Debug, Clone, Copy)]
pub struct PointInputs<'a> {
    pub grades: &'a [GradeRecord],
    pub credits: &'a [CreditRecord],
    /// Signed all-time sum of bonus/penalty records.
    pub adjustment: f64,
}

/// Years summed for `base_year`, newest first.
///
/// The window runs from `base_year - 1` back `min(service_years, cap)` years and is cut off
/// at the grade floor year.
pub fn lookback_years(service_years: u32, base_year: i32, policy: &SelectionPolicy) -> Vec<i32> {
    let range = service_years.min(policy.max_lookback_years) as i32;
    (1..=range)
        .map_while(|offset| base_year.checked_sub(offset))
        .take_while(|year| *year >= policy.grade_floor_year)
        .collect()
}

pub fn grade_window(
    grades: &[GradeRecord],
    table: &GradeTable,
    service_years: u32,
    base_year: i32,
    policy: &SelectionPolicy,
) -> Vec<YearPoints> {
    lookback_years(service_years, base_year, policy)
        .into_iter()
        .map(|year| {
            let grade = grades
                .iter()
                .find(|record| record.year == year)
                .map(|record| record.grade.clone());
            let points = table.points_for(grade.as_deref().unwrap_or(""), year, policy);
            YearPoints {
                year,
                grade,
                points,
            }
        })
        .collect()
}

/// Latest credit score at or before the credit ceiling year. Never summed across years.
pub fn latest_credit(credits: &[CreditRecord], policy: &SelectionPolicy) -> Option<CreditUsed> {
    credits
        .iter()
        .filter(|record| record.year <= policy.credit_ceiling_year)
        .max_by_key(|record| record.year)
        .map(|record| CreditUsed {
            year: record.year,
            score: record.score,
        })
}

fn aggregate(
    inputs: PointInputs<'_>,
    table: &GradeTable,
    service_years: u32,
    base_year: i32,
    ledger: MeritLedger,
    policy: &SelectionPolicy,
) -> PointBreakdown {
    let window = grade_window(inputs.grades, table, service_years, base_year, policy);
    let window_total: f64 = window.iter().map(|year| year.points).sum();
    let credit = latest_credit(inputs.credits, policy);
    let credit_score = credit.map(|c| c.score).unwrap_or(0.0);

    let total = window_total + credit_score + ledger.merit - ledger.penalty + inputs.adjustment;

    PointBreakdown {
        base_year,
        window,
        window_total,
        credit,
        merit: ledger.merit,
        penalty: ledger.penalty,
        adjustment: inputs.adjustment,
        total,
    }
}

/// Total used by the batch candidate pass: grade window, credit and bonus/penalty
/// adjustment. Merit and penalty ledgers are deliberately left out.
pub fn selection_points(
    inputs: PointInputs<'_>,
    table: &GradeTable,
    service_years: u32,
    base_year: i32,
    policy: &SelectionPolicy,
) -> PointBreakdown {
    aggregate(
        inputs,
        table,
        service_years,
        base_year,
        MeritLedger::default(),
        policy,
    )
}

/// Total shown on the live employee listing: the selection inputs plus merit minus penalty.
pub fn listing_points(
    inputs: PointInputs<'_>,
    table: &GradeTable,
    service_years: u32,
    base_year: i32,
    ledger: MeritLedger,
    policy: &SelectionPolicy,
) -> PointBreakdown {
    aggregate(inputs, table, service_years, base_year, ledger, policy)
}
