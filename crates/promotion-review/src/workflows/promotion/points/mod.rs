//! Grade translation and windowed point aggregation.
//!
//! Two totals are exposed on purpose: [`selection_points`] feeds the batch candidate pass and
//! [`listing_points`] feeds the employee listing, which also counts the merit/penalty ledger.
//! They share the grade window and credit lookup but must not be collapsed into one.

mod grades;
mod window;

pub use grades::GradeTable;
pub use window::{
    grade_window, latest_credit, listing_points, lookback_years, selection_points, CreditUsed,
    PointBreakdown, PointInputs, YearPoints,
};
