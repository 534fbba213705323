use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for employees (the user id of the HR system).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered promotion tier, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    L0,
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::L0,
        Level::L1,
        Level::L2,
        Level::L3,
        Level::L4,
        Level::L5,
    ];

    /// The tier an employee is promoted into; `None` at the top.
    pub fn successor(self) -> Option<Level> {
        match self {
            Level::L0 => Some(Level::L1),
            Level::L1 => Some(Level::L2),
            Level::L2 => Some(Level::L3),
            Level::L3 => Some(Level::L4),
            Level::L4 => Some(Level::L5),
            Level::L5 => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::L0 => "L0",
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L3 => "L3",
            Level::L4 => "L4",
            Level::L5 => "L5",
        }
    }
}

/// Position in the approval chain. Only some roles are evaluated for promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    TeamMember,
    DepartmentHead,
    HrTeam,
    Ceo,
}

/// Employee master data consumed by the selection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: EmployeeId,
    pub name: String,
    pub role: EmployeeRole,
    pub level: Option<Level>,
    pub years_of_service: Option<u32>,
    pub level_start_date: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// Thresholds for reaching a level in a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCriteria {
    pub level: Level,
    pub year: i32,
    pub required_points: f64,
    #[serde(default)]
    pub special_required_points: Option<f64>,
    pub required_credits: f64,
    #[serde(default)]
    pub min_tenure: Option<u32>,
}

/// Either one evaluation year or an inclusive span such as `2021-2024`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YearRange(pub String);

impl YearRange {
    /// Exact string match first, then numeric containment for `<from>-<to>`.
    pub fn contains(&self, year: i32) -> bool {
        let raw = self.0.trim();
        if raw == year.to_string() {
            return true;
        }

        match raw.split_once('-') {
            Some((from, to)) => match (from.trim().parse::<i32>(), to.trim().parse::<i32>()) {
                (Ok(from), Ok(to)) => from <= year && year <= to,
                _ => false,
            },
            None => false,
        }
    }
}

/// One row of the grade table. Table order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeCriteriaEntry {
    pub grade: String,
    pub year_range: YearRange,
    pub points: f64,
}

/// Letter grade an employee received for one evaluation year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub score: f64,
}

/// Signed adjustment. Never expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusPenaltyRecord {
    pub employee_id: EmployeeId,
    pub points: f64,
    pub reason: String,
}

/// Manually accumulated merit and penalty points, used by the live listing only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeritLedger {
    pub merit: f64,
    pub penalty: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionType {
    Normal,
    Special,
}

impl PromotionType {
    pub fn label(self) -> &'static str {
        match self {
            PromotionType::Normal => "normal",
            PromotionType::Special => "special",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Auto,
    Manual,
}

/// Outcome recorded by the approval chain after an employee becomes a review target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Pending,
    Confirmed,
    Deferred,
}

/// Per-employee, per-year eligibility verdict.
///
/// `point_met`, `credit_met` and `promotion_type` are owned by the selection pass.
/// `is_review_target`, `source` and `decision` belong to the manual review workflow
/// and survive recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub point_met: bool,
    pub credit_met: bool,
    pub promotion_type: PromotionType,
    pub is_review_target: bool,
    pub source: CandidateSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<ReviewDecision>,
}
