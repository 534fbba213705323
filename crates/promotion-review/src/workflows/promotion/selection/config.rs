use serde::{Deserialize, Serialize};

use super::super::domain::EmployeeRole;

/// Constants governing point aggregation and candidate eligibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Upper bound on how many grade years are summed, regardless of tenure.
    pub max_lookback_years: u32,
    /// Earliest year with usable grade data; the window is truncated here.
    pub grade_floor_year: i32,
    /// Latest year with credit data. Credits were not tracked before this dimension existed.
    pub credit_ceiling_year: i32,
    /// Points for an absent, placeholder or unrecognized grade.
    pub default_grade_points: f64,
    pub placeholder_grades: Vec<String>,
    /// Roles that never enter the candidate pool.
    pub excluded_roles: Vec<EmployeeRole>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            max_lookback_years: 5,
            grade_floor_year: 2021,
            credit_ceiling_year: 2025,
            default_grade_points: 2.0,
            placeholder_grades: vec!["-".to_string(), "NI".to_string()],
            excluded_roles: vec![EmployeeRole::Ceo],
        }
    }
}

impl SelectionPolicy {
    pub fn is_placeholder(&self, normalized_grade: &str) -> bool {
        normalized_grade.is_empty()
            || self
                .placeholder_grades
                .iter()
                .any(|token| token.eq_ignore_ascii_case(normalized_grade))
    }

    pub fn is_excluded(&self, role: EmployeeRole) -> bool {
        self.excluded_roles.contains(&role)
    }
}
