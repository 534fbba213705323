use super::super::domain::GradeCriteriaEntry;
use super::super::fallback::FallbackChain;
use super::super::selection::SelectionPolicy;

/// Grade table in authored order. The first matching row wins; overlaps are not detected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeTable {
    entries: Vec<GradeCriteriaEntry>,
}

pub(crate) fn normalize_grade(raw: &str) -> String {
    raw.trim().to_uppercase()
}

impl GradeTable {
    pub fn new(entries: Vec<GradeCriteriaEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GradeCriteriaEntry] {
        &self.entries
    }

    /// Table lookup without any default.
    pub fn lookup(&self, normalized_grade: &str, year: i32) -> Option<f64> {
        self.entries
            .iter()
            .find(|entry| {
                normalize_grade(&entry.grade) == normalized_grade && entry.year_range.contains(year)
            })
            .map(|entry| entry.points)
    }

    /// Points for a grade in a given year.
    ///
    /// Blank, `-` and `NI` grades and grades with no table row all score the policy
    /// default (2 points), matching the spreadsheet the table was migrated from.
    pub fn points_for(&self, grade: &str, year: i32, policy: &SelectionPolicy) -> f64 {
        let normalized = normalize_grade(grade);

        FallbackChain::<str, f64>::new()
            .then("placeholder", |g| {
                policy
                    .is_placeholder(g)
                    .then_some(policy.default_grade_points)
            })
            .then("grade_table", |g| self.lookup(g, year))
            .resolve_or(&normalized, policy.default_grade_points)
    }
}
