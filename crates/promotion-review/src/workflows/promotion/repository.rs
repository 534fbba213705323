use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Candidate, CreditRecord, EmployeeId, EmployeeProfile, GradeCriteriaEntry, GradeRecord,
    LevelCriteria, MeritLedger,
};

/// Stored point total for the employee listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointTotal {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub total: f64,
}

/// Storage abstraction over the HR schema.
///
/// Everything except candidates and point totals is read-only to the selection pass.
/// `upsert_candidate` must replace any row with the same (employee, year) key atomically.
pub trait PromotionRepository: Send + Sync {
    fn level_criteria(&self) -> Result<Vec<LevelCriteria>, RepositoryError>;
    fn grade_criteria(&self) -> Result<Vec<GradeCriteriaEntry>, RepositoryError>;
    fn save_level_criteria(
        &self,
        year: i32,
        rows: Vec<LevelCriteria>,
    ) -> Result<(), RepositoryError>;
    fn save_grade_criteria(&self, entries: Vec<GradeCriteriaEntry>) -> Result<(), RepositoryError>;

    fn active_employees(&self) -> Result<Vec<EmployeeProfile>, RepositoryError>;
    fn employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, RepositoryError>;
    fn grades(&self, id: &EmployeeId) -> Result<Vec<GradeRecord>, RepositoryError>;
    fn credits(&self, id: &EmployeeId) -> Result<Vec<CreditRecord>, RepositoryError>;

    /// Signed bonus/penalty sums for every employee, all time.
    fn bonus_penalty_totals(&self) -> Result<HashMap<EmployeeId, f64>, RepositoryError>;
    fn merit_ledgers(&self) -> Result<HashMap<EmployeeId, MeritLedger>, RepositoryError>;

    fn candidate(&self, id: &EmployeeId, year: i32) -> Result<Option<Candidate>, RepositoryError>;
    fn upsert_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError>;
    fn candidates(&self, year: i32) -> Result<Vec<Candidate>, RepositoryError>;

    fn store_point_total(&self, total: PointTotal) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
