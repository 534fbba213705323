use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::promotion::domain::{
    BonusPenaltyRecord, Candidate, CreditRecord, EmployeeId, EmployeeProfile, EmployeeRole,
    GradeCriteriaEntry, GradeRecord, Level, LevelCriteria, MeritLedger, YearRange,
};
use crate::workflows::promotion::repository::{PointTotal, PromotionRepository, RepositoryError};
use crate::workflows::promotion::selection::SelectionPolicy;
use crate::workflows::promotion::service::PromotionSelectionService;

pub(super) const YEAR: i32 = 2026;

pub(super) fn id(raw: &str) -> EmployeeId {
    EmployeeId(raw.to_string())
}

pub(super) fn employee(raw_id: &str, level: Level, years_of_service: u32) -> EmployeeProfile {
    EmployeeProfile {
        id: id(raw_id),
        name: format!("Employee {raw_id}"),
        role: EmployeeRole::TeamMember,
        level: Some(level),
        years_of_service: Some(years_of_service),
        level_start_date: None,
        hire_date: NaiveDate::from_ymd_opt(2019, 4, 1),
        is_active: true,
    }
}

pub(super) fn grade_entry(grade: &str, range: &str, points: f64) -> GradeCriteriaEntry {
    GradeCriteriaEntry {
        grade: grade.to_string(),
        year_range: YearRange(range.to_string()),
        points,
    }
}

/// `A=3, B=2, S=4` for 2021-2024 and `S=4` for 2025.
pub(super) fn grade_table_entries() -> Vec<GradeCriteriaEntry> {
    vec![
        grade_entry("A", "2021-2024", 3.0),
        grade_entry("B", "2021-2024", 2.0),
        grade_entry("S", "2021-2024", 4.0),
        grade_entry("S", "2025", 4.0),
        grade_entry("A", "2025", 3.0),
    ]
}

pub(super) fn level_criteria(
    level: Level,
    year: i32,
    required_points: f64,
    min_tenure: Option<u32>,
    special_required_points: Option<f64>,
) -> LevelCriteria {
    LevelCriteria {
        level,
        year,
        required_points,
        special_required_points,
        required_credits: 0.0,
        min_tenure,
    }
}

/// L3 needs 10 points and 2 years; L2 holders may jump with 20 points.
pub(super) fn standard_criteria() -> Vec<LevelCriteria> {
    vec![
        level_criteria(Level::L1, YEAR, 0.0, Some(1), None),
        level_criteria(Level::L2, YEAR, 6.0, Some(2), Some(20.0)),
        level_criteria(Level::L3, YEAR, 10.0, Some(2), Some(25.0)),
        level_criteria(Level::L4, YEAR, 14.0, Some(3), None),
        level_criteria(Level::L5, YEAR, 18.0, Some(3), None),
    ]
}

pub(super) fn grade(raw_id: &str, year: i32, grade: &str) -> GradeRecord {
    GradeRecord {
        employee_id: id(raw_id),
        year,
        grade: grade.to_string(),
    }
}

pub(super) fn credit(raw_id: &str, year: i32, score: f64) -> CreditRecord {
    CreditRecord {
        employee_id: id(raw_id),
        year,
        score,
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) level_criteria: Mutex<Vec<LevelCriteria>>,
    pub(super) grade_criteria: Mutex<Vec<GradeCriteriaEntry>>,
    pub(super) employees: Mutex<Vec<EmployeeProfile>>,
    pub(super) grades: Mutex<Vec<GradeRecord>>,
    pub(super) credits: Mutex<Vec<CreditRecord>>,
    pub(super) bonus_penalties: Mutex<Vec<BonusPenaltyRecord>>,
    pub(super) merit: Mutex<HashMap<EmployeeId, MeritLedger>>,
    pub(super) candidates: Mutex<HashMap<(EmployeeId, i32), Candidate>>,
    pub(super) point_totals: Mutex<HashMap<(EmployeeId, i32), f64>>,
    pub(super) failing_employees: Mutex<HashSet<EmployeeId>>,
    /// Number of upcoming `level_criteria` reads that fail.
    pub(super) criteria_outages: AtomicU32,
    pub(super) upserts: AtomicU32,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        let repository = Self::default();
        *repository.level_criteria.lock().expect("lock") = standard_criteria();
        *repository.grade_criteria.lock().expect("lock") = grade_table_entries();
        repository
    }

    pub(super) fn add_employee(&self, profile: EmployeeProfile) {
        self.employees.lock().expect("lock").push(profile);
    }

    pub(super) fn add_grades(&self, raw_id: &str, grades: &[(i32, &str)]) {
        let mut guard = self.grades.lock().expect("lock");
        for (year, letter) in grades {
            guard.push(grade(raw_id, *year, letter));
        }
    }

    pub(super) fn add_credit(&self, raw_id: &str, year: i32, score: f64) {
        self.credits.lock().expect("lock").push(credit(raw_id, year, score));
    }

    pub(super) fn add_bonus(&self, raw_id: &str, points: f64) {
        self.bonus_penalties
            .lock()
            .expect("lock")
            .push(BonusPenaltyRecord {
                employee_id: id(raw_id),
                points,
                reason: "award".to_string(),
            });
    }

    pub(super) fn set_merit(&self, raw_id: &str, merit: f64, penalty: f64) {
        self.merit
            .lock()
            .expect("lock")
            .insert(id(raw_id), MeritLedger { merit, penalty });
    }

    pub(super) fn fail_for(&self, raw_id: &str) {
        self.failing_employees.lock().expect("lock").insert(id(raw_id));
    }

    pub(super) fn stored_candidate(&self, raw_id: &str, year: i32) -> Option<Candidate> {
        self.candidates
            .lock()
            .expect("lock")
            .get(&(id(raw_id), year))
            .cloned()
    }

    pub(super) fn candidate_count(&self) -> usize {
        self.candidates.lock().expect("lock").len()
    }

    fn check(&self, employee: &EmployeeId) -> Result<(), RepositoryError> {
        if self.failing_employees.lock().expect("lock").contains(employee) {
            return Err(RepositoryError::Unavailable("grade store timeout".to_string()));
        }
        Ok(())
    }
}

impl PromotionRepository for MemoryRepository {
    fn level_criteria(&self) -> Result<Vec<LevelCriteria>, RepositoryError> {
        let outages = self.criteria_outages.load(Ordering::SeqCst);
        if outages > 0 {
            self.criteria_outages.store(outages - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("database offline".to_string()));
        }
        Ok(self.level_criteria.lock().expect("lock").clone())
    }

    fn grade_criteria(&self) -> Result<Vec<GradeCriteriaEntry>, RepositoryError> {
        Ok(self.grade_criteria.lock().expect("lock").clone())
    }

    fn save_level_criteria(
        &self,
        year: i32,
        rows: Vec<LevelCriteria>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.level_criteria.lock().expect("lock");
        guard.retain(|row| row.year != year);
        guard.extend(rows);
        Ok(())
    }

    fn save_grade_criteria(&self, entries: Vec<GradeCriteriaEntry>) -> Result<(), RepositoryError> {
        *self.grade_criteria.lock().expect("lock") = entries;
        Ok(())
    }

    fn active_employees(&self) -> Result<Vec<EmployeeProfile>, RepositoryError> {
        Ok(self
            .employees
            .lock()
            .expect("lock")
            .iter()
            .filter(|profile| profile.is_active)
            .cloned()
            .collect())
    }

    fn employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, RepositoryError> {
        Ok(self
            .employees
            .lock()
            .expect("lock")
            .iter()
            .find(|profile| &profile.id == id)
            .cloned())
    }

    fn grades(&self, id: &EmployeeId) -> Result<Vec<GradeRecord>, RepositoryError> {
        self.check(id)?;
        Ok(self
            .grades
            .lock()
            .expect("lock")
            .iter()
            .filter(|record| &record.employee_id == id)
            .cloned()
            .collect())
    }

    fn credits(&self, id: &EmployeeId) -> Result<Vec<CreditRecord>, RepositoryError> {
        Ok(self
            .credits
            .lock()
            .expect("lock")
            .iter()
            .filter(|record| &record.employee_id == id)
            .cloned()
            .collect())
    }

    fn bonus_penalty_totals(&self) -> Result<HashMap<EmployeeId, f64>, RepositoryError> {
        let mut totals = HashMap::new();
        for record in self.bonus_penalties.lock().expect("lock").iter() {
            *totals.entry(record.employee_id.clone()).or_insert(0.0) += record.points;
        }
        Ok(totals)
    }

    fn merit_ledgers(&self) -> Result<HashMap<EmployeeId, MeritLedger>, RepositoryError> {
        Ok(self.merit.lock().expect("lock").clone())
    }

    fn candidate(&self, id: &EmployeeId, year: i32) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self
            .candidates
            .lock()
            .expect("lock")
            .get(&(id.clone(), year))
            .cloned())
    }

    fn upsert_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.candidates
            .lock()
            .expect("lock")
            .insert((candidate.employee_id.clone(), candidate.year), candidate);
        Ok(())
    }

    fn candidates(&self, year: i32) -> Result<Vec<Candidate>, RepositoryError> {
        let mut rows: Vec<Candidate> = self
            .candidates
            .lock()
            .expect("lock")
            .values()
            .filter(|candidate| candidate.year == year)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(rows)
    }

    fn store_point_total(&self, total: PointTotal) -> Result<(), RepositoryError> {
        self.point_totals
            .lock()
            .expect("lock")
            .insert((total.employee_id, total.year), total.total);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    PromotionSelectionService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = PromotionSelectionService::new(repository.clone(), SelectionPolicy::default());
    (service, repository)
}

/// The worked example: L2, three years of service, grades A/B/S for 2023-2025,
/// +1 adjustment and a 2025 credit of 5.
pub(super) fn seed_worked_example(repository: &MemoryRepository) {
    repository.add_employee(employee("emp-worked", Level::L2, 3));
    repository.add_grades("emp-worked", &[(2023, "A"), (2024, "B"), (2025, "S")]);
    repository.add_credit("emp-worked", 2025, 5.0);
    repository.add_bonus("emp-worked", 1.0);
}
