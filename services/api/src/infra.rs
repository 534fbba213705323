use metrics_exporter_prometheus::PrometheusHandle;
use promotion_review::workflows::promotion::{
    Candidate, CreditRecord, EmployeeId, EmployeeProfile, GradeCriteriaEntry, GradeRecord,
    GradeSheet, LevelCriteria, MeritLedger, PointTotal, PromotionRepository, RepositoryError,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct Records {
    level_criteria: Vec<LevelCriteria>,
    grade_criteria: Vec<GradeCriteriaEntry>,
    employees: HashMap<EmployeeId, EmployeeProfile>,
    grades: Vec<GradeRecord>,
    credits: Vec<CreditRecord>,
    adjustments: HashMap<EmployeeId, f64>,
    ledgers: HashMap<EmployeeId, MeritLedger>,
    candidates: HashMap<(EmployeeId, i32), Candidate>,
    point_totals: HashMap<(EmployeeId, i32), f64>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPromotionRepository {
    records: Arc<Mutex<Records>>,
}

impl InMemoryPromotionRepository {
    fn guard(&self) -> Result<MutexGuard<'_, Records>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }

    pub(crate) fn add_employee(&self, profile: EmployeeProfile) -> Result<(), RepositoryError> {
        self.guard()?.employees.insert(profile.id.clone(), profile);
        Ok(())
    }

    pub(crate) fn add_grade_sheet(&self, sheet: GradeSheet) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        guard.grades.extend(sheet.grades);
        guard.credits.extend(sheet.credits);
        Ok(())
    }

    pub(crate) fn add_adjustment(
        &self,
        id: &EmployeeId,
        points: f64,
    ) -> Result<(), RepositoryError> {
        *self.guard()?.adjustments.entry(id.clone()).or_default() += points;
        Ok(())
    }

    pub(crate) fn set_ledger(
        &self,
        id: &EmployeeId,
        ledger: MeritLedger,
    ) -> Result<(), RepositoryError> {
        self.guard()?.ledgers.insert(id.clone(), ledger);
        Ok(())
    }

    pub(crate) fn point_total(&self, id: &EmployeeId, year: i32) -> Option<f64> {
        self.guard()
            .ok()
            .and_then(|guard| guard.point_totals.get(&(id.clone(), year)).copied())
    }
}

impl PromotionRepository for InMemoryPromotionRepository {
    fn level_criteria(&self) -> Result<Vec<LevelCriteria>, RepositoryError> {
        Ok(self.guard()?.level_criteria.clone())
    }

    fn grade_criteria(&self) -> Result<Vec<GradeCriteriaEntry>, RepositoryError> {
        Ok(self.guard()?.grade_criteria.clone())
    }

    fn save_level_criteria(
        &self,
        year: i32,
        rows: Vec<LevelCriteria>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.guard()?;
        guard.level_criteria.retain(|row| row.year != year);
        guard.level_criteria.extend(rows);
        Ok(())
    }

    fn save_grade_criteria(
        &self,
        entries: Vec<GradeCriteriaEntry>,
    ) -> Result<(), RepositoryError> {
        self.guard()?.grade_criteria = entries;
        Ok(())
    }

    fn active_employees(&self) -> Result<Vec<EmployeeProfile>, RepositoryError> {
        let guard = self.guard()?;
        let mut profiles: Vec<EmployeeProfile> = guard
            .employees
            .values()
            .filter(|profile| profile.is_active)
            .cloned()
            .collect();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(profiles)
    }

    fn employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, RepositoryError> {
        Ok(self.guard()?.employees.get(id).cloned())
    }

    fn grades(&self, id: &EmployeeId) -> Result<Vec<GradeRecord>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard
            .grades
            .iter()
            .filter(|record| &record.employee_id == id)
            .cloned()
            .collect())
    }

    fn credits(&self, id: &EmployeeId) -> Result<Vec<CreditRecord>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard
            .credits
            .iter()
            .filter(|record| &record.employee_id == id)
            .cloned()
            .collect())
    }

    fn bonus_penalty_totals(&self) -> Result<HashMap<EmployeeId, f64>, RepositoryError> {
        Ok(self.guard()?.adjustments.clone())
    }

    fn merit_ledgers(&self) -> Result<HashMap<EmployeeId, MeritLedger>, RepositoryError> {
        Ok(self.guard()?.ledgers.clone())
    }

    fn candidate(
        &self,
        id: &EmployeeId,
        year: i32,
    ) -> Result<Option<Candidate>, RepositoryError> {
        Ok(self.guard()?.candidates.get(&(id.clone(), year)).cloned())
    }

    fn upsert_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
        self.guard()?
            .candidates
            .insert((candidate.employee_id.clone(), candidate.year), candidate);
        Ok(())
    }

    fn candidates(&self, year: i32) -> Result<Vec<Candidate>, RepositoryError> {
        let guard = self.guard()?;
        let mut rows: Vec<Candidate> = guard
            .candidates
            .values()
            .filter(|candidate| candidate.year == year)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(rows)
    }

    fn store_point_total(&self, total: PointTotal) -> Result<(), RepositoryError> {
        self.guard()?
            .point_totals
            .insert((total.employee_id, total.year), total.total);
        Ok(())
    }
}
