use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::criteria::{resolve_criteria, CriteriaSet};
use super::domain::{EmployeeId, EmployeeProfile, MeritLedger};
use super::points::{listing_points, selection_points, GradeTable, PointBreakdown, PointInputs};
use super::repository::{PointTotal, PromotionRepository, RepositoryError};
use super::selection::{classify, eligible_levels, Classification, SelectionPolicy};
use super::tenure::service_years;

/// Counts reported by a batch selection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub year: i32,
    /// Year whose level criteria were applied, if any exist.
    pub criteria_year: Option<i32>,
    pub evaluated: usize,
    pub added: usize,
    pub updated: usize,
    /// Qualifying employees written this pass (`added + updated`).
    pub total: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// The narrow `{added, total}` shape handed back to configuration-save callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCounts {
    pub added: usize,
    pub total: usize,
}

impl SelectionSummary {
    pub fn counts(&self) -> SelectionCounts {
        SelectionCounts {
            added: self.added,
            total: self.total,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRecalcSummary {
    pub year: i32,
    pub updated: usize,
    pub failed: usize,
}

enum CandidateWrite {
    Added,
    Updated,
    NotQualified,
    Skipped,
}

/// Service composing the repository, criteria resolution, point aggregation and the
/// eligibility classifier.
pub struct PromotionSelectionService<R> {
    repository: Arc<R>,
    policy: SelectionPolicy,
}

impl<R> PromotionSelectionService<R>
where
    R: PromotionRepository + 'static,
{
    pub fn new(repository: Arc<R>, policy: SelectionPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    fn grade_table(&self) -> Result<GradeTable, SelectionError> {
        Ok(GradeTable::new(self.repository.grade_criteria()?))
    }

    pub fn criteria_for(&self, year: i32) -> Result<CriteriaSet, SelectionError> {
        Ok(resolve_criteria(&self.repository.level_criteria()?, year))
    }

    /// Point breakdown for the employee listing, including merit and penalty ledgers.
    pub fn employee_points(
        &self,
        employee_id: &EmployeeId,
        year: i32,
    ) -> Result<PointBreakdown, SelectionError> {
        let profile = self
            .repository
            .employee(employee_id)?
            .ok_or_else(|| SelectionError::EmployeeNotFound(employee_id.clone()))?;
        let table = self.grade_table()?;
        let adjustments = self.repository.bonus_penalty_totals()?;
        let ledgers = self.repository.merit_ledgers()?;

        self.listing_breakdown(&profile, &table, &adjustments, &ledgers, year)
    }

    /// Classify a single employee without writing a candidate row.
    pub fn evaluate(
        &self,
        employee_id: &EmployeeId,
        year: i32,
    ) -> Result<Classification, SelectionError> {
        let profile = self
            .repository
            .employee(employee_id)?
            .ok_or_else(|| SelectionError::EmployeeNotFound(employee_id.clone()))?;
        let criteria = self.criteria_for(year)?;
        if let Err(reason) = eligible_levels(&profile, &criteria, &self.policy) {
            return Ok(Classification::Skipped { reason });
        }
        let table = self.grade_table()?;
        let adjustments = self.repository.bonus_penalty_totals()?;

        let points = self.selection_breakdown(&profile, &table, &adjustments, year)?;
        Ok(classify(&profile, &criteria, points.total, year, &self.policy))
    }

    fn listing_breakdown(
        &self,
        profile: &EmployeeProfile,
        table: &GradeTable,
        adjustments: &HashMap<EmployeeId, f64>,
        ledgers: &HashMap<EmployeeId, MeritLedger>,
        year: i32,
    ) -> Result<PointBreakdown, SelectionError> {
        let grades = self.repository.grades(&profile.id)?;
        let credits = self.repository.credits(&profile.id)?;
        let inputs = PointInputs {
            grades: &grades,
            credits: &credits,
            adjustment: adjustments.get(&profile.id).copied().unwrap_or(0.0),
        };
        let ledger = ledgers.get(&profile.id).copied().unwrap_or_default();

        Ok(listing_points(
            inputs,
            table,
            service_years(profile, year),
            year,
            ledger,
            &self.policy,
        ))
    }

    fn selection_breakdown(
        &self,
        profile: &EmployeeProfile,
        table: &GradeTable,
        adjustments: &HashMap<EmployeeId, f64>,
        year: i32,
    ) -> Result<PointBreakdown, SelectionError> {
        let grades = self.repository.grades(&profile.id)?;
        let credits = self.repository.credits(&profile.id)?;
        let inputs = PointInputs {
            grades: &grades,
            credits: &credits,
            adjustment: adjustments.get(&profile.id).copied().unwrap_or(0.0),
        };

        Ok(selection_points(
            inputs,
            table,
            service_years(profile, year),
            year,
            &self.policy,
        ))
    }

    /// Recompute and store the listing point total of every active employee.
    pub fn recalculate_points(&self, year: i32) -> Result<PointRecalcSummary, SelectionError> {
        let employees = self.repository.active_employees()?;
        let table = self.grade_table()?;
        let adjustments = self.repository.bonus_penalty_totals()?;
        let ledgers = self.repository.merit_ledgers()?;

        let mut summary = PointRecalcSummary {
            year,
            ..PointRecalcSummary::default()
        };

        for profile in &employees {
            let stored = self
                .listing_breakdown(profile, &table, &adjustments, &ledgers, year)
                .and_then(|breakdown| {
                    self.repository
                        .store_point_total(PointTotal {
                            employee_id: profile.id.clone(),
                            year,
                            total: breakdown.total,
                        })
                        .map_err(SelectionError::from)
                });

            match stored {
                Ok(()) => summary.updated += 1,
                Err(err) => {
                    warn!(
                        employee_id = %profile.id,
                        year,
                        error = %err,
                        "point total recalculation failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Evaluate every active employee and upsert a candidate row for those who qualify.
    ///
    /// A failure for one employee is logged and counted; the pass carries on.
    pub fn auto_select(&self, year: i32) -> Result<SelectionSummary, SelectionError> {
        let criteria = self.criteria_for(year)?;
        let mut summary = SelectionSummary {
            year,
            criteria_year: criteria.source_year,
            ..SelectionSummary::default()
        };

        if criteria.is_empty() {
            info!(year, "no level criteria configured; skipping candidate selection");
            return Ok(summary);
        }

        let employees = self.repository.active_employees()?;
        let table = self.grade_table()?;
        let adjustments = self.repository.bonus_penalty_totals()?;

        for profile in &employees {
            match self.select_one(profile, &criteria, &table, &adjustments, year) {
                Ok(CandidateWrite::Added) => {
                    summary.evaluated += 1;
                    summary.added += 1;
                }
                Ok(CandidateWrite::Updated) => {
                    summary.evaluated += 1;
                    summary.updated += 1;
                }
                Ok(CandidateWrite::NotQualified) => summary.evaluated += 1,
                Ok(CandidateWrite::Skipped) => summary.skipped += 1,
                Err(err) => {
                    warn!(
                        employee_id = %profile.id,
                        year,
                        error = %err,
                        "candidate selection failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary.total = summary.added + summary.updated;
        info!(
            year,
            criteria_year = ?summary.criteria_year,
            added = summary.added,
            updated = summary.updated,
            total = summary.total,
            failed = summary.failed,
            "candidate selection finished"
        );
        Ok(summary)
    }

    fn select_one(
        &self,
        profile: &EmployeeProfile,
        criteria: &CriteriaSet,
        table: &GradeTable,
        adjustments: &HashMap<EmployeeId, f64>,
        year: i32,
    ) -> Result<CandidateWrite, SelectionError> {
        if let Err(reason) = eligible_levels(profile, criteria, &self.policy) {
            debug!(employee_id = %profile.id, ?reason, "employee skipped");
            return Ok(CandidateWrite::Skipped);
        }

        let points = self.selection_breakdown(profile, table, adjustments, year)?;

        let verdict = match classify(profile, criteria, points.total, year, &self.policy) {
            Classification::Skipped { reason } => {
                debug!(employee_id = %profile.id, ?reason, "employee skipped");
                return Ok(CandidateWrite::Skipped);
            }
            Classification::Evaluated(verdict) => verdict,
        };

        if !verdict.qualifies() {
            return Ok(CandidateWrite::NotQualified);
        }

        let existing = self.repository.candidate(&profile.id, year)?;
        let is_new = existing.is_none();
        let Some(candidate) = verdict.apply_to(existing) else {
            return Ok(CandidateWrite::NotQualified);
        };
        self.repository.upsert_candidate(candidate)?;

        Ok(if is_new {
            CandidateWrite::Added
        } else {
            CandidateWrite::Updated
        })
    }

    /// Point recalculation followed by candidate selection, as run after criteria edits.
    pub fn recalculate_and_select(&self, year: i32) -> Result<SelectionSummary, SelectionError> {
        let points = self.recalculate_points(year)?;
        debug!(year, updated = points.updated, failed = points.failed, "point totals refreshed");
        self.auto_select(year)
    }
}

/// Error raised by the selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),
}
