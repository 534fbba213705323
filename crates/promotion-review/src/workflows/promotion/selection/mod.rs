mod config;
mod rules;

pub use config::SelectionPolicy;

use serde::{Deserialize, Serialize};

use super::criteria::CriteriaSet;
use super::domain::{
    Candidate, CandidateSource, EmployeeId, EmployeeProfile, Level, LevelCriteria, PromotionType,
};
use super::tenure::level_tenure;

/// Why an employee was left out of a pass without being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    Unleveled,
    ExcludedRole,
    TopLevel,
    MissingCriteria,
}

/// Full record of one eligibility decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionVerdict {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub current_level: Level,
    pub next_level: Level,
    pub tenure: u32,
    pub tenure_met: bool,
    pub final_points: f64,
    pub required_points: f64,
    pub special_required_points: Option<f64>,
    pub qualification_met: bool,
    pub special_eligible: bool,
    pub promotion_type: Option<PromotionType>,
}

impl SelectionVerdict {
    pub fn qualifies(&self) -> bool {
        self.promotion_type.is_some()
    }

    /// Candidate row to persist, or `None` when neither track qualifies.
    ///
    /// An existing row keeps its review flag, source and decision; only the derived
    /// fields are rewritten. `point_met` and `credit_met` both mirror the normal-track
    /// verdict rather than being evaluated separately.
    pub fn apply_to(&self, existing: Option<Candidate>) -> Option<Candidate> {
        let promotion_type = self.promotion_type?;

        let mut candidate = existing.unwrap_or_else(|| Candidate {
            employee_id: self.employee_id.clone(),
            year: self.year,
            point_met: false,
            credit_met: false,
            promotion_type,
            is_review_target: false,
            source: CandidateSource::Auto,
            decision: None,
        });

        candidate.point_met = self.qualification_met;
        candidate.credit_met = self.qualification_met;
        candidate.promotion_type = promotion_type;
        Some(candidate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    Skipped { reason: SkipReason },
    Evaluated(SelectionVerdict),
}

/// Whether `profile` is part of the selection population at all.
pub fn screen(profile: &EmployeeProfile, policy: &SelectionPolicy) -> Result<Level, SkipReason> {
    if !profile.is_active {
        return Err(SkipReason::Inactive);
    }
    if policy.is_excluded(profile.role) {
        return Err(SkipReason::ExcludedRole);
    }
    profile.level.ok_or(SkipReason::Unleveled)
}

/// Current level and next-level criteria row, or why the employee is outside the pass.
///
/// Needs no point data, so batch callers can skip before reading any records.
pub fn eligible_levels<'c>(
    profile: &EmployeeProfile,
    criteria: &'c CriteriaSet,
    policy: &SelectionPolicy,
) -> Result<(Level, &'c LevelCriteria), SkipReason> {
    let current_level = screen(profile, policy)?;
    let next_level = current_level.successor().ok_or(SkipReason::TopLevel)?;
    let next = criteria
        .get(next_level)
        .ok_or(SkipReason::MissingCriteria)?;
    Ok((current_level, next))
}

/// Decide promotion eligibility for one employee against already-resolved criteria.
pub fn classify(
    profile: &EmployeeProfile,
    criteria: &CriteriaSet,
    final_points: f64,
    year: i32,
    policy: &SelectionPolicy,
) -> Classification {
    let (current_level, next) = match eligible_levels(profile, criteria, policy) {
        Ok(levels) => levels,
        Err(reason) => return Classification::Skipped { reason },
    };
    let next_level = next.level;
    let current = criteria.get(current_level);

    let tenure = level_tenure(profile, year);
    let tenure_met = rules::tenure_met(tenure, next);
    let qualification_met = rules::normal_track(tenure_met, final_points, next);
    let special_eligible = rules::special_track(tenure_met, final_points, current);

    Classification::Evaluated(SelectionVerdict {
        employee_id: profile.id.clone(),
        year,
        current_level,
        next_level,
        tenure,
        tenure_met,
        final_points,
        required_points: next.required_points,
        special_required_points: current.and_then(|c| c.special_required_points),
        qualification_met,
        special_eligible,
        promotion_type: rules::promotion_type(qualification_met, special_eligible),
    })
}
