//! Promotion candidate selection.
//!
//! Level criteria are resolved for the target year, yearly grades are turned into points over
//! a tenure-bounded lookback window, and each active employee is classified onto the normal or
//! special promotion track. Qualifying employees get a candidate row that the review workflow
//! picks up; edits to grading or level criteria re-run the whole pass in the background.

pub mod criteria;
pub mod domain;
pub mod fallback;
pub mod import;
pub mod points;
pub mod recalc;
pub mod repository;
pub mod router;
pub mod selection;
pub mod service;
pub mod tenure;

#[cfg(test)]
mod tests;

pub use criteria::{resolve_criteria, CriteriaSet};
pub use domain::{
    BonusPenaltyRecord, Candidate, CandidateSource, CreditRecord, EmployeeId, EmployeeProfile,
    EmployeeRole, GradeCriteriaEntry, GradeRecord, Level, LevelCriteria, MeritLedger,
    PromotionType, ReviewDecision, YearRange,
};
pub use import::{GradeImportError, GradeSheet, GradeSheetImporter};
pub use points::{listing_points, selection_points, GradeTable, PointBreakdown, PointInputs};
pub use recalc::{
    QueueError, RecalculationOutcome, RecalculationQueue, RecalculationReport,
    RecalculationTrigger, RetrySettings,
};
pub use repository::{PointTotal, PromotionRepository, RepositoryError};
pub use router::{promotion_router, PromotionApi};
pub use selection::{
    classify, eligible_levels, Classification, SelectionPolicy, SelectionVerdict, SkipReason,
};
pub use service::{
    PointRecalcSummary, PromotionSelectionService, SelectionCounts, SelectionError,
    SelectionSummary,
};
