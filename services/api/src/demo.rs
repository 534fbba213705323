use crate::infra::InMemoryPromotionRepository;
use chrono::NaiveDate;
use clap::Args;
use promotion_review::config::PromotionConfig;
use promotion_review::error::AppError;
use promotion_review::workflows::promotion::{
    Classification, CreditRecord, EmployeeId, EmployeeProfile, EmployeeRole, GradeCriteriaEntry,
    GradeRecord, GradeSheet, GradeSheetImporter, Level, LevelCriteria, MeritLedger,
    PointBreakdown, PromotionRepository, PromotionSelectionService, RecalculationOutcome,
    RecalculationQueue, RecalculationTrigger, RetrySettings, SelectionError, SelectionPolicy,
    SelectionSummary, YearRange,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug, Default)]
pub(crate) struct SelectArgs {
    /// Target selection year (defaults to the current calendar year)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Grade sheet CSV (employee_id,year,grade[,credit]) replacing the sample grades
    #[arg(long)]
    pub(crate) grades_csv: Option<PathBuf>,
    /// Print the point breakdown of every evaluated employee
    #[arg(long)]
    pub(crate) explain: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Target selection year (defaults to 2026, the year the sample criteria are written for)
    #[arg(long)]
    pub(crate) year: Option<i32>,
    /// Optional grade sheet CSV to hydrate the sample roster
    #[arg(long)]
    pub(crate) grades_csv: Option<PathBuf>,
}

const SAMPLE_YEAR: i32 = 2026;

pub(crate) fn run_select(args: SelectArgs) -> Result<(), AppError> {
    let SelectArgs {
        year,
        grades_csv,
        explain,
    } = args;

    let year = year.unwrap_or_else(|| PromotionConfig::default().target_year());
    let repository = Arc::new(sample_repository(load_grade_sheet(grades_csv)?)?);
    let service = PromotionSelectionService::new(repository.clone(), SelectionPolicy::default());

    let summary = service.recalculate_and_select(year)?;
    render_summary(&summary);
    if explain {
        render_breakdowns(&service, year)?;
    }
    render_candidates(repository.as_ref(), year)?;
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { year, grades_csv } = args;
    let year = year.unwrap_or(SAMPLE_YEAR);

    println!("Promotion candidate selection demo ({year})");
    let imported = grades_csv.is_some();
    let repository = Arc::new(sample_repository(load_grade_sheet(grades_csv)?)?);
    if imported {
        println!("Data source: grade sheet CSV import");
    } else {
        println!("Data source: built-in sample roster");
    }

    let service = Arc::new(PromotionSelectionService::new(
        repository.clone(),
        SelectionPolicy::default(),
    ));

    println!("\nEligibility");
    for profile in repository.active_employees().map_err(SelectionError::from)? {
        match service.evaluate(&profile.id, year)? {
            Classification::Skipped { reason } => {
                println!("- {} ({}): skipped, {:?}", profile.name, profile.id, reason)
            }
            Classification::Evaluated(verdict) => println!(
                "- {} ({}): {} -> {} | tenure {} | {:.1} pts vs {:.1} required | {}",
                profile.name,
                profile.id,
                verdict.current_level.label(),
                verdict.next_level.label(),
                verdict.tenure,
                verdict.final_points,
                verdict.required_points,
                verdict
                    .promotion_type
                    .map(|kind| kind.label())
                    .unwrap_or("not eligible"),
            ),
        }
    }

    let summary = service.recalculate_and_select(year)?;
    println!();
    render_summary(&summary);
    render_candidates(repository.as_ref(), year)?;

    println!(
        "\nLowering the {} bar for {year} and recalculating in the background",
        Level::L4.label()
    );
    let (queue, _worker) = RecalculationQueue::spawn(
        service.clone(),
        RetrySettings {
            max_attempts: 2,
            retry_delay: Duration::from_millis(50),
        },
    );
    let mut reports = queue.subscribe();
    let criteria = service.criteria_for(year)?;
    let rows: Vec<LevelCriteria> = Level::ALL
        .into_iter()
        .filter_map(|level| criteria.get(level).cloned())
        .map(|mut row| {
            row.year = year;
            if row.level == Level::L4 {
                row.required_points = 7.0;
            }
            row
        })
        .collect();
    repository
        .save_level_criteria(year, rows)
        .map_err(SelectionError::from)?;
    queue.notify(RecalculationTrigger::LevelCriteriaChanged { year }, year);

    match tokio::time::timeout(Duration::from_secs(10), reports.recv()).await {
        Ok(Ok(report)) => match report.outcome {
            RecalculationOutcome::Completed { summary } => {
                println!(
                    "Job {} finished after {} attempt(s): {} added, {} total",
                    report.job_id, report.attempts, summary.added, summary.total
                );
                render_candidates(repository.as_ref(), year)?;
            }
            RecalculationOutcome::Failed { error } => {
                println!("Job {} failed: {error}", report.job_id)
            }
        },
        Ok(Err(err)) => println!("Recalculation report unavailable: {err}"),
        Err(_) => println!("Recalculation did not finish in time"),
    }

    Ok(())
}

fn load_grade_sheet(path: Option<PathBuf>) -> Result<Option<GradeSheet>, AppError> {
    path.map(GradeSheetImporter::from_path)
        .transpose()
        .map_err(AppError::from)
}

fn render_summary(summary: &SelectionSummary) {
    match summary.criteria_year {
        Some(criteria_year) if criteria_year != summary.year => println!(
            "Selection {}: using {criteria_year} level criteria",
            summary.year
        ),
        Some(_) => println!("Selection {}", summary.year),
        None => println!("Selection {}: no level criteria configured", summary.year),
    }
    println!(
        "- {} evaluated | {} added | {} updated | {} skipped | {} failed",
        summary.evaluated, summary.added, summary.updated, summary.skipped, summary.failed
    );
}

fn render_breakdowns<R>(service: &PromotionSelectionService<R>, year: i32) -> Result<(), AppError>
where
    R: PromotionRepository + 'static,
{
    println!("\nPoint breakdowns");
    let employees = service
        .repository()
        .active_employees()
        .map_err(SelectionError::from)?;
    for profile in employees {
        let breakdown = service.employee_points(&profile.id, year)?;
        render_breakdown(&profile, &breakdown);
    }
    Ok(())
}

fn render_breakdown(profile: &EmployeeProfile, breakdown: &PointBreakdown) {
    println!("- {} ({}): {:.1} pts", profile.name, profile.id, breakdown.total);
    for year in &breakdown.window {
        println!(
            "    {} {:<4} {:.1}",
            year.year,
            year.grade.as_deref().unwrap_or("-"),
            year.points
        );
    }
    if let Some(credit) = breakdown.credit {
        println!("    credit ({}) {:.1}", credit.year, credit.score);
    }
    if breakdown.adjustment != 0.0 {
        println!("    bonus/penalty {:+.1}", breakdown.adjustment);
    }
    if breakdown.merit != 0.0 || breakdown.penalty != 0.0 {
        println!(
            "    merit {:.1} | penalty {:.1}",
            breakdown.merit, breakdown.penalty
        );
    }
}

fn render_candidates(repository: &InMemoryPromotionRepository, year: i32) -> Result<(), AppError> {
    let lines = candidate_lines(repository, year)?;
    if lines.is_empty() {
        println!("\nCandidates: none");
        return Ok(());
    }
    println!("\nCandidates");
    for line in lines {
        println!("- {line}");
    }
    Ok(())
}

/// One line per candidate row, with the stored listing total when a recalculation wrote one.
fn candidate_lines(
    repository: &InMemoryPromotionRepository,
    year: i32,
) -> Result<Vec<String>, SelectionError> {
    let candidates = repository.candidates(year)?;
    Ok(candidates
        .into_iter()
        .map(|candidate| {
            let points = repository
                .point_total(&candidate.employee_id, year)
                .map(|total| format!(" | {total:.1} pts"))
                .unwrap_or_default();
            format!(
                "{} | {} track{} | review target: {}",
                candidate.employee_id,
                candidate.promotion_type.label(),
                points,
                if candidate.is_review_target { "yes" } else { "no" }
            )
        })
        .collect())
}

fn sample_profile(
    raw_id: &str,
    name: &str,
    level: Level,
    years_of_service: Option<u32>,
    level_start: Option<NaiveDate>,
) -> EmployeeProfile {
    EmployeeProfile {
        id: EmployeeId(raw_id.to_string()),
        name: name.to_string(),
        role: EmployeeRole::TeamMember,
        level: Some(level),
        years_of_service,
        level_start_date: level_start,
        hire_date: None,
        is_active: true,
    }
}

fn sample_grade_table() -> Vec<GradeCriteriaEntry> {
    let mut entries = Vec::new();
    for range in ["2021-2024", "2025"] {
        for (grade, points) in [("S", 4.0), ("A", 3.0), ("B", 2.0), ("C", 1.0)] {
            entries.push(GradeCriteriaEntry {
                grade: grade.to_string(),
                year_range: YearRange(range.to_string()),
                points,
            });
        }
    }
    entries
}

fn sample_level_criteria(year: i32) -> Vec<LevelCriteria> {
    [
        (Level::L1, 0.0, None, 1),
        (Level::L2, 6.0, Some(20.0), 2),
        (Level::L3, 10.0, Some(25.0), 2),
        (Level::L4, 14.0, None, 3),
        (Level::L5, 18.0, None, 3),
    ]
    .into_iter()
    .map(|(level, required, special, tenure)| LevelCriteria {
        level,
        year,
        required_points: required,
        special_required_points: special,
        required_credits: 0.0,
        min_tenure: Some(tenure),
    })
    .collect()
}

fn sample_grades() -> GradeSheet {
    let rows: [(&str, i32, &str); 10] = [
        ("emp-001", 2023, "A"),
        ("emp-001", 2024, "B"),
        ("emp-001", 2025, "S"),
        ("emp-002", 2024, "S"),
        ("emp-002", 2025, "S"),
        ("emp-003", 2022, "B"),
        ("emp-003", 2023, "B"),
        ("emp-003", 2024, "NI"),
        ("emp-003", 2025, "C"),
        ("emp-004", 2025, "A"),
    ];
    GradeSheet {
        grades: rows
            .into_iter()
            .map(|(id, year, grade)| GradeRecord {
                employee_id: EmployeeId(id.to_string()),
                year,
                grade: grade.to_string(),
            })
            .collect(),
        credits: vec![
            CreditRecord {
                employee_id: EmployeeId("emp-001".to_string()),
                year: 2025,
                score: 5.0,
            },
            CreditRecord {
                employee_id: EmployeeId("emp-002".to_string()),
                year: 2025,
                score: 18.0,
            },
        ],
    }
}

/// Sample roster covering both promotion tracks and every skip reason. An imported sheet
/// replaces the built-in grades.
pub(crate) fn sample_repository(
    sheet: Option<GradeSheet>,
) -> Result<InMemoryPromotionRepository, SelectionError> {
    let repository = InMemoryPromotionRepository::default();
    repository.save_grade_criteria(sample_grade_table())?;
    repository.save_level_criteria(SAMPLE_YEAR, sample_level_criteria(SAMPLE_YEAR))?;

    let level_start = NaiveDate::from_ymd_opt(2025, 3, 1);
    repository.add_employee(sample_profile("emp-001", "Dana Reyes", Level::L2, Some(3), None))?;
    repository.add_employee(sample_profile(
        "emp-002",
        "Miguel Santos",
        Level::L2,
        None,
        level_start,
    ))?;
    repository.add_employee(sample_profile(
        "emp-003",
        "Priya Natarajan",
        Level::L3,
        Some(4),
        None,
    ))?;
    repository.add_employee(sample_profile("emp-004", "Ahn Tran", Level::L4, Some(2), None))?;

    let mut chief = sample_profile("emp-005", "Ruth Okafor", Level::L5, Some(12), None);
    chief.role = EmployeeRole::Ceo;
    repository.add_employee(chief)?;

    let mut former = sample_profile("emp-006", "Leo Marsh", Level::L1, Some(6), None);
    former.is_active = false;
    repository.add_employee(former)?;

    repository.add_adjustment(&EmployeeId("emp-001".to_string()), 1.0)?;
    repository.set_ledger(
        &EmployeeId("emp-003".to_string()),
        MeritLedger {
            merit: 2.0,
            penalty: 1.0,
        },
    )?;
    repository.add_grade_sheet(sheet.unwrap_or_else(sample_grades))?;

    Ok(repository)
}
