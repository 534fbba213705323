//! End-to-end scenarios for promotion candidate selection through the public service facade,
//! the recalculation queue and the grade-sheet importer.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use promotion_review::workflows::promotion::{
        Candidate, CreditRecord, EmployeeId, EmployeeProfile, EmployeeRole, GradeCriteriaEntry,
        GradeRecord, Level, LevelCriteria, MeritLedger, PointTotal, PromotionRepository,
        PromotionSelectionService, RepositoryError, SelectionPolicy, YearRange,
    };

    pub(super) const YEAR: i32 = 2026;

    #[derive(Default)]
    pub(super) struct Store {
        pub(super) level_criteria: Vec<LevelCriteria>,
        pub(super) grade_criteria: Vec<GradeCriteriaEntry>,
        pub(super) employees: Vec<EmployeeProfile>,
        pub(super) grades: Vec<GradeRecord>,
        pub(super) credits: Vec<CreditRecord>,
        pub(super) adjustments: HashMap<EmployeeId, f64>,
        pub(super) candidates: HashMap<(EmployeeId, i32), Candidate>,
        pub(super) totals: HashMap<(EmployeeId, i32), f64>,
    }

    #[derive(Default)]
    pub(super) struct Repository {
        pub(super) store: Mutex<Store>,
    }

    impl Repository {
        pub(super) fn with<F: FnOnce(&mut Store)>(&self, f: F) {
            f(&mut self.store.lock().expect("lock"));
        }

        pub(super) fn candidate(&self, raw_id: &str) -> Option<Candidate> {
            self.store
                .lock()
                .expect("lock")
                .candidates
                .get(&(EmployeeId(raw_id.to_string()), YEAR))
                .cloned()
        }
    }

    impl PromotionRepository for Repository {
        fn level_criteria(&self) -> Result<Vec<LevelCriteria>, RepositoryError> {
            Ok(self.store.lock().expect("lock").level_criteria.clone())
        }

        fn grade_criteria(&self) -> Result<Vec<GradeCriteriaEntry>, RepositoryError> {
            Ok(self.store.lock().expect("lock").grade_criteria.clone())
        }

        fn save_level_criteria(
            &self,
            year: i32,
            rows: Vec<LevelCriteria>,
        ) -> Result<(), RepositoryError> {
            let mut store = self.store.lock().expect("lock");
            store.level_criteria.retain(|row| row.year != year);
            store.level_criteria.extend(rows);
            Ok(())
        }

        fn save_grade_criteria(
            &self,
            entries: Vec<GradeCriteriaEntry>,
        ) -> Result<(), RepositoryError> {
            self.store.lock().expect("lock").grade_criteria = entries;
            Ok(())
        }

        fn active_employees(&self) -> Result<Vec<EmployeeProfile>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store
                .employees
                .iter()
                .filter(|p| p.is_active)
                .cloned()
                .collect())
        }

        fn employee(&self, id: &EmployeeId) -> Result<Option<EmployeeProfile>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store.employees.iter().find(|p| &p.id == id).cloned())
        }

        fn grades(&self, id: &EmployeeId) -> Result<Vec<GradeRecord>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store
                .grades
                .iter()
                .filter(|g| &g.employee_id == id)
                .cloned()
                .collect())
        }

        fn credits(&self, id: &EmployeeId) -> Result<Vec<CreditRecord>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store
                .credits
                .iter()
                .filter(|c| &c.employee_id == id)
                .cloned()
                .collect())
        }

        fn bonus_penalty_totals(&self) -> Result<HashMap<EmployeeId, f64>, RepositoryError> {
            Ok(self.store.lock().expect("lock").adjustments.clone())
        }

        fn merit_ledgers(&self) -> Result<HashMap<EmployeeId, MeritLedger>, RepositoryError> {
            Ok(HashMap::new())
        }

        fn candidate(
            &self,
            id: &EmployeeId,
            year: i32,
        ) -> Result<Option<Candidate>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store.candidates.get(&(id.clone(), year)).cloned())
        }

        fn upsert_candidate(&self, candidate: Candidate) -> Result<(), RepositoryError> {
            let mut store = self.store.lock().expect("lock");
            store
                .candidates
                .insert((candidate.employee_id.clone(), candidate.year), candidate);
            Ok(())
        }

        fn candidates(&self, year: i32) -> Result<Vec<Candidate>, RepositoryError> {
            let store = self.store.lock().expect("lock");
            Ok(store
                .candidates
                .values()
                .filter(|c| c.year == year)
                .cloned()
                .collect())
        }

        fn store_point_total(&self, total: PointTotal) -> Result<(), RepositoryError> {
            let mut store = self.store.lock().expect("lock");
            store.totals.insert((total.employee_id, total.year), total.total);
            Ok(())
        }
    }

    pub(super) fn profile(raw_id: &str, level: Level, years_of_service: u32) -> EmployeeProfile {
        EmployeeProfile {
            id: EmployeeId(raw_id.to_string()),
            name: raw_id.to_string(),
            role: EmployeeRole::TeamMember,
            level: Some(level),
            years_of_service: Some(years_of_service),
            level_start_date: None,
            hire_date: None,
            is_active: true,
        }
    }

    fn entry(grade: &str, range: &str, points: f64) -> GradeCriteriaEntry {
        GradeCriteriaEntry {
            grade: grade.to_string(),
            year_range: YearRange(range.to_string()),
            points,
        }
    }

    pub(super) fn build() -> (PromotionSelectionService<Repository>, Arc<Repository>) {
        let repository = Arc::new(Repository::default());
        repository.with(|store| {
            store.grade_criteria = vec![
                entry("A", "2021-2024", 3.0),
                entry("B", "2021-2024", 2.0),
                entry("S", "2021-2024", 4.0),
                entry("S", "2025", 4.0),
            ];
            store.level_criteria = vec![
                LevelCriteria {
                    level: Level::L2,
                    year: YEAR,
                    required_points: 6.0,
                    special_required_points: Some(20.0),
                    required_credits: 0.0,
                    min_tenure: Some(2),
                },
                LevelCriteria {
                    level: Level::L3,
                    year: YEAR,
                    required_points: 10.0,
                    special_required_points: None,
                    required_credits: 0.0,
                    min_tenure: Some(2),
                },
            ];
        });
        let service =
            PromotionSelectionService::new(repository.clone(), SelectionPolicy::default());
        (service, repository)
    }
}

mod selection {
    use super::common::*;
    use promotion_review::workflows::promotion::{
        EmployeeId, GradeSheetImporter, Level, PromotionType,
    };
    use std::io::Cursor;

    #[test]
    fn imported_grade_sheet_drives_normal_selection() {
        let (service, repository) = build();
        let sheet = GradeSheetImporter::from_reader(Cursor::new(
            "employee_id,year,grade,credit\nemp-7,2023,A,\nemp-7,2024,B,\nemp-7,2025,S,5\n",
        ))
        .expect("sheet parses");
        repository.with(|store| {
            store.employees.push(profile("emp-7", Level::L2, 3));
            store.grades.extend(sheet.grades);
            store.credits.extend(sheet.credits);
            store
                .adjustments
                .insert(EmployeeId("emp-7".to_string()), 1.0);
        });

        let summary = service.recalculate_and_select(YEAR).expect("pass runs");

        assert_eq!(summary.counts().added, 1);
        let candidate = repository.candidate("emp-7").expect("candidate stored");
        assert_eq!(candidate.promotion_type, PromotionType::Normal);
        let totals = &repository.store.lock().expect("lock").totals;
        assert_eq!(
            totals.get(&(EmployeeId("emp-7".to_string()), YEAR)),
            Some(&15.0)
        );
    }

    #[test]
    fn special_track_candidate_becomes_normal_once_tenure_is_met() {
        let (service, repository) = build();
        repository.with(|store| {
            store.employees.push(profile("emp-9", Level::L2, 1));
            store
                .adjustments
                .insert(EmployeeId("emp-9".to_string()), 19.0);
        });

        service.auto_select(YEAR).expect("first pass");
        let first = repository.candidate("emp-9").expect("special candidate");
        assert_eq!(first.promotion_type, PromotionType::Special);
        assert!(!first.point_met);

        repository.with(|store| {
            store.employees[0].years_of_service = Some(2);
        });
        let summary = service.auto_select(YEAR).expect("second pass");
        assert_eq!(summary.updated, 1);
        let second = repository.candidate("emp-9").expect("still a candidate");
        assert_eq!(second.promotion_type, PromotionType::Normal);
        assert!(second.point_met && second.credit_met);
    }
}

mod recalculation {
    use super::common::*;
    use promotion_review::workflows::promotion::{
        Level, RecalculationOutcome, RecalculationQueue, RecalculationTrigger, RetrySettings,
    };
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn criteria_edit_reclassifies_in_background() {
        let (service, repository) = build();
        repository.with(|store| {
            store.employees.push(profile("emp-3", Level::L2, 3));
        });
        let service = Arc::new(service);

        assert_eq!(service.auto_select(YEAR).expect("pass").total, 0);

        let (queue, _worker) = RecalculationQueue::spawn(service.clone(), RetrySettings::default());
        let mut reports = queue.subscribe();

        repository.with(|store| {
            for row in store.level_criteria.iter_mut() {
                if row.level == Level::L3 {
                    row.required_points = 6.0;
                }
            }
        });
        queue.notify(RecalculationTrigger::LevelCriteriaChanged { year: YEAR }, YEAR);

        let report = tokio::time::timeout(Duration::from_secs(5), reports.recv())
            .await
            .expect("report in time")
            .expect("channel open");
        match report.outcome {
            RecalculationOutcome::Completed { summary } => assert_eq!(summary.added, 1),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(repository.candidate("emp-3").is_some());
    }
}
