use std::collections::BTreeMap;

use super::domain::{Level, LevelCriteria};
use super::fallback::FallbackChain;

/// Level criteria for one resolved year, indexed by level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaSet {
    /// The year whose rows were used, which may differ from the requested one.
    pub source_year: Option<i32>,
    rows: BTreeMap<Level, LevelCriteria>,
}

impl CriteriaSet {
    pub fn get(&self, level: Level) -> Option<&LevelCriteria> {
        self.rows.get(&level)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

fn rows_for_year(all: &[LevelCriteria], year: i32) -> Option<Vec<LevelCriteria>> {
    let rows: Vec<LevelCriteria> = all.iter().filter(|row| row.year == year).cloned().collect();
    (!rows.is_empty()).then_some(rows)
}

pub(crate) fn exact_year(all: &[LevelCriteria], year: i32) -> Option<Vec<LevelCriteria>> {
    rows_for_year(all, year)
}

pub(crate) fn latest_earlier_year(
    all: &[LevelCriteria],
    year: i32,
) -> Option<Vec<LevelCriteria>> {
    let latest = all.iter().map(|row| row.year).filter(|y| *y < year).max()?;
    rows_for_year(all, latest)
}

pub(crate) fn latest_any_year(all: &[LevelCriteria]) -> Option<Vec<LevelCriteria>> {
    let latest = all.iter().map(|row| row.year).max()?;
    rows_for_year(all, latest)
}

/// Pick the criteria rows for `year`, substituting a whole other year when none exist.
///
/// No merging across years: the first tier that finds any row supplies every level.
pub fn resolve_criteria(all: &[LevelCriteria], year: i32) -> CriteriaSet {
    let chain = FallbackChain::<[LevelCriteria], Vec<LevelCriteria>>::new()
        .then("exact_year", |rows| exact_year(rows, year))
        .then("latest_earlier_year", |rows| latest_earlier_year(rows, year))
        .then("latest_any_year", latest_any_year);

    match chain.resolve(all) {
        Some(resolved) => {
            let source_year = resolved.value.first().map(|row| row.year);
            if resolved.tier != "exact_year" {
                tracing::debug!(
                    year,
                    ?source_year,
                    tier = resolved.tier,
                    "level criteria fell back"
                );
            }
            let mut rows = BTreeMap::new();
            for row in resolved.value {
                rows.entry(row.level).or_insert(row);
            }
            CriteriaSet { source_year, rows }
        }
        None => CriteriaSet::default(),
    }
}
