//! Grade sheet import for loading historical grades from the legacy spreadsheet export.
//!
//! Expected headers: `employee_id,year,grade` with an optional `credit` column.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{CreditRecord, EmployeeId, GradeRecord};

#[derive(Debug)]
pub enum GradeImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: usize, detail: String },
}

impl std::fmt::Display for GradeImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeImportError::Io(err) => write!(f, "failed to read grade sheet: {err}"),
            GradeImportError::Csv(err) => write!(f, "invalid grade sheet CSV data: {err}"),
            GradeImportError::InvalidRow { line, detail } => {
                write!(f, "grade sheet line {line}: {detail}")
            }
        }
    }
}

impl std::error::Error for GradeImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GradeImportError::Io(err) => Some(err),
            GradeImportError::Csv(err) => Some(err),
            GradeImportError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for GradeImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for GradeImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Grades and credits parsed from one sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GradeSheet {
    pub grades: Vec<GradeRecord>,
    pub credits: Vec<CreditRecord>,
}

#[derive(Debug, Deserialize)]
struct GradeRow {
    employee_id: String,
    year: String,
    #[serde(default)]
    grade: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    credit: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

pub struct GradeSheetImporter;

impl GradeSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GradeSheet, GradeImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Blank grades are kept blank; they score the default points downstream.
    pub fn from_reader<R: Read>(reader: R) -> Result<GradeSheet, GradeImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut sheet = GradeSheet::default();

        for (index, row) in csv_reader.deserialize::<GradeRow>().enumerate() {
            let line = index + 2;
            let row = row?;

            if row.employee_id.is_empty() {
                return Err(GradeImportError::InvalidRow {
                    line,
                    detail: "missing employee_id".to_string(),
                });
            }
            let year = row
                .year
                .parse::<i32>()
                .map_err(|_| GradeImportError::InvalidRow {
                    line,
                    detail: format!("year '{}' is not a number", row.year),
                })?;
            let employee_id = EmployeeId(row.employee_id);

            if let Some(raw) = row.credit {
                let score = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| GradeImportError::InvalidRow {
                        line,
                        detail: format!("credit '{raw}' is not a number"),
                    })?;
                sheet.credits.push(CreditRecord {
                    employee_id: employee_id.clone(),
                    year,
                    score,
                });
            }

            sheet.grades.push(GradeRecord {
                employee_id,
                year,
                grade: row.grade,
            });
        }

        Ok(sheet)
    }
}
