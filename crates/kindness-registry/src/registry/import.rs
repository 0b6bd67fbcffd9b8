use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::codec::PositionCodec;
use super::domain::{ImportRow, NewPosition};
use super::store::{PositionStore, StoreError};

/// Number of header lines preceding data rows in the originating sheet.
pub const HEADER_ROWS: usize = 1;

/// Report row number for a zero-based batch index.
pub const fn report_row(index: usize) -> usize {
    index + HEADER_ROWS + 1
}

/// Single rule a row failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowViolation {
    NameRequired,
    FloorNotRecognized { allowed: Vec<String> },
    SectionRequired,
    LevelRequired,
    PositionRequired,
    PositionCodeRequired,
    PositionCodeExists { code: String },
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowViolation::NameRequired => write!(f, "name is required"),
            RowViolation::FloorNotRecognized { allowed } => {
                write!(f, "floor must be one of {{{}}}", allowed.join(", "))
            }
            RowViolation::SectionRequired => write!(f, "section is required"),
            RowViolation::LevelRequired => write!(f, "level is required"),
            RowViolation::PositionRequired => write!(f, "position is required"),
            RowViolation::PositionCodeRequired => write!(f, "position code is required"),
            RowViolation::PositionCodeExists { code } => {
                write!(f, "position code [{code}] already exists")
            }
        }
    }
}

/// Violations keyed by report row number.
///
/// Rows iterate in ascending order and each row keeps its violations in rule
/// order, so [`ValidationReport::messages`] is stable for a given batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    rows: BTreeMap<usize, Vec<RowViolation>>,
}

impl ValidationReport {
    pub fn record(&mut self, row: usize, violation: RowViolation) {
        self.rows.entry(row).or_default().push(violation);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn violations(&self, row: usize) -> &[RowViolation] {
        self.rows.get(&row).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }

    pub fn messages(&self) -> Vec<String> {
        self.rows
            .iter()
            .flat_map(|(row, violations)| {
                violations
                    .iter()
                    .map(move |violation| format!("row {row}: {violation}"))
            })
            .collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.messages())
    }
}

/// Result of validating an import batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Accepted(Vec<NewPosition>),
    Rejected(ValidationReport),
}

/// Applies the row rules to a batch and checks codes against the store.
#[derive(Debug, Clone, Default)]
pub struct ImportValidator {
    codec: PositionCodec,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}

fn optional_field(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl ImportValidator {
    pub fn new(codec: PositionCodec) -> Self {
        Self { codec }
    }

    /// Violations for a single row, in rule order. Only the duplicate-code rule
    /// touches the store.
    pub fn check_row<S>(&self, row: &ImportRow, store: &S) -> Result<Vec<RowViolation>, StoreError>
    where
        S: PositionStore + ?Sized,
    {
        let mut violations = Vec::new();

        if present(&row.name).is_none() {
            violations.push(RowViolation::NameRequired);
        }
        if !row
            .floor
            .as_deref()
            .is_some_and(|floor| self.codec.validate_floor(floor))
        {
            violations.push(RowViolation::FloorNotRecognized {
                allowed: self.codec.floors().to_vec(),
            });
        }
        if present(&row.section).is_none() {
            violations.push(RowViolation::SectionRequired);
        }
        if present(&row.level).is_none() {
            violations.push(RowViolation::LevelRequired);
        }
        if present(&row.position).is_none() {
            violations.push(RowViolation::PositionRequired);
        }
        match present(&row.position_code) {
            None => violations.push(RowViolation::PositionCodeRequired),
            Some(code) => {
                if store.get_by_code(code)?.is_some() {
                    violations.push(RowViolation::PositionCodeExists {
                        code: code.to_string(),
                    });
                }
            }
        }

        Ok(violations)
    }

    /// Validate every row; accept the batch only when no row failed.
    pub fn validate<S>(&self, rows: Vec<ImportRow>, store: &S) -> Result<ImportOutcome, StoreError>
    where
        S: PositionStore + ?Sized,
    {
        let mut report = ValidationReport::default();
        let mut accepted = Vec::with_capacity(rows.len());

        for (index, row) in rows.into_iter().enumerate() {
            let violations = self.check_row(&row, store)?;
            if violations.is_empty() {
                accepted.push(materialize(row));
                continue;
            }
            let row_number = report_row(index);
            for violation in violations {
                report.record(row_number, violation);
            }
        }

        if report.is_empty() {
            Ok(ImportOutcome::Accepted(accepted))
        } else {
            Ok(ImportOutcome::Rejected(report))
        }
    }
}

/// Copy a validated row verbatim into an insertable record.
fn materialize(row: ImportRow) -> NewPosition {
    NewPosition {
        name: row.name.unwrap_or_default(),
        position_code: row.position_code.unwrap_or_default(),
        floor: row.floor.unwrap_or_default(),
        section: row.section.unwrap_or_default(),
        level: row.level.unwrap_or_default(),
        position: row.position.unwrap_or_default(),
        applicant_name: optional_field(row.applicant_name),
        relation: optional_field(row.relation),
        mobile_phone: optional_field(row.mobile_phone),
        note: optional_field(row.note),
    }
}
