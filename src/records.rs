//! Record sets and the manual-entry builder.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::scoring::Mode;
use crate::types::StudyRecord;

/// Largest subject count the entry form accepts.
pub const MAX_SUBJECTS: usize = 20;

/// Ordered, scored rows for one submission. A new submission replaces the
/// whole set; rows are never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<StudyRecord>,
}

impl RecordSet {
    pub fn from_records(records: Vec<StudyRecord>) -> Self {
        RecordSet { records }
    }

    /// Flatten a filled-in entry grid into rows, student-major and
    /// subject-minor.
    pub fn from_grid(shape: &EntryShape, grid: &EntryGrid) -> Result<Self> {
        shape.validate()?;
        if grid.students.len() != shape.num_students {
            return Err(AppError::ShapeMismatch(format!(
                "expected {} students, got {}",
                shape.num_students,
                grid.students.len()
            )));
        }

        let mut records = Vec::with_capacity(shape.num_students * shape.num_subjects);
        for (idx, student) in grid.students.iter().enumerate() {
            if student.subjects.len() != shape.num_subjects {
                return Err(AppError::ShapeMismatch(format!(
                    "student {} has {} subjects, expected {}",
                    idx + 1,
                    student.subjects.len(),
                    shape.num_subjects
                )));
            }
            for entry in &student.subjects {
                records.push(StudyRecord::new(
                    student.name.clone(),
                    entry.subject.clone(),
                    entry.study_hours,
                    entry.mode.label(),
                ));
            }
        }
        debug!(rows = records.len(), "built record set from entry grid");
        Ok(RecordSet { records })
    }

    pub fn records(&self) -> &[StudyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StudyRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<StudyRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a StudyRecord;
    type IntoIter = std::slice::Iter<'a, StudyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// How many students and subjects the manual entry form asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryShape {
    pub num_students: usize,
    pub num_subjects: usize,
}

impl EntryShape {
    pub fn new(num_students: usize, num_subjects: usize) -> Result<Self> {
        let shape = EntryShape {
            num_students,
            num_subjects,
        };
        shape.validate()?;
        Ok(shape)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_students == 0 {
            return Err(AppError::InvalidShape(
                "at least one student is required".to_string(),
            ));
        }
        if !(1..=MAX_SUBJECTS).contains(&self.num_subjects) {
            return Err(AppError::InvalidShape(format!(
                "number of subjects must be between 1 and {}",
                MAX_SUBJECTS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryGrid {
    pub students: Vec<StudentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentEntry {
    pub name: String,
    pub subjects: Vec<SubjectEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectEntry {
    pub subject: String,
    pub study_hours: f64,
    pub mode: Mode,
}

impl SubjectEntry {
    pub fn new(subject: impl Into<String>, study_hours: f64, mode: Mode) -> Self {
        SubjectEntry {
            subject: subject.into(),
            study_hours,
            mode,
        }
    }
}
