use crate::error::{AppError, Result};
use crate::records::RecordSet;
use crate::scoring::Mode;
use crate::types::{RawRow, StudyRecord};
use crate::util::parse_f64_safe;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns an uploaded CSV must carry, in the order they are reported.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Student", "Subject", "Study Hours", "Mode"];

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Reject rows whose mode is not Normal, Intermediate or Fast instead of
    /// scoring them with a multiplier of 1.
    pub strict_modes: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub unrecognized_modes: usize,
    pub ignored_columns: Vec<String>,
}

pub fn load_records(path: impl AsRef<Path>, opts: &LoadOptions) -> Result<(RecordSet, LoadReport)> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading study records");
    let file = File::open(path)?;
    read_records(file, opts)
}

/// Read and score every row of a CSV. Either the whole upload is accepted or
/// an error is returned and no rows are produced.
pub fn read_records<R: Read>(reader: R, opts: &LoadOptions) -> Result<(RecordSet, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "upload rejected, required columns absent");
        return Err(AppError::MissingColumns { missing });
    }

    let ignored_columns: Vec<String> = headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.contains(h))
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    let mut unrecognized_modes = 0usize;
    for (idx, result) in rdr.deserialize::<RawRow>().enumerate() {
        let row_no = idx + 1;
        let row = result?;

        let raw_hours = row.study_hours.unwrap_or_default();
        let study_hours = parse_f64_safe(Some(&raw_hours)).ok_or_else(|| AppError::InvalidCell {
            row: row_no,
            column: "Study Hours",
            value: raw_hours.clone(),
        })?;

        let mode = row.mode.unwrap_or_default();
        if !Mode::from_label(&mode).is_recognized() {
            if opts.strict_modes {
                return Err(AppError::UnrecognizedMode { row: row_no, value: mode });
            }
            warn!(row = row_no, mode = %mode, "unrecognized mode, scoring with multiplier 1");
            unrecognized_modes += 1;
        }

        let record = StudyRecord::new(
            row.student.unwrap_or_default(),
            row.subject.unwrap_or_default(),
            study_hours,
            mode,
        );
        debug!(row = row_no, marks = record.predicted_marks, "scored row");
        records.push(record);
    }

    let report = LoadReport {
        total_rows: records.len(),
        unrecognized_modes,
        ignored_columns,
    };
    info!(rows = report.total_rows, "study records loaded");
    Ok((RecordSet::from_records(records), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Recommendation;

    fn read(csv: &str) -> Result<(RecordSet, LoadReport)> {
        read_records(csv.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn test_scores_rows_in_input_order() {
        let (set, report) = read(
            "Student,Subject,Study Hours,Mode\n\
             Asha,Math,6,Normal\n\
             Ben,Art,9.5,Fast\n\
             Asha,Physics,3,Intermediate\n",
        )
        .unwrap();
        assert_eq!(report.total_rows, 3);
        let marks: Vec<f64> = set.iter().map(|r| r.predicted_marks).collect();
        assert_eq!(marks, vec![60.0, 47.5, 24.0]);
        assert_eq!(set.records()[1].recommendation, Recommendation::TakeAdequateSleep);
        assert_eq!(set.records()[2].subject, "Physics");
    }

    #[test]
    fn test_missing_mode_column_is_rejected() {
        let err = read("Student,Subject,Study Hours\nAsha,Math,6\n").unwrap_err();
        match err {
            AppError::MissingColumns { missing } => assert_eq!(missing, vec!["Mode"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_missing_columns_are_named() {
        let err = read("Name,Hours\nAsha,6\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Missing: Student, Subject, Study Hours, Mode"), "{msg}");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let (set, report) = read(
            "Class,Student,Mode,Subject,Study Hours,Notes\n\
             7B,Asha,Fast,Math,4,late\n",
        )
        .unwrap();
        assert_eq!(set.records()[0].predicted_marks, 20.0);
        assert_eq!(report.ignored_columns, vec!["Class", "Notes"]);
    }

    #[test]
    fn test_unrecognized_mode_falls_back() {
        let (set, report) = read("Student,Subject,Study Hours,Mode\nAsha,Math,7,Turbo\n").unwrap();
        assert_eq!(set.records()[0].predicted_marks, 7.0);
        assert_eq!(set.records()[0].mode, "Turbo");
        assert_eq!(report.unrecognized_modes, 1);
    }

    #[test]
    fn test_strict_mode_rejects_unknown_mode() {
        let opts = LoadOptions { strict_modes: true };
        let err = read_records(
            "Student,Subject,Study Hours,Mode\nAsha,Math,7,Normal\nBen,Art,2,fast\n".as_bytes(),
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnrecognizedMode { row: 2, .. }));
    }

    #[test]
    fn test_bad_hours_rejects_upload() {
        let err = read("Student,Subject,Study Hours,Mode\nAsha,Math,six,Normal\n").unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidCell { row: 1, column: "Study Hours", .. }
        ));
    }

    #[test]
    fn test_decimal_comma_hours_rejects_upload() {
        let err = read("Student,Subject,Study Hours,Mode\nAsha,Math,\"1,5\",Normal\n").unwrap_err();
        match err {
            AppError::InvalidCell { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "Study Hours");
                assert_eq!(value, "1,5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_header_only_gives_empty_set() {
        let (set, report) = read("Student,Subject,Study Hours,Mode\n").unwrap();
        assert!(set.is_empty());
        assert_eq!(report.total_rows, 0);
    }

    #[test]
    fn test_empty_input_reports_every_column() {
        let err = read("").unwrap_err();
        assert!(matches!(err, AppError::MissingColumns { ref missing } if missing.len() == 4));
    }
}
