use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::scoring::{recommend, score, Recommendation};
use crate::util::format_number;

/// One uploaded CSV row, read by header name. Extra columns are ignored by
/// the deserializer; a column missing from the header reads as `None`.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "Student")]
    pub student: Option<String>,
    #[serde(rename = "Subject")]
    pub subject: Option<String>,
    #[serde(rename = "Study Hours")]
    pub study_hours: Option<String>,
    #[serde(rename = "Mode")]
    pub mode: Option<String>,
}

/// A scored (student, subject) row. Field order and names are the
/// six-column shape every export writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct StudyRecord {
    #[serde(rename = "Student")]
    #[tabled(rename = "Student")]
    pub student: String,
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Study Hours")]
    #[tabled(rename = "Study Hours", display_with = "display_decimal")]
    pub study_hours: f64,
    #[serde(rename = "Mode")]
    #[tabled(rename = "Mode")]
    pub mode: String,
    #[serde(rename = "Predicted Marks")]
    #[tabled(rename = "Predicted Marks", display_with = "display_decimal")]
    pub predicted_marks: f64,
    #[serde(rename = "Recommendation")]
    #[tabled(rename = "Recommendation")]
    pub recommendation: Recommendation,
}

impl StudyRecord {
    /// Build a row and derive its marks and recommendation.
    pub fn new(
        student: impl Into<String>,
        subject: impl Into<String>,
        study_hours: f64,
        mode: impl Into<String>,
    ) -> Self {
        let mode = mode.into();
        StudyRecord {
            student: student.into(),
            subject: subject.into(),
            study_hours,
            predicted_marks: score(study_hours, &mode),
            recommendation: recommend(study_hours),
            mode,
        }
    }
}

pub const RECORD_HEADERS: [&str; 6] = [
    "Student",
    "Subject",
    "Study Hours",
    "Mode",
    "Predicted Marks",
    "Recommendation",
];

fn display_decimal(v: &f64) -> String {
    format_number(*v, 2)
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SubjectAverageRow {
    #[serde(rename = "Subject")]
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Rows")]
    #[tabled(rename = "Rows")]
    pub rows: usize,
    #[serde(rename = "AverageMarks")]
    #[tabled(rename = "Average Marks", display_with = "display_decimal")]
    pub average_marks: f64,
}

/// Total study hours for one subject or mode and its share of all hours.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct HoursShareRow {
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "TotalHours")]
    #[tabled(rename = "Total Hours", display_with = "display_decimal")]
    pub total_hours: f64,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "Share %", display_with = "display_share")]
    pub share_pct: f64,
}

fn display_share(v: &f64) -> String {
    format_number(*v, 1)
}

/// `[start, end)` except for the last bin, which also holds `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct HistogramBin {
    #[tabled(rename = "From", display_with = "display_decimal")]
    pub start: f64,
    #[tabled(rename = "To", display_with = "display_decimal")]
    pub end: f64,
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterGroup {
    pub label: String,
    /// `(study_hours, predicted_marks)` in record order.
    pub points: Vec<(f64, f64)>,
}

/// Point count and value ranges of one scatter group, for text output.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ScatterSummaryRow {
    #[tabled(rename = "Label")]
    pub label: String,
    #[tabled(rename = "Points")]
    pub points: usize,
    #[tabled(rename = "Min Hours", display_with = "display_decimal")]
    pub min_hours: f64,
    #[tabled(rename = "Max Hours", display_with = "display_decimal")]
    pub max_hours: f64,
    #[tabled(rename = "Min Marks", display_with = "display_decimal")]
    pub min_marks: f64,
    #[tabled(rename = "Max Marks", display_with = "display_decimal")]
    pub max_marks: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_rows: usize,
    pub total_students: usize,
    pub total_subjects: usize,
    pub avg_predicted_marks: f64,
    pub total_study_hours: f64,
}
