use crate::records::RecordSet;
use crate::types::{
    HistogramBin, HoursShareRow, ScatterGroup, ScatterSummaryRow, StudyRecord, SubjectAverageRow,
    SummaryStats,
};
use crate::util::average;
use std::collections::{BTreeMap, HashSet};

/// Bins used for the marks histogram in both the dashboard and the report.
pub const HISTOGRAM_BINS: usize = 10;

/// Mean predicted marks per subject, ordered by subject.
pub fn average_marks_by_subject(data: &RecordSet) -> Vec<SubjectAverageRow> {
    let mut map: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in data {
        map.entry(r.subject.as_str()).or_default().push(r.predicted_marks);
    }
    map.into_iter()
        .map(|(subject, marks)| SubjectAverageRow {
            subject: subject.to_string(),
            rows: marks.len(),
            average_marks: average(&marks),
        })
        .collect()
}

pub fn hours_by_subject(data: &RecordSet) -> Vec<HoursShareRow> {
    hours_by(data, |r| r.subject.as_str())
}

pub fn hours_by_mode(data: &RecordSet) -> Vec<HoursShareRow> {
    hours_by(data, |r| r.mode.as_str())
}

fn hours_by<F>(data: &RecordSet, key: F) -> Vec<HoursShareRow>
where
    F: for<'a> Fn(&'a StudyRecord) -> &'a str,
{
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    for r in data {
        *map.entry(key(r)).or_insert(0.0) += r.study_hours;
    }
    let total: f64 = map.values().sum();
    map.into_iter()
        .map(|(label, hours)| HoursShareRow {
            label: label.to_string(),
            total_hours: hours,
            share_pct: if total > 0.0 { hours * 100.0 / total } else { 0.0 },
        })
        .collect()
}

/// Equal-width histogram of predicted marks over `[min, max]`.
///
/// Every bin is half-open except the last, which is closed so the maximum is
/// counted. A single distinct value is spread over `[v - 0.5, v + 0.5]`.
/// Non-finite marks are skipped.
pub fn marks_histogram(data: &RecordSet, bins: usize) -> Vec<HistogramBin> {
    let values: Vec<f64> = data
        .iter()
        .map(|r| r.predicted_marks)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut hist: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + i as f64 * width,
            end: if i + 1 == bins { hi } else { lo + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        hist[idx].count += 1;
    }
    hist
}

pub fn scatter_by_subject(data: &RecordSet) -> Vec<ScatterGroup> {
    scatter_by(data, |r| r.subject.as_str())
}

pub fn scatter_by_mode(data: &RecordSet) -> Vec<ScatterGroup> {
    scatter_by(data, |r| r.mode.as_str())
}

// Groups keep first-appearance order so colours are stable for a given file.
fn scatter_by<F>(data: &RecordSet, key: F) -> Vec<ScatterGroup>
where
    F: for<'a> Fn(&'a StudyRecord) -> &'a str,
{
    let mut groups: Vec<ScatterGroup> = Vec::new();
    for r in data {
        let label = key(r);
        let point = (r.study_hours, r.predicted_marks);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(g) => g.points.push(point),
            None => groups.push(ScatterGroup {
                label: label.to_string(),
                points: vec![point],
            }),
        }
    }
    groups
}

/// One row per scatter group with its point count and hour and mark ranges.
/// Groups with no finite points are left out.
pub fn scatter_summary(groups: &[ScatterGroup]) -> Vec<ScatterSummaryRow> {
    groups
        .iter()
        .filter_map(|g| {
            let points: Vec<(f64, f64)> = g
                .points
                .iter()
                .copied()
                .filter(|(h, m)| h.is_finite() && m.is_finite())
                .collect();
            if points.is_empty() {
                return None;
            }
            let (mut min_hours, mut max_hours) = (f64::INFINITY, f64::NEG_INFINITY);
            let (mut min_marks, mut max_marks) = (f64::INFINITY, f64::NEG_INFINITY);
            for (h, m) in &points {
                min_hours = min_hours.min(*h);
                max_hours = max_hours.max(*h);
                min_marks = min_marks.min(*m);
                max_marks = max_marks.max(*m);
            }
            Some(ScatterSummaryRow {
                label: g.label.clone(),
                points: points.len(),
                min_hours,
                max_hours,
                min_marks,
                max_marks,
            })
        })
        .collect()
}

pub fn generate_summary(data: &RecordSet) -> SummaryStats {
    let students: HashSet<&str> = data.iter().map(|r| r.student.as_str()).collect();
    let subjects: HashSet<&str> = data.iter().map(|r| r.subject.as_str()).collect();
    let marks: Vec<f64> = data.iter().map(|r| r.predicted_marks).collect();
    SummaryStats {
        total_rows: data.len(),
        total_students: students.len(),
        total_subjects: subjects.len(),
        avg_predicted_marks: average(&marks),
        total_study_hours: data.iter().map(|r| r.study_hours).sum(),
    }
}
