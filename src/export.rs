//! Report documents and their encoders.
//!
//! Every encoder builds the whole document in memory; nothing reaches the
//! output directory until `write_atomic` moves the finished bytes into place.

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use umya_spreadsheet::{Border, HorizontalAlignmentValues, VerticalAlignmentValues};

use crate::charts::{ChartRenderer, ChartSet, RenderedChart};
use crate::error::{AppError, Result};
use crate::output::write_atomic;
use crate::records::RecordSet;
use crate::types::RECORD_HEADERS;
use crate::util::{col_to_letter, escape_html, format_number, slug};

pub const DEFAULT_REPORT_TITLE: &str = "MarX Prediction Summary";
pub const SHEET_TITLE: &str = "Prediction Summary";
const HEADER_FILL: &str = "FF4F81BD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Excel workbook
    Xlsx,
    /// Record-oriented JSON array
    Json,
    /// Plain CSV with the six result columns
    Csv,
    /// Standalone HTML page with table and charts
    Html,
    /// PDF report with table and charts
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything an encoder may need: title, timestamp, rows and charts.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    pub title: String,
    pub generated_at: DateTime<Local>,
    pub records: &'a RecordSet,
    pub charts: Vec<RenderedChart>,
}

impl<'a> Report<'a> {
    pub fn new(title: impl Into<String>, records: &'a RecordSet) -> Self {
        Report {
            title: title.into(),
            generated_at: Local::now(),
            records,
            charts: Vec::new(),
        }
    }

    pub fn with_charts(mut self, charts: Vec<RenderedChart>) -> Self {
        self.charts = charts;
        self
    }
}

pub trait ReportEncoder {
    fn format(&self) -> ExportFormat;

    /// Whether `encode` uses `Report::charts`.
    fn needs_charts(&self) -> bool {
        false
    }

    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>>;
}

pub fn encoder_for(format: ExportFormat) -> Box<dyn ReportEncoder> {
    match format {
        ExportFormat::Xlsx => Box::new(XlsxEncoder),
        ExportFormat::Json => Box::new(JsonEncoder),
        ExportFormat::Csv => Box::new(CsvEncoder),
        ExportFormat::Html => Box::new(HtmlEncoder),
        ExportFormat::Pdf => Box::new(PdfEncoder),
    }
}

pub struct JsonEncoder;

impl ReportEncoder for JsonEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        report.records.serialize(&mut ser)?;
        Ok(buf)
    }
}

pub struct CsvEncoder;

impl ReportEncoder for CsvEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        // Header written by hand so an empty record set still gets one.
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(RECORD_HEADERS)?;
        for r in report.records {
            wtr.serialize(r)?;
        }
        wtr.into_inner().map_err(|e| AppError::Export(e.to_string()))
    }
}

pub struct XlsxEncoder;

impl ReportEncoder for XlsxEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let sheet = book
            .new_sheet(SHEET_TITLE)
            .map_err(|e| AppError::Export(e.to_string()))?;

        for (i, header) in RECORD_HEADERS.iter().enumerate() {
            let addr = format!("{}1", col_to_letter(i + 1));
            sheet.get_cell_mut(addr.as_str()).set_value(*header);

            let style = sheet.get_style_mut(addr.as_str());
            style.get_font_mut().set_bold(true);
            style.get_font_mut().get_color_mut().set_argb("FFFFFFFF");
            style.set_background_color(HEADER_FILL);
            let alignment = style.get_alignment_mut();
            alignment.set_horizontal(HorizontalAlignmentValues::Center);
            alignment.set_vertical(VerticalAlignmentValues::Center);
            let borders = style.get_borders_mut();
            borders.get_left_mut().set_border_style(Border::BORDER_THIN);
            borders.get_right_mut().set_border_style(Border::BORDER_THIN);
            borders.get_top_mut().set_border_style(Border::BORDER_THIN);
            borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
        }

        for (idx, r) in report.records.iter().enumerate() {
            let row = idx + 2;
            let cell = |col: usize| format!("{}{}", col_to_letter(col), row);
            sheet.get_cell_mut(cell(1).as_str()).set_value(r.student.as_str());
            sheet.get_cell_mut(cell(2).as_str()).set_value(r.subject.as_str());
            sheet.get_cell_mut(cell(3).as_str()).set_value_number(r.study_hours);
            sheet.get_cell_mut(cell(4).as_str()).set_value(r.mode.as_str());
            sheet
                .get_cell_mut(cell(5).as_str())
                .set_value_number(r.predicted_marks);
            sheet
                .get_cell_mut(cell(6).as_str())
                .set_value(r.recommendation.as_str());
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        umya_spreadsheet::writer::xlsx::write_writer(&book, &mut cursor)
            .map_err(|e| AppError::Export(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

pub struct HtmlEncoder;

impl HtmlEncoder {
    pub fn render(&self, report: &Report<'_>) -> String {
        let mut html = String::new();
        let title = escape_html(&report.title);
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\" />\n");
        html.push_str(&format!("<title>{}</title>\n", title));
        html.push_str(
            "<style>\n\
             body { font-family: Helvetica, Arial, sans-serif; margin: 32px; color: #222; }\n\
             h1 { text-align: center; }\n\
             .generated { text-align: center; color: #666; font-size: 12px; }\n\
             table { border-collapse: collapse; margin: 20px auto; }\n\
             th { background: #4F81BD; color: #fff; font-size: 12pt; padding: 6px 10px; }\n\
             td { font-size: 10pt; padding: 4px 10px; text-align: center; }\n\
             th, td { border: 1px solid #000; }\n\
             .chart { page-break-inside: avoid; margin: 20px auto; width: 600px; }\n\
             </style>\n</head>\n<body>\n",
        );
        html.push_str(&format!("<h1>{}</h1>\n", title));
        html.push_str(&format!(
            "<p class=\"generated\">Generated {}</p>\n",
            report.generated_at.format("%Y-%m-%d %H:%M")
        ));

        html.push_str("<table>\n<thead><tr>");
        for h in RECORD_HEADERS {
            html.push_str(&format!("<th>{}</th>", h));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for r in report.records {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_html(&r.student),
                escape_html(&r.subject),
                format_number(r.study_hours, 2),
                escape_html(&r.mode),
                format_number(r.predicted_marks, 2),
                r.recommendation,
            ));
        }
        html.push_str("</tbody>\n</table>\n");

        for chart in &report.charts {
            html.push_str(&format!(
                "<div class=\"chart\">\n<h2>{}</h2>\n{}\n</div>\n",
                escape_html(&chart.title),
                chart.svg
            ));
        }
        html.push_str("</body>\n</html>\n");
        html
    }
}

impl ReportEncoder for HtmlEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }

    fn needs_charts(&self) -> bool {
        true
    }

    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        Ok(self.render(report).into_bytes())
    }
}

/// Prints the HTML report to PDF through a headless Chrome instance.
pub struct PdfEncoder;

impl ReportEncoder for PdfEncoder {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn needs_charts(&self) -> bool {
        true
    }

    #[cfg(feature = "pdf")]
    fn encode(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let html = HtmlEncoder.render(report);
        let html_path = std::env::temp_dir().join(format!(
            "marx_report_{}_{}.html",
            std::process::id(),
            report.generated_at.format("%Y%m%d%H%M%S%f")
        ));
        std::fs::write(&html_path, html)?;
        let result = pdf::print_to_pdf(&html_path);
        let _ = std::fs::remove_file(&html_path);
        result
    }

    #[cfg(not(feature = "pdf"))]
    fn encode(&self, _report: &Report<'_>) -> Result<Vec<u8>> {
        Err(AppError::Export(
            "PDF support is not compiled in (enable the `pdf` feature)".to_string(),
        ))
    }
}

#[cfg(feature = "pdf")]
mod pdf {
    use headless_chrome::{Browser, LaunchOptionsBuilder};
    use std::path::Path;
    use tracing::debug;

    use crate::error::{AppError, Result};

    fn export_err(e: impl std::fmt::Display) -> AppError {
        AppError::Export(format!("PDF rendering: {}", e))
    }

    fn file_url(path: &Path) -> Result<String> {
        let abs = std::fs::canonicalize(path)?;
        let mut s = abs
            .to_str()
            .ok_or_else(|| export_err("report path is not valid UTF-8"))?
            .to_string();
        if cfg!(target_os = "windows") {
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                s = stripped.to_string();
            }
            s = s.replace('\\', "/");
            return Ok(format!("file:///{}", s));
        }
        Ok(format!("file://{}", s))
    }

    pub(super) fn print_to_pdf(html_path: &Path) -> Result<Vec<u8>> {
        let options = LaunchOptionsBuilder::default()
            .headless(true)
            .build()
            .map_err(export_err)?;
        let browser = Browser::new(options).map_err(export_err)?;
        let tab = browser.new_tab().map_err(export_err)?;

        let url = file_url(html_path)?;
        debug!(%url, "printing report to PDF");
        tab.navigate_to(&url).map_err(export_err)?;
        tab.wait_until_navigated().map_err(export_err)?;
        tab.print_to_pdf(None).map_err(export_err)
    }
}

/// Encodes reports to files in one output directory, rendering charts only
/// for formats that embed them.
pub struct Exporter {
    renderer: Box<dyn ChartRenderer>,
    title: String,
    output_dir: PathBuf,
    file_stem: String,
}

impl Exporter {
    pub fn new(
        renderer: Box<dyn ChartRenderer>,
        title: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        file_stem: impl Into<String>,
    ) -> Self {
        Exporter {
            renderer,
            title: title.into(),
            output_dir: output_dir.into(),
            file_stem: file_stem.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn path_for(&self, format: ExportFormat) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.file_stem, format.extension()))
    }

    /// Encode `records` in `format` with the default encoder and write it.
    pub fn export(&self, records: &RecordSet, format: ExportFormat) -> Result<PathBuf> {
        self.export_with(records, encoder_for(format).as_ref())
    }

    pub fn export_with(&self, records: &RecordSet, encoder: &dyn ReportEncoder) -> Result<PathBuf> {
        let mut report = Report::new(self.title.clone(), records);
        if encoder.needs_charts() {
            report = report.with_charts(ChartSet::report(records).render_with(self.renderer.as_ref())?);
        }
        let bytes = encoder.encode(&report)?;
        debug!(format = %encoder.format(), bytes = bytes.len(), "encoded report");

        let path = self.path_for(encoder.format());
        write_atomic(&path, &bytes)?;
        info!(path = %path.display(), rows = records.len(), "report exported");
        Ok(path)
    }

    /// Render a chart set and write each chart as `<stem>_<title>.svg`.
    pub fn save_charts(&self, charts: &ChartSet) -> Result<Vec<PathBuf>> {
        let rendered = charts.render_with(self.renderer.as_ref())?;
        let mut paths = Vec::with_capacity(rendered.len());
        for chart in rendered {
            let path = self
                .output_dir
                .join(format!("{}_{}.svg", self.file_stem, slug(&chart.title)));
            write_atomic(&path, chart.svg.as_bytes())?;
            paths.push(path);
        }
        info!(count = paths.len(), dir = %self.output_dir.display(), "charts saved");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::SvgChartRenderer;
    use crate::types::StudyRecord;

    fn sample() -> RecordSet {
        RecordSet::from_records(vec![
            StudyRecord::new("Asha", "Math", 6.0, "Normal"),
            StudyRecord::new("Ben <b>", "Art", 9.5, "Fast"),
        ])
    }

    #[test]
    fn test_json_is_record_array_with_four_space_indent() {
        let data = sample();
        let bytes = JsonEncoder.encode(&Report::new("t", &data)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("[\n    {\n        \"Student\": \"Asha\""), "{text}");
        for object in text.split('{').skip(1) {
            let offsets: Vec<usize> = RECORD_HEADERS
                .iter()
                .map(|h| object.find(&format!("\"{}\":", h)).unwrap())
                .collect();
            assert!(offsets.windows(2).all(|w| w[0] < w[1]), "{object}");
        }
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["Predicted Marks"], 60.0);
        assert_eq!(parsed[1]["Recommendation"], "Take adequate sleep");
    }

    #[test]
    fn test_csv_has_six_column_header() {
        let data = sample();
        let bytes = CsvEncoder.encode(&Report::new("t", &data)).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Student,Subject,Study Hours,Mode,Predicted Marks,Recommendation")
        );
        assert_eq!(lines.next(), Some("Asha,Math,6.0,Normal,60.0,Maintain regular study schedule"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_csv_empty_set_still_has_header() {
        let data = RecordSet::default();
        let bytes = CsvEncoder.encode(&Report::new("t", &data)).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap().trim_end(),
            "Student,Subject,Study Hours,Mode,Predicted Marks,Recommendation"
        );
    }

    #[test]
    fn test_xlsx_is_zip_container() {
        let data = sample();
        let bytes = XlsxEncoder.encode(&Report::new("t", &data)).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_html_escapes_and_embeds_charts() {
        let data = sample();
        let charts = ChartSet::report(&data)
            .render_with(&SvgChartRenderer::default())
            .unwrap();
        let report = Report::new("MarX Prediction Summary", &data).with_charts(charts);
        let html = HtmlEncoder.render(&report);
        assert!(html.contains("<h1>MarX Prediction Summary</h1>"));
        assert!(html.contains("Ben &lt;b&gt;"));
        assert!(html.contains("<h2>Histogram of Marks</h2>"));
        assert_eq!(html.matches("<svg").count(), 4);
        assert!(html.contains("<th>Predicted Marks</th>"));
    }

    #[test]
    fn test_exporter_writes_named_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(
            Box::new(SvgChartRenderer::default()),
            DEFAULT_REPORT_TITLE,
            dir.path(),
            "prediction",
        );
        let data = sample();
        for format in [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Xlsx, ExportFormat::Html] {
            let path = exporter.export(&data, format).unwrap();
            assert_eq!(path, dir.path().join(format!("prediction.{}", format.extension())));
            assert!(path.exists());
        }
    }

    #[test]
    fn test_save_charts_names_files_by_title() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Box::new(SvgChartRenderer::default()), "t", dir.path(), "term1");
        let paths = exporter.save_charts(&ChartSet::dashboard(&sample())).unwrap();
        assert_eq!(paths.len(), 4);
        assert_eq!(paths[0], dir.path().join("term1_average_marks_per_subject.svg"));
        assert_eq!(paths[1], dir.path().join("term1_study_hours_distribution_by_mode.svg"));
        assert!(paths.iter().all(|p| p.exists()));
    }

    struct FailingEncoder;

    impl ReportEncoder for FailingEncoder {
        fn format(&self) -> ExportFormat {
            ExportFormat::Json
        }

        fn encode(&self, _report: &Report<'_>) -> Result<Vec<u8>> {
            Err(AppError::Export("boom".to_string()))
        }
    }

    #[test]
    fn test_failed_encode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(Box::new(SvgChartRenderer::default()), "t", dir.path(), "prediction");
        assert!(exporter.export_with(&sample(), &FailingEncoder).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
