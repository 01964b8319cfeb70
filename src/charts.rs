//! Chart views over a record set and an SVG renderer for them.
//!
//! The aggregate data is computed by `reports`; this module only decides
//! which views make up a chart set and how each one is drawn.

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::records::RecordSet;
use crate::reports::{
    average_marks_by_subject, hours_by_mode, hours_by_subject, marks_histogram, scatter_by_mode,
    scatter_by_subject, HISTOGRAM_BINS,
};
use crate::types::{HistogramBin, HoursShareRow, ScatterGroup, SubjectAverageRow};

/// Colours cycled through by scatter groups and pie slices.
pub const PALETTE: [RGBColor; 5] = [
    RGBColor(0x4F, 0x81, 0xBD),
    RGBColor(0xC0, 0x50, 0x4D),
    RGBColor(0x9B, 0xBB, 0x59),
    RGBColor(0x80, 0x64, 0xA2),
    RGBColor(0xF7, 0x96, 0x46),
];
const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

pub const AVERAGE_MARKS_TITLE: &str = "Average Marks per Subject";
pub const HISTOGRAM_TITLE: &str = "Histogram of Marks";

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    AverageMarks(Vec<SubjectAverageRow>),
    HoursShare {
        title: String,
        rows: Vec<HoursShareRow>,
    },
    MarksHistogram(Vec<HistogramBin>),
    Scatter {
        title: String,
        groups: Vec<ScatterGroup>,
    },
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::AverageMarks(_) => AVERAGE_MARKS_TITLE,
            Chart::HoursShare { title, .. } => title,
            Chart::MarksHistogram(_) => HISTOGRAM_TITLE,
            Chart::Scatter { title, .. } => title,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Chart::AverageMarks(rows) => rows.is_empty(),
            Chart::HoursShare { rows, .. } => rows.iter().all(|r| r.total_hours <= 0.0),
            Chart::MarksHistogram(bins) => bins.is_empty(),
            Chart::Scatter { groups, .. } => groups.iter().all(|g| g.points.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub title: String,
    pub svg: String,
}

/// Turns one chart view into an embeddable image.
pub trait ChartRenderer {
    fn render(&self, chart: &Chart) -> Result<RenderedChart>;
}

/// The four charts shown together: average marks, hours share, marks
/// histogram and an hours-vs-marks scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub charts: Vec<Chart>,
}

impl ChartSet {
    /// On-screen set: hours and scatter grouped by mode.
    pub fn dashboard(data: &RecordSet) -> Self {
        ChartSet {
            charts: vec![
                Chart::AverageMarks(average_marks_by_subject(data)),
                Chart::HoursShare {
                    title: "Study Hours Distribution by Mode".to_string(),
                    rows: hours_by_mode(data),
                },
                Chart::MarksHistogram(marks_histogram(data, HISTOGRAM_BINS)),
                Chart::Scatter {
                    title: "Study Hours vs Predicted Marks by Mode".to_string(),
                    groups: scatter_by_mode(data),
                },
            ],
        }
    }

    /// Exported-report set: hours and scatter grouped by subject.
    pub fn report(data: &RecordSet) -> Self {
        ChartSet {
            charts: vec![
                Chart::AverageMarks(average_marks_by_subject(data)),
                Chart::HoursShare {
                    title: "Study Hours Distribution by Subject".to_string(),
                    rows: hours_by_subject(data),
                },
                Chart::MarksHistogram(marks_histogram(data, HISTOGRAM_BINS)),
                Chart::Scatter {
                    title: "Study Hours vs Predicted Marks".to_string(),
                    groups: scatter_by_subject(data),
                },
            ],
        }
    }

    pub fn render_with(&self, renderer: &dyn ChartRenderer) -> Result<Vec<RenderedChart>> {
        self.charts.iter().map(|c| renderer.render(c)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        SvgChartRenderer {
            width: 600,
            height: 400,
        }
    }
}

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, chart: &Chart) -> Result<RenderedChart> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            draw_chart(&root, chart).map_err(|e| AppError::Chart(e.to_string()))?;
            root.present().map_err(|e| AppError::Chart(e.to_string()))?;
        }
        debug!(title = chart.title(), bytes = svg.len(), "rendered chart");
        Ok(RenderedChart {
            title: chart.title().to_string(),
            svg,
        })
    }
}

fn draw_chart(root: &Area<'_>, chart: &Chart) -> DrawResult {
    root.fill(&WHITE)?;
    if chart.is_empty() {
        return draw_placeholder(root, chart.title());
    }
    match chart {
        Chart::AverageMarks(rows) => draw_bar(root, rows),
        Chart::HoursShare { title, rows } => draw_pie(root, title, rows),
        Chart::MarksHistogram(bins) => draw_histogram(root, bins),
        Chart::Scatter { title, groups } => draw_scatter(root, title, groups),
    }
}

fn draw_placeholder(root: &Area<'_>, title: &str) -> DrawResult {
    let area = root.titled(title, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    let style = TextStyle::from(("sans-serif", 18).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new("No data", (w as i32 / 2, h as i32 / 2), style))?;
    Ok(())
}

/// Pads a value range so points do not sit on the frame, and keeps zero in
/// view.
fn axis_range(lo: f64, hi: f64) -> (f64, f64) {
    let lo = lo.min(0.0);
    let hi = hi.max(0.0);
    if hi - lo < f64::EPSILON {
        return (lo, lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, hi + pad)
}

fn draw_bar(root: &Area<'_>, rows: &[SubjectAverageRow]) -> DrawResult {
    let n = rows.len() as i32;
    let lo = rows.iter().map(|r| r.average_marks).fold(0.0, f64::min);
    let hi = rows.iter().map(|r| r.average_marks).fold(0.0, f64::max);
    let (y_lo, y_hi) = axis_range(lo, hi);

    let mut chart = ChartBuilder::on(root)
        .caption(AVERAGE_MARKS_TITLE, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), y_lo..y_hi)?;

    let subject_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => rows
            .get(*i as usize)
            .map(|r| r.subject.clone())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&subject_label)
        .y_desc("Marks")
        .draw()?;

    chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), r.average_marks),
            ],
            SKY_BLUE.filled(),
        );
        bar.set_margin(0, 0, 6, 6);
        bar
    }))?;
    Ok(())
}

fn draw_pie(root: &Area<'_>, title: &str, rows: &[HoursShareRow]) -> DrawResult {
    let area = root.titled(title, ("sans-serif", 22))?;
    let (w, h) = area.dim_in_pixel();
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let radius = w.min(h) as f64 * 0.36;
    let total: f64 = rows.iter().map(|r| r.total_hours.max(0.0)).sum();
    let label_style = TextStyle::from(("sans-serif", 13).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));

    // Slices run counter-clockwise from three o'clock.
    let mut angle = 0.0f64;
    for (i, row) in rows.iter().enumerate() {
        let sweep = row.total_hours.max(0.0) / total * 2.0 * PI;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / (2.0 * PI)) * 120.0).ceil().max(2.0) as usize;
        let mut points = vec![(cx as i32, cy as i32)];
        for s in 0..=steps {
            let a = angle + sweep * s as f64 / steps as f64;
            points.push(((cx + radius * a.cos()) as i32, (cy - radius * a.sin()) as i32));
        }
        area.draw(&Polygon::new(points, PALETTE[i % PALETTE.len()].filled()))?;

        let mid = angle + sweep / 2.0;
        let pos = (
            (cx + radius * 1.2 * mid.cos()) as i32,
            (cy - radius * 1.2 * mid.sin()) as i32,
        );
        area.draw(&Text::new(
            format!("{} ({:.1}%)", row.label, row.share_pct),
            pos,
            label_style.clone(),
        ))?;
        angle += sweep;
    }
    Ok(())
}

fn draw_histogram(root: &Area<'_>, bins: &[HistogramBin]) -> DrawResult {
    let (x_lo, x_hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => return Ok(()),
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let mut chart = ChartBuilder::on(root)
        .caption(HISTOGRAM_TITLE, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, 0f64..(max_count as f64 + 1.0))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Marks")
        .y_desc("Frequency")
        .y_label_formatter(&|v: &f64| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], LIGHT_GREEN.filled())
    }))?;
    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLACK.stroke_width(1))
    }))?;
    Ok(())
}

fn draw_scatter(root: &Area<'_>, title: &str, groups: &[ScatterGroup]) -> DrawResult {
    let finite = |&(x, y): &(f64, f64)| x.is_finite() && y.is_finite();
    let points = || groups.iter().flat_map(|g| g.points.iter().copied()).filter(finite);
    let (x_lo, x_hi) = axis_range(
        points().map(|p| p.0).fold(0.0, f64::min),
        points().map(|p| p.0).fold(0.0, f64::max),
    );
    let (y_lo, y_hi) = axis_range(
        points().map(|p| p.1).fold(0.0, f64::min),
        points().map(|p| p.1).fold(0.0, f64::max),
    );

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
    chart
        .configure_mesh()
        .x_desc("Study Hours")
        .y_desc("Predicted Marks")
        .draw()?;

    for (i, group) in groups.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(
                group
                    .points
                    .iter()
                    .copied()
                    .filter(finite)
                    .map(|p| Circle::new(p, 4, color.filled())),
            )?
            .label(group.label.as_str())
            .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;
    Ok(())
}
