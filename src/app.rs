// Interactive console front end.
//
// Walks four screens in turn: auth, subject setup, subject details and
// recommendations. The session is owned by `run_interactive`
// and handed to each screen; every error is printed inline and the user
// stays on the screen that produced it. Closing stdin ends the session.
use std::io::{BufRead, Write};
use tracing::info;

use crate::charts::ChartSet;
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::export::{ExportFormat, Exporter};
use crate::loader;
use crate::output::table_rows;
use crate::records::{
    EntryGrid, EntryShape, RecordSet, StudentEntry, SubjectEntry, MAX_SUBJECTS,
};
use crate::reports::{
    average_marks_by_subject, generate_summary, hours_by_mode, marks_histogram, scatter_by_mode,
    scatter_summary, HISTOGRAM_BINS,
};
use crate::scoring::Mode;
use crate::session::{Screen, Session};
use crate::util::{format_int, format_number, parse_f64_safe};

const PREVIEW_ROWS: usize = 50;

/// Line-oriented prompt over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    out: W,
}

enum Flow {
    Continue,
    Exit,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Console { input, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Print `label: ` and read one trimmed line.
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.out, "{}: ", label)?;
        self.out.flush()?;
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            writeln!(self.out)?;
            return Err(AppError::InputClosed);
        }
        Ok(buf.trim().to_string())
    }

    fn read_choice(&mut self) -> Result<String> {
        self.prompt("Enter choice")
    }

    /// Ask a Y/N question until one of the two is given.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            let resp = self.prompt(&format!("{} (Y/N)", question))?.to_uppercase();
            match resp.as_str() {
                "Y" => return Ok(true),
                "N" => return Ok(false),
                _ => writeln!(self.out, "Invalid choice. Please enter Y or N.")?,
            }
        }
    }

    fn prompt_hours(&mut self) -> Result<f64> {
        loop {
            let raw = self.prompt("Study Hours (0-24)")?;
            match parse_f64_safe(Some(&raw)) {
                Some(h) if (0.0..=24.0).contains(&h) => return Ok(h),
                _ => writeln!(self.out, "Please enter a number between 0 and 24.")?,
            }
        }
    }

    fn prompt_mode(&mut self) -> Result<Mode> {
        let options: Vec<String> = Mode::SELECTABLE
            .iter()
            .enumerate()
            .map(|(i, m)| format!("[{}] {}", i + 1, m))
            .collect();
        let label = format!("Study Mode {}", options.join(" "));
        loop {
            let raw = self.prompt(&label)?;
            let picked = raw
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Mode::SELECTABLE.get(i).copied())
                .or_else(|| Some(Mode::from_label(&raw)).filter(|m| m.is_recognized()));
            match picked {
                Some(mode) => return Ok(mode),
                None => writeln!(self.out, "Please pick 1, 2 or 3.")?,
            }
        }
    }
}

/// Drive a fresh session until the user exits or input runs out.
pub fn run_interactive<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    settings: &Settings,
    exporter: &Exporter,
) -> Result<()> {
    let mut session = Session::new();
    loop {
        let step = match session.screen() {
            Screen::Auth => auth_screen(console, &mut session),
            Screen::SubjectSetup => setup_screen(console, &mut session, settings),
            Screen::SubjectDetails => details_screen(console, &mut session),
            Screen::Recommendations => results_screen(console, &mut session, exporter),
        };
        match step {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => {
                writeln!(console.out, "Exiting the program.")?;
                return Ok(());
            }
            Err(AppError::InputClosed) => return Ok(()),
            Err(e) => writeln!(console.out, "Error: {}\n", e)?,
        }
    }
}

fn auth_screen<R: BufRead, W: Write>(c: &mut Console<R, W>, session: &mut Session) -> Result<Flow> {
    writeln!(c.out, "Welcome to MarX Prediction")?;
    writeln!(c.out, "Please Register or Sign In")?;
    writeln!(c.out, "[1] Register")?;
    writeln!(c.out, "[2] Sign In")?;
    writeln!(c.out, "[3] Exit\n")?;
    match c.read_choice()?.as_str() {
        "1" => {
            let name = c.prompt("Name")?;
            let email = c.prompt("Email")?;
            let password = c.prompt("Password")?;
            session.register(&name, &email, &password)?;
            writeln!(c.out, "Welcome {}! Registration successful.\n", name)?;
        }
        "2" => {
            let email = c.prompt("Email")?;
            let password = c.prompt("Password")?;
            session.sign_in(&email, &password)?;
            writeln!(c.out, "Welcome back! Login successful.\n")?;
        }
        "3" => return Ok(Flow::Exit),
        _ => writeln!(c.out, "Invalid choice. Please enter 1, 2 or 3.\n")?,
    }
    Ok(Flow::Continue)
}

fn setup_screen<R: BufRead, W: Write>(
    c: &mut Console<R, W>,
    session: &mut Session,
    settings: &Settings,
) -> Result<Flow> {
    writeln!(c.out, "Setup Subjects for Prediction")?;
    writeln!(c.out, "Choose input method for student data.")?;
    writeln!(c.out, "[1] Single Student")?;
    writeln!(c.out, "[2] Two Students")?;
    writeln!(c.out, "[3] Upload CSV")?;
    writeln!(c.out, "[4] Sign Out\n")?;
    let choice = c.read_choice()?;
    match choice.as_str() {
        "1" | "2" => {
            let num_students = if choice == "1" { 1 } else { 2 };
            let raw = c.prompt(&format!("Enter number of subjects (1-{})", MAX_SUBJECTS))?;
            let num_subjects = raw.parse::<usize>().map_err(|_| {
                AppError::InvalidShape(format!(
                    "number of subjects must be between 1 and {}",
                    MAX_SUBJECTS
                ))
            })?;
            session.configure_manual(EntryShape::new(num_students, num_subjects)?)?;
            writeln!(c.out)?;
        }
        "3" => {
            let path = c.prompt("CSV file path")?;
            if path.is_empty() {
                return Err(AppError::MissingField("CSV file path"));
            }
            let (records, report) = loader::load_records(&path, &settings.load_options())?;
            writeln!(
                c.out,
                "CSV uploaded successfully! ({} rows loaded)",
                format_int(report.total_rows)
            )?;
            if report.unrecognized_modes > 0 {
                writeln!(
                    c.out,
                    "Note: {} rows have an unrecognized mode and were scored with multiplier 1.",
                    format_int(report.unrecognized_modes)
                )?;
            }
            writeln!(c.out)?;
            session.submit_upload(records)?;
        }
        "4" => {
            session.sign_out();
            writeln!(c.out, "Signed out.\n")?;
        }
        _ => writeln!(c.out, "Invalid choice. Please enter 1, 2, 3 or 4.\n")?,
    }
    Ok(Flow::Continue)
}

fn details_screen<R: BufRead, W: Write>(c: &mut Console<R, W>, session: &mut Session) -> Result<Flow> {
    let shape = session.shape().ok_or_else(|| {
        AppError::InvalidShape("manual entry has not been set up".to_string())
    })?;
    writeln!(c.out, "Enter Subject Details")?;

    let mut grid = EntryGrid::default();
    for student_idx in 0..shape.num_students {
        writeln!(c.out, "\nStudent {}", student_idx + 1)?;
        let name = c.prompt(&format!("Student {} Name", student_idx + 1))?;
        let mut subjects = Vec::with_capacity(shape.num_subjects);
        for subj_idx in 0..shape.num_subjects {
            let subject = c.prompt(&format!("Subject {} Name", subj_idx + 1))?;
            let study_hours = c.prompt_hours()?;
            let mode = c.prompt_mode()?;
            subjects.push(SubjectEntry::new(subject, study_hours, mode));
        }
        grid.students.push(StudentEntry { name, subjects });
    }

    writeln!(c.out)?;
    if c.confirm("Submit")? {
        session.submit_grid(&grid)?;
    } else {
        session.back_to_setup()?;
        writeln!(c.out, "Entries discarded.\n")?;
    }
    Ok(Flow::Continue)
}

/// Result tables and the summary line shown after every prediction.
pub fn print_results<W: Write>(out: &mut W, records: &RecordSet) -> Result<()> {
    writeln!(out, "Predicted Marks & Recommendations\n")?;
    writeln!(out, "Summary Table")?;
    writeln!(out, "{}\n", table_rows(records.records(), PREVIEW_ROWS))?;
    if records.len() > PREVIEW_ROWS {
        writeln!(
            out,
            "({} more rows in the exports)\n",
            format_int(records.len() - PREVIEW_ROWS)
        )?;
    }

    writeln!(out, "Average Marks per Subject")?;
    writeln!(out, "{}\n", table_rows(&average_marks_by_subject(records), usize::MAX))?;
    writeln!(out, "Study Hours Distribution by Mode")?;
    writeln!(out, "{}\n", table_rows(&hours_by_mode(records), usize::MAX))?;
    writeln!(out, "Histogram of Marks")?;
    writeln!(
        out,
        "{}\n",
        table_rows(&marks_histogram(records, HISTOGRAM_BINS), HISTOGRAM_BINS)
    )?;
    writeln!(out, "Study Hours vs Predicted Marks by Mode")?;
    writeln!(
        out,
        "{}\n",
        table_rows(&scatter_summary(&scatter_by_mode(records)), usize::MAX)
    )?;

    let summary = generate_summary(records);
    writeln!(
        out,
        "Summary: {} rows, {} students, {} subjects, average marks {}, total hours {}\n",
        format_int(summary.total_rows),
        format_int(summary.total_students),
        format_int(summary.total_subjects),
        format_number(summary.avg_predicted_marks, 2),
        format_number(summary.total_study_hours, 2)
    )?;
    writeln!(out, "Prediction Complete!\n")?;
    Ok(())
}

fn results_screen<R: BufRead, W: Write>(
    c: &mut Console<R, W>,
    session: &mut Session,
    exporter: &Exporter,
) -> Result<Flow> {
    let records = session.require_records()?.clone();
    print_results(&mut c.out, &records)?;

    loop {
        writeln!(c.out, "Download Data")?;
        writeln!(c.out, "[1] Download Excel")?;
        writeln!(c.out, "[2] Download JSON")?;
        writeln!(c.out, "[3] Download PDF")?;
        writeln!(c.out, "[4] Download CSV")?;
        writeln!(c.out, "[5] Download HTML")?;
        writeln!(c.out, "[6] Save Charts (SVG)")?;
        writeln!(c.out, "[7] Back to Setup")?;
        writeln!(c.out, "[8] Sign Out")?;
        writeln!(c.out, "[9] Exit\n")?;

        let format = match c.read_choice()?.as_str() {
            "1" => ExportFormat::Xlsx,
            "2" => ExportFormat::Json,
            "3" => ExportFormat::Pdf,
            "4" => ExportFormat::Csv,
            "5" => ExportFormat::Html,
            "6" => {
                match exporter.save_charts(&ChartSet::dashboard(&records)) {
                    Ok(paths) => {
                        for p in paths {
                            writeln!(c.out, "Saved {}", p.display())?;
                        }
                        writeln!(c.out)?;
                    }
                    Err(e) => writeln!(c.out, "Error: {}\n", e)?,
                }
                continue;
            }
            "7" => {
                session.back_to_setup()?;
                writeln!(c.out)?;
                return Ok(Flow::Continue);
            }
            "8" => {
                session.sign_out();
                writeln!(c.out, "Signed out.\n")?;
                return Ok(Flow::Continue);
            }
            "9" => return Ok(Flow::Exit),
            _ => {
                writeln!(c.out, "Invalid choice. Please enter 1-9.\n")?;
                continue;
            }
        };

        match exporter.export(&records, format) {
            Ok(path) => {
                info!(%format, "export requested from console");
                writeln!(c.out, "Saved {}\n", path.display())?;
            }
            Err(e) => writeln!(c.out, "Error: {}\n", e)?,
        }
    }
}
