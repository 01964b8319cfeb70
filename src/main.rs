// Entry point.
//
// With `--input` the binary runs once over a CSV: load, print the result
// tables, write every configured export and exit. Without it the
// interactive console walks the sign-in, setup, details and results screens.
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use marx_predict::app::{print_results, run_interactive, Console};
use marx_predict::charts::SvgChartRenderer;
use marx_predict::config::{Cli, Settings};
use marx_predict::export::Exporter;
use marx_predict::loader;
use marx_predict::util::format_int;
use marx_predict::Result;

/// Logs go to stderr so they never mix with tables on stdout.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_batch(input: &Path, settings: &Settings, exporter: &Exporter) -> Result<()> {
    let (records, report) = loader::load_records(input, &settings.load_options())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Processing dataset... ({} rows loaded)",
        format_int(report.total_rows)
    )?;
    if report.unrecognized_modes > 0 {
        writeln!(
            out,
            "Note: {} rows have an unrecognized mode and were scored with multiplier 1.",
            format_int(report.unrecognized_modes)
        )?;
    }
    if !report.ignored_columns.is_empty() {
        writeln!(out, "Info: ignored columns: {}", report.ignored_columns.join(", "))?;
    }
    writeln!(out)?;

    print_results(&mut out, &records)?;

    for format in &settings.formats {
        let path = exporter.export(&records, *format)?;
        writeln!(out, "Saved {}", path.display())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = Settings::resolve(&cli).and_then(|settings| {
        info!(output_dir = %settings.output_dir.display(), formats = ?settings.formats, "settings resolved");
        let exporter = Exporter::new(
            Box::new(SvgChartRenderer::default()),
            settings.report_title.clone(),
            settings.output_dir.clone(),
            settings.file_stem.clone(),
        );
        match &cli.input {
            Some(input) => run_batch(input, &settings, &exporter),
            None => {
                let stdin = io::stdin();
                let stdout = io::stdout();
                let mut console = Console::new(stdin.lock(), stdout.lock());
                run_interactive(&mut console, &settings, &exporter)
            }
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
