//! `aiglist run` / `aiglist validate`: one reconciliation from a config or
//! command-line paths.

use std::path::{Path, PathBuf};

use aiglist_io::{writer, IoError, StagingDir, TabColors};
use aiglist_recon::config::SUMMARY_JSON;
use aiglist_recon::markdown::render_statistics;
use aiglist_recon::{Origin, ReconInput, ReconReport, RunConfig, SourceRoster};
use tracing::{info, warn};

use crate::exit_codes::{EXIT_EXTRACTION, EXIT_MISSING_ROSTER, EXIT_STRICT_ISSUES};
use crate::CliError;

pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub roster: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
    pub docx: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub name: Option<String>,
    pub json: bool,
    pub strict: bool,
    pub quiet: bool,
}

/// Switches shared by `run` and `batch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Also stage `summary.json`.
    pub json: bool,
    /// Unreadable optional sources are fatal instead of skipped.
    pub strict: bool,
}

/// What one committed run produced.
pub struct RunOutcome {
    pub report: ReconReport,
    pub written: Vec<PathBuf>,
    pub json: Option<String>,
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let options = RunOptions { json: args.json, strict: args.strict };
    let outcome = execute(&config, options)?;

    if let Some(json) = &outcome.json {
        println!("{json}");
    }
    if !args.quiet {
        print_summary(&outcome.report, &outcome.written);
    }

    if args.strict {
        let report = &outcome.report;
        if !report.missing.is_empty() || report.has_issues() {
            return Err(CliError::new(
                EXIT_STRICT_ISSUES,
                format!(
                    "--strict: {} student(s) not in class lists, {} row issue(s)",
                    report.missing.len(),
                    report.issues.len()
                ),
            ));
        }
    }
    Ok(())
}

pub fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let optional = |p: &Option<PathBuf>| {
        p.as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string())
    };
    eprintln!(
        "valid: run '{}' roster={} pdf={} docx={} out={}",
        config.name,
        config.inputs.roster.display(),
        optional(&config.inputs.pdf),
        optional(&config.inputs.docx),
        config.output.dir.display(),
    );
    Ok(())
}

/// Read, parse and validate a config file; relative paths resolve against
/// the file's directory.
fn load_config(config_path: &Path) -> Result<RunConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::config(format!("cannot read config {}: {e}", config_path.display()))
    })?;
    let mut config = RunConfig::from_toml(&config_str)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base_dir);
    Ok(config)
}

fn resolve_config(args: &RunArgs) -> Result<RunConfig, CliError> {
    let mut config = match (&args.config, &args.roster) {
        (Some(path), _) => load_config(path)?,
        (None, Some(roster)) => RunConfig::from_paths(roster.clone(), None, None, "output"),
        (None, None) => {
            return Err(CliError::args("no class list workbook given")
                .with_hint("pass --roster <file.xlsx> or --config <aiglist.toml>"))
        }
    };

    if let Some(roster) = &args.roster {
        config.inputs.roster = roster.clone();
    }
    if let Some(pdf) = &args.pdf {
        config.inputs.pdf = Some(pdf.clone());
    }
    if let Some(docx) = &args.docx {
        config.inputs.docx = Some(docx.clone());
    }
    if let Some(out) = &args.out {
        config.output.dir = out.clone();
    }
    if let Some(name) = &args.name {
        config.name = name.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Load inputs, reconcile, and commit every output. Nothing reaches the
/// output directory unless all outputs were staged.
pub fn execute(config: &RunConfig, options: RunOptions) -> Result<RunOutcome, CliError> {
    let roster_path = &config.inputs.roster;
    if !roster_path.is_file() {
        return Err(CliError::new(
            EXIT_MISSING_ROSTER,
            format!("class list workbook not found: {}", roster_path.display()),
        ));
    }
    let (roster, tab_colors) = aiglist_io::load_classroom_roster(roster_path)
        .map_err(|e| CliError::from_io(e, EXIT_MISSING_ROSTER))?;

    let pdf = load_optional(
        config.inputs.pdf.as_deref(),
        Origin::PdfSource,
        options.strict,
        aiglist_io::load_pdf_roster,
    )?;
    let docx = load_optional(
        config.inputs.docx.as_deref(),
        Origin::DocxSource,
        options.strict,
        aiglist_io::load_docx_roster,
    )?;

    let input = ReconInput { roster, pdf, docx };
    let report = aiglist_recon::run(&config.name, &roster_path.display().to_string(), &input)?;

    for issue in &report.issues {
        warn!("skipped {issue}");
    }
    for sheet in &report.skipped_sheets {
        info!(sheet = %sheet, "skipped empty sheet");
    }
    for m in &report.grade_mismatches {
        warn!(
            student = %m.identity,
            sheet = %m.sheet_name,
            class_grade = %m.classroom_grade,
            source_grade = %m.source_grade,
            "grade mismatch"
        );
    }

    let json = if options.json {
        Some(
            serde_json::to_string_pretty(&report)
                .map_err(|e| CliError::output(format!("JSON serialization error: {e}")))?,
        )
    } else {
        None
    };

    let written = write_outputs(config, &report, &tab_colors, json.as_deref())?;
    Ok(RunOutcome { report, written, json })
}

fn load_optional(
    path: Option<&Path>,
    origin: Origin,
    strict: bool,
    load: fn(&Path) -> Result<SourceRoster, IoError>,
) -> Result<SourceRoster, CliError> {
    let Some(path) = path else {
        info!(source = %origin, "no file given, source skipped");
        return Ok(SourceRoster::empty(origin));
    };
    match load(path) {
        Ok(roster) => Ok(roster),
        Err(e) if strict => Err(CliError::from_io(e, EXIT_EXTRACTION)),
        Err(e) => {
            match e.hint() {
                Some(hint) => warn!(source = %origin, "{e}; continuing without it ({hint})"),
                None => warn!(source = %origin, "{e}; continuing without it"),
            }
            Ok(SourceRoster::empty(origin))
        }
    }
}

fn write_outputs(
    config: &RunConfig,
    report: &ReconReport,
    tab_colors: &TabColors,
    json: Option<&str>,
) -> Result<Vec<PathBuf>, CliError> {
    let out = &config.output;
    let staging = StagingDir::new(&out.dir)?;

    writer::write_full_roster(report, tab_colors, &staging.path(&out.full_roster))?;
    writer::write_aig_only(report, tab_colors, &staging.path(&out.aig_only))?;

    let mut stale: Vec<&str> = Vec::new();
    if report.missing.is_empty() {
        stale.push(&out.missing);
    } else {
        writer::write_missing_students(&report.missing, &staging.path(&out.missing))?;
    }

    staging.write(&out.statistics, render_statistics(report, out))?;

    match json {
        Some(json) => {
            staging.write(SUMMARY_JSON, json)?;
        }
        None => stale.push(SUMMARY_JSON),
    }

    let written = staging.commit(&stale)?;
    info!(dir = %out.dir.display(), files = written.len(), "outputs committed");
    Ok(written)
}

fn print_summary(report: &ReconReport, written: &[PathBuf]) {
    let s = &report.summary;
    eprintln!(
        "{}: {} sheet(s), {} students, {} AIG ({} math only, {} reading only, {} both), {} TD-only",
        report.meta.run_name,
        report.sheets.len(),
        s.total_students,
        s.total_aig,
        s.math_only,
        s.reading_only,
        s.both,
        s.td_only,
    );
    eprintln!(
        "sources: {} students named, {} found in class lists ({:.1}%), {} not in class lists",
        s.source_identities, s.found_in_roster, s.found_percent, s.missing,
    );
    if s.invalid_names + s.malformed_rows + s.grade_mismatches + s.skipped_sheets > 0 {
        eprintln!(
            "issues: {} invalid name(s), {} malformed row(s), {} grade mismatch(es), {} empty sheet(s)",
            s.invalid_names, s.malformed_rows, s.grade_mismatches, s.skipped_sheets,
        );
    }
    for path in written {
        eprintln!("wrote {}", path.display());
    }
}
