//! `aiglist batch`: reconcile every PDF × workbook pairing in a directory.

use std::path::{Path, PathBuf};

use aiglist_recon::RunConfig;
use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::exit_codes::EXIT_BATCH_FAILED;
use crate::run::{execute, RunOptions};
use crate::CliError;

/// Input files found in a batch directory, each list sorted by path.
#[derive(Debug, Default, PartialEq)]
pub struct BatchInputs {
    pub pdfs: Vec<PathBuf>,
    pub workbooks: Vec<PathBuf>,
    pub docx: Vec<PathBuf>,
}

impl BatchInputs {
    /// Scan `dir` (not recursively). Office lock files (`~$…`) are ignored.
    pub fn discover(dir: &Path) -> Result<Self, CliError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CliError::args(format!("cannot read input directory {}: {e}", dir.display()))
        })?;

        let pattern = |p: &str| Pattern::new(p).map_err(|e| CliError::args(e.to_string()));
        let (pdf, xlsx, docx) = (pattern("*.pdf")?, pattern("*.xlsx")?, pattern("*.docx")?);
        let options = MatchOptions { case_sensitive: false, ..MatchOptions::new() };

        let mut inputs = Self::default();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with("~$") {
                debug!(file = name, "skipping lock file");
                continue;
            }
            if pdf.matches_with(name, options) {
                inputs.pdfs.push(path);
            } else if xlsx.matches_with(name, options) {
                inputs.workbooks.push(path);
            } else if docx.matches_with(name, options) {
                inputs.docx.push(path);
            }
        }
        inputs.pdfs.sort();
        inputs.workbooks.sort();
        inputs.docx.sort();
        Ok(inputs)
    }
}

/// Output folder for one pairing: `batch_<pdf stem>_<workbook stem>`.
pub fn combination_dir(out: &Path, pdf: &Path, workbook: &Path) -> PathBuf {
    let stem = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().replace(' ', "_"))
            .unwrap_or_default()
    };
    out.join(format!("batch_{}_{}", stem(pdf), stem(workbook)))
}

pub fn cmd_batch(dir: &Path, out: &Path, strict: bool, quiet: bool) -> Result<(), CliError> {
    let inputs = BatchInputs::discover(dir)?;
    if inputs.pdfs.is_empty() || inputs.workbooks.is_empty() {
        return Err(CliError::args(format!(
            "{} needs at least one .pdf and one .xlsx ({} pdf, {} xlsx found)",
            dir.display(),
            inputs.pdfs.len(),
            inputs.workbooks.len()
        )));
    }
    let docx = inputs.docx.first();
    if inputs.docx.len() > 1 && !quiet {
        eprintln!(
            "note: {} Word files found, using {}",
            inputs.docx.len(),
            inputs.docx[0].display()
        );
    }

    let total = inputs.pdfs.len() * inputs.workbooks.len();
    let options = RunOptions { json: false, strict };
    let mut failed = 0usize;

    for pdf in &inputs.pdfs {
        for workbook in &inputs.workbooks {
            let out_dir = combination_dir(out, pdf, workbook);
            let mut config =
                RunConfig::from_paths(workbook.clone(), Some(pdf.clone()), docx.cloned(), &out_dir);
            if let Some(name) = out_dir.file_name() {
                config.name = name.to_string_lossy().into_owned();
            }

            match execute(&config, options) {
                Ok(outcome) => {
                    if !quiet {
                        let s = &outcome.report.summary;
                        eprintln!(
                            "ok    {}: {} students, {} AIG, {} not in class lists",
                            out_dir.display(),
                            s.total_students,
                            s.total_aig,
                            s.missing
                        );
                    }
                }
                Err(e) => {
                    failed += 1;
                    debug!(pdf = %pdf.display(), workbook = %workbook.display(), code = e.code, "combination failed");
                    eprintln!("FAIL  {}: {}", out_dir.display(), e.message);
                }
            }
        }
    }

    if !quiet {
        eprintln!("batch: {} of {total} combination(s) succeeded", total - failed);
    }
    if failed > 0 {
        return Err(CliError::new(
            EXIT_BATCH_FAILED,
            format!("{failed} of {total} combination(s) failed"),
        ));
    }
    Ok(())
}
