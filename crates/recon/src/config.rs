use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const DEFAULT_FULL_ROSTER: &str = "updated_class_lists.xlsx";
pub const DEFAULT_AIG_ONLY: &str = "updated_class_lists_AIG_Only.xlsx";
pub const DEFAULT_MISSING: &str = "students_not_in_roster.xlsx";
pub const DEFAULT_STATISTICS: &str = "aig_statistics_report.md";
pub const SUMMARY_JSON: &str = "summary.json";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub inputs: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_name() -> String {
    "aiglist".to_string()
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input locations. The classroom workbook is required; either source
/// roster may be absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub roster: PathBuf,
    #[serde(default)]
    pub pdf: Option<PathBuf>,
    #[serde(default)]
    pub docx: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_full_roster")]
    pub full_roster: String,
    #[serde(default = "default_aig_only")]
    pub aig_only: String,
    #[serde(default = "default_missing")]
    pub missing: String,
    #[serde(default = "default_statistics")]
    pub statistics: String,
}

fn default_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_full_roster() -> String {
    DEFAULT_FULL_ROSTER.to_string()
}

fn default_aig_only() -> String {
    DEFAULT_AIG_ONLY.to_string()
}

fn default_missing() -> String {
    DEFAULT_MISSING.to_string()
}

fn default_statistics() -> String {
    DEFAULT_STATISTICS.to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            full_roster: default_full_roster(),
            aig_only: default_aig_only(),
            missing: default_missing(),
            statistics: default_statistics(),
        }
    }
}

impl OutputConfig {
    /// Output file names in write order.
    pub fn file_names(&self) -> [&str; 4] {
        [
            &self.full_roster,
            &self.aig_only,
            &self.missing,
            &self.statistics,
        ]
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl RunConfig {
    /// Config built from command-line paths with default output names.
    pub fn from_paths(
        roster: impl Into<PathBuf>,
        pdf: Option<PathBuf>,
        docx: Option<PathBuf>,
        dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: default_name(),
            inputs: InputConfig {
                roster: roster.into(),
                pdf,
                docx,
            },
            output: OutputConfig {
                dir: dir.into(),
                ..OutputConfig::default()
            },
        }
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.inputs.roster.as_os_str().is_empty() {
            return Err(ReconError::ConfigValidation(
                "inputs.roster must not be empty".into(),
            ));
        }

        let names = self.output.file_names();
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "output file names must not be empty".into(),
                ));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(ReconError::ConfigValidation(format!(
                    "output file '{name}' must be a bare file name"
                )));
            }
            if names[..i].contains(name) || *name == SUMMARY_JSON {
                return Err(ReconError::ConfigValidation(format!(
                    "output file '{name}' is used twice"
                )));
            }
        }

        Ok(())
    }

    /// Resolve relative paths against `base` (the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.inputs.roster);
        if let Some(pdf) = self.inputs.pdf.as_mut() {
            resolve(pdf);
        }
        if let Some(docx) = self.inputs.docx.as_mut() {
            resolve(docx);
        }
        resolve(&mut self.output.dir);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
