//! AIG roster PDF → `PdfRow`s.
//!
//! Text comes from `pdftotext -layout`, so each student sits on one line:
//!
//! ```text
//! Name                 Student Id   Grade   Reading   Math
//! Doe, Jane007                      05      TD        IG
//! ```
//!
//! The student id is usually glued to the first name. Blank status cells
//! collapse under whitespace splitting, so a lone status token is placed by
//! the header's column offsets.

use std::path::Path;
use std::process::Command;

use aiglist_recon::PdfRow;
use tracing::debug;

use crate::error::IoError;

/// Extract every student row from a roster PDF.
pub fn extract_rows(path: &Path) -> Result<Vec<PdfRow>, IoError> {
    let text = run_pdftotext(path)?;
    let rows = parse_roster_text(&text);
    debug!(path = %path.display(), rows = rows.len(), "parsed pdf roster");
    Ok(rows)
}

/// Run `pdftotext -layout <file> -` and capture stdout.
pub fn run_pdftotext(path: &Path) -> Result<String, IoError> {
    which::which("pdftotext").map_err(|_| IoError::ToolMissing { tool: "pdftotext" })?;

    let file_str = path
        .to_str()
        .ok_or_else(|| IoError::open(path, "path is not valid UTF-8"))?;

    let output = Command::new("pdftotext")
        .args(["-layout", file_str, "-"])
        .output()
        .map_err(|e| IoError::extraction(path, format!("failed to run pdftotext: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IoError::extraction(
            path,
            format!(
                "pdftotext failed (exit {}): {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout).to_string();
    if text.trim().is_empty() {
        return Err(IoError::extraction(
            path,
            "PDF appears scanned/image-only, no text extracted",
        ));
    }
    Ok(text)
}

/// Byte offsets of the `Reading` and `Math` headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StatusColumns {
    reading: usize,
    math: usize,
}

impl StatusColumns {
    fn from_header(line: &str) -> Option<Self> {
        Some(Self {
            reading: line.find("Reading")?,
            math: line.find("Math")?,
        })
    }

    fn is_math(&self, offset: usize) -> bool {
        offset.abs_diff(self.math) < offset.abs_diff(self.reading)
    }
}

fn is_header(line: &str) -> bool {
    let compact = line.split_whitespace().collect::<Vec<_>>().join(" ");
    compact.contains("Name Student Id Grade Reading Math") || compact.contains("School Roster")
}

/// Split `pdftotext` output into rows. A student line has a comma, then a
/// first name, then a digit run (the student id) followed by a grade token.
/// Every other line (letterhead, addresses, print dates) is dropped.
pub fn parse_roster_text(text: &str) -> Vec<PdfRow> {
    let mut columns: Option<StatusColumns> = None;
    let mut rows = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if is_header(line) {
            if let Some(found) = StatusColumns::from_header(line) {
                columns = Some(found);
            }
            continue;
        }
        match parse_line(line, columns) {
            Some(row) => rows.push(row),
            None => debug!(line = line.trim(), "not a student line"),
        }
    }

    rows
}

/// Grades print as `K`, `KG` or a one- or two-digit number.
fn is_grade_token(token: &str) -> bool {
    let digits = !token.is_empty() && token.len() <= 2 && token.bytes().all(|b| b.is_ascii_digit());
    digits || token.eq_ignore_ascii_case("K") || token.eq_ignore_ascii_case("KG")
}

fn parse_line(line: &str, columns: Option<StatusColumns>) -> Option<PdfRow> {
    let comma = line.find(',')?;
    let id_start = line[comma..].find(|c: char| c.is_ascii_digit()).map(|i| comma + i)?;
    if line[comma + 1..id_start].trim().is_empty() {
        return None;
    }
    let id_end = line[id_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(line.len(), |i| id_start + i);

    let mut tokens = tokens_with_offsets(line, id_end);
    if !tokens.first().is_some_and(|(_, grade)| is_grade_token(grade)) {
        return None;
    }
    let grade = tokens.remove(0).1.to_string();

    let (reading, math) = match tokens.as_slice() {
        [] => (String::new(), String::new()),
        [(offset, only)] => {
            let is_math = columns.map_or(true, |c| c.is_math(*offset));
            if is_math {
                (String::new(), only.to_string())
            } else {
                (only.to_string(), String::new())
            }
        }
        [(_, reading), (_, math), ..] => (reading.to_string(), math.to_string()),
    };

    Some(PdfRow {
        name: line[..id_end].trim().to_string(),
        student_id: line[id_start..id_end].to_string(),
        grade,
        reading,
        math,
    })
}

/// Whitespace-separated tokens after `start`, with their byte offsets.
fn tokens_with_offsets(line: &str, start: usize) -> Vec<(usize, &str)> {
    let mut tokens = Vec::new();
    let mut token_start = None;
    for (i, c) in line[start..].char_indices() {
        let at = start + i;
        match (c.is_whitespace(), token_start) {
            (false, None) => token_start = Some(at),
            (true, Some(s)) => {
                tokens.push((s, &line[s..at]));
                token_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = token_start {
        tokens.push((s, &line[s..]));
    }
    tokens
}
