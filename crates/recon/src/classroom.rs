//! Canonical classroom roster: one spreadsheet sheet per classroom.
//!
//! Sheet layout:
//! - row 0: free-text classroom header (grade / track / teacher)
//! - row 1: heading row, never data
//! - rows 2..: `LASTNAME`, `FIRSTNAME`, then columns the engine ignores

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{IssueScope, RowError, RowIssue};
use crate::model::{ClassroomRecord, IdentityKey};

/// First row index that can hold a student.
pub const FIRST_DATA_ROW: usize = 2;

static GRADE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:st|nd|rd|th)?\s*grade|grade\s*(\d+)").expect("grade pattern")
});
static TRACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bt(\d+)\b|track\s*(\d+)").expect("track pattern")
});
static TEACHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("teacher pattern"));

/// Metadata parsed out of a sheet's header text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassroomInfo {
    /// Digits only, leading zeros stripped.
    pub grade: Option<String>,
    pub track: Option<String>,
    /// First word of the header, or the sheet name.
    pub teacher: String,
}

impl ClassroomInfo {
    pub fn parse(header: &str, sheet_name: &str) -> Self {
        let grade = first_capture(&GRADE_RE, header).map(|g| strip_leading_zeros(&g));
        let track = first_capture(&TRACK_RE, header);
        let teacher = TEACHER_RE
            .find(header)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| sheet_name.to_string());
        Self { grade, track, teacher }
    }
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    caps.iter()
        .skip(1)
        .flatten()
        .next()
        .map(|m| m.as_str().to_string())
}

pub(crate) fn strip_leading_zeros(digits: &str) -> String {
    let trimmed = digits.trim().trim_start_matches('0');
    if trimmed.is_empty() && !digits.trim().is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// One classroom sheet after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassroomSheet {
    pub sheet_name: String,
    /// Row-0 cells joined with single spaces, blanks dropped.
    pub classroom_label: String,
    /// Row-0 cells as read, for rendering.
    pub header_cells: Vec<String>,
    pub info: ClassroomInfo,
    pub records: Vec<ClassroomRecord>,
}

/// All classroom sheets in workbook order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassroomRoster {
    pub sheets: Vec<ClassroomSheet>,
    pub issues: Vec<RowIssue>,
    /// Sheets with no content at all.
    pub skipped_sheets: Vec<String>,
}

impl ClassroomRoster {
    /// Load every `(sheet_name, rows)` pair. Sheets keep their order.
    pub fn load<'a, I>(sheets: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [Vec<String>])>,
    {
        let mut roster = Self::default();
        for (sheet_name, rows) in sheets {
            match load_sheet(sheet_name, rows, &mut roster.issues) {
                Some(sheet) => roster.sheets.push(sheet),
                None => roster.skipped_sheets.push(sheet_name.to_string()),
            }
        }
        roster
    }

    pub fn records(&self) -> impl Iterator<Item = &ClassroomRecord> {
        self.sheets.iter().flat_map(|s| s.records.iter())
    }

    pub fn student_count(&self) -> usize {
        self.sheets.iter().map(|s| s.records.len()).sum()
    }
}

/// Load one sheet. Returns `None` when the sheet has no non-blank cell.
pub fn load_sheet(
    sheet_name: &str,
    rows: &[Vec<String>],
    issues: &mut Vec<RowIssue>,
) -> Option<ClassroomSheet> {
    let has_content = rows.iter().flatten().any(|cell| !cell.trim().is_empty());
    if !has_content {
        return None;
    }

    let header_cells = rows.first().cloned().unwrap_or_default();
    let classroom_label = header_cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let info = ClassroomInfo::parse(&classroom_label, sheet_name);

    let mut records = Vec::new();
    for (row_index, row) in rows.iter().enumerate().skip(FIRST_DATA_ROW) {
        let last = row.first().map(|c| c.trim()).unwrap_or("");
        let first = row.get(1).map(|c| c.trim()).unwrap_or("");

        // Padding row.
        if last.is_empty() && first.is_empty() {
            continue;
        }
        if row.len() < 2 {
            issues.push(RowIssue::new(
                IssueScope::Sheet(sheet_name.to_string()),
                row_index,
                RowError::MalformedRow { expected: 2, found: row.len() },
            ));
            continue;
        }
        // Repeated heading.
        if last.eq_ignore_ascii_case("LASTNAME") || last.eq_ignore_ascii_case("LAST") {
            continue;
        }

        match IdentityKey::from_parts(last, first) {
            Ok(identity) => records.push(ClassroomRecord {
                identity,
                classroom_label: classroom_label.clone(),
                sheet_name: sheet_name.to_string(),
                row_index,
                last_display: last.to_string(),
                first_display: first.to_string(),
            }),
            Err(error) => issues.push(RowIssue::new(
                IssueScope::Sheet(sheet_name.to_string()),
                row_index,
                error,
            )),
        }
    }

    Some(ClassroomSheet {
        sheet_name: sheet_name.to_string(),
        classroom_label,
        header_cells,
        info,
        records,
    })
}
