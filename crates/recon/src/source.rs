//! Source rosters: PDF-origin and document-origin rows → `SourceRecord`s.

use serde::Serialize;

use crate::error::{IssueScope, RowError, RowIssue};
use crate::model::{Origin, SourceRecord};
use crate::name::{normalize, NameFormat};

/// Flag cells that mean "is AIG", case-insensitive, for both subjects and
/// both sources.
pub const AIG_TOKENS: [&str; 4] = ["TD", "AG", "IG", "AIG"];

pub fn is_aig_flag(text: &str) -> bool {
    let text = text.trim();
    AIG_TOKENS.iter().any(|token| text.eq_ignore_ascii_case(token))
}

fn is_td(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("TD")
}

/// At least one cell is `TD` and neither is `AG`/`IG`/`AIG`.
pub fn is_td_only(reading: &str, math: &str) -> bool {
    let strong = |t: &str| is_aig_flag(t) && !is_td(t);
    (is_td(reading) || is_td(math)) && !strong(reading) && !strong(math)
}

// ---------------------------------------------------------------------------
// Row shapes
// ---------------------------------------------------------------------------

/// One row shape per source layout. The trait carries the name strategy so
/// the builder stays format-agnostic.
pub trait SourceRow: Sized {
    const ORIGIN: Origin;
    const NAME_FORMAT: NameFormat;
    const FIELD_COUNT: usize;

    fn from_cells(cells: &[String]) -> Result<Self, RowError>;
    fn name(&self) -> &str;
    fn reading(&self) -> &str;
    fn math(&self) -> &str;

    fn grade(&self) -> Option<&str> {
        None
    }

    fn student_id(&self) -> Option<&str> {
        None
    }
}

/// A row from the PDF roster: `Name Student-Id Grade Reading Math`.
/// `name` may still carry the glued-on student id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PdfRow {
    pub name: String,
    pub student_id: String,
    pub grade: String,
    pub reading: String,
    pub math: String,
}

impl SourceRow for PdfRow {
    const ORIGIN: Origin = Origin::PdfSource;
    const NAME_FORMAT: NameFormat = NameFormat::CommaLastFirst;
    const FIELD_COUNT: usize = 5;

    fn from_cells(cells: &[String]) -> Result<Self, RowError> {
        match cells {
            [name, student_id, grade, reading, math, ..] => Ok(Self {
                name: name.clone(),
                student_id: student_id.clone(),
                grade: grade.clone(),
                reading: reading.clone(),
                math: math.clone(),
            }),
            _ => Err(RowError::MalformedRow {
                expected: Self::FIELD_COUNT,
                found: cells.len(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reading(&self) -> &str {
        &self.reading
    }

    fn math(&self) -> &str {
        &self.math
    }

    fn grade(&self) -> Option<&str> {
        non_blank(&self.grade)
    }

    fn student_id(&self) -> Option<&str> {
        non_blank(&self.student_id)
    }
}

/// A row from the document table: `Name Reading Math`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocxRow {
    pub name: String,
    pub reading: String,
    pub math: String,
}

impl SourceRow for DocxRow {
    const ORIGIN: Origin = Origin::DocxSource;
    const NAME_FORMAT: NameFormat = NameFormat::Auto;
    const FIELD_COUNT: usize = 3;

    fn from_cells(cells: &[String]) -> Result<Self, RowError> {
        match cells {
            [name, reading, math, ..] => Ok(Self {
                name: name.clone(),
                reading: reading.clone(),
                math: math.clone(),
            }),
            _ => Err(RowError::MalformedRow {
                expected: Self::FIELD_COUNT,
                found: cells.len(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn reading(&self) -> &str {
        &self.reading
    }

    fn math(&self) -> &str {
        &self.math
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Records from one source, in input order, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRoster {
    pub origin: Origin,
    pub records: Vec<SourceRecord>,
    pub issues: Vec<RowIssue>,
}

impl SourceRoster {
    /// Roster for an absent optional source.
    pub fn empty(origin: Origin) -> Self {
        Self { origin, records: Vec::new(), issues: Vec::new() }
    }

    /// Build records from typed rows. Rows whose name fails to normalize are
    /// skipped and recorded; no deduplication happens here.
    pub fn build<R: SourceRow>(rows: &[R]) -> Self {
        let mut roster = Self::empty(R::ORIGIN);
        for (row_index, row) in rows.iter().enumerate() {
            roster.push_row(row_index, row);
        }
        roster
    }

    /// Build records from raw cell lists, recording short rows as malformed.
    pub fn build_from_cells<R: SourceRow>(rows: &[Vec<String>]) -> Self {
        let mut roster = Self::empty(R::ORIGIN);
        for (row_index, cells) in rows.iter().enumerate() {
            match R::from_cells(cells) {
                Ok(row) => roster.push_row(row_index, &row),
                Err(error) => roster.issues.push(RowIssue::new(scope(R::ORIGIN), row_index, error)),
            }
        }
        roster
    }

    pub fn from_pdf_rows(rows: &[PdfRow]) -> Self {
        Self::build(rows)
    }

    pub fn from_docx_rows(rows: &[DocxRow]) -> Self {
        Self::build(rows)
    }

    fn push_row<R: SourceRow>(&mut self, row_index: usize, row: &R) {
        match normalize(row.name(), R::NAME_FORMAT) {
            Ok(identity) => self.records.push(SourceRecord {
                identity,
                aig_math: is_aig_flag(row.math()),
                aig_reading: is_aig_flag(row.reading()),
                origin: R::ORIGIN,
                grade: row.grade().map(str::to_string),
                student_id: row.student_id().map(str::to_string),
                td_only: is_td_only(row.reading(), row.math()),
            }),
            Err(error) => self.issues.push(RowIssue::new(scope(R::ORIGIN), row_index, error)),
        }
    }
}

fn scope(origin: Origin) -> IssueScope {
    match origin {
        Origin::PdfSource => IssueScope::Pdf,
        Origin::DocxSource => IssueScope::Docx,
    }
}
