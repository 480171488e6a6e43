use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::classroom::ClassroomRoster;
use crate::source::SourceRoster;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Normalized `(last, first)` pair. Two names are the same person iff their
/// keys are equal. Built only through `crate::name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IdentityKey {
    pub last: String,
    pub first: String,
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.last, self.first)
    }
}

/// Which non-canonical roster a source record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    PdfSource,
    DocxSource,
}

impl Origin {
    /// Human label used in the missing-students report.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PdfSource => "PDF",
            Self::DocxSource => "Word Document",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PdfSource => write!(f, "pdf_source"),
            Self::DocxSource => write!(f, "docx_source"),
        }
    }
}

// ---------------------------------------------------------------------------
// Flags + category
// ---------------------------------------------------------------------------

/// Per-identity AIG status. Combined with logical OR, so merging is
/// associative, commutative and idempotent with `NONE` as identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct AigFlags {
    pub math: bool,
    pub reading: bool,
}

impl AigFlags {
    pub const NONE: Self = Self { math: false, reading: false };

    pub fn new(math: bool, reading: bool) -> Self {
        Self { math, reading }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            math: self.math || other.math,
            reading: self.reading || other.reading,
        }
    }

    pub fn any(&self) -> bool {
        self.math || self.reading
    }
}

impl FromIterator<AigFlags> for AigFlags {
    fn from_iter<I: IntoIterator<Item = AigFlags>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::merge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    None,
    MathOnly,
    ReadingOnly,
    Both,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "NONE"),
            Self::MathOnly => write!(f, "MATH_ONLY"),
            Self::ReadingOnly => write!(f, "READING_ONLY"),
            Self::Both => write!(f, "BOTH"),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One parsed row from the PDF-origin or document-origin roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    pub identity: IdentityKey,
    pub aig_math: bool,
    pub aig_reading: bool,
    pub origin: Origin,
    /// PDF-origin only.
    pub grade: Option<String>,
    /// PDF-origin only. Reported, never matched on.
    pub student_id: Option<String>,
    /// Flagged only through `TD`, never `AG`/`IG`/`AIG`.
    pub td_only: bool,
}

impl SourceRecord {
    pub fn flags(&self) -> AigFlags {
        AigFlags::new(self.aig_math, self.aig_reading)
    }
}

/// One student row from the canonical classroom roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassroomRecord {
    pub identity: IdentityKey,
    /// Header text of the sheet, verbatim.
    pub classroom_label: String,
    pub sheet_name: String,
    /// 0-based raw row index within the sheet.
    pub row_index: usize,
    /// Trimmed cell text as it appeared, for rendering.
    pub last_display: String,
    pub first_display: String,
}

/// A classroom record with its merged AIG status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledRecord {
    #[serde(flatten)]
    pub classroom: ClassroomRecord,
    pub aig_math: bool,
    pub aig_reading: bool,
    pub category: Category,
    /// Every matching source row was TD-only.
    pub td_only: bool,
}

impl ReconciledRecord {
    pub fn flags(&self) -> AigFlags {
        AigFlags::new(self.aig_math, self.aig_reading)
    }

    pub fn is_aig(&self) -> bool {
        self.category != Category::None
    }
}

/// A source identity absent from the canonical roster, deduplicated across
/// every source row that names it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedStudent {
    pub identity: IdentityKey,
    pub origins: BTreeSet<Origin>,
    pub aig_math: bool,
    pub aig_reading: bool,
    pub category: Category,
    pub student_id: Option<String>,
    pub grade: Option<String>,
    pub source_rows: usize,
}

impl UnmatchedStudent {
    /// Smallest origin observed; PDF sorts before DOCX.
    pub fn primary_origin(&self) -> Origin {
        self.origins.iter().next().copied().unwrap_or(Origin::PdfSource)
    }

    /// `"PDF"`, `"Word Document"`, or both joined with `" + "`.
    pub fn source_label(&self) -> String {
        self.origins
            .iter()
            .map(|o| o.label())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Grade listed in the PDF roster disagrees with the sheet's header grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeMismatch {
    pub identity: IdentityKey,
    pub sheet_name: String,
    pub classroom_grade: String,
    pub source_grade: String,
}

// ---------------------------------------------------------------------------
// Input + meta
// ---------------------------------------------------------------------------

/// Fully materialized inputs for one run.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub roster: ClassroomRoster,
    pub pdf: SourceRoster,
    pub docx: SourceRoster,
}

impl ReconInput {
    /// Source records from both origins, PDF first.
    pub fn source_records(&self) -> Vec<SourceRecord> {
        self.pdf
            .records
            .iter()
            .chain(self.docx.records.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub run_name: String,
    pub engine_version: String,
    pub run_at: String,
}
