//! `aiglist-io`: file adapters around the reconciliation engine.
//!
//! Reads the roster PDF (via `pdftotext`), Word tables and the classroom
//! workbook; writes the output workbooks through a staging directory.

pub mod docx;
pub mod error;
pub mod pdf;
pub mod workbook;
pub mod workdir;
pub mod writer;

use std::path::Path;

use aiglist_recon::{ClassroomRoster, DocxRow, PdfRow, SourceRoster};
use tracing::info;

pub use error::IoError;
pub use workbook::RawSheet;
pub use workdir::StagingDir;
pub use writer::TabColors;

/// Load the classroom workbook into a roster plus its tab colors.
pub fn load_classroom_roster(path: &Path) -> Result<(ClassroomRoster, TabColors), IoError> {
    let sheets = workbook::read_sheets(path)?;
    let roster = ClassroomRoster::load(sheets.iter().map(|s| (s.name.as_str(), s.rows.as_slice())));
    let tab_colors = sheets
        .iter()
        .filter_map(|s| s.tab_color.map(|c| (s.name.clone(), c)))
        .collect();
    info!(
        path = %path.display(),
        sheets = roster.sheets.len(),
        students = roster.student_count(),
        "loaded class lists"
    );
    Ok((roster, tab_colors))
}

/// Load the roster PDF into source records.
pub fn load_pdf_roster(path: &Path) -> Result<SourceRoster, IoError> {
    let rows: Vec<PdfRow> = pdf::extract_rows(path)?;
    let roster = SourceRoster::from_pdf_rows(&rows);
    info!(path = %path.display(), records = roster.records.len(), "loaded pdf roster");
    Ok(roster)
}

/// Load the Word document's tables into source records.
pub fn load_docx_roster(path: &Path) -> Result<SourceRoster, IoError> {
    let mut rows = docx::extract_table_rows(path)?;
    rows.retain(|cells| cells.iter().any(|c| !c.trim().is_empty()));
    let roster = SourceRoster::build_from_cells::<DocxRow>(&rows);
    info!(path = %path.display(), records = roster.records.len(), "loaded docx roster");
    Ok(roster)
}
