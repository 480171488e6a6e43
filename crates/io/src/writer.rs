//! Output workbooks: full roster, AIG-only roster, missing students.

use std::collections::HashMap;
use std::path::Path;

use aiglist_recon::{Category, ReconReport, ReconciledRecord, SheetReport, UnmatchedStudent};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::error::IoError;

pub const ROSTER_HEADINGS: [&str; 5] = ["LASTNAME", "FIRSTNAME", "AIG Math", "AIG Reading", "AIG Status"];
pub const MISSING_SHEET: &str = "Students Not In Roster";
pub const MISSING_HEADINGS: [&str; 7] = [
    "Student Name",
    "Source",
    "Student ID",
    "Grade",
    "AIG Math",
    "AIG Reading",
    "AIG Status",
];
const MAX_COLUMN_WIDTH: usize = 50;

/// Sheet name → `0xRRGGBB` tab color of the input workbook.
///
/// Only explicit `rgb` tab colors are carried over. Tabs colored by theme
/// or by legacy palette index come out uncolored, since resolving them
/// needs the source workbook's theme part.
pub type TabColors = HashMap<String, u32>;

/// Every classroom sheet with AIG columns and category fills.
pub fn write_full_roster(report: &ReconReport, tab_colors: &TabColors, path: &Path) -> Result<(), IoError> {
    write_rosters(report, tab_colors, path, |_| true)
}

/// Same layout as the full roster, `None` rows left out.
pub fn write_aig_only(report: &ReconReport, tab_colors: &TabColors, path: &Path) -> Result<(), IoError> {
    write_rosters(report, tab_colors, path, ReconciledRecord::is_aig)
}

fn write_rosters(
    report: &ReconReport,
    tab_colors: &TabColors,
    path: &Path,
    keep: impl Fn(&ReconciledRecord) -> bool,
) -> Result<(), IoError> {
    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let records: Vec<&ReconciledRecord> = sheet.records.iter().filter(|r| keep(r)).collect();
        write_roster_sheet(&mut workbook, sheet, &records, tab_colors.get(&sheet.sheet_name).copied())
            .map_err(|e| IoError::output(path, format!("sheet '{}': {e}", sheet.sheet_name)))?;
    }
    workbook.save(path).map_err(|e| IoError::output(path, e))?;
    debug!(path = %path.display(), sheets = report.sheets.len(), "wrote roster workbook");
    Ok(())
}

fn write_roster_sheet(
    workbook: &mut Workbook,
    sheet: &SheetReport,
    records: &[&ReconciledRecord],
    tab_color: Option<u32>,
) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet().set_name(&sheet.sheet_name)?;
    if let Some(rgb) = tab_color {
        worksheet.set_tab_color(Color::RGB(rgb));
    }
    let mut widths = ColumnWidths::default();

    for (col, text) in sheet.header_cells.iter().enumerate() {
        if !text.is_empty() {
            worksheet.write_string(0, col as u16, text)?;
            widths.observe(col, text);
        }
    }
    write_headings(worksheet, 1, &ROSTER_HEADINGS, &mut widths)?;

    for (i, record) in records.iter().enumerate() {
        let row = 2 + i as u32;
        let format = fill_for(record.category);
        let c = &record.classroom;
        worksheet.write_string_with_format(row, 0, &c.last_display, &format)?;
        worksheet.write_string_with_format(row, 1, &c.first_display, &format)?;
        worksheet.write_boolean_with_format(row, 2, record.aig_math, &format)?;
        worksheet.write_boolean_with_format(row, 3, record.aig_reading, &format)?;
        worksheet.write_string_with_format(row, 4, record.category.status_text(), &format)?;
        widths.observe(0, &c.last_display);
        widths.observe(1, &c.first_display);
        widths.observe_bool(2, record.aig_math);
        widths.observe_bool(3, record.aig_reading);
        widths.observe(4, record.category.status_text());
    }

    widths.apply(worksheet)
}

/// One sheet listing the source students the roster never names.
pub fn write_missing_students(missing: &[UnmatchedStudent], path: &Path) -> Result<(), IoError> {
    let mut workbook = Workbook::new();
    write_missing_sheet(&mut workbook, missing).map_err(|e| IoError::output(path, e))?;
    workbook.save(path).map_err(|e| IoError::output(path, e))?;
    debug!(path = %path.display(), students = missing.len(), "wrote missing-students workbook");
    Ok(())
}

fn write_missing_sheet(workbook: &mut Workbook, missing: &[UnmatchedStudent]) -> Result<(), XlsxError> {
    let worksheet = workbook.add_worksheet().set_name(MISSING_SHEET)?;
    let mut widths = ColumnWidths::default();
    write_headings(worksheet, 0, &MISSING_HEADINGS, &mut widths)?;

    for (i, student) in missing.iter().enumerate() {
        let row = 1 + i as u32;
        let format = fill_for(student.category);
        let texts = [
            student.identity.to_string(),
            student.source_label(),
            student.student_id.clone().unwrap_or_else(|| "N/A".into()),
            student.grade.clone().unwrap_or_else(|| "N/A".into()),
        ];
        for (col, text) in texts.iter().enumerate() {
            worksheet.write_string_with_format(row, col as u16, text, &format)?;
            widths.observe(col, text);
        }
        worksheet.write_boolean_with_format(row, 4, student.aig_math, &format)?;
        worksheet.write_boolean_with_format(row, 5, student.aig_reading, &format)?;
        worksheet.write_string_with_format(row, 6, student.category.status_text(), &format)?;
        widths.observe_bool(4, student.aig_math);
        widths.observe_bool(5, student.aig_reading);
        widths.observe(6, student.category.status_text());
    }

    widths.apply(worksheet)
}

fn write_headings(
    worksheet: &mut Worksheet,
    row: u32,
    headings: &[&str],
    widths: &mut ColumnWidths,
) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, heading) in headings.iter().enumerate() {
        worksheet.write_string_with_format(row, col as u16, *heading, &bold)?;
        widths.observe(col, heading);
    }
    Ok(())
}

fn fill_for(category: Category) -> Format {
    match category.fill_rgb() {
        Some(rgb) => Format::new().set_background_color(Color::RGB(rgb)),
        None => Format::new(),
    }
}

/// Longest text per column; written as `min(len + 2, 50)`.
#[derive(Debug, Default)]
struct ColumnWidths {
    max_len: Vec<usize>,
}

impl ColumnWidths {
    fn observe(&mut self, col: usize, text: &str) {
        if self.max_len.len() <= col {
            self.max_len.resize(col + 1, 0);
        }
        self.max_len[col] = self.max_len[col].max(text.chars().count());
    }

    fn observe_bool(&mut self, col: usize, value: bool) {
        self.observe(col, if value { "TRUE" } else { "FALSE" });
    }

    fn width(&self, col: usize) -> Option<usize> {
        self.max_len
            .get(col)
            .filter(|len| **len > 0)
            .map(|len| (len + 2).min(MAX_COLUMN_WIDTH))
    }

    fn apply(&self, worksheet: &mut Worksheet) -> Result<(), XlsxError> {
        for col in 0..self.max_len.len() {
            if let Some(width) = self.width(col) {
                worksheet.set_column_width(col as u16, width as f64)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::read_sheets;
    use aiglist_recon::{run, ClassroomRoster, DocxRow, Origin, PdfRow, ReconInput, SourceRoster};

    fn report() -> ReconReport {
        let rows: Vec<Vec<String>> = vec![
            vec!["Heinze 4th Grade".into(), "T2".into()],
            vec!["LASTNAME".into(), "FIRSTNAME".into()],
            vec!["Lee".into(), "Amy".into()],
            vec!["Ng".into(), "Tom".into()],
        ];
        let input = ReconInput {
            roster: ClassroomRoster::load(vec![("Heinze", rows.as_slice())]),
            pdf: SourceRoster::from_pdf_rows(&[PdfRow {
                name: "Lee, Amy200".into(),
                student_id: "200".into(),
                grade: "04".into(),
                reading: "".into(),
                math: "AG".into(),
            }]),
            docx: SourceRoster::from_docx_rows(&[DocxRow {
                name: "Park, Sam".into(),
                reading: "TD".into(),
                math: "".into(),
            }]),
        };
        run("writer", "class_lists.xlsx", &input).unwrap()
    }

    #[test]
    fn full_roster_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updated_class_lists.xlsx");
        let colors = TabColors::from([("Heinze".to_string(), 0xFF0000)]);
        write_full_roster(&report(), &colors, &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        let sheet = &sheets[0];
        assert_eq!(sheet.tab_color, Some(0xFF0000));
        assert_eq!(sheet.rows[0][..2], ["Heinze 4th Grade", "T2"]);
        assert_eq!(sheet.rows[1], ROSTER_HEADINGS);
        assert_eq!(sheet.rows[2], ["Lee", "Amy", "TRUE", "FALSE", "Math Only"]);
        assert_eq!(sheet.rows[3], ["Ng", "Tom", "FALSE", "FALSE", "None"]);
    }

    #[test]
    fn aig_only_drops_none_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aig_only.xlsx");
        write_aig_only(&report(), &TabColors::new(), &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets[0].rows.len(), 3);
        assert_eq!(sheets[0].rows[2][0], "Lee");
        assert_eq!(sheets[0].tab_color, None);
    }

    #[test]
    fn missing_students_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.xlsx");
        let report = report();
        assert_eq!(report.missing[0].origins.iter().next(), Some(&Origin::DocxSource));
        write_missing_students(&report.missing, &path).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets[0].name, MISSING_SHEET);
        assert_eq!(sheets[0].rows[0], MISSING_HEADINGS);
        assert_eq!(
            sheets[0].rows[1],
            ["PARK, SAM", "Word Document", "N/A", "N/A", "FALSE", "TRUE", "Reading Only"]
        );
    }

    #[test]
    fn column_widths_are_capped() {
        let mut widths = ColumnWidths::default();
        widths.observe(0, "Lee");
        widths.observe(2, &"x".repeat(80));
        assert_eq!(widths.width(0), Some(5));
        assert_eq!(widths.width(1), None);
        assert_eq!(widths.width(2), Some(50));
    }
}
