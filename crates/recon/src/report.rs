//! Report views layered on top of a reconciliation: full roster, AIG-only
//! roster, missing-students set, and summary counters.

use serde::Serialize;

use crate::classroom::ClassroomInfo;
use crate::engine::Reconciliation;
use crate::error::RowIssue;
use crate::evidence::compute_summary;
use crate::model::{GradeMismatch, ReconMeta, ReconciledRecord, UnmatchedStudent};

/// One classroom sheet's reconciled rows.
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub sheet_name: String,
    pub classroom_label: String,
    pub header_cells: Vec<String>,
    pub info: ClassroomInfo,
    pub records: Vec<ReconciledRecord>,
}

impl SheetReport {
    /// Rows with `category != None`, row order kept.
    pub fn aig_only(&self) -> impl Iterator<Item = &ReconciledRecord> {
        self.records.iter().filter(|r| r.is_aig())
    }
}

/// Counters consumed by the summary renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_students: usize,
    pub math_only: usize,
    pub reading_only: usize,
    pub both: usize,
    pub none: usize,
    pub total_aig: usize,
    pub td_only: usize,
    pub source_identities: usize,
    pub found_in_roster: usize,
    pub missing: usize,
    pub invalid_names: usize,
    pub malformed_rows: usize,
    pub grade_mismatches: usize,
    pub skipped_sheets: usize,
    pub aig_percent: f64,
    pub td_only_percent: f64,
    pub found_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconReport {
    pub meta: ReconMeta,
    pub summary: ReportSummary,
    /// Workbook order; rows in original row order.
    pub sheets: Vec<SheetReport>,
    /// Ordered by primary origin, then identity.
    pub missing: Vec<UnmatchedStudent>,
    pub issues: Vec<RowIssue>,
    pub grade_mismatches: Vec<GradeMismatch>,
    pub skipped_sheets: Vec<String>,
}

impl ReconReport {
    /// Every reconciled record in `(sheet, row_index)` order.
    pub fn full_roster(&self) -> impl Iterator<Item = &ReconciledRecord> {
        self.sheets.iter().flat_map(|s| s.records.iter())
    }

    /// Records with an AIG category, same order as `full_roster`.
    pub fn aig_only(&self) -> impl Iterator<Item = &ReconciledRecord> {
        self.full_roster().filter(|r| r.is_aig())
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

/// Build the report views and counters from a reconciliation.
pub fn assemble(
    meta: ReconMeta,
    reconciliation: Reconciliation,
    issues: Vec<RowIssue>,
    skipped_sheets: Vec<String>,
) -> ReconReport {
    let Reconciliation {
        sheets,
        mut unmatched,
        grade_mismatches,
        source_identities,
    } = reconciliation;

    unmatched.sort_by(|a, b| {
        a.primary_origin()
            .cmp(&b.primary_origin())
            .then_with(|| a.identity.cmp(&b.identity))
    });

    let sheets: Vec<SheetReport> = sheets
        .into_iter()
        .map(|s| {
            let mut records = s.records;
            records.sort_by_key(|r| r.classroom.row_index);
            SheetReport {
                sheet_name: s.sheet_name,
                classroom_label: s.classroom_label,
                header_cells: s.header_cells,
                info: s.info,
                records,
            }
        })
        .collect();

    let summary = compute_summary(
        &sheets,
        &unmatched,
        source_identities,
        &issues,
        grade_mismatches.len(),
        skipped_sheets.len(),
    );

    ReconReport {
        meta,
        summary,
        sheets,
        missing: unmatched,
        issues,
        grade_mismatches,
        skipped_sheets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classroom::ClassroomRoster;
    use crate::engine::reconcile;
    use crate::model::{Category, Origin};
    use crate::source::{DocxRow, PdfRow, SourceRoster};

    fn meta() -> ReconMeta {
        ReconMeta {
            run_name: "test".into(),
            engine_version: "0".into(),
            run_at: "2026-01-01T00:00:00+00:00".into(),
        }
    }

    fn sheet(header: &str, students: &[(&str, &str)]) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec![header.to_string()],
            vec!["LASTNAME".to_string(), "FIRSTNAME".to_string()],
        ];
        rows.extend(students.iter().map(|(l, f)| vec![l.to_string(), f.to_string()]));
        rows
    }

    #[test]
    fn missing_ordered_by_origin_then_identity() {
        let rows = sheet("Room 1", &[("Lee", "Amy")]);
        let roster = ClassroomRoster::load(vec![("Room 1", rows.as_slice())]);
        let mut sources = SourceRoster::from_docx_rows(&[
            DocxRow { name: "Abe Zed".into(), reading: "TD".into(), math: "".into() },
            DocxRow { name: "Adams, Bo".into(), reading: "".into(), math: "".into() },
        ])
        .records;
        sources.extend(
            SourceRoster::from_pdf_rows(&[PdfRow {
                name: "Young, Cy5".into(),
                student_id: "5".into(),
                grade: "4".into(),
                reading: "AG".into(),
                math: "".into(),
            }])
            .records,
        );

        let report = assemble(meta(), reconcile(&roster, &sources), Vec::new(), Vec::new());
        let order: Vec<(Origin, String)> = report
            .missing
            .iter()
            .map(|m| (m.primary_origin(), m.identity.last.clone()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Origin::PdfSource, "YOUNG".to_string()),
                (Origin::DocxSource, "ADAMS".to_string()),
                (Origin::DocxSource, "ZED".to_string()),
            ]
        );
    }

    #[test]
    fn aig_only_is_full_minus_none() {
        let rows = sheet("Room 1", &[("Lee", "Amy"), ("Ng", "Tom"), ("Kim", "Joy")]);
        let roster = ClassroomRoster::load(vec![("Room 1", rows.as_slice())]);
        let sources = SourceRoster::from_docx_rows(&[
            DocxRow { name: "Amy Lee".into(), reading: "".into(), math: "AG".into() },
            DocxRow { name: "Joy Kim".into(), reading: "IG".into(), math: "IG".into() },
        ])
        .records;
        let report = assemble(meta(), reconcile(&roster, &sources), Vec::new(), Vec::new());

        let full: Vec<_> = report.full_roster().collect();
        let aig: Vec<_> = report.aig_only().collect();
        let none = full.iter().filter(|r| r.category == Category::None).count();
        assert_eq!(aig.len(), full.len() - none);
        assert_eq!(aig[0].classroom.identity.last, "LEE");
        assert_eq!(aig[1].classroom.identity.last, "KIM");
        assert_eq!(report.sheets[0].aig_only().count(), 2);
    }
}
