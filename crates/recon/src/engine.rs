use crate::aggregate::aggregate_sources;
use crate::classroom::{strip_leading_zeros, ClassroomInfo, ClassroomRoster};
use crate::error::ReconError;
use crate::matcher::{unmatched_sources, MatchLedger};
use crate::model::{
    AigFlags, Category, GradeMismatch, ReconInput, ReconMeta, ReconciledRecord, SourceRecord,
    UnmatchedStudent,
};
use crate::report::{assemble, ReconReport};

/// Reconciled rows for one sheet, in row order.
#[derive(Debug, Clone)]
pub struct ReconciledSheet {
    pub sheet_name: String,
    pub classroom_label: String,
    pub header_cells: Vec<String>,
    pub info: ClassroomInfo,
    pub records: Vec<ReconciledRecord>,
}

/// Output of one reconciliation call.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub sheets: Vec<ReconciledSheet>,
    /// Deduplicated, identity order.
    pub unmatched: Vec<UnmatchedStudent>,
    pub grade_mismatches: Vec<GradeMismatch>,
    /// Distinct identities across both source rosters.
    pub source_identities: usize,
}

/// Merge source flags onto every classroom row and collect the source
/// identities the roster never names. Never fails on data content.
pub fn reconcile(roster: &ClassroomRoster, sources: &[SourceRecord]) -> Reconciliation {
    let ledger = MatchLedger::from_roster(roster);
    let merged = aggregate_sources(sources);

    let mut grade_mismatches = Vec::new();
    let mut sheets = Vec::with_capacity(roster.sheets.len());

    for sheet in &roster.sheets {
        let mut records = Vec::with_capacity(sheet.records.len());
        for record in &sheet.records {
            let aggregate = merged.get(&record.identity);
            let flags = aggregate.map_or(AigFlags::NONE, |a| a.flags);
            let td_only = aggregate.is_some_and(|a| a.td_only && a.flags.any());

            if let (Some(classroom_grade), Some(source_grade)) = (
                sheet.info.grade.as_deref(),
                aggregate.and_then(|a| a.grade.as_deref()),
            ) {
                if !grades_agree(classroom_grade, source_grade) {
                    grade_mismatches.push(GradeMismatch {
                        identity: record.identity.clone(),
                        sheet_name: sheet.sheet_name.clone(),
                        classroom_grade: classroom_grade.to_string(),
                        source_grade: source_grade.to_string(),
                    });
                }
            }

            records.push(ReconciledRecord {
                classroom: record.clone(),
                aig_math: flags.math,
                aig_reading: flags.reading,
                category: Category::from_flags(flags),
                td_only,
            });
        }

        sheets.push(ReconciledSheet {
            sheet_name: sheet.sheet_name.clone(),
            classroom_label: sheet.classroom_label.clone(),
            header_cells: sheet.header_cells.clone(),
            info: sheet.info.clone(),
            records,
        });
    }

    let unmatched = unmatched_sources(&merged, &ledger)
        .into_iter()
        .map(|agg| UnmatchedStudent {
            identity: agg.identity.clone(),
            origins: agg.origins.clone(),
            aig_math: agg.flags.math,
            aig_reading: agg.flags.reading,
            category: Category::from_flags(agg.flags),
            student_id: agg.student_id.clone(),
            grade: agg.grade.clone(),
            source_rows: agg.source_rows,
        })
        .collect();

    Reconciliation {
        sheets,
        unmatched,
        grade_mismatches,
        source_identities: merged.len(),
    }
}

/// Grades compare numerically ("05" == "5"); non-numeric text compares
/// case-insensitively.
fn grades_agree(classroom: &str, source: &str) -> bool {
    let digits = |s: &str| s.trim().chars().all(|c| c.is_ascii_digit()) && !s.trim().is_empty();
    if digits(classroom) && digits(source) {
        strip_leading_zeros(classroom) == strip_leading_zeros(source)
    } else {
        classroom.trim().eq_ignore_ascii_case(source.trim())
    }
}

/// Run a full reconciliation: reconcile, then assemble the report views and
/// counters. Fails only when the canonical roster has no usable sheet.
pub fn run(run_name: &str, roster_path: &str, input: &ReconInput) -> Result<ReconReport, ReconError> {
    if input.roster.sheets.is_empty() {
        return Err(ReconError::MissingSource {
            path: roster_path.to_string(),
            reason: "workbook has no classroom sheets".into(),
        });
    }

    let reconciliation = reconcile(&input.roster, &input.source_records());

    let mut issues = Vec::new();
    issues.extend(input.pdf.issues.iter().cloned());
    issues.extend(input.docx.issues.iter().cloned());
    issues.extend(input.roster.issues.iter().cloned());

    let meta = ReconMeta {
        run_name: run_name.to_string(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
    };

    Ok(assemble(meta, reconciliation, issues, input.roster.skipped_sheets.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{IdentityKey, Origin};
    use crate::source::{DocxRow, PdfRow, SourceRoster};

    fn roster(sheets: &[(&str, &str, &[(&str, &str)])]) -> ClassroomRoster {
        let raw: Vec<(String, Vec<Vec<String>>)> = sheets
            .iter()
            .map(|(name, header, students)| {
                let mut rows = vec![
                    vec![header.to_string()],
                    vec!["LASTNAME".to_string(), "FIRSTNAME".to_string()],
                ];
                rows.extend(students.iter().map(|(l, f)| vec![l.to_string(), f.to_string()]));
                (name.to_string(), rows)
            })
            .collect();
        ClassroomRoster::load(raw.iter().map(|(n, r)| (n.as_str(), r.as_slice())))
    }

    fn pdf(name: &str, grade: &str, reading: &str, math: &str) -> PdfRow {
        PdfRow {
            name: name.into(),
            student_id: "1".into(),
            grade: grade.into(),
            reading: reading.into(),
            math: math.into(),
        }
    }

    #[test]
    fn absent_student_is_none() {
        let roster = roster(&[("A", "Room A", &[("Ng", "Tom")])]);
        let result = reconcile(&roster, &[]);
        let tom = &result.sheets[0].records[0];
        assert_eq!(tom.category, Category::None);
        assert!(!tom.aig_math && !tom.aig_reading);
        assert!(!tom.td_only);
        assert!(result.unmatched.is_empty());
        assert_eq!(result.source_identities, 0);
    }

    #[test]
    fn flags_merge_across_origins() {
        let roster = roster(&[("A", "Room A", &[("Kim", "Joy")])]);
        let mut sources = SourceRoster::from_pdf_rows(&[pdf("Kim, Joy11", "3", "", "AG")]).records;
        sources.extend(
            SourceRoster::from_docx_rows(&[DocxRow {
                name: "Joy Kim".into(),
                reading: "TD".into(),
                math: "".into(),
            }])
            .records,
        );
        let result = reconcile(&roster, &sources);
        assert_eq!(result.sheets[0].records[0].category, Category::Both);
    }

    #[test]
    fn same_student_on_two_sheets_reconciles_per_row() {
        let roster = roster(&[
            ("A", "Room A", &[("Kim", "Joy")]),
            ("B", "Room B", &[("Kim", "Joy")]),
        ]);
        let sources = SourceRoster::from_pdf_rows(&[pdf("Kim, Joy11", "", "IG", "")]).records;
        let result = reconcile(&roster, &sources);
        assert_eq!(result.sheets.len(), 2);
        assert_eq!(result.sheets[0].records[0].category, Category::ReadingOnly);
        assert_eq!(result.sheets[1].records[0].category, Category::ReadingOnly);
    }

    #[test]
    fn grade_mismatch_is_diagnostic_only() {
        let roster = roster(&[("A", "Heinze 5th Grade", &[("Kim", "Joy"), ("Lee", "Amy")])]);
        let sources = SourceRoster::from_pdf_rows(&[
            pdf("Kim, Joy11", "04", "IG", ""),
            pdf("Lee, Amy12", "05", "", "AG"),
        ])
        .records;
        let result = reconcile(&roster, &sources);
        assert_eq!(result.grade_mismatches.len(), 1);
        assert_eq!(result.grade_mismatches[0].identity.last, "KIM");
        assert_eq!(result.grade_mismatches[0].classroom_grade, "5");
        assert_eq!(result.grade_mismatches[0].source_grade, "04");
        assert_eq!(result.sheets[0].records[0].category, Category::ReadingOnly);
    }

    #[test]
    fn td_only_student_is_flagged() {
        let roster = roster(&[("A", "Room A", &[("Kim", "Joy")])]);
        let sources = SourceRoster::from_pdf_rows(&[pdf("Kim, Joy11", "", "TD", "-")]).records;
        let result = reconcile(&roster, &sources);
        assert!(result.sheets[0].records[0].td_only);
    }

    #[test]
    fn unmatched_keeps_union_of_origins() {
        let roster = roster(&[("A", "Room A", &[("Lee", "Amy")])]);
        let mut sources = SourceRoster::from_pdf_rows(&[pdf("Park, Sam77", "4", "", "AG")]).records;
        sources.extend(
            SourceRoster::from_docx_rows(&[DocxRow {
                name: "Sam Park".into(),
                reading: "TD".into(),
                math: "".into(),
            }])
            .records,
        );
        let result = reconcile(&roster, &sources);
        assert_eq!(result.unmatched.len(), 1);
        let sam = &result.unmatched[0];
        assert_eq!(sam.identity, IdentityKey { last: "PARK".into(), first: "SAM".into() });
        assert!(sam.origins.contains(&Origin::PdfSource));
        assert!(sam.origins.contains(&Origin::DocxSource));
        assert_eq!(sam.category, Category::Both);
        assert_eq!(sam.student_id.as_deref(), Some("1"));
    }

    #[test]
    fn run_requires_a_classroom_sheet() {
        let input = ReconInput {
            roster: ClassroomRoster::default(),
            pdf: SourceRoster::empty(Origin::PdfSource),
            docx: SourceRoster::empty(Origin::DocxSource),
        };
        let err = run("t", "lists.xlsx", &input).unwrap_err();
        assert!(matches!(err, ReconError::MissingSource { .. }));
    }

    #[test]
    fn grades_agree_numerically() {
        assert!(grades_agree("5", "05"));
        assert!(!grades_agree("5", "4"));
        assert!(grades_agree("K", "k"));
    }
}
