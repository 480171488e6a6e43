use crate::error::RowIssue;
use crate::model::{Category, UnmatchedStudent};
use crate::report::{ReportSummary, SheetReport};

/// Compute summary counters from the assembled views.
pub fn compute_summary(
    sheets: &[SheetReport],
    missing: &[UnmatchedStudent],
    source_identities: usize,
    issues: &[RowIssue],
    grade_mismatches: usize,
    skipped_sheets: usize,
) -> ReportSummary {
    let mut summary = ReportSummary {
        source_identities,
        missing: missing.len(),
        found_in_roster: source_identities.saturating_sub(missing.len()),
        invalid_names: issues.iter().filter(|i| i.is_invalid_name()).count(),
        malformed_rows: issues.iter().filter(|i| i.is_malformed()).count(),
        grade_mismatches,
        skipped_sheets,
        ..ReportSummary::default()
    };

    for record in sheets.iter().flat_map(|s| s.records.iter()) {
        summary.total_students += 1;
        match record.category {
            Category::None => summary.none += 1,
            Category::MathOnly => summary.math_only += 1,
            Category::ReadingOnly => summary.reading_only += 1,
            Category::Both => summary.both += 1,
        }
        if record.td_only {
            summary.td_only += 1;
        }
    }

    summary.total_aig = summary.math_only + summary.reading_only + summary.both;
    summary.aig_percent = percent(summary.total_aig, summary.total_students);
    summary.td_only_percent = percent(summary.td_only, summary.total_students);
    summary.found_percent = percent(summary.found_in_roster, summary.source_identities);
    summary
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
