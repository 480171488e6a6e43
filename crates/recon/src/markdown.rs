use crate::config::OutputConfig;
use crate::model::Category;
use crate::report::{ReconReport, ReportSummary};

fn category_count(s: &ReportSummary, category: Category) -> usize {
    match category {
        Category::None => s.none,
        Category::MathOnly => s.math_only,
        Category::ReadingOnly => s.reading_only,
        Category::Both => s.both,
    }
}

/// Render the statistics report as Markdown.
///
/// `outputs` names the files listed under "Generated Files"; the missing
/// workbook is only listed when it was written.
pub fn render_statistics(report: &ReconReport, outputs: &OutputConfig) -> String {
    let s = &report.summary;
    let mut out = String::new();

    out.push_str("# AIG Student Statistics Report\n\n");
    out.push_str(&format!("Run: {}\n", report.meta.run_name));
    out.push_str(&format!("Generated on: {}\n\n", report.meta.run_at));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- **Total students in class lists:** {}\n", s.total_students));
    out.push_str(&format!("- **Students with AIG status:** {}\n", s.total_aig));
    out.push_str(&format!("- **Students who are only TD:** {}\n\n", s.td_only));

    out.push_str("## AIG Status Breakdown\n\n");
    out.push_str("| Category | Count |\n");
    out.push_str("|----------|-------|\n");
    for category in Category::ALL {
        let label = match category {
            Category::None => "No AIG status",
            other => other.status_text(),
        };
        out.push_str(&format!("| {} | {} |\n", label, category_count(s, category)));
    }
    out.push('\n');

    out.push_str("## Source Document Analysis\n\n");
    out.push_str(&format!("- **Students named in PDF/Word sources:** {}\n", s.source_identities));
    out.push_str(&format!("- **Found in class lists:** {}\n", s.found_in_roster));
    out.push_str(&format!("- **Not in class lists:** {}\n\n", s.missing));

    out.push_str("## Percentages\n\n");
    out.push_str(&format!("- **AIG students:** {:.1}% of class list total\n", s.aig_percent));
    out.push_str(&format!("- **TD-only students:** {:.1}% of class list total\n", s.td_only_percent));
    out.push_str(&format!("- **Found in class lists:** {:.1}% of source total\n\n", s.found_percent));

    if report.has_issues() || !report.grade_mismatches.is_empty() || !report.skipped_sheets.is_empty() {
        out.push_str("## Data Issues\n\n");
        out.push_str(&format!("- **Invalid names:** {}\n", s.invalid_names));
        out.push_str(&format!("- **Malformed rows:** {}\n", s.malformed_rows));
        out.push_str(&format!("- **Grade mismatches:** {}\n", s.grade_mismatches));
        out.push_str(&format!("- **Skipped sheets:** {}\n\n", s.skipped_sheets));
        for issue in &report.issues {
            out.push_str(&format!("- {issue}\n"));
        }
        for m in &report.grade_mismatches {
            out.push_str(&format!(
                "- {} on sheet '{}': class grade {}, source grade {}\n",
                m.identity, m.sheet_name, m.classroom_grade, m.source_grade
            ));
        }
        for name in &report.skipped_sheets {
            out.push_str(&format!("- sheet '{name}' skipped (no content)\n"));
        }
        out.push('\n');
    }

    out.push_str("## Generated Files\n\n");
    out.push_str(&format!(
        "1. `{}` - class lists with AIG columns and color coding\n",
        outputs.full_roster
    ));
    out.push_str(&format!("2. `{}` - AIG students only\n", outputs.aig_only));
    if !report.missing.is_empty() {
        out.push_str(&format!(
            "3. `{}` - students from PDF/Word not found in the class lists\n",
            outputs.missing
        ));
    }
    out.push('\n');

    out.push_str("## Color Coding\n\n");
    for category in Category::ALL {
        if let Some(rgb) = category.fill_rgb() {
            out.push_str(&format!("- **{:06X}:** {}\n", rgb, category.status_text()));
        }
    }

    out
}
