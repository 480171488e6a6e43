// End-to-end tests for the `aiglist` binary: exit codes, outputs, --json.
// Run with: cargo test -p aiglist-cli --test cli_tests -- --nocapture

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rust_xlsxwriter::Workbook;

fn aiglist() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_aiglist"));
    cmd.env_remove("AIGLIST_CONFIG");
    cmd.env_remove("AIGLIST_LOG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// One classroom sheet: header cell, column labels, then students.
fn write_class_lists(path: &Path, sheets: &[(&str, &str, &[(&str, &str)])]) {
    let mut workbook = Workbook::new();
    for (name, header, students) in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(*name).unwrap();
        ws.write_string(0, 0, *header).unwrap();
        ws.write_string(1, 0, "LASTNAME").unwrap();
        ws.write_string(1, 1, "FIRSTNAME").unwrap();
        for (i, (last, first)) in students.iter().enumerate() {
            let row = 2 + i as u32;
            ws.write_string(row, 0, *last).unwrap();
            ws.write_string(row, 1, *first).unwrap();
        }
    }
    workbook.save(path).unwrap();
}

/// A Word document holding one Name / Reading / Math table.
fn write_td_list(path: &Path, rows: &[[&str; 3]]) {
    let cell = |text: &str| format!("<w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>");
    let mut table = String::from("<w:tbl>");
    for row in std::iter::once(&["Name", "Reading", "Math"]).chain(rows.iter()) {
        table.push_str("<w:tr>");
        for text in row {
            table.push_str(&cell(text));
        }
        table.push_str("</w:tr>");
    }
    table.push_str("</w:tbl>");
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{table}</w:body></w:document>"#
    );

    let file = std::fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    /// Room 5 holds Doe, Lee and Ng; the Word list names Lee, Ng and Park.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_class_lists(
            &dir.path().join("class_lists.xlsx"),
            &[("Room 5", "Doe 5th Grade", &[("Doe", "Jane"), ("Lee", "Amy"), ("Ng", "Tom")][..])],
        );
        write_td_list(
            &dir.path().join("td_list.docx"),
            &[["Lee, Amy", "", "AIG"], ["Tom Ng", "", ""], ["Sam Park", "IG", ""]],
        );
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_string_lossy().to_string()
    }
}

// ===========================================================================
// aiglist run
// ===========================================================================

#[test]
fn run_writes_outputs_and_single_json_value() {
    let fx = Fixture::new();
    let output = aiglist()
        .args(["run", "--roster", &fx.arg("class_lists.xlsx")])
        .args(["--docx", &fx.arg("td_list.docx")])
        .args(["--out", &fx.arg("out"), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value = serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"));
    assert_eq!(report["summary"]["total_students"], 3);
    assert_eq!(report["summary"]["math_only"], 1);
    assert_eq!(report["summary"]["missing"], 1);
    assert_eq!(report["missing"][0]["identity"]["last"], "PARK");

    let out = fx.path("out");
    for name in [
        "updated_class_lists.xlsx",
        "updated_class_lists_AIG_Only.xlsx",
        "students_not_in_roster.xlsx",
        "aig_statistics_report.md",
        "summary.json",
    ] {
        assert!(out.join(name).is_file(), "{name} should be written");
    }
    let markdown = std::fs::read_to_string(out.join("aig_statistics_report.md")).unwrap();
    assert!(markdown.contains("Math Only"));

    let leftovers: Vec<_> = std::fs::read_dir(&out)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".aiglist-staging-"))
        .collect();
    assert!(leftovers.is_empty(), "staging dir must not survive commit");
}

#[test]
fn rerun_without_missing_students_removes_old_missing_workbook() {
    let fx = Fixture::new();
    let out = fx.arg("out");
    let first = aiglist()
        .args(["-q", "run", "--roster", &fx.arg("class_lists.xlsx")])
        .args(["--docx", &fx.arg("td_list.docx"), "--out", &out])
        .output()
        .unwrap();
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert!(fx.path("out/students_not_in_roster.xlsx").is_file());

    let second = aiglist()
        .args(["-q", "run", "--roster", &fx.arg("class_lists.xlsx"), "--out", &out])
        .output()
        .unwrap();
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert!(!fx.path("out/students_not_in_roster.xlsx").exists());
    assert!(fx.path("out/updated_class_lists.xlsx").is_file());
}

#[test]
fn missing_roster_exits_3_and_writes_nothing() {
    let fx = Fixture::new();
    let output = aiglist()
        .args(["run", "--roster", &fx.arg("nope.xlsx"), "--out", &fx.arg("out")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("error:"));
    assert!(!fx.path("out").exists());
}

#[test]
fn run_without_roster_is_a_usage_error() {
    let output = aiglist().args(["run"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn strict_with_missing_students_exits_7_after_writing() {
    let fx = Fixture::new();
    let output = aiglist()
        .args(["run", "--roster", &fx.arg("class_lists.xlsx")])
        .args(["--docx", &fx.arg("td_list.docx"), "--out", &fx.arg("out"), "--strict"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "stderr: {}", stderr(&output));
    assert!(fx.path("out/updated_class_lists.xlsx").is_file());
}

#[test]
fn strict_with_unreadable_pdf_exits_5() {
    let fx = Fixture::new();
    std::fs::write(fx.path("roster.pdf"), b"not a pdf").unwrap();
    let output = aiglist()
        .args(["run", "--roster", &fx.arg("class_lists.xlsx")])
        .args(["--pdf", &fx.arg("roster.pdf"), "--out", &fx.arg("out"), "--strict"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5), "stderr: {}", stderr(&output));
    assert!(!fx.path("out/updated_class_lists.xlsx").exists());
}

#[test]
fn unreadable_pdf_without_strict_is_skipped() {
    let fx = Fixture::new();
    std::fs::write(fx.path("roster.pdf"), b"not a pdf").unwrap();
    let output = aiglist()
        .args(["run", "--roster", &fx.arg("class_lists.xlsx")])
        .args(["--pdf", &fx.arg("roster.pdf"), "--out", &fx.arg("out")])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("continuing without it"));
    assert!(!fx.path("out/students_not_in_roster.xlsx").exists());
}

// ===========================================================================
// Config files
// ===========================================================================

#[test]
fn config_paths_resolve_against_config_dir() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("aiglist.toml"),
        r#"
name = "fall"

[inputs]
roster = "class_lists.xlsx"
docx = "td_list.docx"

[output]
dir = "results"
statistics = "fall.md"
"#,
    )
    .unwrap();

    let output = aiglist()
        .args(["-q", "run", "--config", &fx.arg("aiglist.toml")])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let markdown = std::fs::read_to_string(fx.path("results/fall.md")).unwrap();
    assert!(markdown.contains("fall"));
}

#[test]
fn invalid_config_exits_4() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("bad.toml"),
        "[inputs]\nroster = \"class_lists.xlsx\"\n[output]\nfull_roster = \"a.xlsx\"\naig_only = \"a.xlsx\"\n",
    )
    .unwrap();
    let output = aiglist()
        .args(["validate", &fx.arg("bad.toml")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4), "stderr: {}", stderr(&output));

    let unparsable = aiglist()
        .args(["run", "--config", &fx.arg("class_lists.xlsx")])
        .output()
        .unwrap();
    assert_eq!(unparsable.status.code(), Some(4));
}

#[test]
fn validate_accepts_good_config() {
    let fx = Fixture::new();
    std::fs::write(fx.path("ok.toml"), "[inputs]\nroster = \"class_lists.xlsx\"\n").unwrap();
    let output = aiglist()
        .args(["validate", &fx.arg("ok.toml")])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid:"));
}

// ===========================================================================
// aiglist batch
// ===========================================================================

#[test]
fn batch_runs_each_combination_into_its_own_folder() {
    let fx = Fixture::new();
    std::fs::write(fx.path("roster.pdf"), b"not a pdf").unwrap();
    let out = fx.path("batch_out");

    let output = aiglist()
        .args(["batch", &fx.arg(""), "--out"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let combo = out.join("batch_roster_class_lists");
    assert!(combo.join("updated_class_lists.xlsx").is_file());
    // The Word list still contributes Park.
    assert!(combo.join("students_not_in_roster.xlsx").is_file());
}

#[test]
fn strict_batch_reports_failed_combinations() {
    let fx = Fixture::new();
    std::fs::write(fx.path("roster.pdf"), b"not a pdf").unwrap();
    let output = aiglist()
        .args(["batch", &fx.arg(""), "--strict", "--out", &fx.arg("batch_out")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(8), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("FAIL"));
}

#[test]
fn batch_without_pdf_is_a_usage_error() {
    let fx = Fixture::new();
    let output = aiglist()
        .args(["batch", &fx.arg(""), "--out", &fx.arg("batch_out")])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}
