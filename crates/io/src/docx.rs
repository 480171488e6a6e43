//! Word (.docx) tables → raw cell rows.
//!
//! Only `word/document.xml` is read. Every top-level table contributes its
//! rows minus the first (heading); nested tables fold into the enclosing
//! cell's text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::IoError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract the data rows of every table in a `.docx` file.
pub fn extract_table_rows(path: &Path) -> Result<Vec<Vec<String>>, IoError> {
    let file = File::open(path).map_err(|e| IoError::open(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| IoError::extraction(path, e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| IoError::extraction(path, format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| IoError::extraction(path, e))?;

    let rows = parse_document_tables(&xml).map_err(|e| IoError::extraction(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "parsed docx tables");
    Ok(rows)
}

/// Parse `document.xml` and return table rows, first row of each table
/// dropped. Paragraphs within a cell are joined with a single space.
pub fn parse_document_tables(xml: &str) -> Result<Vec<Vec<String>>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut rows = Vec::new();
    let mut table_depth = 0usize;
    let mut row_in_table = 0usize;
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<String> = None;
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        row_in_table = 0;
                    }
                }
                b"w:tr" if table_depth == 1 => row = Some(Vec::new()),
                b"w:tc" if table_depth == 1 => cell = Some(String::new()),
                b"w:p" => paragraph.clear(),
                b"w:t" => in_text = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_text && cell.is_some() => {
                paragraph.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(ref e)) if in_text && cell.is_some() => {
                if let Some(ch) = e.resolve_char_ref().map_err(|err| err.to_string())? {
                    paragraph.push(ch);
                } else {
                    paragraph.push_str(match &**e {
                        b"amp" => "&",
                        b"lt" => "<",
                        b"gt" => ">",
                        b"apos" => "'",
                        b"quot" => "\"",
                        _ => "",
                    });
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if let Some(text) = cell.as_mut() {
                        let para = paragraph.trim();
                        if !para.is_empty() {
                            if !text.is_empty() {
                                text.push(' ');
                            }
                            text.push_str(para);
                        }
                    }
                    paragraph.clear();
                }
                b"w:tc" if table_depth == 1 => {
                    if let (Some(r), Some(text)) = (row.as_mut(), cell.take()) {
                        r.push(text);
                    }
                }
                b"w:tr" if table_depth == 1 => {
                    if let Some(r) = row.take() {
                        if row_in_table > 0 {
                            rows.push(r);
                        }
                        row_in_table += 1;
                    }
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "malformed document.xml at byte {}: {e}",
                    reader.buffer_position()
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}
