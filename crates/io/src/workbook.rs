//! Classroom workbook reader.
//!
//! Cells come from calamine; sheet tab colors are not exposed there, so they
//! are read straight from the sheet XML when the file is an xlsx archive.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::IoError;

/// One sheet as plain cell text, rows padded from A1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
    /// `0xRRGGBB`, when the sheet carries an explicit RGB tab color.
    pub tab_color: Option<u32>,
}

/// Read every sheet of a workbook (xlsx, xls, xlsb, ods), in workbook order.
pub fn read_sheets(path: &Path) -> Result<Vec<RawSheet>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path).map_err(|e| IoError::open(path, e))?;
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::open(path, "workbook contains no sheets"));
    }

    let tab_colors = read_tab_colors(path);
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| IoError::open(path, format!("sheet '{name}': {e}")))?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row as usize];
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col as usize];
            cells.extend(row.iter().map(cell_text));
            rows.push(cells);
        }

        debug!(sheet = %name, rows = rows.len(), "read sheet");
        sheets.push(RawSheet {
            tab_color: tab_colors.get(&name).copied(),
            name,
            rows,
        });
    }

    Ok(sheets)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Format nicely: integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tab colors
// ---------------------------------------------------------------------------

/// Sheet name → RGB tab color. Empty for non-xlsx files or unreadable parts.
fn read_tab_colors(path: &Path) -> HashMap<String, u32> {
    let mut colors = HashMap::new();
    let Ok(file) = File::open(path) else {
        return colors;
    };
    let Ok(mut archive) = ZipArchive::new(file) else {
        return colors;
    };
    let Some(workbook_xml) = read_zip_file(&mut archive, "xl/workbook.xml") else {
        return colors;
    };
    let Some(rels_xml) = read_zip_file(&mut archive, "xl/_rels/workbook.xml.rels") else {
        return colors;
    };

    for (name, part) in resolve_sheet_parts(&workbook_xml, &rels_xml) {
        if let Some(color) = read_zip_file(&mut archive, &part).and_then(|xml| tab_color_in_xml(&xml)) {
            colors.insert(name, color);
        }
    }
    colors
}

fn read_zip_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Option<String> {
    let mut file = archive.by_name(path).ok()?;
    let mut content = String::new();
    file.read_to_string(&mut content).ok()?;
    Some(content)
}

/// `(sheet name, worksheet part path)` from workbook.xml + its rels.
fn resolve_sheet_parts(workbook_xml: &str, rels_xml: &str) -> Vec<(String, String)> {
    let mut sheets = Vec::new();
    let mut reader = XmlReader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut rid = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => {
                            name = attr
                                .decode_and_unescape_value(reader.decoder())
                                .ok()
                                .map(|v| v.into_owned())
                        }
                        b"r:id" => rid = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(name), Some(rid)) = (name, rid) {
                    sheets.push((name, rid));
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let mut rid_to_target: HashMap<String, String> = HashMap::new();
    let mut reader = XmlReader::from_str(rels_xml);
    reader.config_mut().trim_text(true);
    buf.clear();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => target = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    rid_to_target.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    sheets
        .into_iter()
        .filter_map(|(name, rid)| {
            let target = rid_to_target.get(&rid)?;
            if !target.contains("worksheet") {
                return None;
            }
            let part = match target.strip_prefix('/') {
                Some(absolute) => absolute.to_string(),
                None => format!("xl/{target}"),
            };
            Some((name, part))
        })
        .collect()
}

/// `<sheetPr><tabColor rgb="FFRRGGBB"/></sheetPr>` → `0xRRGGBB`. Theme and
/// indexed colors are ignored.
fn tab_color_in_xml(xml: &str) -> Option<u32> {
    let mut reader = XmlReader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"tabColor" => {
                    let rgb = e
                        .attributes()
                        .flatten()
                        .find(|a| a.key.as_ref() == b"rgb")
                        .map(|a| String::from_utf8_lossy(&a.value).to_string())?;
                    return parse_argb(&rgb);
                }
                // sheetPr precedes sheetData; no tab color past this point.
                b"sheetData" => return None,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

fn parse_argb(text: &str) -> Option<u32> {
    let hex = text.trim();
    let rgb = match hex.len() {
        8 => &hex[2..],
        6 => hex,
        _ => return None,
    };
    u32::from_str_radix(rgb, 16).ok()
}
