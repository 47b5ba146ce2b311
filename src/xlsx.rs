//! XLSX writer. Consumes collected [BookRecord]s and writes a single-sheet workbook
//! (content types, package rels, workbook, styles, one worksheet with inline strings).
//!
//! Columns: unnamed 0-based index, `book_name`, `book_author`, `book_genres`, `book_rating`.
//! List fields are rendered with [render_list](crate::model::render_list).

use crate::model::{render_list, BookRecord};
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Header row; the first (index) column has an empty header.
pub const COLUMNS: [&str; 5] = ["", "book_name", "book_author", "book_genres", "book_rating"];

const SHEET_NAME: &str = "Sheet1";

const CONTENT_TYPES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#;

const ROOT_RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

/// Style 0 is the default; style 1 is bold (header row and index column).
const STYLES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

const BOLD_STYLE: u32 = 1;

/// Errors from the XLSX writer.
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("Failed to create XLSX file: {path}: {source}")]
    CreateFile {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write XLSX archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl From<std::io::Error> for XlsxError {
    fn from(e: std::io::Error) -> Self {
        XlsxError::Zip(zip::result::ZipError::Io(e))
    }
}

/// Write `records` to an XLSX file at `path`, one row per record in order.
///
/// An empty slice still produces a valid workbook with the header row only.
pub fn write_xlsx(records: &[BookRecord], path: &Path) -> Result<(), XlsxError> {
    let path = path.to_path_buf();
    let file = std::fs::File::create(&path).map_err(|e| XlsxError::CreateFile {
        path: path.clone(),
        source: e,
    })?;
    write_workbook(records, file)
}

/// Write the workbook archive to any seekable writer.
pub fn write_workbook<W: Write + Seek>(records: &[BookRecord], writer: W) -> Result<(), XlsxError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML)?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS_XML)?;

    write_workbook_xml(&mut zip, options)?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS_XML)?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES_XML)?;

    write_sheet_xml(records, &mut zip, options)?;

    zip.finish()?;
    Ok(())
}

fn write_workbook_xml(
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), XlsxError> {
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="{}" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#,
        SHEET_NAME
    );
    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(workbook.as_bytes())?;
    Ok(())
}

fn write_sheet_xml(
    records: &[BookRecord],
    zip: &mut ZipWriter<impl Write + Seek>,
    options: SimpleFileOptions,
) -> Result<(), XlsxError> {
    let last_ref = format!("{}{}", column_name(COLUMNS.len() - 1), records.len() + 1);
    let mut rows = String::new();

    rows.push_str(r#"    <row r="1">"#);
    for (col, header) in COLUMNS.iter().enumerate() {
        if header.is_empty() {
            continue;
        }
        rows.push_str(&string_cell(col, 1, header, Some(BOLD_STYLE)));
    }
    rows.push_str("</row>\n");

    for (i, record) in records.iter().enumerate() {
        let row = i + 2;
        rows.push_str(&format!(r#"    <row r="{}">"#, row));
        rows.push_str(&format!(
            r#"<c r="{}{}" s="{}"><v>{}</v></c>"#,
            column_name(0),
            row,
            BOLD_STYLE,
            i
        ));
        rows.push_str(&string_cell(1, row, &record.title, None));
        rows.push_str(&string_cell(2, row, &render_list(&record.authors), None));
        rows.push_str(&string_cell(3, row, &render_list(&record.genres), None));
        rows.push_str(&string_cell(4, row, &record.rating, None));
        rows.push_str("</row>\n");
    }

    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <dimension ref="A1:{}"/>
  <sheetData>
{}  </sheetData>
</worksheet>"#,
        last_ref, rows
    );
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(sheet.as_bytes())?;
    Ok(())
}

fn string_cell(col: usize, row: usize, value: &str, style: Option<u32>) -> String {
    let style_attr = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
    format!(
        r#"<c r="{}{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
        column_name(col),
        row,
        style_attr,
        xml_escape(value)
    )
}

/// 0-based column index to spreadsheet letters: 0 -> A, 25 -> Z, 26 -> AA.
fn column_name(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Escape for XML text and drop control characters XML 1.0 cannot carry.
fn xml_escape(s: &str) -> String {
    s.chars()
        .filter(|&c| c == '\t' || c == '\n' || c == '\r' || !c.is_control())
        .collect::<String>()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
