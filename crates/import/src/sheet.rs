//! Spreadsheet parsing into a header-indexed table.
//!
//! Both formats follow the same layout: the first row is a banner and is
//! skipped, the second row holds the column names, data starts on the third.
//! Cells are trimmed; blank cells are `None`.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

use crate::error::ImportError;
use crate::upload::FileFormat;

/// Number of banner rows above the header row.
const BANNER_ROWS: usize = 1;

type RawRow = Vec<Option<String>>;

/// Parsed sheet: trimmed column names plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl Table {
    /// Build a table from raw sheet rows (banner included).
    pub fn from_raw_rows(raw: Vec<RawRow>) -> Result<Self, ImportError> {
        let mut raw = raw.into_iter().skip(BANNER_ROWS);
        let header = raw
            .next()
            .ok_or_else(|| ImportError::unreadable("no header row found"))?;

        let columns = header
            .into_iter()
            .enumerate()
            .map(|(idx, name)| name.unwrap_or_else(|| format!("Unnamed: {idx}")))
            .collect();

        Ok(Self {
            columns,
            rows: raw.collect(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of the first column named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell text; `None` for blank cells and short rows.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }
}

/// Parse `bytes` according to `format`.
pub fn read_table(format: FileFormat, bytes: &[u8]) -> Result<Table, ImportError> {
    let raw = match format {
        FileFormat::Csv => read_csv_rows(bytes)?,
        FileFormat::Xlsx => read_xlsx_rows(bytes)?,
    };
    let table = Table::from_raw_rows(raw)?;

    tracing::debug!(columns = ?table.columns(), rows = table.row_count(), "parsed import sheet");
    Ok(table)
}

fn normalize(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(ImportError::unreadable)?;
        rows.push(record.iter().map(normalize).collect());
    }
    Ok(rows)
}

fn read_xlsx_rows(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).map_err(ImportError::unreadable)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::unreadable("workbook has no worksheets"))?
        .map_err(ImportError::unreadable)?;

    // The range starts at the first used cell; pad so that indices match sheet rows.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<RawRow> = (0..start_row).map(|_| Vec::new()).collect();

    for row in range.rows() {
        let mut cells: RawRow = vec![None; start_col as usize];
        cells.extend(row.iter().map(cell_text));
        rows.push(cells);
    }
    Ok(rows)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => normalize(s),
        Data::Int(i) => Some(i.to_string()),
        // Spreadsheet apps store codes such as barcodes as floats.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        other => normalize(&other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    fn column_letter(idx: usize) -> char {
        (b'A' + idx as u8) as char
    }

    /// Minimal single-sheet workbook. Cells that parse as numbers are stored
    /// as numbers, everything else as inline strings; empty cells are omitted.
    pub(crate) fn xlsx_bytes(rows: &[Vec<&str>]) -> Vec<u8> {
        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let reference = format!("{}{}", column_letter(c), r + 1);
                if value.parse::<f64>().is_ok() {
                    sheet.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#));
                } else {
                    sheet.push_str(&format!(r#"<c r="{reference}" t="inlineStr"><is><t>{value}</t></is></c>"#));
                }
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in parts {
            zip.start_file(name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn csv_skips_banner_and_trims_headers() {
        let csv = "Product export 2024,,\n Style Id ,Color Id,SKU \nA1, Red ,SKU1\nA2,,\n";
        let table = read_table(FileFormat::Csv, csv.as_bytes()).unwrap();

        assert_eq!(table.columns(), ["Style Id", "Color Id", "SKU"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 1), Some("Red"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), None);
    }

    #[test]
    fn csv_tolerates_ragged_rows_and_bom() {
        let csv = "\u{feff}banner\nStyle Id,Size\nA1\nA2,M,extra\n";
        let table = read_table(FileFormat::Csv, csv.as_bytes()).unwrap();

        assert_eq!(table.columns(), ["Style Id", "Size"]);
        assert_eq!(table.cell(0, 1), None);
        assert_eq!(table.cell(1, 1), Some("M"));
    }

    #[test]
    fn unnamed_header_cells_get_placeholder_names() {
        let table = read_table(FileFormat::Csv, b"banner\nStyle Id,,SKU\n").unwrap();
        assert_eq!(table.columns(), ["Style Id", "Unnamed: 1", "SKU"]);
    }

    #[test]
    fn banner_only_file_is_unreadable() {
        let err = read_table(FileFormat::Csv, b"just a banner\n").unwrap_err();
        assert_eq!(err, ImportError::validation("Error reading file: no header row found"));
    }

    #[test]
    fn invalid_utf8_csv_is_unreadable() {
        let err = read_table(FileFormat::Csv, b"banner\nStyle Id\n\xff\xfe\n").unwrap_err();
        match err {
            ImportError::Validation(msg) => assert!(msg.starts_with("Error reading file:")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn xlsx_reads_header_from_second_row() {
        let bytes = xlsx_bytes(&[
            vec!["Catalog"],
            vec!["Style Id", "Size", "No_"],
            vec!["A1", "M", "5901234123457"],
            vec!["A2", "", "12.5"],
        ]);
        let table = read_table(FileFormat::Xlsx, &bytes).unwrap();

        assert_eq!(table.columns(), ["Style Id", "Size", "No_"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 2), Some("5901234123457"));
        assert_eq!(table.cell(1, 1), None);
        assert_eq!(table.cell(1, 2), Some("12.5"));
    }

    #[test]
    fn xlsx_offset_range_keeps_row_positions() {
        // Banner row left empty: the used range starts on the header row.
        let bytes = xlsx_bytes(&[vec![], vec!["Style Id"], vec!["A1"]]);
        let table = read_table(FileFormat::Xlsx, &bytes).unwrap();

        assert_eq!(table.columns(), ["Style Id"]);
        assert_eq!(table.cell(0, 0), Some("A1"));
    }

    #[test]
    fn garbage_xlsx_is_unreadable() {
        let err = read_table(FileFormat::Xlsx, b"not a zip archive").unwrap_err();
        match err {
            ImportError::Validation(msg) => assert!(msg.starts_with("Error reading file:")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
