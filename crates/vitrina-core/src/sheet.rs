//! # Spreadsheet Readers
//!
//! Turns a local file into a `Sheet`.
//!
//! - `.csv` / `.txt`: csv crate, comma or semicolon delimited
//! - `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods`: calamine, first worksheet only
//!
//! Every failure is reported as `VitrinaError::SourceUnavailable`.

use crate::primitives::{MAX_SOURCE_FILE_SIZE, MAX_SOURCE_ROWS};
use crate::row::{Cell, Sheet};
use crate::VitrinaError;
use calamine::{Data, Reader, open_workbook_auto};
use rust_decimal::Decimal;
use std::path::Path;

/// File formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

impl SheetFormat {
    /// Pick a format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, VitrinaError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv" | "txt") => Ok(Self::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Self::Workbook),
            Some(ext) => Err(VitrinaError::SourceUnavailable(format!(
                "unsupported file extension: {}",
                ext
            ))),
            None => Err(VitrinaError::SourceUnavailable(format!(
                "file has no extension: {}",
                path.display()
            ))),
        }
    }
}

/// Read a spreadsheet file from disk.
pub fn read_sheet(path: &Path) -> Result<Sheet, VitrinaError> {
    let format = SheetFormat::from_path(path)?;

    let metadata = std::fs::metadata(path).map_err(|e| {
        VitrinaError::SourceUnavailable(format!("cannot open {}: {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(VitrinaError::SourceUnavailable(format!(
            "{} is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_SOURCE_FILE_SIZE {
        return Err(VitrinaError::SourceUnavailable(format!(
            "file size {} bytes exceeds maximum {} bytes",
            metadata.len(),
            MAX_SOURCE_FILE_SIZE
        )));
    }

    match format {
        SheetFormat::Csv => {
            let bytes = std::fs::read(path).map_err(|e| {
                VitrinaError::SourceUnavailable(format!("cannot read {}: {}", path.display(), e))
            })?;
            read_csv(&bytes)
        }
        SheetFormat::Workbook => read_workbook(path),
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Parse CSV bytes. The first record is the header row.
///
/// The delimiter is `;` when the header line has semicolons and no commas,
/// which is how spreadsheet apps export in comma-decimal locales.
///
/// Fields are decoded lossily: a byte that is not UTF-8 (a legacy-encoded
/// accent, say) becomes U+FFFD in that one cell and the rest of the file
/// still loads.
pub fn read_csv(bytes: &[u8]) -> Result<Sheet, VitrinaError> {
    let delimiter = detect_delimiter(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .byte_headers()
        .map_err(|e| VitrinaError::SourceUnavailable(format!("invalid CSV header: {}", e)))?
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record
            .map_err(|e| VitrinaError::SourceUnavailable(format!("invalid CSV record: {}", e)))?;
        if rows.len() >= MAX_SOURCE_ROWS {
            return Err(too_many_rows());
        }
        rows.push(
            record
                .iter()
                .map(|field| Cell::from_text(&String::from_utf8_lossy(field)))
                .collect(),
        );
    }

    Ok(Sheet::new(headers, rows))
}

fn detect_delimiter(bytes: &[u8]) -> u8 {
    let header_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let has_semicolon = header_line.contains(&b';');
    let has_comma = header_line.contains(&b',');
    if has_semicolon && !has_comma { b';' } else { b',' }
}

// =============================================================================
// WORKBOOK
// =============================================================================

/// Read the first worksheet of a workbook. The first row is the header row.
pub fn read_workbook(path: &Path) -> Result<Sheet, VitrinaError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        VitrinaError::SourceUnavailable(format!("cannot open workbook {}: {}", path.display(), e))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| VitrinaError::SourceUnavailable("workbook has no worksheets".to_string()))?
        .map_err(|e| VitrinaError::SourceUnavailable(format!("cannot read worksheet: {}", e)))?;

    let mut source_rows = range.rows();
    let headers: Vec<String> = match source_rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|data| cell_from_data(data).as_text().unwrap_or_default())
            .collect(),
        None => return Ok(Sheet::default()),
    };

    let mut rows = Vec::new();
    for source_row in source_rows {
        if rows.len() >= MAX_SOURCE_ROWS {
            return Err(too_many_rows());
        }
        rows.push(source_row.iter().map(cell_from_data).collect());
    }

    Ok(Sheet::new(headers, rows))
}

/// Convert a calamine cell. Error cells and non-finite floats count as empty.
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::Int(i) => Cell::Number(Decimal::from(*i)),
        Data::Float(f) => Decimal::try_from(*f)
            .map(Cell::Number)
            .unwrap_or(Cell::Empty),
        Data::String(s) => Cell::from_text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        other => Cell::from_text(&other.to_string()),
    }
}

fn too_many_rows() -> VitrinaError {
    VitrinaError::SourceUnavailable(format!(
        "source has more than {} data rows",
        MAX_SOURCE_ROWS
    ))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            SheetFormat::from_path(Path::new("a.CSV")).expect("csv"),
            SheetFormat::Csv
        );
        assert_eq!(
            SheetFormat::from_path(Path::new("a.xlsx")).expect("xlsx"),
            SheetFormat::Workbook
        );
        assert!(SheetFormat::from_path(Path::new("a.pdf")).is_err());
        assert!(SheetFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn csv_comma_delimited() {
        let sheet = read_csv(b"DETALLE,PRECIO\nBed,10\n").expect("csv");
        assert_eq!(sheet.headers(), ["DETALLE", "PRECIO"]);
        let row = sheet.rows().next().expect("row");
        assert_eq!(row.number("PRECIO"), Decimal::from_str("10").ok());
    }

    #[test]
    fn csv_semicolon_delimited() {
        let sheet = read_csv(b"DETALLE;PRECIO\nBed;10.5\n").expect("csv");
        let row = sheet.rows().next().expect("row");
        assert_eq!(row.text("DETALLE").as_deref(), Some("Bed"));
        assert_eq!(row.number("PRECIO"), Decimal::from_str("10.5").ok());
    }

    #[test]
    fn csv_short_rows_are_kept() {
        let sheet = read_csv(b"A,B,C\n1\n1,2,3\n").expect("csv");
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn csv_legacy_encoded_byte_spoils_only_its_cell() {
        let bytes = b"COD_ALFA,DETALLE,PRECIO,STOCK,Link\nA,Cama peque\xF1a,10,3,\nB,Bowl,5,2,\n";
        let sheet = read_csv(bytes).expect("csv");
        assert_eq!(sheet.row_count(), 2);

        let rows: Vec<_> = sheet.rows().collect();
        assert_eq!(
            rows[0].text("DETALLE").as_deref(),
            Some("Cama peque\u{FFFD}a")
        );
        assert_eq!(rows[0].number("PRECIO"), Decimal::from_str("10").ok());
        assert_eq!(rows[1].text("DETALLE").as_deref(), Some("Bowl"));
        assert_eq!(rows[1].number("STOCK"), Decimal::from_str("2").ok());
    }

    #[test]
    fn float_cells_convert_without_binary_noise() {
        let cell = cell_from_data(&Data::Float(10.1));
        assert_eq!(cell, Cell::Number(Decimal::from_str("10.1").expect("decimal")));
        assert_eq!(cell_from_data(&Data::Float(f64::NAN)), Cell::Empty);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let result = read_sheet(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(VitrinaError::SourceUnavailable(_))));
    }

    #[test]
    fn garbage_workbook_is_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").expect("write");
        assert!(matches!(
            read_sheet(&path),
            Err(VitrinaError::SourceUnavailable(_))
        ));
    }
}
