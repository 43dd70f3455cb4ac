// src/extract/excel.rs

use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::{debug, info, instrument};

use super::{ExtractionError, RawTable};

fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        // date-formatted cells hold a serial number; render them the way the sheet writes dates
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_date() {
            Some(d) => Some(d.format("%m/%Y").to_string()),
            None => {
                debug!(?cell, "unreadable date cell");
                Some(cell.to_string())
            }
        },
        other => Some(other.to_string()),
    }
}

/// Read the first worksheet; row 0 is the header, every later row is data.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_first_sheet<P: AsRef<Path>>(path: P) -> Result<RawTable, ExtractionError> {
    let path = path.as_ref();
    let mut workbook =
        open_workbook_auto(path).map_err(|source| ExtractionError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ExtractionError::NoWorksheet(path.to_path_buf()))?
        .map_err(|source| ExtractionError::Spreadsheet {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|c| cell_to_text(c).unwrap_or_default())
            .collect(),
        None => return Err(ExtractionError::NoDataRows),
    };
    let body: Vec<Vec<Option<String>>> = rows
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect();

    info!(columns = headers.len(), rows = body.len(), "read worksheet");
    Ok(RawTable::from_ragged(headers, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_render_without_trailing_zero() {
        assert_eq!(cell_to_text(&Data::Float(5.0)).as_deref(), Some("5"));
        assert_eq!(cell_to_text(&Data::Float(3.25)).as_deref(), Some("3.25"));
        assert_eq!(cell_to_text(&Data::Int(12)).as_deref(), Some("12"));
        assert_eq!(cell_to_text(&Data::Empty), None);
    }

    #[test]
    fn iso_date_cells_render_as_month_year() {
        assert_eq!(
            cell_to_text(&Data::DateTimeIso("2024-05-01".to_string())).as_deref(),
            Some("05/2024")
        );
    }

    fn fixture() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Skills.xlsx")
    }

    #[test]
    fn reads_header_and_body_rows() {
        let table = read_first_sheet(fixture()).unwrap();
        assert_eq!(table.headers[0], "O*NET-SOC Code");
        assert_eq!(table.headers.len(), 9);
        assert_eq!(table.num_rows(), 4);

        let first = &table.rows[0];
        assert_eq!(first[0].as_deref(), Some("11-1011.00"));
        assert_eq!(first[5].as_deref(), Some("4.12"));
        assert_eq!(first[6].as_deref(), Some("8"));
        assert_eq!(first[7].as_deref(), Some("05/2024"));
    }

    #[test]
    fn date_styled_cells_and_short_rows() {
        let table = read_first_sheet(fixture()).unwrap();
        // serial 45413 with a date format
        assert_eq!(table.rows[2][7].as_deref(), Some("05/2024"));
        assert_eq!(table.rows[2][5].as_deref(), Some("4"));
        // last row has no domain source cell
        assert_eq!(table.rows[3].len(), 9);
        assert_eq!(table.rows[3][8], None);
        assert_eq!(table.rows[3][7].as_deref(), Some("N/A"));
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_first_sheet(dir.path().join("Skills.xlsx")).unwrap_err();
        assert!(matches!(err, ExtractionError::Spreadsheet { .. }));
    }
}
