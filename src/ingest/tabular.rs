use std::path::Path;

use calamine::{open_workbook_auto, Reader};

use crate::error::{DocmineError, Result};
use crate::ingest::tables::Table;

/// Read a data file into rows of cells.
///
/// `.csv` and `.tsv` are parsed as delimited text (quoted fields may span
/// lines). Spreadsheets (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`) yield the
/// rows of their first sheet. Any other extension is an
/// [`DocmineError::UnsupportedFormat`].
pub fn extract_data(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => read_delimited(path, b','),
        "tsv" => read_delimited(path, b'\t'),
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => read_spreadsheet(path),
        _ => Err(DocmineError::UnsupportedFormat {
            path: path.to_string_lossy().into(),
            ext,
        }),
    }
}

fn tabular_err(path: &Path, e: impl std::fmt::Display) -> DocmineError {
    DocmineError::Tabular {
        path: path.to_string_lossy().into(),
        detail: e.to_string(),
    }
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let bytes = std::fs::read(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| tabular_err(path, e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_spreadsheet(path: &Path) -> Result<Table> {
    // Surface a missing file as I/O, like the delimited formats
    std::fs::metadata(path)?;
    let mut workbook = open_workbook_auto(path).map_err(|e| tabular_err(path, e))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| tabular_err(path, e))?;
    tracing::debug!(path = %path.display(), sheet = %sheet, "read spreadsheet");
    Ok(range
        .rows()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_csv_with_quotes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.csv");
        std::fs::write(&path, "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n\nx,\n").unwrap();
        let rows = extract_data(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["name", "note"]);
        assert_eq!(rows[1], vec!["Smith, J", "said \"hi\""]);
        assert_eq!(rows[2], vec!["x", ""]);
    }

    #[test]
    fn quoted_field_may_span_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.csv");
        std::fs::write(&path, "id,note\n1,\"first line\nsecond line\"\n2,short\n").unwrap();
        let rows = extract_data(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["1", "first line\nsecond line"]);
        assert_eq!(rows[2], vec!["2", "short"]);
    }

    #[test]
    fn reads_tsv() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.TSV");
        std::fs::write(&path, "a\tb\n1\t2").unwrap();
        assert_eq!(extract_data(&path).unwrap(), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn reads_first_sheet_of_xlsx() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/tabular/prices.xlsx");
        let rows = extract_data(&path).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Item", "Qty"],
                vec!["Widget", "3"],
                vec!["Gadget", "12"],
            ]
        );
    }

    #[test]
    fn corrupt_spreadsheet_is_tabular_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let err = extract_data(&path).unwrap_err();
        assert!(matches!(err, DocmineError::Tabular { .. }));
    }

    #[test]
    fn other_formats_are_unsupported() {
        let err = extract_data(Path::new("report.json")).unwrap_err();
        match err {
            DocmineError::UnsupportedFormat { ext, .. } => assert_eq!(ext, "json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_files_are_io_errors() {
        for name in ["/no/such/file.csv", "/no/such/file.xlsx"] {
            let err = extract_data(Path::new(name)).unwrap_err();
            assert!(matches!(err, DocmineError::Io(_)), "{name}: {err}");
        }
    }
}
