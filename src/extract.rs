use crate::error::{PipelineError, Result};
use crate::table::{DataTable, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Locate the CSV file an external acquisition step dropped into `dir`.
///
/// Picks the lexicographically first `.csv` so the choice is stable when
/// several files are present. A missing directory or a directory without a
/// CSV both surface as `MissingSource`.
pub fn find_csv(dir: &Path) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        PipelineError::MissingSource(format!("cannot read directory '{}': {e}", dir.display()))
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| {
        PipelineError::MissingSource(format!("no CSV file found in '{}'", dir.display()))
    })
}

/// Read a CSV file into a `DataTable`.
///
/// The header row names the columns; empty cells become `Value::Null` and
/// everything else stays `Value::Text` for the transforms to coerce.
pub fn read_csv(path: &Path) -> Result<DataTable> {
    debug!("Reading CSV file {}", path.display());
    let mut reader = csv::Reader::from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = DataTable::new(columns);

    for record in reader.records() {
        let record = record?;
        let row: Vec<Value> = record
            .iter()
            .map(|cell| {
                if cell.trim().is_empty() {
                    Value::Null
                } else {
                    Value::Text(cell.to_string())
                }
            })
            .collect();
        table.push_row(row)?;
    }

    info!(
        "Read {} rows x {} columns from {}",
        table.row_count(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Find and read the source CSV for one input directory.
pub fn load_table(dir: &Path) -> Result<DataTable> {
    let path = find_csv(dir)?;
    read_csv(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn find_csv_reports_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_csv(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingSource(_)));
    }

    #[test]
    fn find_csv_picks_first_csv_lexicographically() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "x\n1\n").unwrap();
        fs::write(dir.path().join("a.csv"), "x\n1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let found = find_csv(dir.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "a.csv");
    }

    #[test]
    fn read_csv_maps_empty_cells_to_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "state,permit\nAlaska,\n").unwrap();

        let table = read_csv(&path).unwrap();
        assert_eq!(table.columns(), &["state".to_string(), "permit".to_string()]);
        assert_eq!(
            table.rows()[0],
            vec![Value::Text("Alaska".to_string()), Value::Null]
        );
    }
}
