// ============================================================
// Layer 4: Dataset Loader
// ============================================================
// Reads dataset files into a schema-free RawTable.
//
// Supported formats (chosen by file extension):
//   .csv    header row + records             (csv crate)
//   .jsonl  one JSON object per line         (serde_json)
//   .json   a JSON array of objects          (serde_json)
//
// A directory path loads every supported file in name order and
// concatenates them; all files must share the same columns.
//
// JSON values become cells as follows:
//   string        → the string itself
//   number / bool → its JSON text ("1", "true")
//   null          → missing cell
//   array/object  → its JSON text
//
// Reference: csv crate docs, serde_json::Value

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::{
    fs,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::table::RawTable;
use crate::domain::traits::TableSource;

/// Loads a dataset table from a file or a directory of files.
pub struct FileTableLoader {
    path: PathBuf,
}

impl FileTableLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for FileTableLoader {
    fn load_table(&self) -> Result<RawTable> {
        if self.path.is_dir() {
            load_directory(&self.path)
        } else {
            load_file(&self.path)
        }
    }
}

fn load_directory(dir: &Path) -> Result<RawTable> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Cannot read directory '{}'", dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_supported(p))
        .collect();
    paths.sort();

    if paths.is_empty() {
        bail!("No .csv/.jsonl/.json files found in '{}'", dir.display());
    }

    let mut merged: Option<RawTable> = None;
    for path in &paths {
        let table = load_file(path)?;
        tracing::debug!("Loaded '{}' ({} rows)", path.display(), table.row_count());
        merged = Some(match merged {
            None => table,
            Some(mut acc) => {
                if acc.columns != table.columns {
                    bail!(
                        "Schema mismatch in '{}': expected {:?}, found {:?}",
                        path.display(),
                        acc.columns,
                        table.columns
                    );
                }
                acc.rows.extend(table.rows);
                acc
            }
        });
    }

    let table = merged.unwrap_or_default();
    tracing::info!("Loaded {} files, {} rows", paths.len(), table.row_count());
    Ok(table)
}

fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("csv") | Some("jsonl") | Some("json")
    )
}

/// Load a single dataset file, dispatching on its extension.
pub fn load_file(path: &Path) -> Result<RawTable> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv")   => read_csv(path),
        Some("jsonl") => read_jsonl(path),
        Some("json")  => read_json(path),
        _ => bail!(
            "Unsupported dataset format '{}' (expected .csv, .jsonl or .json)",
            path.display()
        ),
    }
}

fn read_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open CSV '{}'", path.display()))?;

    let columns: Vec<String> = reader
        .headers()
        .with_context(|| format!("Cannot read CSV header in '{}'", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut table = RawTable::new(columns);
    for (idx, result) in reader.records().enumerate() {
        let record = result
            .with_context(|| format!("Failed to read record {} in '{}'", idx, path.display()))?;
        table.push_row(record.iter().map(|c| Some(c.to_string())).collect());
    }
    Ok(table)
}

fn read_jsonl(path: &Path) -> Result<RawTable> {
    let file = fs::File::open(path)
        .with_context(|| format!("Cannot open '{}'", path.display()))?;

    let mut objects = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line
            .with_context(|| format!("Failed to read line {} in '{}'", idx + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line)
            .with_context(|| format!("Invalid JSON on line {} in '{}'", idx + 1, path.display()))?;
        match value {
            Value::Object(map) => objects.push(map),
            _ => bail!("Line {} in '{}' is not a JSON object", idx + 1, path.display()),
        }
    }
    Ok(table_from_objects(objects))
}

fn read_json(path: &Path) -> Result<RawTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in '{}'", path.display()))?;

    let Value::Array(items) = value else {
        bail!("'{}' must contain a JSON array of objects", path.display());
    };
    let mut objects = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => objects.push(map),
            _ => bail!("Element {} in '{}' is not a JSON object", idx, path.display()),
        }
    }
    Ok(table_from_objects(objects))
}

/// Columns are the union of keys in order of first appearance.
pub fn table_from_objects(objects: Vec<Map<String, Value>>) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(columns);
    for obj in &objects {
        let row = table
            .columns
            .iter()
            .map(|c| obj.get(c).and_then(cell_text))
            .collect();
        table.push_row(row);
    }
    table
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null      => None,
        Value::String(s) => Some(s.clone()),
        other            => Some(other.to_string()),
    }
}
