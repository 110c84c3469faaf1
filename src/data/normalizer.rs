// ============================================================
// Layer 4: Dataset Normaliser
// ============================================================
// Turns a RawTable of any supported shape into Vec<TextRecord>.
//
// Supported shapes:
//
//   Single-column ("text" + "label"):
//     text                         | label
//     "I went to the shop..."      | 0
//     "As an AI language model..." | 1
//
//   Wide (one human column, every other column an AI variant):
//     prompt | Human_story | gpt4 | llama | ...
//     "..."  | "Once..."    | "In" | "The" | ...
//   → one record per non-empty cell:
//     Human_story → label 0, every AI column → label 1
//
// Blank texts are dropped in both shapes.

use thiserror::Error;

use crate::domain::record::{Label, TextRecord};
use crate::domain::table::RawTable;

pub const DEFAULT_HUMAN_COLUMN: &str = "Human_story";

/// Column names that never hold classifiable text.
const LABEL_OR_ID_COLUMNS: &[&str] = &["label", "labels", "id", "idx"];

/// Columns skipped in the wide shape besides the human column.
const WIDE_METADATA_COLUMNS: &[&str] = &["prompt", "input_ids", "attention_mask", "id", "idx"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("dataset has no columns")]
    NoColumns,

    #[error("wide dataset has human column '{0}' but no AI columns")]
    NoAiColumns(String),
}

/// Which layout a table was recognised as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetShape {
    SingleColumn { text_column: String, label_column: Option<String> },
    Wide         { human_column: String, ai_columns: Vec<String> },
}

pub struct DatasetNormalizer {
    human_column: String,
}

impl DatasetNormalizer {
    pub fn new(human_column: impl Into<String>) -> Self {
        Self { human_column: human_column.into() }
    }

    /// Work out which shape `table` is in.
    pub fn detect_shape(&self, table: &RawTable) -> Result<DatasetShape, DatasetError> {
        if table.columns.is_empty() {
            return Err(DatasetError::NoColumns);
        }

        if table.has_column(&self.human_column) && !table.has_column("label") {
            let ai_columns: Vec<String> = table
                .columns
                .iter()
                .filter(|c| **c != self.human_column)
                .filter(|c| !WIDE_METADATA_COLUMNS.contains(&c.to_lowercase().as_str()))
                .cloned()
                .collect();
            if ai_columns.is_empty() {
                return Err(DatasetError::NoAiColumns(self.human_column.clone()));
            }
            return Ok(DatasetShape::Wide {
                human_column: self.human_column.clone(),
                ai_columns,
            });
        }

        Ok(DatasetShape::SingleColumn {
            text_column:  text_column(&table.columns),
            label_column: label_column(&table.columns),
        })
    }

    /// Convert `table` into labelled (or unlabelled) records.
    pub fn normalize(&self, table: &RawTable) -> Result<Vec<TextRecord>, DatasetError> {
        let shape = self.detect_shape(table)?;
        tracing::info!("Detected dataset shape: {:?}", shape);

        let records = match &shape {
            DatasetShape::SingleColumn { text_column, label_column } => {
                single_column_records(table, text_column, label_column.as_deref())
            }
            DatasetShape::Wide { human_column, ai_columns } => {
                wide_records(table, human_column, ai_columns)
            }
        };

        tracing::info!(
            "Normalised {} rows into {} records",
            table.row_count(),
            records.len()
        );
        Ok(records)
    }
}

impl Default for DatasetNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_HUMAN_COLUMN)
    }
}

/// "text" if present, else the first non label/id column, else the first column.
pub fn text_column(columns: &[String]) -> String {
    if columns.iter().any(|c| c == "text") {
        return "text".to_string();
    }
    columns
        .iter()
        .find(|c| !LABEL_OR_ID_COLUMNS.contains(&c.to_lowercase().as_str()))
        .or_else(|| columns.first())
        .cloned()
        .unwrap_or_else(|| "text".to_string())
}

fn label_column(columns: &[String]) -> Option<String> {
    ["label", "labels"]
        .iter()
        .find(|name| columns.iter().any(|c| c == *name))
        .map(|name| name.to_string())
}

fn single_column_records(
    table:        &RawTable,
    text_column:  &str,
    label_column: Option<&str>,
) -> Vec<TextRecord> {
    let Some(text_idx) = table.column_index(text_column) else {
        return Vec::new();
    };
    let label_idx = label_column.and_then(|c| table.column_index(c));

    (0..table.row_count())
        .filter_map(|row| {
            let text = table.cell(row, text_idx)?;
            if text.trim().is_empty() {
                return None;
            }
            let label = label_idx
                .and_then(|i| table.cell(row, i))
                .and_then(Label::parse);
            Some(TextRecord::new(text, label))
        })
        .collect()
}

fn wide_records(table: &RawTable, human_column: &str, ai_columns: &[String]) -> Vec<TextRecord> {
    let human_idx = table.column_index(human_column);
    let ai_idxs: Vec<usize> = ai_columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    let mut records = Vec::new();
    for row in 0..table.row_count() {
        if let Some(text) = human_idx.and_then(|i| table.cell(row, i)) {
            if !text.trim().is_empty() {
                records.push(TextRecord::labelled(text, Label::Human));
            }
        }
        for &i in &ai_idxs {
            if let Some(text) = table.cell(row, i) {
                if !text.trim().is_empty() {
                    records.push(TextRecord::labelled(text, Label::Ai));
                }
            }
        }
    }
    records
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        let mut t = RawTable::new(columns.iter().map(|c| c.to_string()).collect());
        for r in rows {
            t.push_row(r.iter().map(|c| c.map(str::to_string)).collect());
        }
        t
    }

    #[test]
    fn test_text_column_prefers_literal_text() {
        let cols: Vec<String> = ["id", "body", "text"].iter().map(|s| s.to_string()).collect();
        assert_eq!(text_column(&cols), "text");
    }

    #[test]
    fn test_text_column_skips_label_and_id() {
        let cols: Vec<String> = ["ID", "label", "essay"].iter().map(|s| s.to_string()).collect();
        assert_eq!(text_column(&cols), "essay");
    }

    #[test]
    fn test_text_column_falls_back_to_first() {
        let cols: Vec<String> = ["id", "label"].iter().map(|s| s.to_string()).collect();
        assert_eq!(text_column(&cols), "id");
        assert_eq!(text_column(&[]), "text");
    }

    #[test]
    fn test_single_column_dataset() {
        let t = table(
            &["id", "text", "label"],
            &[
                &[Some("1"), Some("a human wrote this"), Some("0")],
                &[Some("2"), Some("   "),                Some("1")],
                &[Some("3"), Some("a model wrote this"), Some("1")],
                &[Some("4"), Some("no label here"),      None],
            ],
        );
        let records = DatasetNormalizer::default().normalize(&t).unwrap();
        assert_eq!(
            records,
            vec![
                TextRecord::labelled("a human wrote this", Label::Human),
                TextRecord::labelled("a model wrote this", Label::Ai),
                TextRecord::new("no label here", None),
            ]
        );
    }

    #[test]
    fn test_wide_dataset_one_record_per_non_empty_cell() {
        let t = table(
            &["prompt", "Human_story", "gpt4", "llama"],
            &[
                &[Some("p1"), Some("human one"), Some("gpt one"), Some("llama one")],
                &[Some("p2"), Some(""),          Some("gpt two"), None],
                &[Some("p3"), Some("human three"), Some("  "),    Some("llama three")],
            ],
        );
        let n = DatasetNormalizer::default();
        assert_eq!(
            n.detect_shape(&t).unwrap(),
            DatasetShape::Wide {
                human_column: "Human_story".into(),
                ai_columns:   vec!["gpt4".into(), "llama".into()],
            }
        );

        let records = n.normalize(&t).unwrap();
        // 3 + 1 + 2 non-empty cells outside the prompt column
        assert_eq!(records.len(), 6);
        assert_eq!(records[0], TextRecord::labelled("human one", Label::Human));
        assert_eq!(records[1], TextRecord::labelled("gpt one", Label::Ai));
        assert_eq!(records[2], TextRecord::labelled("llama one", Label::Ai));
        assert_eq!(records[3], TextRecord::labelled("gpt two", Label::Ai));
        assert_eq!(records[4], TextRecord::labelled("human three", Label::Human));
        assert_eq!(records[5], TextRecord::labelled("llama three", Label::Ai));

        let humans = records.iter().filter(|r| r.label == Some(Label::Human)).count();
        assert_eq!(humans, 2);
    }

    #[test]
    fn test_human_column_with_label_column_is_single_column() {
        let t = table(&["Human_story", "label"], &[&[Some("hi"), Some("0")]]);
        let shape = DatasetNormalizer::default().detect_shape(&t).unwrap();
        assert!(matches!(shape, DatasetShape::SingleColumn { .. }));
    }

    #[test]
    fn test_wide_without_ai_columns_is_an_error() {
        let t = table(&["prompt", "Human_story"], &[]);
        assert_eq!(
            DatasetNormalizer::default().normalize(&t),
            Err(DatasetError::NoAiColumns("Human_story".into()))
        );
    }

    #[test]
    fn test_empty_schema_is_an_error() {
        let t = RawTable::default();
        assert_eq!(DatasetNormalizer::default().normalize(&t), Err(DatasetError::NoColumns));
    }
}
