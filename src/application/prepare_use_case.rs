// ============================================================
// Layer 2: PrepareUseCase
// ============================================================
// Normalises any supported dataset into a flat `text,label` CSV
// so it can be inspected or fed back into `train`:
//
//   load → normalise → clean → optional subsample → write CSV
//
// Labels are written as 0 (human) / 1 (AI); unlabelled rows get
// an empty label cell.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::corpus::{load_clean_records, maybe_sample};
use crate::domain::record::{Label, TextRecord};

#[derive(Debug, Clone)]
pub struct PrepareConfig {
    pub data_path:        String,
    pub output_path:      PathBuf,
    pub human_column:     String,
    pub sample_per_label: Option<usize>,
    pub sample_unlabeled: usize,
    pub seed:             u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareSummary {
    pub human:     usize,
    pub ai:        usize,
    pub unlabeled: usize,
}

impl PrepareSummary {
    fn of(records: &[TextRecord]) -> Self {
        records.iter().fold(Self::default(), |mut s, r| {
            match r.label {
                Some(Label::Human) => s.human += 1,
                Some(Label::Ai)    => s.ai += 1,
                None               => s.unlabeled += 1,
            }
            s
        })
    }

    pub fn total(&self) -> usize {
        self.human + self.ai + self.unlabeled
    }
}

pub struct PrepareUseCase {
    config: PrepareConfig,
}

impl PrepareUseCase {
    pub fn new(config: PrepareConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<PrepareSummary> {
        let cfg = &self.config;

        let records = load_clean_records(&cfg.data_path, &cfg.human_column)?;
        let records = maybe_sample(records, cfg.sample_per_label, cfg.sample_unlabeled, cfg.seed);

        if let Some(parent) = cfg.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        let mut writer = csv::Writer::from_path(&cfg.output_path)
            .with_context(|| format!("Cannot create '{}'", cfg.output_path.display()))?;
        writer.write_record(["text", "label"])?;
        for r in &records {
            let label = r.label.map(|l| l.as_index().to_string()).unwrap_or_default();
            writer.write_record([r.text.as_str(), label.as_str()])?;
        }
        writer.flush()?;

        let summary = PrepareSummary::of(&records);
        tracing::info!(
            "Wrote {} rows ({} human, {} AI, {} unlabelled) to '{}'",
            summary.total(), summary.human, summary.ai, summary.unlabeled,
            cfg.output_path.display(),
        );
        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config(dir: &std::path::Path, data: &str) -> PrepareConfig {
        PrepareConfig {
            data_path:        dir.join(data).to_string_lossy().into_owned(),
            output_path:      dir.join("out").join("prepared.csv"),
            human_column:     "Human_story".to_string(),
            sample_per_label: None,
            sample_unlabeled: 0,
            seed:             7,
        }
    }

    #[test]
    fn test_wide_jsonl_becomes_text_label_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("wide.jsonl"),
            "{\"prompt\":\"p\",\"Human_story\":\"Mine, with a comma\",\"llama\":\"Theirs <i>styled</i>\"}\n",
        )
        .unwrap();

        let cfg = config(dir.path(), "wide.jsonl");
        let summary = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary, PrepareSummary { human: 1, ai: 1, unlabeled: 0 });

        let mut reader = csv::Reader::from_path(&cfg.output_path).unwrap();
        let rows: Vec<(String, String)> = reader
            .records()
            .map(|r| {
                let r = r.unwrap();
                (r[0].to_string(), r[1].to_string())
            })
            .collect();
        assert_eq!(rows, vec![
            ("Mine, with a comma".to_string(), "0".to_string()),
            ("Theirs styled".to_string(), "1".to_string()),
        ]);
    }

    #[test]
    fn test_unlabelled_rows_keep_empty_label() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("plain.csv"), "text\nfirst\nsecond\n").unwrap();

        let cfg = config(dir.path(), "plain.csv");
        let summary = PrepareUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(summary.unlabeled, 2);

        let written = fs::read_to_string(&cfg.output_path).unwrap();
        assert_eq!(written, "text,label\nfirst,\nsecond,\n");
    }

    #[test]
    fn test_sampling_caps_each_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = String::from("text,label\n");
        for i in 0..10 {
            body.push_str(&format!("human {i},0\nmachine {i},1\n"));
        }
        fs::write(dir.path().join("many.csv"), body).unwrap();

        let mut cfg = config(dir.path(), "many.csv");
        cfg.sample_per_label = Some(3);
        let summary = PrepareUseCase::new(cfg).execute().unwrap();
        assert_eq!(summary, PrepareSummary { human: 3, ai: 3, unlabeled: 0 });
    }
}
