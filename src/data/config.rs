//! Stimulus table loading
//!
//! Raw CSV rows are normalized into `StimulusRow` at this boundary; the core
//! never inspects tabular records. A row names the photographed concept in
//! its first cell and a variable number of distractor words after it.
//! Headered files take distractor tags from the column names; headerless
//! files get positional `d1`, `d2`, ... tags.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::error::{Error, Result};

/// One normalized stimulus table row
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusRow {
    /// The depicted concept's correct word; also names the asset files
    pub target: String,
    /// `(condition tag, word)` pairs, in table order
    pub distractors: Vec<(String, String)>,
}

/// Loads and normalizes one stimulus table. Every row must carry a target
/// and at least one distractor; empty cells are skipped.
pub fn load_stimulus_rows(path: &Path) -> Result<Vec<StimulusRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }
    if records.is_empty() {
        return Err(Error::Config(format!(
            "stimulus table {} is empty",
            path.display()
        )));
    }

    let tags: Option<Vec<String>> = if is_header(&records[0]) {
        let header = records.remove(0);
        Some(header.iter().skip(1).map(str::to_string).collect())
    } else {
        None
    };

    if records.is_empty() {
        return Err(Error::Config(format!(
            "stimulus table {} has a header but no rows",
            path.display()
        )));
    }
    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        rows.push(normalize(record, tags.as_deref(), path)?);
    }
    debug!("loaded {} stimulus rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// A first row starting with the schema's target column name is a header
fn is_header(first: &StringRecord) -> bool {
    matches!(
        first.get(0).map(str::to_lowercase).as_deref(),
        Some("target") | Some("subject")
    )
}

fn normalize(record: &StringRecord, tags: Option<&[String]>, path: &Path) -> Result<StimulusRow> {
    let target = record
        .get(0)
        .filter(|cell| !cell.is_empty())
        .ok_or_else(|| {
            Error::Config(format!("row without a target word in {}", path.display()))
        })?
        .to_string();

    let mut distractors = Vec::new();
    for (index, cell) in record.iter().enumerate().skip(1) {
        if cell.is_empty() {
            continue;
        }
        let tag = tags
            .and_then(|tags| tags.get(index - 1).cloned())
            .unwrap_or_else(|| format!("d{index}"));
        distractors.push((tag, cell.to_string()));
    }
    if distractors.is_empty() {
        return Err(Error::Config(format!(
            "stimulus row '{target}' has no distractor words"
        )));
    }
    Ok(StimulusRow { target, distractors })
}

/// Splits a stage's rows into its former and latter halves; the former half
/// takes the extra row on odd counts.
pub fn split_former_latter(mut rows: Vec<StimulusRow>) -> (Vec<StimulusRow>, Vec<StimulusRow>) {
    let cut = (rows.len() + 1) / 2;
    let latter = rows.split_off(cut);
    (rows, latter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_headerless_rows_get_positional_tags() {
        let file = table("cat,dog,fox\nsun,moon\n");
        let rows = load_stimulus_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].target, "cat");
        assert_eq!(
            rows[0].distractors,
            vec![
                ("d1".to_string(), "dog".to_string()),
                ("d2".to_string(), "fox".to_string()),
            ]
        );
        assert_eq!(rows[1].distractors, vec![("d1".to_string(), "moon".to_string())]);
    }

    #[test]
    fn test_header_provides_condition_tags() {
        let file = table("target,semantic,phonetic\ncat,dog,cap\n");
        let rows = load_stimulus_rows(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].distractors,
            vec![
                ("semantic".to_string(), "dog".to_string()),
                ("phonetic".to_string(), "cap".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let file = table("cat,dog,,fox\n");
        let rows = load_stimulus_rows(file.path()).unwrap();
        assert_eq!(
            rows[0].distractors,
            vec![
                ("d1".to_string(), "dog".to_string()),
                ("d3".to_string(), "fox".to_string()),
            ]
        );
    }

    #[test]
    fn test_row_without_distractors_rejected() {
        let file = table("cat,dog\nlonely\n");
        assert!(load_stimulus_rows(file.path()).is_err());
    }

    #[test]
    fn test_empty_table_rejected() {
        let file = table("");
        assert!(load_stimulus_rows(file.path()).is_err());
    }

    #[test]
    fn test_former_takes_the_extra_row() {
        let rows: Vec<StimulusRow> = (0..5)
            .map(|i| StimulusRow {
                target: format!("t{i}"),
                distractors: vec![("d1".to_string(), "w".to_string())],
            })
            .collect();
        let (former, latter) = split_former_latter(rows);
        assert_eq!(former.len(), 3);
        assert_eq!(latter.len(), 2);
        assert_eq!(former[0].target, "t0");
        assert_eq!(latter[0].target, "t3");
    }
}
