//! Result persistence
//!
//! Two tables per session: a record-per-row trial CSV for this participant,
//! and one summary row per block appended to a cross-session overview CSV.
//! The overview header is written only when the file is created, so sessions
//! append cleanly across runs.

use std::fs::OpenOptions;
use std::path::Path;

use chrono::Local;
use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::session::results::SessionResult;

/// Metadata collected by the participant form before the session starts
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    pub age: String,
    pub group: String,
}

#[derive(Serialize)]
struct TrialRow<'a> {
    block: &'a str,
    phase: &'a str,
    trial: usize,
    word1: &'a str,
    word2: &'a str,
    condition: &'a str,
    /// Empty cell for timeouts
    response_ms: Option<u64>,
    correct: &'a str,
}

#[derive(Serialize)]
struct OverviewRow<'a> {
    participant: &'a str,
    date: &'a str,
    protocol: u8,
    block: &'a str,
    phase: &'a str,
    trials: usize,
    mean_rt_ms: f64,
    mean_correct: f64,
}

/// `stage1_former_practice` -> (`stage1_former`, `practice`)
fn split_phase(name: &str) -> (&str, &'static str) {
    match name.strip_suffix("_practice") {
        Some(block) => (block, "practice"),
        None => (name, "measured"),
    }
}

/// Writes every response record of the session, one row per trial, in
/// presentation order.
pub fn write_session_csv(path: &Path, result: &SessionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (name, records) in &result.blocks {
        let (block, phase) = split_phase(name);
        for (index, record) in records.iter().enumerate() {
            writer.serialize(TrialRow {
                block,
                phase,
                trial: index + 1,
                word1: &record.word1,
                word2: &record.word2,
                condition: &record.condition,
                response_ms: record.response_time.map(|rt| rt.as_millis() as u64),
                correct: record.verdict.as_str(),
            })?;
        }
    }
    writer.flush()?;
    info!("session records written to {}", path.display());
    Ok(())
}

/// Appends one summary row per block to the overview table. Empty blocks
/// still produce a row, with zero means.
pub fn append_overview(path: &Path, participant: &Participant, result: &SessionResult) -> Result<()> {
    let existed = path.exists();
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(!existed)
        .from_writer(file);
    let date = Local::now().format("%Y-%m-%d").to_string();

    for summary in result.summaries() {
        let (block, phase) = split_phase(&summary.name);
        writer.serialize(OverviewRow {
            participant: &participant.id,
            date: &date,
            protocol: result.protocol.code(),
            block,
            phase,
            trials: summary.trials,
            mean_rt_ms: summary.mean_rt_ms,
            mean_correct: summary.mean_correct,
        })?;
    }
    writer.flush()?;
    info!("overview updated at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::protocol::Protocol;
    use crate::trial::item::{ResponseRecord, Verdict};
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_result() -> SessionResult {
        let mut result = SessionResult::new(Protocol::Type2);
        result.push(
            "stage1_former_practice".to_string(),
            vec![ResponseRecord {
                word1: "cat".to_string(),
                word2: "dog".to_string(),
                condition: "d1".to_string(),
                response_time: Some(Duration::from_millis(412)),
                verdict: Verdict::Correct,
            }],
        );
        result.push(
            "stage1_former".to_string(),
            vec![
                ResponseRecord {
                    word1: "dog".to_string(),
                    word2: "cat".to_string(),
                    condition: "d1".to_string(),
                    response_time: Some(Duration::from_millis(530)),
                    verdict: Verdict::Incorrect,
                },
                ResponseRecord {
                    word1: "cat".to_string(),
                    word2: "fox".to_string(),
                    condition: "d2".to_string(),
                    response_time: None,
                    verdict: Verdict::NoResponse,
                },
            ],
        );
        result
    }

    #[test]
    fn test_session_csv_one_row_per_trial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p01.csv");
        write_session_csv(&path, &sample_result()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4, "header plus three trials");
        assert!(lines[0].starts_with("block,phase,trial"));
        assert!(lines[1].contains("practice"));
        // timeout rows carry an empty response cell and the sentinel verdict
        assert!(lines[3].contains(",,no response"));
    }

    #[test]
    fn test_overview_header_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("overview.csv");
        let participant = Participant {
            id: "p01".to_string(),
            age: "24".to_string(),
            group: "control".to_string(),
        };
        append_overview(&path, &participant, &sample_result()).unwrap();
        append_overview(&path, &participant, &sample_result()).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let headers = contents
            .lines()
            .filter(|line| line.starts_with("participant,date"))
            .count();
        assert_eq!(headers, 1);
        // 2 sessions x 2 blocks, plus the header
        assert_eq!(contents.lines().count(), 5);
    }

    #[test]
    fn test_empty_block_still_gets_an_overview_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("overview.csv");
        let participant = Participant {
            id: "p02".to_string(),
            age: "31".to_string(),
            group: "test".to_string(),
        };
        let mut result = SessionResult::new(Protocol::Type1);
        result.push("stage1_former".to_string(), vec![]);
        append_overview(&path, &participant, &result).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("stage1_former,measured,0,0.0,0.0"));
    }
}
