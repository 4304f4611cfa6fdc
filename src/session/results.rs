//! Session result assembly and reduction
//!
//! Blocks arrive in presentation order and stay ordered; the reductions here
//! feed the cross-session overview table and the end-of-session printout.
//! Empty or all-timeout blocks reduce to neutral zeros rather than failing,
//! so an overview row can always be written.

use rustc_hash::FxHashMap;

use crate::session::protocol::Protocol;
use crate::trial::item::{ResponseRecord, Verdict};

/// Everything one session produced, keyed by block name in presentation
/// order. Practice blocks carry a `_practice` suffix.
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub protocol: Protocol,
    pub blocks: Vec<(String, Vec<ResponseRecord>)>,
    /// The cancellation key ended the session before the protocol ran out
    pub aborted: bool,
}

impl SessionResult {
    pub fn new(protocol: Protocol) -> Self {
        SessionResult {
            protocol,
            blocks: Vec::new(),
            aborted: false,
        }
    }

    pub fn push(&mut self, name: String, records: Vec<ResponseRecord>) {
        self.blocks.push((name, records));
    }

    pub fn get(&self, name: &str) -> Option<&[ResponseRecord]> {
        self.blocks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| records.as_slice())
    }

    /// Measured block names in presentation order (practice filtered out)
    pub fn measured_names(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !name.ends_with("_practice"))
            .collect()
    }

    pub fn summaries(&self) -> Vec<BlockSummary> {
        self.blocks
            .iter()
            .map(|(name, records)| summarize(name, records))
            .collect()
    }
}

/// Per-block reduction for the overview table
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub name: String,
    pub trials: usize,
    /// Mean reaction time over responded trials, 0.0 when none responded
    pub mean_rt_ms: f64,
    /// Share of correct answers over responded trials, 0.0 when none
    pub mean_correct: f64,
}

/// Reduces one block. Timeouts contribute to the trial count but carry no
/// reaction time and no correctness value, matching the original tables
/// where "no response" cells are non-numeric.
pub fn summarize(name: &str, records: &[ResponseRecord]) -> BlockSummary {
    let rts: Vec<f64> = records
        .iter()
        .filter_map(|r| r.response_time)
        .map(|rt| rt.as_secs_f64() * 1000.0)
        .collect();
    let mean_rt_ms = if rts.is_empty() {
        0.0
    } else {
        rts.iter().sum::<f64>() / rts.len() as f64
    };

    let judged = records
        .iter()
        .filter(|r| r.verdict != Verdict::NoResponse)
        .count();
    let correct = records.iter().filter(|r| r.is_correct()).count();
    let mean_correct = if judged == 0 {
        0.0
    } else {
        correct as f64 / judged as f64
    };

    BlockSummary {
        name: name.to_string(),
        trials: records.len(),
        mean_rt_ms,
        mean_correct,
    }
}

/// Per-distractor `(correct, responded)` tallies for one block
pub fn condition_accuracy(records: &[ResponseRecord]) -> FxHashMap<String, (usize, usize)> {
    let mut tallies: FxHashMap<String, (usize, usize)> = FxHashMap::default();
    for record in records {
        if record.verdict == Verdict::NoResponse {
            continue;
        }
        let tally = tallies.entry(record.condition.clone()).or_default();
        if record.is_correct() {
            tally.0 += 1;
        }
        tally.1 += 1;
    }
    tallies
}
