//! Trial phase timing
//!
//! One trial walks a fixed phase sequence; every phase has a dwell taken
//! from `TrialTiming`. The final gap is the one duration protocols disagree
//! on: the classic variant closes the response window after 400 ms, the
//! patient variant waits indefinitely, so it is carried as an `Option`.

use std::time::Duration;

/// Default dwells (ms), protocol constants
const FIXATION_MS: u64 = 1000;
const FIXATION_GAP_MS: u64 = 400;
const STIMULUS_MS: u64 = 1000;
const STIMULUS_GAP_MS: u64 = 400;
const WORD1_MS: u64 = 500;
const WORD_GAP_MS: u64 = 400;
const WORD2_MS: u64 = 500;
const FINAL_GAP_MS: u64 = 400;

/// One timed segment of the trial state machine, in presentation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fixation cross on screen
    Fixation,
    /// Blank between cross and photo
    Gap1,
    /// Photo on screen (audio starts here for audio-visual items)
    Stimulus,
    /// Blank between photo and first word
    Gap2,
    /// First candidate word; the reaction clock starts at its onset
    Word1,
    /// Blank between words, response window open
    Gap3,
    /// Second candidate word
    Word2,
    /// Blank after the second word; finite or unbounded
    Gap4,
}

impl Phase {
    /// Phases before the response window opens; only cancellation is heard
    pub const APPROACH: [Phase; 4] = [Phase::Fixation, Phase::Gap1, Phase::Stimulus, Phase::Gap2];

    /// Phases in which response keys terminate the trial
    pub const RESPONSE_WINDOW: [Phase; 4] = [Phase::Word1, Phase::Gap3, Phase::Word2, Phase::Gap4];
}

/// Per-phase dwell table for one protocol variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialTiming {
    pub fixation: Duration,
    pub fixation_gap: Duration,
    pub stimulus: Duration,
    pub stimulus_gap: Duration,
    pub word1: Duration,
    pub word_gap: Duration,
    pub word2: Duration,
    /// `None` waits indefinitely for a response; timeout then cannot occur
    pub final_gap: Option<Duration>,
}

impl Default for TrialTiming {
    fn default() -> Self {
        TrialTiming {
            fixation: Duration::from_millis(FIXATION_MS),
            fixation_gap: Duration::from_millis(FIXATION_GAP_MS),
            stimulus: Duration::from_millis(STIMULUS_MS),
            stimulus_gap: Duration::from_millis(STIMULUS_GAP_MS),
            word1: Duration::from_millis(WORD1_MS),
            word_gap: Duration::from_millis(WORD_GAP_MS),
            word2: Duration::from_millis(WORD2_MS),
            final_gap: Some(Duration::from_millis(FINAL_GAP_MS)),
        }
    }
}

impl TrialTiming {
    /// The default table with the final gap overridden
    pub fn with_final_gap(final_gap: Option<Duration>) -> Self {
        TrialTiming {
            final_gap,
            ..TrialTiming::default()
        }
    }

    /// Dwell for a phase; `None` only for an unbounded final gap
    pub fn dwell(&self, phase: Phase) -> Option<Duration> {
        match phase {
            Phase::Fixation => Some(self.fixation),
            Phase::Gap1 => Some(self.fixation_gap),
            Phase::Stimulus => Some(self.stimulus),
            Phase::Gap2 => Some(self.stimulus_gap),
            Phase::Word1 => Some(self.word1),
            Phase::Gap3 => Some(self.word_gap),
            Phase::Word2 => Some(self.word2),
            Phase::Gap4 => self.final_gap,
        }
    }
}
